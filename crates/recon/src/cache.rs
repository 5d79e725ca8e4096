use std::collections::HashMap;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::profile::IdentityProfile;
use crate::table::PreparedTable;

/// Identity of an input artifact: SHA-256 of its bytes.
pub type ContentDigest = [u8; 32];

pub fn content_digest(bytes: &[u8]) -> ContentDigest {
    Sha256::digest(bytes).into()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    digest: ContentDigest,
    format: String,
    profile: IdentityProfile,
}

/// Read-through memo of prepared tables, keyed by content, input format and
/// identity profile. The same bytes decode differently as CSV and as a workbook.
///
/// Entries live as long as the cache; nothing is evicted.
#[derive(Debug, Default)]
pub struct PreparedCache {
    entries: HashMap<CacheKey, Arc<PreparedTable>>,
    hits: usize,
    misses: usize,
}

impl PreparedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `content` read as `format` (a lowercase
    /// file extension), or build it with `prepare`.
    ///
    /// A failing `prepare` leaves the cache untouched.
    pub fn get_or_prepare<E, F>(
        &mut self,
        content: &[u8],
        format: &str,
        profile: &IdentityProfile,
        prepare: F,
    ) -> Result<Arc<PreparedTable>, E>
    where
        F: FnOnce() -> Result<PreparedTable, E>,
    {
        let key = CacheKey {
            digest: content_digest(content),
            format: format.to_string(),
            profile: profile.clone(),
        };

        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            log::debug!(
                "prepared-table cache hit ({format}, {} {})",
                profile.kind,
                profile.language
            );
            return Ok(Arc::clone(hit));
        }

        self.misses += 1;
        let prepared = Arc::new(prepare()?);
        self.entries.insert(key, Arc::clone(&prepared));
        Ok(prepared)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Language, RecordKind};

    fn profile(lang: Language) -> IdentityProfile {
        IdentityProfile::new(RecordKind::ContractList, lang)
    }

    #[test]
    fn same_content_same_profile_is_cached() {
        let mut cache = PreparedCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            let _ = cache
                .get_or_prepare::<(), _>(b"bytes", "csv", &profile(Language::En), || {
                    calls += 1;
                    Ok(PreparedTable::default())
                })
                .unwrap();
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn profile_is_part_of_the_key() {
        let mut cache = PreparedCache::new();
        let empty = || Ok::<_, ()>(PreparedTable::default());
        cache.get_or_prepare(b"bytes", "csv", &profile(Language::En), empty).unwrap();
        cache.get_or_prepare(b"bytes", "csv", &profile(Language::De), empty).unwrap();
        cache.get_or_prepare(b"other", "csv", &profile(Language::De), empty).unwrap();
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.hits(), 0);
    }

    #[test]
    fn format_is_part_of_the_key() {
        let mut cache = PreparedCache::new();
        let mut calls = 0;
        for format in ["csv", "xlsx", "csv"] {
            cache
                .get_or_prepare::<(), _>(b"bytes", format, &profile(Language::En), || {
                    calls += 1;
                    Ok(PreparedTable::default())
                })
                .unwrap();
        }
        assert_eq!(calls, 2);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn errors_are_not_cached() {
        let mut cache = PreparedCache::new();
        let err = cache.get_or_prepare(b"bad", "csv", &profile(Language::En), || Err("boom"));
        assert_eq!(err.unwrap_err(), "boom");
        assert!(cache.is_empty());
    }
}
