use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ReconError;
use crate::profile::{IdentityProfile, Labels, Language, RecordKind};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// A saved comparison: which layout, which language, which two files.
///
/// ```toml
/// name = "March closing"
/// kind = "closing"
/// language = "en"
/// test = "test/closing.xlsx"
/// prod = "prod/closing.xlsx"
///
/// [output]
/// dir = "out"
/// report = "closing-diff.csv"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompareConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub kind: RecordKind,
    #[serde(default)]
    pub language: Language,
    pub test: String,
    pub prod: String,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Output locations. Unset file names fall back to the per-kind defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub dir: Option<String>,
    #[serde(default)]
    pub test: Option<String>,
    #[serde(default)]
    pub prod: Option<String>,
    #[serde(default)]
    pub report: Option<String>,
    /// Optional JSON dump of the report.
    #[serde(default)]
    pub json: Option<String>,
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub test: PathBuf,
    pub prod: PathBuf,
    pub report: PathBuf,
    pub json: Option<PathBuf>,
}

impl OutputPaths {
    /// Default file names for `kind`/`language` inside `dir`.
    pub fn defaults(dir: &Path, kind: RecordKind, language: Language) -> Self {
        let labels = Labels::for_output(kind, language);
        Self {
            test: dir.join(labels.test_file),
            prod: dir.join(labels.prod_file),
            report: dir.join(labels.report_file),
            json: None,
        }
    }
}

const TABLE_EXTENSIONS: &[&str] = &["xlsx", "csv"];

impl CompareConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: CompareConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.test.trim().is_empty() {
            return Err(ReconError::ConfigValidation("'test' input path is empty".into()));
        }
        if self.prod.trim().is_empty() {
            return Err(ReconError::ConfigValidation("'prod' input path is empty".into()));
        }

        let named = [
            ("output.test", &self.output.test),
            ("output.prod", &self.output.prod),
            ("output.report", &self.output.report),
        ];
        for (field, value) in named {
            let Some(name) = value else { continue };
            let ext = Path::new(name)
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            if !ext.as_deref().is_some_and(|e| TABLE_EXTENSIONS.contains(&e)) {
                return Err(ReconError::ConfigValidation(format!(
                    "{field} = \"{name}\": expected a .xlsx or .csv file name"
                )));
            }
        }

        let names: Vec<&String> = named.iter().filter_map(|(_, v)| v.as_ref()).collect();
        for (i, a) in names.iter().enumerate() {
            if names[i + 1..].contains(a) {
                let msg = format!("output file \"{a}\" is used twice");
                return Err(ReconError::ConfigValidation(msg));
            }
        }

        Ok(())
    }

    pub fn profile(&self) -> IdentityProfile {
        IdentityProfile::new(self.kind, self.language)
    }

    /// Input paths resolved against `base_dir` (the config file's directory).
    pub fn input_paths(&self, base_dir: &Path) -> (PathBuf, PathBuf) {
        (base_dir.join(&self.test), base_dir.join(&self.prod))
    }

    /// Output paths resolved against `base_dir`, defaults filled in.
    pub fn output_paths(&self, base_dir: &Path) -> OutputPaths {
        let dir = match &self.output.dir {
            Some(d) => base_dir.join(d),
            None => base_dir.to_path_buf(),
        };
        let defaults = OutputPaths::defaults(&dir, self.kind, self.language);
        OutputPaths {
            test: self.output.test.as_ref().map(|n| dir.join(n)).unwrap_or(defaults.test),
            prod: self.output.prod.as_ref().map(|n| dir.join(n)).unwrap_or(defaults.prod),
            report: self.output.report.as_ref().map(|n| dir.join(n)).unwrap_or(defaults.report),
            json: self.output.json.as_ref().map(|n| dir.join(n)),
        }
    }
}
