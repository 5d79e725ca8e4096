use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::profile::KEY_COLUMN;
use crate::value::CellValue;

/// Headerless grid as read from a sheet. Row 0 is the first physical row.
pub type Grid = Vec<Vec<CellValue>>;

/// A table with one header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    /// Split a grid into header row + data rows. Header cells become their text form.
    pub fn from_grid(mut grid: Grid) -> Self {
        if grid.is_empty() {
            return Self::default();
        }
        let header = grid.remove(0);
        let columns = header.iter().map(CellValue::to_text).collect();
        Self { columns, rows: grid }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// One keyed row. `values` is aligned with the owning table's `columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedRow {
    pub key: String,
    pub values: Vec<CellValue>,
}

/// Rows indexed by their identity key.
///
/// All rows are kept in order for export. When two rows share a key the first
/// one is the one returned by [`KeyedTable::get`].
#[derive(Debug, Clone, Default)]
pub struct KeyedTable {
    columns: Vec<String>,
    rows: Vec<KeyedRow>,
    index: HashMap<String, usize>,
    duplicates: Vec<String>,
}

impl KeyedTable {
    pub fn new(columns: Vec<String>, rows: Vec<KeyedRow>) -> Self {
        let mut index = HashMap::with_capacity(rows.len());
        let mut duplicates = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            if index.contains_key(&row.key) {
                duplicates.push(row.key.clone());
            } else {
                index.insert(row.key.clone(), i);
            }
        }
        if !duplicates.is_empty() {
            log::warn!("{} duplicate key(s); first occurrence wins", duplicates.len());
        }
        Self { columns, rows, index, duplicates }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[KeyedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&KeyedRow> {
        self.index.get(key).map(|&i| &self.rows[i])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Value of `column` for `key`, if both exist.
    pub fn value(&self, key: &str, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.get(key).and_then(|row| row.values.get(col))
    }

    /// Keys that occurred more than once, in input order.
    pub fn duplicate_keys(&self) -> &[String] {
        &self.duplicates
    }

    /// Export shape: `Key` first, then every column, every row.
    pub fn to_raw_table(&self) -> RawTable {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(KEY_COLUMN.to_string());
        columns.extend(self.columns.iter().cloned());

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut out = Vec::with_capacity(columns.len());
                out.push(CellValue::Text(row.key.clone()));
                out.extend(row.values.iter().cloned());
                out.resize(columns.len(), CellValue::Empty);
                out
            })
            .collect();

        RawTable { columns, rows }
    }
}

/// Something worth telling the caller about while preparing a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// Mandatory identity columns are absent; the table is empty.
    MissingRequired { missing: Vec<String>, available: Vec<String> },
    /// Optional identity columns are absent; the fallback key scheme may apply.
    MissingOptional { missing: Vec<String> },
    /// The same key was derived for more than one row.
    DuplicateKeys { keys: Vec<String> },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired { missing, available } => write!(
                f,
                "expected columns not found: {}; available columns after cleanup: {}",
                missing.join(", "),
                available.join(", ")
            ),
            Self::MissingOptional { missing } => write!(
                f,
                "optional columns not found (ignored for matching): {}",
                missing.join(", ")
            ),
            Self::DuplicateKeys { keys } => {
                let count = keys.len();
                write!(f, "{count} duplicate key(s), first occurrence used: {}", keys.join(", "))
            }
        }
    }
}

/// A keyed table plus the issues raised while building it.
#[derive(Debug, Clone, Default)]
pub struct PreparedTable {
    pub table: KeyedTable,
    pub issues: Vec<Issue>,
}

impl PreparedTable {
    pub fn new(table: KeyedTable, mut issues: Vec<Issue>) -> Self {
        if !table.duplicate_keys().is_empty() {
            issues.push(Issue::DuplicateKeys { keys: table.duplicate_keys().to_vec() });
        }
        Self { table, issues }
    }

    pub fn is_missing_required(&self) -> bool {
        self.issues.iter().any(|i| matches!(i, Issue::MissingRequired { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, vals: &[&str]) -> KeyedRow {
        KeyedRow { key: key.into(), values: vals.iter().map(|v| CellValue::text(*v)).collect() }
    }

    #[test]
    fn first_duplicate_wins() {
        let t = KeyedTable::new(
            vec!["a".into()],
            vec![row("k1", &["x"]), row("k1", &["y"]), row("k2", &["z"])],
        );
        assert_eq!(t.len(), 3);
        assert_eq!(t.value("k1", "a"), Some(&CellValue::text("x")));
        assert_eq!(t.duplicate_keys(), ["k1".to_string()]);

        let prepared = PreparedTable::new(t, Vec::new());
        assert_eq!(prepared.issues, vec![Issue::DuplicateKeys { keys: vec!["k1".into()] }]);
    }

    #[test]
    fn export_puts_key_first() {
        let t = KeyedTable::new(vec!["a".into(), "b".into()], vec![row("k1", &["x", "y"])]);
        let raw = t.to_raw_table();
        assert_eq!(raw.columns, vec!["Key", "a", "b"]);
        assert_eq!(raw.rows[0][0], CellValue::text("k1"));
        assert_eq!(raw.rows[0][2], CellValue::text("y"));
    }

    #[test]
    fn grid_header_split() {
        let grid = vec![
            vec![CellValue::text("id"), CellValue::Number(2024.0)],
            vec![CellValue::text("a"), CellValue::Number(1.0)],
        ];
        let raw = RawTable::from_grid(grid);
        assert_eq!(raw.columns, vec!["id", "2024"]);
        assert_eq!(raw.rows.len(), 1);
    }
}
