use std::sync::Arc;

use serde::Serialize;

use crate::profile::{Labels, Language, RecordKind};
use crate::table::{Issue, PreparedTable, RawTable};
use crate::value::CellValue;

// ---------------------------------------------------------------------------
// Row outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    OnlyInTest,
    OnlyInProd,
    /// Present on both sides with at least one column outside tolerance.
    Changed,
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OnlyInTest => write!(f, "only_in_test"),
            Self::OnlyInProd => write!(f, "only_in_prod"),
            Self::Changed => write!(f, "changed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDiff {
    pub column: String,
    pub test: CellValue,
    pub prod: CellValue,
}

impl std::fmt::Display for ColumnDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: Test={} / Prod={}",
            self.column,
            self.test.to_key_text(),
            self.prod.to_key_text()
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffRow {
    pub key: String,
    pub status: DiffStatus,
    /// Aligned with [`DiffReport::identity_columns`].
    pub identity: Vec<CellValue>,
    pub differences: Vec<ColumnDiff>,
}

impl DiffRow {
    /// The `Differences` cell: a status sentinel or `; `-joined column diffs.
    pub fn differences_text(&self, labels: &Labels) -> String {
        match self.status {
            DiffStatus::OnlyInTest => labels.only_in_test.to_string(),
            DiffStatus::OnlyInProd => labels.only_in_prod.to_string(),
            DiffStatus::Changed if self.differences.is_empty() => labels.no_differences.to_string(),
            DiffStatus::Changed => {
                self.differences.iter().map(ColumnDiff::to_string).collect::<Vec<_>>().join("; ")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Identity column carried into the report: where it comes from and its header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityColumn {
    pub source: String,
    pub label: String,
}

/// Comparable columns that exist on only one side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnDrift {
    pub only_in_test: Vec<String>,
    pub only_in_prod: Vec<String>,
}

impl ColumnDrift {
    pub fn is_empty(&self) -> bool {
        self.only_in_test.is_empty() && self.only_in_prod.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub test_rows: usize,
    pub prod_rows: usize,
    pub keys_compared: usize,
    pub unchanged: usize,
    pub changed: usize,
    pub only_in_test: usize,
    pub only_in_prod: usize,
}

impl DiffSummary {
    /// Rows that made it into the report.
    pub fn reported(&self) -> usize {
        self.changed + self.only_in_test + self.only_in_prod
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub kind: RecordKind,
    pub language: Language,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffReport {
    pub meta: ReportMeta,
    pub identity_columns: Vec<IdentityColumn>,
    pub compared_columns: Vec<String>,
    pub drift: ColumnDrift,
    pub summary: DiffSummary,
    pub rows: Vec<DiffRow>,
}

impl DiffReport {
    pub fn labels(&self) -> &'static Labels {
        Labels::for_output(self.meta.kind, self.meta.language)
    }

    pub fn has_differences(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Export shape: identity columns, then the differences column.
    pub fn to_table(&self) -> RawTable {
        let labels = self.labels();
        let mut columns: Vec<String> =
            self.identity_columns.iter().map(|c| c.label.clone()).collect();
        columns.push(labels.differences.to_string());

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut out = row.identity.clone();
                out.push(CellValue::Text(row.differences_text(labels)));
                out
            })
            .collect();

        RawTable::new(columns, rows)
    }
}

// ---------------------------------------------------------------------------
// Comparison output
// ---------------------------------------------------------------------------

/// Everything one comparison produces: both cleaned tables and the report.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub test: Arc<PreparedTable>,
    pub prod: Arc<PreparedTable>,
    pub report: DiffReport,
}

impl Comparison {
    /// Issues raised while preparing either side, tagged with the side name.
    pub fn issues(&self) -> impl Iterator<Item = (&'static str, &Issue)> {
        let test = self.test.issues.iter().map(|i| ("test", i));
        let prod = self.prod.issues.iter().map(|i| ("prod", i));
        test.chain(prod)
    }

    /// Both sides lost their mandatory identity columns; nothing to compare.
    pub fn is_unusable(&self) -> bool {
        self.test.is_missing_required() && self.prod.is_missing_required()
    }
}
