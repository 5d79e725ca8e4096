use std::collections::BTreeSet;
use std::sync::Arc;

use crate::compare::{nearly_equal, values_differ, TOLERANCE};
use crate::model::{
    ColumnDiff, ColumnDrift, Comparison, DiffReport, DiffRow, DiffStatus, DiffSummary,
    IdentityColumn, ReportMeta,
};
use crate::profile::{IdentityProfile, LINE_INDEX_COLUMN};
use crate::table::{KeyedTable, PreparedTable};

/// Compare two prepared tables. The tables are carried into the result as-is.
pub fn run(
    test: Arc<PreparedTable>,
    prod: Arc<PreparedTable>,
    profile: &IdentityProfile,
) -> Comparison {
    let report = reconcile(&test.table, &prod.table, profile);
    Comparison { test, prod, report }
}

/// Align two keyed tables and collect per-column differences.
///
/// Keys are visited in sorted order. Rows present on both sides with every
/// compared column equal (or within tolerance) are left out of the report.
pub fn reconcile(test: &KeyedTable, prod: &KeyedTable, profile: &IdentityProfile) -> DiffReport {
    let identity_columns = report_identity_columns(test, prod, profile);
    let compared_columns = comparable_columns(test, prod, profile);
    let drift = column_drift(test, prod, profile);

    if !drift.is_empty() {
        log::info!(
            "column drift: {} only in test, {} only in prod",
            drift.only_in_test.len(),
            drift.only_in_prod.len()
        );
    }

    let keys: BTreeSet<&str> = test.keys().chain(prod.keys()).collect();

    let mut summary = DiffSummary {
        test_rows: test.len(),
        prod_rows: prod.len(),
        keys_compared: keys.len(),
        ..DiffSummary::default()
    };
    let mut rows = Vec::new();

    for key in keys {
        let source = if test.contains_key(key) { test } else { prod };
        let identity = identity_columns
            .iter()
            .map(|c| source.value(key, &c.source).cloned().unwrap_or_default())
            .collect();

        let (status, differences) = if !test.contains_key(key) {
            summary.only_in_prod += 1;
            (DiffStatus::OnlyInProd, Vec::new())
        } else if !prod.contains_key(key) {
            summary.only_in_test += 1;
            (DiffStatus::OnlyInTest, Vec::new())
        } else {
            let differences = compare_row(test, prod, key, &compared_columns);
            if differences.is_empty() {
                summary.unchanged += 1;
                continue;
            }
            summary.changed += 1;
            (DiffStatus::Changed, differences)
        };

        rows.push(DiffRow { key: key.to_string(), status, identity, differences });
    }

    log::debug!("reconciled {} key(s), {} reported", summary.keys_compared, rows.len());

    DiffReport {
        meta: ReportMeta {
            kind: profile.kind,
            language: profile.language,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        identity_columns,
        compared_columns,
        drift,
        summary,
        rows,
    }
}

fn compare_row(
    test: &KeyedTable,
    prod: &KeyedTable,
    key: &str,
    columns: &[String],
) -> Vec<ColumnDiff> {
    let mut diffs = Vec::new();

    for column in columns {
        let test_val = test.value(key, column).cloned().unwrap_or_default();
        let prod_val = prod.value(key, column).cloned().unwrap_or_default();

        if test_val.is_missing() && prod_val.is_missing() {
            continue;
        }
        if nearly_equal(&test_val, &prod_val, TOLERANCE) {
            continue;
        }
        if values_differ(&test_val, &prod_val) {
            diffs.push(ColumnDiff { column: column.clone(), test: test_val, prod: prod_val });
        }
    }

    diffs
}

/// Columns present on both sides, minus identity/key/line-index, sorted.
fn comparable_columns(
    test: &KeyedTable,
    prod: &KeyedTable,
    profile: &IdentityProfile,
) -> Vec<String> {
    let test_cols = value_columns(test, profile);
    let prod_cols = value_columns(prod, profile);
    test_cols.intersection(&prod_cols).map(|c| c.to_string()).collect()
}

fn column_drift(test: &KeyedTable, prod: &KeyedTable, profile: &IdentityProfile) -> ColumnDrift {
    let test_cols = value_columns(test, profile);
    let prod_cols = value_columns(prod, profile);
    ColumnDrift {
        only_in_test: test_cols.difference(&prod_cols).map(|c| c.to_string()).collect(),
        only_in_prod: prod_cols.difference(&test_cols).map(|c| c.to_string()).collect(),
    }
}

fn value_columns<'a>(table: &'a KeyedTable, profile: &IdentityProfile) -> BTreeSet<&'a str> {
    table
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|c| !profile.is_excluded(c))
        .collect()
}

/// Identity columns shown in the report: required ones always, optional ones
/// and the line index when either table carries them.
fn report_identity_columns(
    test: &KeyedTable,
    prod: &KeyedTable,
    profile: &IdentityProfile,
) -> Vec<IdentityColumn> {
    let labels = profile.labels();
    let either_has = |c: &str| test.has_column(c) || prod.has_column(c);

    let mut cols: Vec<IdentityColumn> = profile
        .required()
        .into_iter()
        .map(|c| IdentityColumn { source: c.to_string(), label: c.to_string() })
        .collect();

    cols.extend(
        profile
            .optional()
            .into_iter()
            .filter(|c| either_has(*c))
            .map(|c| IdentityColumn { source: c.to_string(), label: c.to_string() }),
    );

    if either_has(LINE_INDEX_COLUMN) {
        cols.push(IdentityColumn {
            source: LINE_INDEX_COLUMN.to_string(),
            label: labels.line_index.to_string(),
        });
    }

    cols
}
