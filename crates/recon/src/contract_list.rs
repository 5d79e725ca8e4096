//! Contract lists: one header row, possibly several rows per contract/asset.
//!
//! Rows are keyed by system id + asset id, extended by payment and option id
//! when those columns exist. Without either of them, rows inside each
//! (system, asset) group are numbered 1.. in a content-derived order.

use crate::profile::{IdentityProfile, LINE_INDEX_COLUMN};
use crate::table::{Issue, KeyedRow, KeyedTable, PreparedTable, RawTable};
use crate::value::CellValue;

/// Trim a column name and drop every quote character.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().chars().filter(|c| *c != '"' && *c != '\'').collect()
}

/// Key a contract list. Never fails: a missing mandatory column yields an
/// empty table plus a [`Issue::MissingRequired`].
pub fn prepare_contract_list(raw: &RawTable, profile: &IdentityProfile) -> PreparedTable {
    let columns: Vec<String> = raw.columns.iter().map(|c| normalize_column_name(c)).collect();
    let position = |name: &str| columns.iter().position(|c| c == name);

    let missing_required: Vec<String> = profile
        .required()
        .into_iter()
        .filter(|name| position(name).is_none())
        .map(String::from)
        .collect();
    if !missing_required.is_empty() {
        log::warn!("contract list: missing required column(s) {missing_required:?}");
        let issue = Issue::MissingRequired { missing: missing_required, available: columns };
        return PreparedTable::new(KeyedTable::default(), vec![issue]);
    }

    let mut issues = Vec::new();
    let missing_optional: Vec<String> = profile
        .optional()
        .into_iter()
        .filter(|name| position(name).is_none())
        .map(String::from)
        .collect();
    if !missing_optional.is_empty() {
        log::info!("contract list: optional column(s) absent {missing_optional:?}");
        issues.push(Issue::MissingOptional { missing: missing_optional });
    }

    let system_col = position(&profile.primary).unwrap_or_default();
    let asset_col = position(&profile.asset).unwrap_or_default();
    let optional_cols: Vec<usize> =
        profile.optional().into_iter().filter_map(|name| position(name)).collect();

    let mut identity_cols = vec![system_col, asset_col];
    identity_cols.extend(&optional_cols);

    let width = columns.len();
    let rows: Vec<Vec<CellValue>> = raw
        .rows
        .iter()
        .map(|raw_row| {
            let mut values: Vec<CellValue> = raw_row.iter().take(width).cloned().collect();
            values.resize(width, CellValue::Empty);
            for &col in &identity_cols {
                values[col] = std::mem::take(&mut values[col]).into_text();
            }
            values
        })
        .collect();

    let table = if optional_cols.is_empty() {
        key_by_line_index(columns, rows, system_col, asset_col)
    } else {
        let keyed = rows
            .into_iter()
            .map(|values| {
                let key = identity_cols
                    .iter()
                    .map(|&c| values[c].to_key_text())
                    .collect::<Vec<_>>()
                    .join("_");
                KeyedRow { key, values }
            })
            .collect();
        KeyedTable::new(columns, keyed)
    };

    log::debug!("contract list: {} row(s) keyed", table.len());
    PreparedTable::new(table, issues)
}

/// Fallback keying: `<system>_<asset>_<n>` where `n` counts rows within the
/// (system, asset) group after a stable sort by system, asset and the
/// `|`-joined remaining columns.
fn key_by_line_index(
    mut columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    system_col: usize,
    asset_col: usize,
) -> KeyedTable {
    let other_cols: Vec<usize> =
        (0..columns.len()).filter(|&c| c != system_col && c != asset_col).collect();

    let mut sortable: Vec<(String, String, String, Vec<CellValue>)> = rows
        .into_iter()
        .map(|values| {
            let tie_break = other_cols
                .iter()
                .map(|&c| values[c].to_key_text())
                .collect::<Vec<_>>()
                .join("|");
            (values[system_col].to_key_text(), values[asset_col].to_key_text(), tie_break, values)
        })
        .collect();
    sortable.sort_by(|a, b| (&a.0, &a.1, &a.2).cmp(&(&b.0, &b.1, &b.2)));

    columns.push(LINE_INDEX_COLUMN.to_string());

    let mut keyed = Vec::with_capacity(sortable.len());
    let mut line = 0u64;
    let mut group: Option<(String, String)> = None;
    for (system, asset, _, mut values) in sortable {
        let same_group = group.as_ref().is_some_and(|(s, a)| *s == system && *a == asset);
        line = if same_group { line + 1 } else { 1 };
        values.push(CellValue::Number(line as f64));
        let key = format!("{system}_{asset}_{line}");
        group = Some((system, asset));
        keyed.push(KeyedRow { key, values });
    }

    KeyedTable::new(columns, keyed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Language, RecordKind};

    fn t(s: &str) -> CellValue {
        CellValue::text(s)
    }

    fn en() -> IdentityProfile {
        IdentityProfile::new(RecordKind::ContractList, Language::En)
    }

    #[test]
    fn column_names_are_normalized() {
        assert_eq!(normalize_column_name("  \"System ID\"\t"), "System ID");
        assert_eq!(normalize_column_name("'Payment ID'"), "Payment ID");
        assert_eq!(normalize_column_name("Asset [System ID]"), "Asset [System ID]");
    }

    #[test]
    fn full_identity_key() {
        let raw = RawTable::new(
            vec![
                "System ID".into(),
                "Asset [System ID]".into(),
                "Payment ID".into(),
                "Amount".into(),
            ],
            vec![
                vec![t("S1"), t("A1"), CellValue::Number(7.0), CellValue::Number(10.0)],
                vec![t("S1"), t("A1"), CellValue::Number(8.0), CellValue::Number(20.0)],
            ],
        );
        let prepared = prepare_contract_list(&raw, &en());
        assert_eq!(
            prepared.issues,
            vec![Issue::MissingOptional { missing: vec!["Option ID".into()] }]
        );
        let table = &prepared.table;
        assert!(table.contains_key("S1_A1_7"));
        assert!(table.contains_key("S1_A1_8"));
        assert_eq!(table.value("S1_A1_8", "Payment ID"), Some(&t("8")));
        assert!(!table.has_column(LINE_INDEX_COLUMN));
    }

    #[test]
    fn fallback_numbers_rows_by_tie_break() {
        let raw = RawTable::new(
            vec!["System ID".into(), "Asset [System ID]".into(), "Note".into()],
            vec![
                vec![t("S1"), t("A1"), t("zeta")],
                vec![t("S1"), t("A1"), t("alpha")],
                vec![t("S0"), t("A9"), t("x")],
            ],
        );
        let prepared = prepare_contract_list(&raw, &en());
        let table = &prepared.table;
        let keys: Vec<&str> = table.rows().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["S0_A9_1", "S1_A1_1", "S1_A1_2"]);
        assert_eq!(table.value("S1_A1_1", "Note"), Some(&t("alpha")));
        assert_eq!(table.value("S1_A1_2", "Note"), Some(&t("zeta")));
        assert_eq!(table.value("S1_A1_2", LINE_INDEX_COLUMN), Some(&CellValue::Number(2.0)));
    }

    #[test]
    fn fallback_keeps_identical_rows_apart() {
        let raw = RawTable::new(
            vec!["System ID".into(), "Asset [System ID]".into()],
            vec![vec![t("S1"), t("A1")], vec![t("S1"), t("A1")]],
        );
        let prepared = prepare_contract_list(&raw, &en());
        assert_eq!(prepared.table.len(), 2);
        assert!(prepared.table.duplicate_keys().is_empty());
    }

    #[test]
    fn missing_required_yields_empty_table() {
        let raw = RawTable::new(
            vec!["\"System ID\"".into(), "Amount".into()],
            vec![vec![t("S1"), CellValue::Number(1.0)]],
        );
        let prepared = prepare_contract_list(&raw, &en());
        assert!(prepared.table.is_empty());
        assert!(prepared.is_missing_required());
        assert_eq!(
            prepared.issues,
            vec![Issue::MissingRequired {
                missing: vec!["Asset [System ID]".into()],
                available: vec!["System ID".into(), "Amount".into()],
            }]
        );
    }

    #[test]
    fn numeric_identity_values_become_text() {
        let raw = RawTable::new(
            vec!["System-ID".into(), "Asset System-ID".into(), "Options-ID".into()],
            vec![vec![CellValue::Number(12.0), CellValue::Number(3.0), CellValue::Empty]],
        );
        let profile = IdentityProfile::new(RecordKind::ContractList, Language::De);
        let prepared = prepare_contract_list(&raw, &profile);
        assert!(prepared.table.contains_key("12_3_nan"));
        assert_eq!(prepared.table.value("12_3_nan", "System-ID"), Some(&t("12")));
        assert_eq!(prepared.table.value("12_3_nan", "Options-ID"), Some(&t("nan")));
    }

    #[test]
    fn fallback_orders_missing_cells_as_nan() {
        let raw = RawTable::new(
            vec!["System ID".into(), "Asset [System ID]".into(), "Note".into()],
            vec![
                vec![t("S1"), t("A1"), CellValue::Empty],
                vec![t("S1"), t("A1"), t("abc")],
                vec![t("S1"), t("A1"), t("xyz")],
            ],
        );
        let prepared = prepare_contract_list(&raw, &en());
        let table = &prepared.table;
        assert_eq!(table.value("S1_A1_1", "Note"), Some(&t("abc")));
        assert_eq!(table.value("S1_A1_2", "Note"), Some(&CellValue::Empty));
        assert_eq!(table.value("S1_A1_3", "Note"), Some(&t("xyz")));
    }
}
