// File I/O operations

use std::path::Path;

use stagediff_recon::{Grid, RawTable};

pub mod csv;
pub mod xlsx;

/// Input formats accepted by [`load_grid`], matched on file extension.
pub const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Whether the path names a CSV file (`.csv`, case-insensitive).
pub fn is_csv(path: &Path) -> bool {
    extension(path) == "csv"
}

/// Load the first sheet (or the CSV body) of a file as a headerless grid.
pub fn load_grid(path: &Path) -> Result<Grid, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    load_grid_from_bytes(&bytes, &extension(path))
}

/// Decode already-read file content. `ext` is the lowercase extension without the dot.
pub fn load_grid_from_bytes(bytes: &[u8], ext: &str) -> Result<Grid, String> {
    match ext {
        "csv" | "tsv" | "txt" => csv::import_bytes(bytes),
        e if EXCEL_EXTENSIONS.contains(&e) => xlsx::import_bytes(bytes),
        "" => xlsx::import_bytes(bytes),
        other => Err(format!(
            "unsupported file type '.{other}' (expected .xlsx, .xls, .ods or .csv)"
        )),
    }
}

/// Write a table to `path`: CSV when the name ends in `.csv`, otherwise a
/// single-sheet workbook named `sheet`.
pub fn export_table(table: &RawTable, sheet: &str, path: &Path) -> Result<(), String> {
    if is_csv(path) {
        csv::export(table, path)?;
    } else {
        xlsx::export(table, sheet, path)?;
    }
    log::debug!("wrote {} row(s) to {}", table.rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagediff_recon::CellValue;
    use tempfile::tempdir;

    #[test]
    fn test_extension_dispatch() {
        let grid = load_grid_from_bytes(b"a;b\n1;2\n", "csv").unwrap();
        assert_eq!(grid.len(), 2);

        let err = load_grid_from_bytes(b"", "pdf").unwrap_err();
        assert!(err.contains("unsupported file type"));
    }

    #[test]
    fn test_export_table_picks_format_from_name() {
        let dir = tempdir().unwrap();
        let table = RawTable::new(vec!["Key".into()], vec![vec![CellValue::text("k")]]);

        let csv_path = dir.path().join("report.CSV");
        export_table(&table, "Differences", &csv_path).unwrap();
        assert_eq!(std::fs::read_to_string(&csv_path).unwrap(), "Key\nk\n");
        let grid = load_grid(&csv_path).unwrap();
        assert_eq!(grid, vec![vec![CellValue::text("Key")], vec![CellValue::text("k")]]);

        let xlsx_path = dir.path().join("report.xlsx");
        export_table(&table, "Differences", &xlsx_path).unwrap();
        let grid = load_grid(&xlsx_path).unwrap();
        assert_eq!(grid[1][0], CellValue::text("k"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_grid(Path::new("/nonexistent/input.xlsx")).unwrap_err();
        assert!(err.starts_with("cannot read"));
    }
}
