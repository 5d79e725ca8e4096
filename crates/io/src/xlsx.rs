// Excel import (xlsx, xlsm, xls, xlsb, ods) and xlsx export

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Duration, NaiveDate};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use stagediff_recon::{CellValue, Grid, RawTable};

/// Excel caps sheet names at 31 characters.
const MAX_SHEET_NAME: usize = 31;

/// Read the first sheet of a workbook into a headerless grid.
///
/// The grid is anchored at A1: leading empty rows/columns are kept so row
/// indexes match the physical sheet.
pub fn import_bytes(bytes: &[u8]) -> Result<Grid, String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| format!("Failed to open Excel file: {e}"))?;

    let sheet_names = workbook.sheet_names();
    let Some(first) = sheet_names.first() else {
        return Err("Excel file contains no sheets".to_string());
    };

    let range = workbook
        .worksheet_range(first)
        .map_err(|e| format!("Failed to read sheet '{first}': {e}"))?;

    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        return Ok(Grid::new());
    }

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    let mut grid: Grid = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut out = vec![CellValue::Empty; start_col as usize];
        out.extend(row.iter().map(convert_cell));
        grid.push(out);
    }

    log::debug!(
        "imported sheet '{}': {} row(s) x {} column(s)",
        first,
        grid.len(),
        width + start_col as usize
    );
    Ok(grid)
}

pub fn import(path: &Path) -> Result<Grid, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    import_bytes(&bytes)
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Text(e.to_string()),
        // Note: assumes the 1900 date system (calamine doesn't expose the 1904 flag)
        Data::DateTime(dt) => CellValue::Text(format_excel_serial(dt.as_f64())),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Render an Excel date serial as `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`.
pub fn format_excel_serial(serial: f64) -> String {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0));
    let Some(epoch) = epoch else {
        return serial.to_string();
    };
    let days = serial.floor();
    let seconds = ((serial - days) * 86_400.0).round() as i64;
    let offset = Duration::days(days as i64) + Duration::seconds(seconds);
    let Some(stamp) = epoch.checked_add_signed(offset) else {
        return serial.to_string();
    };

    if seconds == 0 {
        stamp.format("%Y-%m-%d").to_string()
    } else {
        stamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Export result statistics
#[derive(Debug, Default)]
pub struct ExportResult {
    pub rows_exported: usize,
    pub cells_exported: usize,
}

/// Write a headed table to a single-sheet xlsx file.
///
/// The header row is bold and frozen. Non-finite numbers are written as text.
pub fn export(table: &RawTable, sheet_name: &str, path: &Path) -> Result<ExportResult, String> {
    let mut workbook = Workbook::new();
    let result = write_sheet(&mut workbook, table, sheet_name)
        .map_err(|e| format!("Failed to write sheet '{sheet_name}': {e}"))?;

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {e}"))?;

    Ok(result)
}

fn write_sheet(
    workbook: &mut Workbook,
    table: &RawTable,
    sheet_name: &str,
) -> Result<ExportResult, XlsxError> {
    let mut result = ExportResult::default();
    let header_format = Format::new().set_bold();
    let name: String = sheet_name.chars().take(MAX_SHEET_NAME).collect();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&name)?;

    for (col, header) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row32 = (row_idx + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            let col16 = col as u16;
            match value {
                CellValue::Empty => continue,
                CellValue::Text(s) => {
                    worksheet.write_string(row32, col16, s)?;
                }
                CellValue::Number(n) if n.is_finite() => {
                    worksheet.write_number(row32, col16, *n)?;
                }
                CellValue::Number(n) => {
                    worksheet.write_string(row32, col16, n.to_string())?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(row32, col16, *b)?;
                }
            }
            result.cells_exported += 1;
        }
        result.rows_exported += 1;
    }

    worksheet.set_freeze_panes(1, 0)?;
    worksheet.autofit();

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_format_excel_serial() {
        assert_eq!(format_excel_serial(45322.0), "2024-01-31");
        assert_eq!(format_excel_serial(45322.5), "2024-01-31 12:00:00");
        assert_eq!(format_excel_serial(1.0), "1899-12-31");
    }

    #[test]
    fn test_export_and_reimport() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cleaned.xlsx");
        let table = RawTable::new(
            vec!["Key".into(), "Contract ID".into(), "Amount".into(), "Flag".into()],
            vec![
                vec!["C1_A1".into(), "C1".into(), CellValue::Number(1234.5), CellValue::Bool(true)],
                vec!["C2_A1".into(), "C2".into(), CellValue::Empty, CellValue::Bool(false)],
            ],
        );

        let result = export(&table, "Cleaned_Test", &path).unwrap();
        assert_eq!(result.rows_exported, 2);
        assert_eq!(result.cells_exported, 7);

        let grid = import(&path).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0][1], CellValue::text("Contract ID"));
        assert_eq!(grid[1][2], CellValue::Number(1234.5));
        assert_eq!(grid[1][3], CellValue::Bool(true));
        assert_eq!(grid[2][2], CellValue::Empty);
    }

    #[test]
    fn test_leading_empty_rows_are_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("offset.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(2, 1, "first").unwrap();
        workbook.save(&path).unwrap();

        let grid = import(&path).unwrap();
        assert_eq!(grid.len(), 3);
        assert!(grid[0].is_empty());
        assert_eq!(grid[2], vec![CellValue::Empty, CellValue::text("first")]);
    }

    #[test]
    fn test_long_sheet_names_are_truncated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("long.xlsx");
        let table = RawTable::new(vec!["a".into()], Vec::new());
        export(&table, "A sheet name that is much longer than Excel allows", &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_garbage_is_an_error() {
        let err = import_bytes(b"not a workbook").unwrap_err();
        assert!(err.contains("Failed to open Excel file"));
    }
}
