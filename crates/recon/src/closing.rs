//! Closing exports: rebuild the 3-row composite header and key each row by
//! contract id + asset id.
//!
//! Layout of the first sheet (0-based rows):
//!
//! | row | content                                         |
//! |-----|-------------------------------------------------|
//! | 0   | metadata, ignored                               |
//! | 1   | descriptions (first 9 columns: final names)     |
//! | 2   | account numbers                                 |
//! | 3   | debit / credit marker                           |
//! | 4.. | data                                            |

use crate::error::ReconError;
use crate::profile::IdentityProfile;
use crate::table::{Grid, KeyedRow, KeyedTable, PreparedTable};
use crate::value::CellValue;

/// First data row of a closing export.
pub const DATA_START_ROW: usize = 4;

/// Columns before this index keep their row-1 caption as-is.
pub const PLAIN_HEADER_COLUMNS: usize = 9;

/// Rebuild flat column names from header rows 1–3.
///
/// Rows 1 and 2 are forward-filled across columns; row 3 is not.
pub fn reconstruct_headers(grid: &Grid) -> Result<Vec<String>, ReconError> {
    if grid.len() < DATA_START_ROW {
        return Err(ReconError::MalformedInput(format!(
            "closing export needs {DATA_START_ROW} header rows, found {}",
            grid.len()
        )));
    }

    let width = grid_width(grid);
    let descriptions = forward_fill(&grid[1], width);
    let accounts = forward_fill(&grid[2], width);
    let sides = padded(&grid[3], width);

    let names = (0..width)
        .map(|i| {
            if i < PLAIN_HEADER_COLUMNS {
                descriptions[i].to_text()
            } else {
                let description =
                    descriptions[i].to_text().split_whitespace().collect::<Vec<_>>().join(" ");
                let account = accounts[i].to_text();
                let side = sides[i].to_text();
                format!("{description} - {}_IFRS16 - {}", account.trim(), side.trim())
            }
        })
        .collect();

    Ok(names)
}

/// Turn a headerless closing grid into a table keyed by `<contract>_<asset>`.
pub fn prepare_closing(
    grid: &Grid,
    profile: &IdentityProfile,
) -> Result<PreparedTable, ReconError> {
    let columns = reconstruct_headers(grid)?;

    let missing: Vec<&str> = profile
        .required()
        .into_iter()
        .filter(|name| !columns.iter().any(|c| c == name))
        .collect();
    if !missing.is_empty() {
        return Err(ReconError::MalformedInput(format!(
            "identity column(s) not found in closing header: {} (columns: {})",
            missing.join(", "),
            columns.join(", ")
        )));
    }

    // Both present, checked above
    let id_col = columns.iter().position(|c| *c == profile.primary).unwrap_or_default();
    let asset_col = columns.iter().position(|c| *c == profile.asset).unwrap_or_default();

    let width = columns.len();
    let rows: Vec<KeyedRow> = grid[DATA_START_ROW..]
        .iter()
        .map(|raw| {
            let mut values = padded(raw, width);
            values[id_col] = std::mem::take(&mut values[id_col]).into_text();
            values[asset_col] = std::mem::take(&mut values[asset_col]).into_text();
            let key = format!("{}_{}", values[id_col], values[asset_col]);
            KeyedRow { key, values }
        })
        .collect();

    log::debug!("closing: {} column(s), {} data row(s)", width, rows.len());

    Ok(PreparedTable::new(KeyedTable::new(columns, rows), Vec::new()))
}

fn grid_width(grid: &Grid) -> usize {
    grid.iter().map(Vec::len).max().unwrap_or(0)
}

fn padded(row: &[CellValue], width: usize) -> Vec<CellValue> {
    let mut out: Vec<CellValue> = row.iter().take(width).cloned().collect();
    out.resize(width, CellValue::Empty);
    out
}

fn forward_fill(row: &[CellValue], width: usize) -> Vec<CellValue> {
    let mut out = padded(row, width);
    let mut last: Option<CellValue> = None;
    for cell in out.iter_mut() {
        if cell.is_missing() {
            if let Some(prev) = &last {
                *cell = prev.clone();
            }
        } else {
            last = Some(cell.clone());
        }
    }
    out
}
