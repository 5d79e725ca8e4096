use crate::number::parse_number;
use crate::value::CellValue;

/// Numeric differences strictly below this are not reported.
pub const TOLERANCE: f64 = 1.0;

/// True when both values parse as numbers and `|a - b| < tolerance`.
///
/// Non-numeric input is never nearly equal; callers fall back to
/// [`values_differ`].
pub fn nearly_equal(a: &CellValue, b: &CellValue, tolerance: f64) -> bool {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => (x - y).abs() < tolerance,
        _ => false,
    }
}

/// Exact inequality. Text never equals a number, even when it spells one.
pub fn values_differ(a: &CellValue, b: &CellValue) -> bool {
    match (a.is_missing(), b.is_missing()) {
        (true, true) => false,
        (true, false) | (false, true) => true,
        (false, false) => a != b,
    }
}
