// Number normalization for locale-formatted amounts.
// Pure functions: raw scalar in, optional float out.

use crate::value::CellValue;

/// Characters removed before any parse attempt.
const STRIPPED: &[char] = &['\u{a0}', '€', '%', ' ', '’', '\''];

/// Parse a raw scalar as a number.
///
/// - `Empty` and `Bool` are never numeric
/// - `Number` is returned as-is
/// - `Text` goes through [`parse_number_text`]
pub fn parse_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Empty | CellValue::Bool(_) => None,
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => parse_number_text(s),
    }
}

/// Parse locale-formatted numeric text.
///
/// Strips non-breaking spaces, `€`, `%`, spaces and apostrophes, then tries
/// the decimal-comma reading (`1.234,56`) before the decimal-point reading
/// (`1,234.56`). The first reading that parses wins, so `"1.234"` is 1234.0.
/// Underscore digit separators (`1_000`) are not accepted.
pub fn parse_number_text(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    let cleaned: String = trimmed.chars().filter(|c| !STRIPPED.contains(c)).collect();

    let decimal_comma = cleaned.replace('.', "").replace(',', ".");
    if let Ok(n) = decimal_comma.parse::<f64>() {
        return Some(n);
    }

    let decimal_point = cleaned.replace(',', "");
    decimal_point.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_numbers_pass_through() {
        assert_eq!(parse_number(&CellValue::Number(1000.5)), Some(1000.5));
        assert_eq!(parse_number(&CellValue::Number(-3.0)), Some(-3.0));
    }

    #[test]
    fn missing_and_bool_are_not_numeric() {
        assert_eq!(parse_number(&CellValue::Empty), None);
        assert_eq!(parse_number(&CellValue::Bool(true)), None);
        assert_eq!(parse_number(&CellValue::text("")), None);
        assert_eq!(parse_number(&CellValue::text("   ")), None);
    }

    #[test]
    fn decimal_comma_format() {
        assert_eq!(parse_number_text("1.000,50"), Some(1000.5));
        assert_eq!(parse_number_text("1.234.567,89"), Some(1234567.89));
        assert_eq!(parse_number_text("-12,5"), Some(-12.5));
    }

    #[test]
    fn decimal_comma_wins_for_ambiguous_input() {
        assert_eq!(parse_number_text("1.234"), Some(1234.0));
        // Decimal-comma reading turns "1,234.56" into "1.23456"
        assert_eq!(parse_number_text("1,234.56"), Some(1.23456));
    }

    #[test]
    fn decimal_point_fallback() {
        // "1,234,567" fails as decimal-comma ("1.234.567"), succeeds with commas removed
        assert_eq!(parse_number_text("1,234,567"), Some(1234567.0));
    }

    #[test]
    fn symbols_and_spaces_stripped() {
        assert_eq!(parse_number_text("€ 1.000,50"), Some(1000.5));
        assert_eq!(parse_number_text("12,5 %"), Some(12.5));
        assert_eq!(parse_number_text("1\u{a0}000"), Some(1000.0));
        assert_eq!(parse_number_text("1'000"), Some(1000.0));
        assert_eq!(parse_number_text("1’000,25"), Some(1000.25));
        assert_eq!(parse_number_text("  42  "), Some(42.0));
    }

    #[test]
    fn non_numeric_text() {
        assert_eq!(parse_number_text("abc"), None);
        assert_eq!(parse_number_text("2024-01-31"), None);
        assert_eq!(parse_number_text("N/A"), None);
        assert_eq!(parse_number_text("€"), None);
    }

    #[test]
    fn exponent_notation() {
        assert_eq!(parse_number_text("1e3"), Some(1000.0));
    }

    #[test]
    fn underscore_separators_stay_text() {
        assert_eq!(parse_number_text("1_000"), None);
        assert_eq!(parse_number(&CellValue::text("1_000,50")), None);
    }
}
