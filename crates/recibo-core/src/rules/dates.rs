//! Purchase date extraction from free-form OCR text.

use chrono::NaiveDate;

use super::patterns::{DATE_DMY, DATE_SPANISH_LONG, DATE_YMD};

/// Parse a purchase date out of arbitrary text.
///
/// Format families are tried in fixed precedence order, first match wins:
/// 1. ISO-like `YYYY-MM-DD` / `YYYY/MM/DD`
/// 2. Day-first `DD-MM-YYYY` / `DD/MM/YYYY`
/// 3. Spanish long form `D [de] mes [de] YYYY`
///
/// Every candidate is validated: the year must lie in [2000, 2099] and the
/// day must be a real calendar day for that month. Out-of-range values,
/// invalid dates and unmatched text all yield `None`; the caller cannot tell
/// which one happened, the distinction is not actionable.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    if text.trim().is_empty() {
        return None;
    }

    if let Some(caps) = DATE_YMD.captures(text) {
        let year: i32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        let day: u32 = caps[3].parse().unwrap_or(0);

        if let Some(date) = build_date(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = DATE_DMY.captures(text) {
        let day: u32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        let year: i32 = caps[3].parse().unwrap_or(0);

        if let Some(date) = build_date(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = DATE_SPANISH_LONG.captures(text) {
        let day: u32 = caps[1].parse().unwrap_or(0);
        let year: i32 = caps[3].parse().unwrap_or(0);

        if let Some(month) = spanish_month_to_number(&caps[2]) {
            if let Some(date) = build_date(year, month, day) {
                return Some(date);
            }
        }
    }

    None
}

fn build_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if !(2000..=2099).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn spanish_month_to_number(month: &str) -> Option<u32> {
    let n = match month.to_lowercase().as_str() {
        "enero" | "ene" => 1,
        "febrero" | "feb" => 2,
        "marzo" | "mar" => 3,
        "abril" | "abr" => 4,
        "mayo" | "may" => 5,
        "junio" | "jun" => 6,
        "julio" | "jul" => 7,
        "agosto" | "ago" => 8,
        "septiembre" | "sep" | "sept" => 9,
        "octubre" | "oct" => 10,
        "noviembre" | "nov" => 11,
        "diciembre" | "dic" => 12,
        _ => return None,
    };
    Some(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_format() {
        assert_eq!(parse_date("2026-02-15"), Some(date(2026, 2, 15)));
        assert_eq!(parse_date("2024-12-31"), Some(date(2024, 12, 31)));
        assert_eq!(parse_date("2026/01/05"), Some(date(2026, 1, 5)));
    }

    #[test]
    fn test_dmy_format() {
        assert_eq!(parse_date("15/02/2026"), Some(date(2026, 2, 15)));
        assert_eq!(parse_date("31/12/2024"), Some(date(2024, 12, 31)));
        assert_eq!(parse_date("01-01-2025"), Some(date(2025, 1, 1)));
        assert_eq!(parse_date("05/03/2026"), Some(date(2026, 3, 5)));
    }

    #[test]
    fn test_spanish_long_format() {
        assert_eq!(parse_date("15 febrero 2026"), Some(date(2026, 2, 15)));
        assert_eq!(parse_date("1 ene 2025"), Some(date(2025, 1, 1)));
        assert_eq!(parse_date("5 de marzo de 2026"), Some(date(2026, 3, 5)));
        assert_eq!(parse_date("31 dic 2024"), Some(date(2024, 12, 31)));
        assert_eq!(parse_date("10 de septiembre de 2025"), Some(date(2025, 9, 10)));
        // Irregular abbreviation
        assert_eq!(parse_date("10 sept 2025"), Some(date(2025, 9, 10)));
    }

    #[test]
    fn test_date_embedded_in_larger_text() {
        assert_eq!(parse_date("Fecha: 15/02/2026 Total: 45.30"), Some(date(2026, 2, 15)));
        assert_eq!(
            parse_date("MERCADONA S.A.\n15/02/2026\nTotal: 23.50"),
            Some(date(2026, 2, 15))
        );
    }

    #[test]
    fn test_iso_wins_over_dmy() {
        assert_eq!(
            parse_date("compra 01/01/2025 emitido 2026-02-15"),
            Some(date(2026, 2, 15))
        );
    }

    #[test]
    fn test_invalid_input_returns_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("no date here"), None);
        assert_eq!(parse_date("32/13/2026"), None);
        assert_eq!(parse_date("MERCADONA"), None);
    }

    #[test]
    fn test_february_30_rejected() {
        assert_eq!(parse_date("30/02/2026"), None);
    }

    #[test]
    fn test_year_out_of_range_rejected() {
        assert_eq!(parse_date("15/02/1999"), None);
        assert_eq!(parse_date("15/02/2100"), None);
    }
}
