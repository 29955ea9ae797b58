//! `Date` header validation and display.
//!
//! Only the full calendar form `YYYY-MM-DD` counts as a date. Anything else
//! (a bare year, `2026-1-5`, `Jan 5`, an impossible day) is treated as "no
//! date": it never produces an error, never participates in date ordering,
//! and displays as an empty string.

use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_FORMAT: &str = "%b %-d, %Y";

/// Parse a strict `YYYY-MM-DD` date. Returns `None` for anything else.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Human-readable form of a `Date` header value, e.g. `Feb 1, 2026`.
///
/// Missing or unparseable values display as an empty string.
pub fn display_date(value: Option<&str>) -> String {
    value
        .and_then(parse_date)
        .map(|d| d.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_iso_date() {
        assert_eq!(
            parse_date("2026-02-01"),
            NaiveDate::from_ymd_opt(2026, 2, 1)
        );
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        assert_eq!(
            parse_date(" 2026-02-01 "),
            NaiveDate::from_ymd_opt(2026, 2, 1)
        );
    }

    #[test]
    fn partial_dates_are_rejected() {
        assert_eq!(parse_date("2026"), None);
        assert_eq!(parse_date("2026-02"), None);
        assert_eq!(parse_date("2026-2-1"), None);
    }

    #[test]
    fn other_formats_are_rejected() {
        assert_eq!(parse_date("02/01/2026"), None);
        assert_eq!(parse_date("Feb 1, 2026"), None);
        assert_eq!(parse_date("2026-02-01T10:00:00Z"), None);
        assert_eq!(parse_date("+026-02-01"), None);
    }

    #[test]
    fn impossible_calendar_dates_are_rejected() {
        assert_eq!(parse_date("2026-02-30"), None);
        assert_eq!(parse_date("2026-13-01"), None);
        assert_eq!(parse_date("2025-02-29"), None);
    }

    #[test]
    fn leap_day_is_accepted() {
        assert_eq!(
            parse_date("2024-02-29"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
    }

    #[test]
    fn display_valid_date() {
        assert_eq!(display_date(Some("2026-02-01")), "Feb 1, 2026");
        assert_eq!(display_date(Some("2026-12-25")), "Dec 25, 2026");
    }

    #[test]
    fn display_missing_or_invalid_is_empty() {
        assert_eq!(display_date(None), "");
        assert_eq!(display_date(Some("soon")), "");
        assert_eq!(display_date(Some("2026")), "");
    }
}
