//! Lenient cell parsing for trade-log values.
//!
//! Anything that cannot be read becomes `None`; callers never see an error.

use chrono::{NaiveDate, NaiveDateTime};

/// Datetime layouts tried in order. Day-first layouts follow the journal's
/// `DD/MM/YYYY` convention.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %I:%M %p",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Parse a monetary or percentage cell.
///
/// Accepts surrounding whitespace, a leading `$`, thousands separators, and a
/// trailing `%`. Empty cells, `nan`, and non-finite results are `None`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: String = trimmed
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',' && *c != '$' && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a timestamp cell. A bare date is taken as midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts() {
        assert_eq!(parse_amount("120"), Some(120.0));
        assert_eq!(parse_amount("  -35.5 "), Some(-35.5));
        assert_eq!(parse_amount("1,250.75"), Some(1250.75));
        assert_eq!(parse_amount("$2,000"), Some(2000.0));
        assert_eq!(parse_amount("-25.00%"), Some(-25.0));
    }

    #[test]
    fn bad_amounts_are_none() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("nan"), None);
        assert_eq!(parse_amount("inf"), None);
    }

    #[test]
    fn iso_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-05-17 14:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-17T14:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-17 14:30"), Some(expected));
    }

    #[test]
    fn day_first_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 3)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("03/05/2024 02:30 PM"), Some(expected));
        assert_eq!(parse_timestamp("03/05/2024 14:30"), Some(expected));
    }

    #[test]
    fn bare_dates_are_midnight() {
        let midnight = NaiveDate::from_ymd_opt(2024, 1, 9)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-01-09"), Some(midnight));
        assert_eq!(parse_timestamp("09/01/2024"), Some(midnight));
    }

    #[test]
    fn bad_timestamps_are_none() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-13-45"), None);
    }
}
