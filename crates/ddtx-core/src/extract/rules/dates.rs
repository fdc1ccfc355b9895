//! Date normalization for document headers.

use chrono::NaiveDate;
use tracing::debug;

use super::patterns::DOCUMENT_DATE;
use super::{ExtractionMatch, FieldExtractor};

/// Two-digit years below this are read as 20xx, the rest as 19xx.
pub const CENTURY_PIVOT: i32 = 50;

/// Canonical output format.
const DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a `d/m/y` date with `/`, `-` or `.` separators.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.trim().split(['/', '-', '.']).collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };

    let day: u32 = day.trim().parse().ok()?;
    let month: u32 = month.trim().parse().ok()?;
    let year = parse_year(year.trim())?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Normalize a date to `dd/mm/yyyy`, or an empty string if it is not a
/// real calendar date.
pub fn normalize_date(s: &str) -> String {
    parse_date(s)
        .map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn parse_year(s: &str) -> Option<i32> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s.parse().ok()?;
    match s.len() {
        1 | 2 if year < CENTURY_PIVOT => Some(2000 + year),
        1 | 2 => Some(1900 + year),
        4 => Some(year),
        _ => None,
    }
}

/// Document date extractor.
///
/// Runs the labelled date cascade and keeps the first candidate that is a
/// valid calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let found = DOCUMENT_DATE.extract(text)?;
        let normalized = found.map(|raw| normalize_date(&raw));
        if normalized.value.is_empty() {
            debug!("Date candidate '{}' is not a calendar date", normalized.source);
            return None;
        }
        Some(normalized)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DOCUMENT_DATE
            .scan(text)
            .into_iter()
            .map(|m| m.map(|raw| normalize_date(&raw)))
            .filter(|m| !m.value.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_pads_and_expands_year() {
        assert_eq!(normalize_date("3/06/25"), "03/06/2025");
        assert_eq!(normalize_date("3/6/2025"), "03/06/2025");
    }

    #[test]
    fn test_fixed_pivot() {
        assert_eq!(normalize_date("15/03/75"), "15/03/1975");
        assert_eq!(normalize_date("15/03/49"), "15/03/2049");
        assert_eq!(normalize_date("15/03/50"), "15/03/1950");
    }

    #[test]
    fn test_separators() {
        assert_eq!(normalize_date("15-03-2024"), "15/03/2024");
        assert_eq!(normalize_date("15.03.2024"), "15/03/2024");
    }

    #[test]
    fn test_invalid_dates_are_empty() {
        assert_eq!(normalize_date("32/13/2024"), "");
        assert_eq!(normalize_date("29/02/2023"), "");
        assert_eq!(normalize_date("15/03/202"), "");
        assert_eq!(normalize_date("garbage"), "");
        assert_eq!(normalize_date(""), "");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("29/02/24"), NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn test_extractor_uses_labels() {
        let extractor = DateExtractor::new();
        let found = extractor.extract("DDT n. 12 del 3/06/25\nScadenza 30/06/25").unwrap();
        assert_eq!(found.value, "03/06/2025");
        assert_eq!(found.pattern, 0);

        let found = extractor.extract("Data documento: 01.02.2024").unwrap();
        assert_eq!(found.value, "01/02/2024");
    }

    #[test]
    fn test_extractor_rejects_impossible_date() {
        assert!(DateExtractor::new().extract("del 31/02/2024").is_none());
    }
}
