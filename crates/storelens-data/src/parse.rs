//! Field-level parsing shared by both loaders.

use crate::error::{DataError, Result};
use chrono::NaiveDate;

/// Convert a csv reader error into a [`DataError`].
///
/// IO failures stay IO failures; everything else is a malformed row.
pub(crate) fn row_error(err: csv::Error) -> DataError {
    if err.is_io_error() {
        return DataError::Csv(err);
    }
    let line = err.position().map_or(0, csv::Position::line);
    DataError::parse(line, "<row>", err.to_string())
}

pub(crate) fn int(line: u64, column: &str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|e| DataError::parse(line, column, format!("'{value}' is not an integer: {e}")))
}

pub(crate) fn opt_int(line: u64, column: &str, value: &str) -> Result<Option<i64>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    int(line, column, value).map(Some)
}

/// Optional integer that silently degrades to `None` when malformed.
pub(crate) fn lenient_int(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

pub(crate) fn flag(line: u64, column: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(DataError::parse(
            line,
            column,
            format!("'{other}' is not a 0/1 flag"),
        )),
    }
}

pub(crate) fn date(line: u64, column: &str, value: &str, format: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), format).map_err(|e| {
        DataError::parse(line, column, format!("'{value}' does not match {format}: {e}"))
    })
}

pub(crate) fn opt_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int() {
        assert_eq!(int(2, "Sales", " 5263 ").unwrap(), 5263);
        assert!(matches!(
            int(7, "Sales", "12.5"),
            Err(DataError::Parse { line: 7, ref column, .. }) if column == "Sales"
        ));
    }

    #[test]
    fn test_optional_values() {
        assert_eq!(opt_int(2, "CompetitionDistance", "").unwrap(), None);
        assert_eq!(opt_int(2, "CompetitionDistance", "570").unwrap(), Some(570));
        assert_eq!(lenient_int("nan"), None);
        assert_eq!(opt_text("  "), None);
        assert_eq!(opt_text("Jan,Apr,Jul,Oct"), Some("Jan,Apr,Jul,Oct".to_string()));
    }

    #[test]
    fn test_flag() {
        assert!(flag(2, "Open", "1").unwrap());
        assert!(!flag(2, "Open", "0").unwrap());
        assert!(flag(2, "Open", "yes").is_err());
    }

    #[test]
    fn test_date() {
        let parsed = date(2, "Date", "2015-07-31", "%Y-%m-%d").unwrap();
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2015, 7, 31).unwrap());
        assert!(date(2, "Date", "2015-02-30", "%Y-%m-%d").is_err());
    }
}
