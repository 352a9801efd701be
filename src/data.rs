use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime};

pub const TIMESTAMP_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

pub fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%m/%d/%Y %I:%M:%S %p",
        "%m/%d/%Y %I:%M %p",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as datetime"))
}

pub fn coerce_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_naive_datetime(trimmed)
        .ok()
        .or_else(|| {
            parse_naive_date(trimmed)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

pub fn coerce_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

/// Years arrive as `2023` or, from spreadsheet round-trips, `2023.0`.
pub fn coerce_year(value: &str) -> Option<i64> {
    let numeric = coerce_number(value)?;
    if numeric.fract() != 0.0 || numeric.abs() > i64::MAX as f64 {
        return None;
    }
    Some(numeric as i64)
}

pub fn coerce_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

pub fn coerce_label(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn format_timestamp(value: Option<&NaiveDateTime>) -> String {
    value
        .map(|ts| ts.format(TIMESTAMP_DISPLAY_FORMAT).to_string())
        .unwrap_or_default()
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn coerce_timestamp_reads_twelve_hour_extract_format() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 5)
            .unwrap()
            .and_hms_opt(15, 45, 0)
            .unwrap();
        assert_eq!(coerce_timestamp("01/05/2023 03:45:00 PM"), Some(expected));
        assert_eq!(coerce_timestamp("2023-01-05T15:45:00.000"), Some(expected));
        assert_eq!(coerce_timestamp("2023-01-05 15:45"), Some(expected));
    }

    #[test]
    fn coerce_timestamp_falls_back_to_midnight_dates() {
        let midnight = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(coerce_timestamp("2024-05-06"), Some(midnight));
        assert_eq!(coerce_timestamp("05/06/2024"), Some(midnight));
    }

    #[test]
    fn coerce_timestamp_nulls_garbage() {
        assert_eq!(coerce_timestamp(""), None);
        assert_eq!(coerce_timestamp("not a date"), None);
        assert_eq!(coerce_timestamp("13/45/2023 99:00:00 PM"), None);
    }

    #[test]
    fn coerce_year_accepts_integral_numbers_only() {
        assert_eq!(coerce_year("2023"), Some(2023));
        assert_eq!(coerce_year(" 2019.0 "), Some(2019));
        assert_eq!(coerce_year("2019.5"), None);
        assert_eq!(coerce_year("twenty"), None);
        assert_eq!(coerce_year(""), None);
    }

    #[test]
    fn coerce_flag_handles_common_spellings() {
        assert_eq!(coerce_flag("true"), Some(true));
        assert_eq!(coerce_flag("False"), Some(false));
        assert_eq!(coerce_flag("Y"), Some(true));
        assert_eq!(coerce_flag("0"), Some(false));
        assert_eq!(coerce_flag("maybe"), None);
    }

    #[test]
    fn coerce_number_rejects_non_finite() {
        assert_eq!(coerce_number("41.88"), Some(41.88));
        assert_eq!(coerce_number("NaN"), None);
        assert_eq!(coerce_number("inf"), None);
    }

    #[test]
    fn format_number_drops_trailing_fraction_for_integers() {
        assert_eq!(format_number(12.0), "12");
        assert_eq!(format_number(0.125), "0.1250");
    }
}
