use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Trims whitespace and drops commas, so both `1,234.56` and the Indian
/// `1,23,456.78` grouping are accepted.
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::error!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Like [`parse_decimal`] but blank input is `None`.
pub fn parse_optional_decimal(s: &str) -> Result<Option<Decimal>, ParseDecimalError> {
    if normalize_decimal_input(s).is_empty() {
        Ok(None)
    } else {
        parse_decimal(s).map(Some)
    }
}

/// `YYYY-MM-DD`; blank input is `None`.
pub fn parse_optional_date(s: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map(Some)
    }
}

/// Like [`parse_optional_date`], and `none` also means no date.
pub fn parse_date_or_none(s: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    if s.trim().eq_ignore_ascii_case("none") {
        Ok(None)
    } else {
        parse_optional_date(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_decimal_accepts_comma_separators() {
        assert_eq!(parse_decimal("1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal("1,23,456.78").unwrap(), dec!(123456.78));
    }

    #[test]
    fn parse_decimal_trim_whitespace() {
        assert_eq!(parse_decimal("  123.45  ").unwrap(), dec!(123.45));
    }

    #[test]
    fn parse_decimal_empty_treated_as_zero() {
        assert_eq!(parse_decimal("").unwrap(), Decimal::ZERO);
        assert_eq!(parse_decimal("   ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_decimal_invalid_returns_error() {
        let err = parse_decimal("abc").unwrap_err();
        assert!(err.to_string().contains("'abc'"));
    }

    #[test]
    fn parse_optional_decimal_blank_is_none() {
        assert_eq!(parse_optional_decimal(" ").unwrap(), None);
        assert_eq!(parse_optional_decimal("7.5").unwrap(), Some(dec!(7.5)));
        assert!(parse_optional_decimal("x").is_err());
    }

    #[test]
    fn parse_optional_date_accepts_iso_dates() {
        assert_eq!(parse_optional_date("").unwrap(), None);
        assert_eq!(
            parse_optional_date(" 2026-03-31 ").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31)
        );
        assert!(parse_optional_date("31/03/2026").is_err());
    }

    #[test]
    fn parse_date_or_none_clears_on_none() {
        assert_eq!(parse_date_or_none("none").unwrap(), None);
        assert_eq!(parse_date_or_none(" NONE ").unwrap(), None);
        assert_eq!(
            parse_date_or_none("2027-06-30").unwrap(),
            NaiveDate::from_ymd_opt(2027, 6, 30)
        );
        assert!(parse_date_or_none("soon").is_err());
    }
}
