use crate::error::{InvalidRecord, RecordField};
use crate::model::{midnight, FieldValue};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Canonical text form of an expiry date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse the medicine name. Must contain something other than whitespace.
pub fn parse_name(value: &FieldValue) -> Result<String, InvalidRecord> {
    match value {
        FieldValue::Text(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        FieldValue::Text(_) | FieldValue::Missing => Err(invalid(
            RecordField::Name,
            "must be a non-blank string",
        )),
        other => Err(invalid(
            RecordField::Name,
            format!("expected text, got {other}"),
        )),
    }
}

/// Parse a stock count.
///
/// Handles formats like:
/// - "100" -> 100
/// - "100.0" -> 100 (integral decimals written by spreadsheet exports)
/// - "-1" -> error
/// - "12.5" -> error
pub fn parse_stock(value: &FieldValue) -> Result<u64, InvalidRecord> {
    let field = RecordField::Stock;
    let number = match value {
        FieldValue::Integer(i) => Decimal::from(*i),
        FieldValue::Number(d) => *d,
        FieldValue::Text(s) => parse_decimal(field, s)?,
        FieldValue::Missing => return Err(invalid(field, "value is missing")),
        FieldValue::Date(dt) => {
            return Err(invalid(field, format!("expected an integer, got date {dt}")))
        }
    };

    if number.is_sign_negative() && !number.is_zero() {
        return Err(invalid(field, format!("must be non-negative, got {number}")));
    }
    if !number.fract().is_zero() {
        return Err(invalid(field, format!("must be a whole number, got {number}")));
    }
    number
        .to_u64()
        .ok_or_else(|| invalid(field, format!("out of range: {number}")))
}

/// Parse average units sold per day. Fractions are allowed.
pub fn parse_daily_sales(value: &FieldValue) -> Result<Decimal, InvalidRecord> {
    let field = RecordField::DailySales;
    let number = match value {
        FieldValue::Integer(i) => Decimal::from(*i),
        FieldValue::Number(d) => *d,
        FieldValue::Text(s) => parse_decimal(field, s)?,
        FieldValue::Missing => return Err(invalid(field, "value is missing")),
        FieldValue::Date(dt) => {
            return Err(invalid(field, format!("expected a number, got date {dt}")))
        }
    };

    if number.is_sign_negative() && !number.is_zero() {
        return Err(invalid(field, format!("must be non-negative, got {number}")));
    }
    Ok(number)
}

/// Parse an expiry date.
///
/// Native date values are taken as-is, time of day included. Text must be
/// exactly `YYYY-MM-DD` and is read as midnight of that day.
pub fn parse_expiry_date(value: &FieldValue) -> Result<NaiveDateTime, InvalidRecord> {
    let field = RecordField::ExpiryDate;
    match value {
        FieldValue::Date(dt) => Ok(*dt),
        FieldValue::Text(s) => {
            let s = s.trim();
            if !is_canonical_date(s) {
                return Err(invalid(
                    field,
                    format!("'{s}' does not match format YYYY-MM-DD"),
                ));
            }
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map(midnight)
                .map_err(|e| invalid(field, format!("invalid date '{s}': {e}")))
        }
        FieldValue::Missing => Err(invalid(field, "value is missing")),
        other => Err(invalid(field, format!("expected a date, got {other}"))),
    }
}

// chrono accepts single-digit months and days; the inventory format does not.
fn is_canonical_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn parse_decimal(field: RecordField, s: &str) -> Result<Decimal, InvalidRecord> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| invalid(field, format!("invalid number '{s}'")))
}

fn invalid(field: RecordField, reason: impl Into<String>) -> InvalidRecord {
    InvalidRecord::new(field, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn test_stock_integer_text() {
        assert_eq!(parse_stock(&text("100")).unwrap(), 100);
    }

    #[test]
    fn test_stock_whitespace_trimming() {
        assert_eq!(parse_stock(&text("  68  ")).unwrap(), 68);
    }

    #[test]
    fn test_stock_integral_decimal() {
        assert_eq!(parse_stock(&text("100.0")).unwrap(), 100);
        assert_eq!(parse_stock(&FieldValue::Number(dec!(7.00))).unwrap(), 7);
    }

    #[test]
    fn test_stock_zero_allowed() {
        assert_eq!(parse_stock(&FieldValue::Integer(0)).unwrap(), 0);
    }

    #[test]
    fn test_stock_negative_rejected() {
        let err = parse_stock(&FieldValue::Integer(-1)).unwrap_err();
        assert_eq!(err.field, RecordField::Stock);
    }

    #[test]
    fn test_stock_fraction_rejected() {
        assert!(parse_stock(&text("12.5")).is_err());
    }

    #[test]
    fn test_stock_missing_rejected() {
        assert!(parse_stock(&FieldValue::Missing).is_err());
    }

    #[test]
    fn test_daily_sales_fraction() {
        assert_eq!(parse_daily_sales(&text("2.5")).unwrap(), dec!(2.5));
    }

    #[test]
    fn test_daily_sales_negative_rejected() {
        assert!(parse_daily_sales(&text("-0.1")).is_err());
    }

    #[test]
    fn test_daily_sales_invalid_returns_error() {
        assert!(parse_daily_sales(&text("abc")).is_err());
    }

    #[test]
    fn test_expiry_canonical_text() {
        let dt = parse_expiry_date(&text("2023-01-06")).unwrap();
        assert_eq!(dt.to_string(), "2023-01-06 00:00:00");
    }

    #[test]
    fn test_expiry_native_keeps_time() {
        let native = NaiveDate::from_ymd_opt(2023, 1, 6)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();
        assert_eq!(parse_expiry_date(&FieldValue::Date(native)).unwrap(), native);
    }

    #[test]
    fn test_expiry_non_canonical_rejected() {
        assert!(parse_expiry_date(&text("2023-1-6")).is_err());
        assert!(parse_expiry_date(&text("06/01/2023")).is_err());
        assert!(parse_expiry_date(&text("2023-02-30")).is_err());
    }

    #[test]
    fn test_expiry_number_rejected() {
        assert!(parse_expiry_date(&FieldValue::Integer(20230106)).is_err());
    }

    #[test]
    fn test_name_trimmed() {
        assert_eq!(parse_name(&text(" Aspirin ")).unwrap(), "Aspirin");
    }
}
