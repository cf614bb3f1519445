//! Column decoding rules.
//!
//! Application code expects PostgreSQL values in a particular shape:
//!
//! - `INT8` (and the smaller integer types) decode to native `i64`
//! - `NUMERIC` decodes to `f64` ([`NumericF64`])
//! - `DATE` is passed through as its raw `YYYY-MM-DD` text ([`RawDate`])
//!
//! sqlx decides the Rust type per call, so these rules live in the wrapper
//! types below and in [`RowToJson`], which applies them to whole rows.

use chrono::{Datelike, Days, NaiveDate};
use serde_json::Value as JsonValue;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgRow, PgTypeInfo, PgValueFormat, PgValueRef};
use sqlx::types::BigDecimal;
use sqlx::{Column, Decode, Postgres, Row, Type, TypeInfo};

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for PostgreSQL column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Date,
    Timestamp,
    TimestampTz,
    Json,
    Text,
}

/// Classify a PostgreSQL type name into a logical category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    match type_name.to_ascii_uppercase().as_str() {
        "INT2" | "INT4" | "INT8" | "SMALLINT" | "INTEGER" | "BIGINT" => TypeCategory::Integer,
        "FLOAT4" | "FLOAT8" | "REAL" | "DOUBLE PRECISION" => TypeCategory::Float,
        "NUMERIC" | "DECIMAL" => TypeCategory::Decimal,
        "BOOL" | "BOOLEAN" => TypeCategory::Boolean,
        "DATE" => TypeCategory::Date,
        "TIMESTAMP" => TypeCategory::Timestamp,
        "TIMESTAMPTZ" => TypeCategory::TimestampTz,
        "JSON" | "JSONB" => TypeCategory::Json,
        _ => TypeCategory::Text,
    }
}

// =============================================================================
// NUMERIC as f64
// =============================================================================

/// A `NUMERIC` value decoded to the nearest `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericF64(pub f64);

impl Type<Postgres> for NumericF64 {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("NUMERIC")
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        ty.name().eq_ignore_ascii_case("numeric")
    }
}

impl<'r> Decode<'r, Postgres> for NumericF64 {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        // BigDecimal has no NaN or infinities
        let special = match value.format() {
            PgValueFormat::Text => numeric_special_text(value.as_str()?),
            PgValueFormat::Binary => numeric_special_binary(value.as_bytes()?),
        };
        if let Some(v) = special {
            return Ok(NumericF64(v));
        }
        let decimal = <BigDecimal as Decode<Postgres>>::decode(value)?;
        Ok(NumericF64(decimal_to_f64(&decimal)?))
    }
}

// Sign word values for NUMERIC special values
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// NaN and the infinities in the text form of a NUMERIC.
pub fn numeric_special_text(s: &str) -> Option<f64> {
    match s.trim() {
        "NaN" => Some(f64::NAN),
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

/// NaN and the infinities in the binary form of a NUMERIC.
///
/// The sign word sits after `ndigits` and `weight`.
pub fn numeric_special_binary(bytes: &[u8]) -> Option<f64> {
    let sign = u16::from_be_bytes([*bytes.get(4)?, *bytes.get(5)?]);
    match sign {
        NUMERIC_NAN => Some(f64::NAN),
        NUMERIC_PINF => Some(f64::INFINITY),
        NUMERIC_NINF => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

/// Nearest `f64` to a decimal, going through its exact text so the result is
/// correctly rounded.
pub fn decimal_to_f64(decimal: &BigDecimal) -> Result<f64, BoxDynError> {
    Ok(decimal.to_string().parse::<f64>()?)
}

// =============================================================================
// DATE as raw text
// =============================================================================

/// A `DATE` value kept as PostgreSQL's ISO text (`2024-02-29`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDate(pub String);

impl Type<Postgres> for RawDate {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("DATE")
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        ty.name().eq_ignore_ascii_case("date")
    }
}

impl<'r> Decode<'r, Postgres> for RawDate {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        match value.format() {
            PgValueFormat::Text => Ok(RawDate(value.as_str()?.to_string())),
            PgValueFormat::Binary => {
                let bytes = value.as_bytes()?;
                let days: [u8; 4] = bytes
                    .try_into()
                    .map_err(|_| format!("DATE value has {} bytes, expected 4", bytes.len()))?;
                Ok(RawDate(date_from_pg_days(i32::from_be_bytes(days))?))
            }
        }
    }
}

/// Render a binary DATE (days since 2000-01-01) the way PostgreSQL prints it.
pub fn date_from_pg_days(days: i32) -> Result<String, BoxDynError> {
    match days {
        i32::MAX => return Ok("infinity".to_string()),
        i32::MIN => return Ok("-infinity".to_string()),
        _ => {}
    }
    let epoch = NaiveDate::from_ymd_opt(2000, 1, 1).ok_or("invalid date epoch")?;
    let date = if days >= 0 {
        epoch.checked_add_days(Days::new(days as u64))
    } else {
        epoch.checked_sub_days(Days::new(days.unsigned_abs() as u64))
    }
    .ok_or_else(|| format!("DATE out of range: {} days from 2000-01-01", days))?;

    if date.year() <= 0 {
        // Proleptic year 0 is 1 BC
        Ok(format!(
            "{:04}-{:02}-{:02} BC",
            1 - date.year(),
            date.month(),
            date.day()
        ))
    } else {
        Ok(date.format("%Y-%m-%d").to_string())
    }
}

// =============================================================================
// Row to JSON
// =============================================================================

/// Convert database rows to JSON maps using the decoding rules above.
pub trait RowToJson {
    fn to_json_map(&self) -> serde_json::Map<String, JsonValue>;
}

impl RowToJson for PgRow {
    fn to_json_map(&self) -> serde_json::Map<String, JsonValue> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let category = categorize_type(col.type_info().name());
                (col.name().to_string(), decode_column(self, idx, category))
            })
            .collect()
    }
}

fn decode_column(row: &PgRow, idx: usize, category: TypeCategory) -> JsonValue {
    match category {
        TypeCategory::Integer => decode_integer(row, idx),
        TypeCategory::Float => decode_float(row, idx),
        TypeCategory::Decimal => match row.try_get::<Option<NumericF64>, _>(idx) {
            Ok(Some(v)) => float_value(v.0),
            Ok(None) => JsonValue::Null,
            Err(e) => {
                tracing::error!("Failed to decode NUMERIC: {:?}", e);
                JsonValue::Null
            }
        },
        TypeCategory::Boolean => row
            .try_get::<Option<bool>, _>(idx)
            .ok()
            .flatten()
            .map(JsonValue::Bool)
            .unwrap_or(JsonValue::Null),
        TypeCategory::Date => row
            .try_get::<Option<RawDate>, _>(idx)
            .ok()
            .flatten()
            .map(|d| JsonValue::String(d.0))
            .unwrap_or(JsonValue::Null),
        TypeCategory::Timestamp => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(idx)
            .ok()
            .flatten()
            .map(|t| JsonValue::String(t.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
            .unwrap_or(JsonValue::Null),
        TypeCategory::TimestampTz => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx)
            .ok()
            .flatten()
            .map(|t| JsonValue::String(t.to_rfc3339()))
            .unwrap_or(JsonValue::Null),
        TypeCategory::Json => row
            .try_get::<Option<JsonValue>, _>(idx)
            .ok()
            .flatten()
            .unwrap_or(JsonValue::Null),
        TypeCategory::Text => row
            .try_get::<Option<String>, _>(idx)
            .ok()
            .flatten()
            .map(JsonValue::String)
            .unwrap_or(JsonValue::Null),
    }
}

fn decode_integer(row: &PgRow, idx: usize) -> JsonValue {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map(|v| JsonValue::Number(v.into())).unwrap_or(JsonValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
        return v.map(|v| JsonValue::Number(v.into())).unwrap_or(JsonValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<i16>, _>(idx) {
        return v.map(|v| JsonValue::Number(v.into())).unwrap_or(JsonValue::Null);
    }
    JsonValue::Null
}

fn decode_float(row: &PgRow, idx: usize) -> JsonValue {
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.map(float_value).unwrap_or(JsonValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(idx) {
        return v
            .map(|v| float_value(v as f64))
            .unwrap_or(JsonValue::Null);
    }
    JsonValue::Null
}

/// JSON has no NaN or infinity; those become strings.
fn float_value(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(v.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn special_bytes(sign: u16) -> Vec<u8> {
        let mut out = vec![0, 0, 0, 0];
        out.extend_from_slice(&sign.to_be_bytes());
        out.extend_from_slice(&[0, 0]);
        out
    }

    #[test]
    fn test_categorize_type() {
        assert_eq!(categorize_type("INT8"), TypeCategory::Integer);
        assert_eq!(categorize_type("int4"), TypeCategory::Integer);
        assert_eq!(categorize_type("NUMERIC"), TypeCategory::Decimal);
        assert_eq!(categorize_type("FLOAT8"), TypeCategory::Float);
        assert_eq!(categorize_type("DATE"), TypeCategory::Date);
        assert_eq!(categorize_type("TIMESTAMPTZ"), TypeCategory::TimestampTz);
        assert_eq!(categorize_type("JSONB"), TypeCategory::Json);
        assert_eq!(categorize_type("VARCHAR"), TypeCategory::Text);
    }

    #[test]
    fn test_decimal_to_f64() {
        let cases = [
            ("123.45", 123.45),
            ("-0.5", -0.5),
            ("1000000", 1_000_000.0),
            ("0", 0.0),
            ("0.1", 0.1),
            ("9007199254740993", 9_007_199_254_740_992.0),
        ];
        for (text, expected) in cases {
            let decimal = BigDecimal::from_str(text).unwrap();
            assert_eq!(decimal_to_f64(&decimal).unwrap(), expected, "{}", text);
        }
    }

    #[test]
    fn test_numeric_special_binary() {
        assert!(numeric_special_binary(&special_bytes(NUMERIC_NAN)).unwrap().is_nan());
        assert_eq!(
            numeric_special_binary(&special_bytes(NUMERIC_PINF)),
            Some(f64::INFINITY)
        );
        assert_eq!(
            numeric_special_binary(&special_bytes(NUMERIC_NINF)),
            Some(f64::NEG_INFINITY)
        );
        // Positive, negative and truncated values go through BigDecimal
        assert_eq!(numeric_special_binary(&special_bytes(0x0000)), None);
        assert_eq!(numeric_special_binary(&special_bytes(0x4000)), None);
        assert_eq!(numeric_special_binary(&[0, 1]), None);
    }

    #[test]
    fn test_numeric_special_text() {
        assert_eq!(numeric_special_text("Infinity"), Some(f64::INFINITY));
        assert_eq!(numeric_special_text("-Infinity"), Some(f64::NEG_INFINITY));
        assert!(numeric_special_text("NaN").unwrap().is_nan());
        assert_eq!(numeric_special_text("42.125"), None);
    }

    #[test]
    fn test_date_from_pg_days() {
        assert_eq!(date_from_pg_days(0).unwrap(), "2000-01-01");
        assert_eq!(date_from_pg_days(8825).unwrap(), "2024-02-29");
        assert_eq!(date_from_pg_days(-1).unwrap(), "1999-12-31");
        assert_eq!(date_from_pg_days(i32::MAX).unwrap(), "infinity");
        assert_eq!(date_from_pg_days(i32::MIN).unwrap(), "-infinity");
    }

    #[test]
    fn test_date_before_common_era() {
        // 0001-01-01 BC is proleptic year 0
        let days = NaiveDate::from_ymd_opt(0, 1, 1)
            .unwrap()
            .signed_duration_since(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap())
            .num_days() as i32;
        assert_eq!(date_from_pg_days(days).unwrap(), "0001-01-01 BC");
    }

    #[test]
    fn test_float_value_non_finite() {
        assert_eq!(float_value(1.5), serde_json::json!(1.5));
        assert_eq!(float_value(f64::NAN), JsonValue::String("NaN".to_string()));
    }
}
