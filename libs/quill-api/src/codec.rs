//! Schema-driven conversion between wire scalars and [`Value`].
//!
//! The wire form is plain JSON: INT64 travels as a decimal string, non-finite
//! floats as the strings `"NaN"`, `"Infinity"`, `"-Infinity"`, BYTES as
//! standard base64, TIMESTAMP as RFC 3339 with a `Z` offset and DATE as
//! `YYYY-MM-DD`. The declared type always comes from the caller; nothing is
//! inferred from the JSON kind.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value as Json;

use crate::error::DecodeError;
use crate::schema::TypeCode;
use crate::value::Value;

const NAN: &str = "NaN";
const POS_INF: &str = "Infinity";
const NEG_INF: &str = "-Infinity";

// ════════════════════════════════════════════════════════════════
//  Decode
// ════════════════════════════════════════════════════════════════

/// Decode one wire scalar declared as `code`.
///
/// JSON `null` is `Value::Null` for every code, including the ones without
/// a decoding rule.
pub fn decode(raw: &Json, code: TypeCode) -> Result<Value, DecodeError> {
    if raw.is_null() {
        return Ok(Value::Null);
    }

    match code {
        TypeCode::Bool => match raw {
            Json::Bool(b) => Ok(Value::Bool(*b)),
            other => Err(mismatch(code, "a boolean", other)),
        },
        TypeCode::Int64 => {
            let s = expect_str(raw, code)?;
            s.parse::<i64>()
                .map(Value::Int64)
                .map_err(|e| DecodeError::malformed(format!("INT64 {s:?}: {e}")))
        }
        TypeCode::Float64 => decode_float(raw, code).map(Value::Float64),
        TypeCode::Float32 => {
            let wide = decode_float(raw, code)?;
            let narrow = wide as f32;
            if wide.is_finite() && !narrow.is_finite() {
                return Err(DecodeError::malformed(format!("FLOAT32 {wide} is out of range")));
            }
            Ok(Value::Float32(narrow))
        }
        TypeCode::Timestamp => parse_timestamp(expect_str(raw, code)?).map(Value::Timestamp),
        TypeCode::Date => parse_date(expect_str(raw, code)?).map(Value::Date),
        TypeCode::String => expect_str(raw, code).map(|s| Value::String(s.to_string())),
        TypeCode::Bytes => {
            let s = expect_str(raw, code)?;
            STANDARD
                .decode(s)
                .map(Value::Bytes)
                .map_err(|e| DecodeError::malformed(format!("BYTES base64: {e}")))
        }
        TypeCode::Array
        | TypeCode::Struct
        | TypeCode::Numeric
        | TypeCode::Json
        | TypeCode::Proto
        | TypeCode::Enum
        | TypeCode::Unspecified
        | TypeCode::Unknown => Err(DecodeError::UnsupportedType(code)),
    }
}

fn expect_str(raw: &Json, code: TypeCode) -> Result<&str, DecodeError> {
    raw.as_str().ok_or_else(|| mismatch(code, "a string", raw))
}

fn decode_float(raw: &Json, code: TypeCode) -> Result<f64, DecodeError> {
    match raw {
        Json::Number(n) => n
            .as_f64()
            .ok_or_else(|| DecodeError::malformed(format!("{code} {n} is not representable"))),
        Json::String(s) => match s.as_str() {
            NAN => Ok(f64::NAN),
            POS_INF => Ok(f64::INFINITY),
            NEG_INF => Ok(f64::NEG_INFINITY),
            other => Err(DecodeError::malformed(format!(
                "{code} string must be one of NaN, Infinity, -Infinity, got {other:?}"
            ))),
        },
        other => Err(mismatch(code, "a number", other)),
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DecodeError> {
    if !s.ends_with('Z') {
        return Err(DecodeError::malformed(format!("TIMESTAMP {s:?}: offset must be 'Z'")));
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DecodeError::malformed(format!("TIMESTAMP {s:?}: {e}")))
}

/// `YYYY-MM-DD`; a full `...Z` timestamp is accepted too and keeps its UTC date.
fn parse_date(s: &str) -> Result<NaiveDate, DecodeError> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    parse_timestamp(s)
        .map(|ts| ts.date_naive())
        .map_err(|_| DecodeError::malformed(format!("DATE {s:?}: expected YYYY-MM-DD")))
}

fn mismatch(code: TypeCode, expected: &str, raw: &Json) -> DecodeError {
    let got = match raw {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    };
    DecodeError::malformed(format!("{code} expects {expected}, got {got}"))
}

// ════════════════════════════════════════════════════════════════
//  Encode
// ════════════════════════════════════════════════════════════════

/// Render a value in its wire form. Exact inverse of [`decode`].
pub fn encode(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int64(i) => Json::String(i.to_string()),
        Value::Float64(f) => encode_float(*f),
        Value::Float32(f) => encode_float(f64::from(*f)),
        Value::String(s) => Json::String(s.clone()),
        Value::Bytes(b) => Json::String(STANDARD.encode(b)),
        Value::Date(d) => Json::String(d.format("%Y-%m-%d").to_string()),
        Value::Timestamp(ts) => Json::String(ts.to_rfc3339_opts(SecondsFormat::Nanos, true)),
    }
}

fn encode_float(f: f64) -> Json {
    if f.is_nan() {
        Json::String(NAN.into())
    } else if f == f64::INFINITY {
        Json::String(POS_INF.into())
    } else if f == f64::NEG_INFINITY {
        Json::String(NEG_INF.into())
    } else {
        // finite here, from_f64 only rejects NaN/inf
        serde_json::Number::from_f64(f).map_or(Json::Null, Json::Number)
    }
}
