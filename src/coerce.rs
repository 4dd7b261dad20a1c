//! Field text to typed value coercion.
//!
//! One dispatch table over [`FieldKind`], driven by a per-run
//! [`CoercionContext`]. Formats and boolean truthiness are pluggable; the
//! numeric parses are locale-invariant `str::parse`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::CoerceError;
use crate::field_type::{FieldKind, Value};

/// Default date format: ISO calendar date.
pub const ISO_DATE: &str = "%Y-%m-%d";
/// Default date-time format: ISO combined date-time, optional fractional seconds.
pub const ISO_DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S%.f";
/// Default time format: ISO time, optional fractional seconds.
pub const ISO_TIME: &str = "%H:%M:%S%.f";

/// Default boolean interpreter: case-insensitive match against `"true"`.
pub fn default_boolean_reader(text: &str) -> bool {
    text.eq_ignore_ascii_case("true")
}

/// The active coercion configuration for one ingestion run.
///
/// Immutable for the duration of the run; cloned out of the
/// [`Loader`](crate::Loader) builder when a read starts.
#[derive(Debug, Clone)]
pub struct CoercionContext {
    /// When set, an empty raw field skips coercion: nullable columns become
    /// null, non-nullable columns keep the record default.
    pub blank_is_null: bool,
    /// chrono format for [`FieldKind::Date`].
    pub date_format: String,
    /// chrono format for [`FieldKind::DateTime`].
    pub datetime_format: String,
    /// chrono format for [`FieldKind::Time`].
    pub time_format: String,
    /// Boolean truthiness interpreter. Total: it never fails, unrecognized
    /// tokens read as `false` under the default.
    pub boolean_reader: fn(&str) -> bool,
}

impl Default for CoercionContext {
    fn default() -> Self {
        Self {
            blank_is_null: false,
            date_format: ISO_DATE.to_string(),
            datetime_format: ISO_DATE_TIME.to_string(),
            time_format: ISO_TIME.to_string(),
            boolean_reader: default_boolean_reader,
        }
    }
}

/// Coerce one raw text field according to its declared kind.
///
/// Returns `Ok(None)` when the blank-is-null policy skips the field entirely
/// (blank raw text on a non-nullable column); the materializer leaves the
/// record default in place. `Ok(Some(Value::Null))` is the nullable blank.
pub fn coerce(
    kind: FieldKind,
    nullable: bool,
    raw: &str,
    ctx: &CoercionContext,
) -> Result<Option<Value>, CoerceError> {
    if ctx.blank_is_null && raw.is_empty() && kind != FieldKind::Text {
        return Ok(if nullable { Some(Value::Null) } else { None });
    }

    let value = match kind {
        FieldKind::Int8 => Value::Int(parse_int::<i8>(raw)? as i64),
        FieldKind::Int16 => Value::Int(parse_int::<i16>(raw)? as i64),
        FieldKind::Int32 => Value::Int(parse_int::<i32>(raw)? as i64),
        FieldKind::Int64 => Value::Int(parse_int::<i64>(raw)?),
        FieldKind::Float32 => Value::Float(parse_float::<f32>(raw)? as f64),
        FieldKind::Float64 => Value::Float(parse_float::<f64>(raw)?),
        FieldKind::Bool => Value::Bool((ctx.boolean_reader)(raw)),
        FieldKind::Text => Value::Text(raw.to_string()),
        FieldKind::Date => {
            Value::Date(parse_temporal(raw, &ctx.date_format, NaiveDate::parse_from_str)?)
        }
        FieldKind::DateTime => Value::DateTime(parse_temporal(
            raw,
            &ctx.datetime_format,
            NaiveDateTime::parse_from_str,
        )?),
        FieldKind::Time => {
            Value::Time(parse_temporal(raw, &ctx.time_format, NaiveTime::parse_from_str)?)
        }
        // Raw text handed through; the assign side runs ParseFromText.
        FieldKind::Custom => Value::Text(raw.to_string()),
    };
    Ok(Some(value))
}

fn parse_int<T>(raw: &str) -> Result<T, CoerceError>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    raw.parse().map_err(|source| CoerceError::Int {
        value: raw.to_string(),
        source,
    })
}

fn parse_float<T>(raw: &str) -> Result<T, CoerceError>
where
    T: std::str::FromStr<Err = std::num::ParseFloatError>,
{
    raw.parse().map_err(|source| CoerceError::Float {
        value: raw.to_string(),
        source,
    })
}

fn parse_temporal<T>(
    raw: &str,
    format: &str,
    parse: fn(&str, &str) -> chrono::ParseResult<T>,
) -> Result<T, CoerceError> {
    parse(raw, format).map_err(|source| CoerceError::Temporal {
        value: raw.to_string(),
        source,
    })
}
