use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::CoerceError;

/// Declared target type for a bound CSV column.
///
/// This is a closed set: the coercion engine dispatches on it exhaustively.
/// Types outside the set implement [`ParseFromText`] and declare `Custom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldKind {
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// Boolean, read through the configured boolean interpreter.
    Bool,
    /// Text, passed through unchanged.
    #[default]
    Text,
    /// Calendar date.
    Date,
    /// Combined date and time.
    DateTime,
    /// Time of day.
    Time,
    /// Any type implementing [`ParseFromText`]; the raw text is handed
    /// through and the field's assign function performs the parse.
    Custom,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Int8 => "Int8",
            FieldKind::Int16 => "Int16",
            FieldKind::Int32 => "Int32",
            FieldKind::Int64 => "Int64",
            FieldKind::Float32 => "Float32",
            FieldKind::Float64 => "Float64",
            FieldKind::Bool => "Bool",
            FieldKind::Text => "Text",
            FieldKind::Date => "Date",
            FieldKind::DateTime => "DateTime",
            FieldKind::Time => "Time",
            FieldKind::Custom => "Custom",
        };
        write!(f, "{name}")
    }
}

/// A decoded field value produced by the coercion engine.
///
/// Integers are widened to `i64` and floats to `f64` after parsing at the
/// declared width, so narrowing during assignment cannot overflow.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Blank field under the blank-is-null policy, bound to a nullable column.
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

impl Value {
    fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::DateTime(_) => "date-time",
            Value::Time(_) => "time",
        }
    }

    fn mismatch(&self, expected: &'static str) -> CoerceError {
        CoerceError::TypeMismatch {
            expected,
            actual: self.kind_name(),
        }
    }

    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The integer payload.
    pub fn into_i64(self) -> Result<i64, CoerceError> {
        match self {
            Value::Int(n) => Ok(n),
            other => Err(other.mismatch("integer")),
        }
    }

    /// The integer payload, with `Null` mapped to `None`.
    pub fn into_opt_i64(self) -> Result<Option<i64>, CoerceError> {
        match self {
            Value::Null => Ok(None),
            other => other.into_i64().map(Some),
        }
    }

    /// The float payload.
    pub fn into_f64(self) -> Result<f64, CoerceError> {
        match self {
            Value::Float(x) => Ok(x),
            other => Err(other.mismatch("float")),
        }
    }

    /// The float payload, with `Null` mapped to `None`.
    pub fn into_opt_f64(self) -> Result<Option<f64>, CoerceError> {
        match self {
            Value::Null => Ok(None),
            other => other.into_f64().map(Some),
        }
    }

    /// The boolean payload.
    pub fn into_bool(self) -> Result<bool, CoerceError> {
        match self {
            Value::Bool(b) => Ok(b),
            other => Err(other.mismatch("boolean")),
        }
    }

    /// The boolean payload, with `Null` mapped to `None`.
    pub fn into_opt_bool(self) -> Result<Option<bool>, CoerceError> {
        match self {
            Value::Null => Ok(None),
            other => other.into_bool().map(Some),
        }
    }

    /// The text payload.
    pub fn into_text(self) -> Result<String, CoerceError> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(other.mismatch("text")),
        }
    }

    /// Borrow the text payload.
    pub fn as_str(&self) -> Result<&str, CoerceError> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(other.mismatch("text")),
        }
    }

    /// The date payload.
    pub fn into_date(self) -> Result<NaiveDate, CoerceError> {
        match self {
            Value::Date(d) => Ok(d),
            other => Err(other.mismatch("date")),
        }
    }

    /// The date payload, with `Null` mapped to `None`.
    pub fn into_opt_date(self) -> Result<Option<NaiveDate>, CoerceError> {
        match self {
            Value::Null => Ok(None),
            other => other.into_date().map(Some),
        }
    }

    /// The date-time payload.
    pub fn into_datetime(self) -> Result<NaiveDateTime, CoerceError> {
        match self {
            Value::DateTime(dt) => Ok(dt),
            other => Err(other.mismatch("date-time")),
        }
    }

    /// The date-time payload, with `Null` mapped to `None`.
    pub fn into_opt_datetime(self) -> Result<Option<NaiveDateTime>, CoerceError> {
        match self {
            Value::Null => Ok(None),
            other => other.into_datetime().map(Some),
        }
    }

    /// The time payload.
    pub fn into_time(self) -> Result<NaiveTime, CoerceError> {
        match self {
            Value::Time(t) => Ok(t),
            other => Err(other.mismatch("time")),
        }
    }

    /// The time payload, with `Null` mapped to `None`.
    pub fn into_opt_time(self) -> Result<Option<NaiveTime>, CoerceError> {
        match self {
            Value::Null => Ok(None),
            other => other.into_time().map(Some),
        }
    }
}

/// Capability for record field types outside the built-in set.
///
/// Columns declared [`FieldKind::Custom`] receive the raw text unchanged;
/// the field's assign function invokes this parse.
pub trait ParseFromText: Sized {
    /// Parse a value from its text form.
    fn parse_text(text: &str) -> Result<Self, CoerceError>;
}
