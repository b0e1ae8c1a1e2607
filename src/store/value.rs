//! The closed set of value kinds a store can hold.

use std::fmt;

use super::error::StoreError;

/// Kind tag of a stored [`Value`].
///
/// The display form is the tag written to the backing file (`INT32`, `INT64`,
/// `FLOAT32`, `FLOAT64`, `BOOL`, `STRING`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    String,
}

impl Kind {
    /// All supported kinds, in tag order.
    pub const ALL: [Kind; 6] = [
        Kind::Int32,
        Kind::Int64,
        Kind::Float32,
        Kind::Float64,
        Kind::Bool,
        Kind::String,
    ];

    /// The wire tag for this kind.
    pub const fn tag(self) -> &'static str {
        match self {
            Kind::Int32 => "INT32",
            Kind::Int64 => "INT64",
            Kind::Float32 => "FLOAT32",
            Kind::Float64 => "FLOAT64",
            Kind::Bool => "BOOL",
            Kind::String => "STRING",
        }
    }

    /// Look up a kind by its wire tag. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A value held by the store.
///
/// Exactly six kinds exist; anything else is rejected at the [`IntoValue`]
/// boundary with [`StoreError::UnsupportedType`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    String(String),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Int32(_) => Kind::Int32,
            Value::Int64(_) => Kind::Int64,
            Value::Float32(_) => Kind::Float32,
            Value::Float64(_) => Kind::Float64,
            Value::Bool(_) => Kind::Bool,
            Value::String(_) => Kind::String,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
        }
    }
}

/// Conversion into a storable [`Value`], checked at the `put` boundary.
///
/// The six native Rust types convert infallibly. `serde_json::Value` is the
/// dynamic entry point: integers that fit in `i32` become [`Value::Int32`],
/// other signed integers [`Value::Int64`], fractional numbers
/// [`Value::Float64`]. `null`, arrays, objects and unsigned integers beyond
/// `i64::MAX` are unsupported.
pub trait IntoValue {
    fn into_value(self) -> Result<Value, StoreError>;
}

/// Typed extraction from a stored [`Value`].
///
/// `from_value` returns `None` when the stored kind differs from
/// [`FromValue::KIND`]; the store turns that into
/// [`StoreError::TypeMismatch`].
pub trait FromValue: Sized {
    const KIND: Kind;

    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! native_kind {
    ($ty:ty, $variant:ident) => {
        impl IntoValue for $ty {
            fn into_value(self) -> Result<Value, StoreError> {
                Ok(Value::$variant(self))
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }

        impl FromValue for $ty {
            const KIND: Kind = Kind::$variant;

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

native_kind!(i32, Int32);
native_kind!(i64, Int64);
native_kind!(f32, Float32);
native_kind!(f64, Float64);
native_kind!(bool, Bool);
native_kind!(String, String);

impl IntoValue for &str {
    fn into_value(self) -> Result<Value, StoreError> {
        Ok(Value::String(self.to_owned()))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Result<Value, StoreError> {
        Ok(self)
    }
}

impl IntoValue for serde_json::Value {
    fn into_value(self) -> Result<Value, StoreError> {
        use serde_json::Value as Json;

        match self {
            Json::Bool(b) => Ok(Value::Bool(b)),
            Json::String(s) => Ok(Value::String(s)),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(match i32::try_from(i) {
                        Ok(small) => Value::Int32(small),
                        Err(_) => Value::Int64(i),
                    })
                } else if n.is_f64() {
                    n.as_f64()
                        .map(Value::Float64)
                        .ok_or_else(|| StoreError::UnsupportedType(format!("number {n}")))
                } else {
                    Err(StoreError::UnsupportedType(format!(
                        "unsigned integer {n} (exceeds i64)"
                    )))
                }
            }
            Json::Null => Err(StoreError::UnsupportedType("null".to_string())),
            Json::Array(_) => Err(StoreError::UnsupportedType("array".to_string())),
            Json::Object(_) => Err(StoreError::UnsupportedType("object".to_string())),
        }
    }
}
