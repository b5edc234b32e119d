//! Scalar and entry types shared by variables, uncertainties and records.
//!
//! Values reach a [`Variable`](crate::Variable) from many places: readout series,
//! hand-written lists, JSON documents. They are normalised to [`Scalar`]: strings,
//! integers and nulls are kept as they are, every other number becomes an `f64`.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::{Error, Result};

/// A single sanitised value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Free-text value (e.g. a bin label).
    Str(String),
    /// Integer value, kept exact.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Missing value.
    Null,
}

impl Scalar {
    /// Numeric view of the value, `None` for strings and nulls.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Scalar::Int(v) => Some(v as f64),
            Scalar::Float(v) => Some(v),
            Scalar::Str(_) | Scalar::Null => None,
        }
    }

    /// True for [`Scalar::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// True for values that count as "no uncertainty": null, the empty string and zero.
    pub fn is_zero_like(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::Str(s) => s.is_empty(),
            Scalar::Int(v) => *v == 0,
            Scalar::Float(v) => *v == 0.0,
        }
    }

    /// Multiply by `factor`. Nulls stay null, strings cannot be scaled.
    pub fn scaled(&self, factor: f64) -> Result<Scalar> {
        match self {
            Scalar::Int(v) => Ok(Scalar::Float(factor * *v as f64)),
            Scalar::Float(v) => Ok(Scalar::Float(factor * v)),
            Scalar::Null => Ok(Scalar::Null),
            Scalar::Str(s) => Err(Error::type_error(format!("cannot scale string value '{s}'"))),
        }
    }

    /// Convert a JSON scalar. Arrays and objects are rejected.
    pub fn from_json(value: &serde_json::Value) -> Result<Scalar> {
        use serde_json::Value;
        match value {
            Value::Null => Ok(Scalar::Null),
            Value::Bool(b) => Ok(Scalar::Int(i64::from(*b))),
            Value::String(s) => Ok(Scalar::Str(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Scalar::Int(i))
                } else {
                    n.as_f64()
                        .map(Scalar::Float)
                        .ok_or_else(|| Error::validation(format!("unrepresentable number {n}")))
                }
            }
            Value::Array(_) | Value::Object(_) => {
                Err(Error::validation(format!("expected a scalar value, got {value}")))
            }
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::Str(s) => serializer.serialize_str(s),
            Scalar::Int(v) => serializer.serialize_i64(*v),
            Scalar::Float(v) => serializer.serialize_f64(*v),
            Scalar::Null => serializer.serialize_none(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => write!(f, "{s}"),
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Null => write!(f, "null"),
        }
    }
}

macro_rules! scalar_from_float {
    ($($t:ty),*) => {$(
        impl From<$t> for Scalar {
            fn from(v: $t) -> Self {
                Scalar::Float(f64::from(v))
            }
        }
    )*};
}

macro_rules! scalar_from_int {
    ($($t:ty),*) => {$(
        impl From<$t> for Scalar {
            fn from(v: $t) -> Self {
                Scalar::Int(i64::from(v))
            }
        }
    )*};
}

scalar_from_float!(f64, f32);
scalar_from_int!(i64, i32, i16, i8, u32, u16, u8);

impl From<usize> for Scalar {
    fn from(v: usize) -> Self {
        i64::try_from(v).map(Scalar::Int).unwrap_or(Scalar::Float(v as f64))
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map_or(Scalar::Null, Into::into)
    }
}

/// One element of a value list: either a scalar or a `(low, high)` pair.
///
/// Binned variables and asymmetric uncertainties hold pairs, everything else scalars.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// Single value.
    Scalar(Scalar),
    /// Interval `(low, high)` or asymmetric error `(down, up)`.
    Pair(Scalar, Scalar),
}

impl Entry {
    /// True if the entry is a pair.
    pub fn is_pair(&self) -> bool {
        matches!(self, Entry::Pair(..))
    }

    /// The scalar, if this is not a pair.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Entry::Scalar(s) => Some(s),
            Entry::Pair(..) => None,
        }
    }

    /// The two members, if this is a pair.
    pub fn as_pair(&self) -> Option<(&Scalar, &Scalar)> {
        match self {
            Entry::Pair(a, b) => Some((a, b)),
            Entry::Scalar(_) => None,
        }
    }

    /// Multiply every member by `factor`.
    pub fn scaled(&self, factor: f64) -> Result<Entry> {
        match self {
            Entry::Scalar(s) => Ok(Entry::Scalar(s.scaled(factor)?)),
            Entry::Pair(a, b) => Ok(Entry::Pair(a.scaled(factor)?, b.scaled(factor)?)),
        }
    }
}

impl TryFrom<&serde_json::Value> for Entry {
    type Error = Error;

    fn try_from(value: &serde_json::Value) -> Result<Entry> {
        match value {
            serde_json::Value::Array(items) => match items.as_slice() {
                [a, b] => Ok(Entry::Pair(Scalar::from_json(a)?, Scalar::from_json(b)?)),
                _ => Err(Error::validation(format!(
                    "expected a pair of two values, got {} element(s): {value}",
                    items.len()
                ))),
            },
            other => Ok(Entry::Scalar(Scalar::from_json(other)?)),
        }
    }
}

impl From<Scalar> for Entry {
    fn from(v: Scalar) -> Self {
        Entry::Scalar(v)
    }
}

macro_rules! entry_from_scalar_like {
    ($($t:ty),*) => {$(
        impl From<$t> for Entry {
            fn from(v: $t) -> Self {
                Entry::Scalar(Scalar::from(v))
            }
        }
    )*};
}

entry_from_scalar_like!(f64, f32, i64, i32, i16, i8, u32, u16, u8, usize, &str, String);

impl<T: Into<Scalar>> From<Option<T>> for Entry {
    fn from(v: Option<T>) -> Self {
        Entry::Scalar(Scalar::from(v))
    }
}

impl<A: Into<Scalar>, B: Into<Scalar>> From<(A, B)> for Entry {
    fn from((a, b): (A, B)) -> Self {
        Entry::Pair(a.into(), b.into())
    }
}

/// Convert a JSON array into entries.
pub fn entries_from_json(value: &serde_json::Value) -> Result<Vec<Entry>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::validation(format!("expected a list of values, got {value}")))?;
    items.iter().map(Entry::try_from).collect()
}
