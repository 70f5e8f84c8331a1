//! Opaque property and dependency values.
//!
//! [`Value`] is the loosely typed payload carried by the escape-hatch part of a
//! property bag and by effect dependency lists. Equality is shallow and
//! structural, which is what dependency comparison relies on.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(String),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A string keyed map of values.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns the contained string, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {item}")?;
                }
                f.write_str("}")
            }
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_from_wide_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    i64::try_from(value).map_or_else(|_| Self::Str(value.to_string()), Self::Int)
                }
            }
        )*
    };
}

// Values beyond `i64` keep their exact decimal form.
impl_from_wide_int!(u64, usize, isize);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shallow_equality_is_structural() {
        assert_eq!(Value::from(3), Value::Int(3));
        assert_ne!(Value::from(3), Value::from(3.0));
        assert_eq!(Value::from(vec!["a", "b"]), Value::from(vec!["a", "b"]));
        assert_eq!(Value::from(None::<i32>), Value::Null);
    }

    #[test]
    fn deps_macro_builds_lists() {
        let empty: Option<Vec<Value>> = deps![];
        assert_eq!(empty, Some(Vec::new()));
        let count = 4_i64;
        assert_eq!(deps![count, "x"], Some(vec![Value::Int(4), Value::from("x")]));
    }

    #[test]
    fn lengths_can_be_dependencies() {
        let items = vec![1, 2];
        assert_eq!(deps![items.len()], Some(vec![Value::Int(2)]));
        assert_eq!(Value::from(u64::MAX), Value::from("18446744073709551615"));
    }

    #[test]
    fn display_renders_nested_values() {
        let value = Value::List(vec![Value::Int(1), Value::from("two"), Value::Null]);
        assert_eq!(value.to_string(), "[1, two, null]");
    }
}
