//! Tag values and geometry types shared by the builder surface.

use std::fmt::Display;

/// Geometry type of a feature, matching the wire enumeration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GeomType {
    Unknown = 0,
    Point = 1,
    LineString = 2,
    Polygon = 3,
}

/// A feature tag value. The set of variants is closed; anything outside it
/// is canonicalized on the way in, either by widening (the integer `From`
/// impls below) or by [`Value::text`].
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    UInt(u64),
    Int(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
}

impl Value {
    /// Fallback for types outside the enumerated set: the value's
    /// `Display` rendering becomes a string tag.
    pub fn text<T: Display>(value: T) -> Value {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::String(v.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Value {
        Value::from(&v[..])
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Value {
        Value::String(String::from_utf8_lossy(v).into_owned())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Value {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Value {
        Value::Double(v)
    }
}

macro_rules! widen_unsigned {
    ($($from:ty),*) => {$(
        impl From<$from> for Value {
            fn from(v: $from) -> Value {
                Value::UInt(u64::from(v))
            }
        }
    )*}
}

macro_rules! widen_signed {
    ($($from:ty),*) => {$(
        impl From<$from> for Value {
            fn from(v: $from) -> Value {
                Value::Int(i64::from(v))
            }
        }
    )*}
}

widen_unsigned!(u8, u16, u32, u64);
widen_signed!(i8, i16, i32, i64);

#[cfg(test)]
mod value_test {
    use super::*;

    #[test]
    fn integers_widen_preserving_signedness() {
        assert_eq!(Value::from(5u8), Value::UInt(5));
        assert_eq!(Value::from(5u16), Value::UInt(5));
        assert_eq!(Value::from(5u32), Value::UInt(5));
        assert_eq!(Value::from(-5i8), Value::Int(-5));
        assert_eq!(Value::from(-5i16), Value::Int(-5));
        assert_eq!(Value::from(-5i32), Value::Int(-5));
    }

    #[test]
    fn bytes_become_strings() {
        assert_eq!(Value::from(&b"abc"[..]), Value::String("abc".to_owned()));
    }

    #[test]
    fn text_fallback_uses_display() {
        assert_eq!(Value::text(3.5), Value::String("3.5".to_owned()));
        assert_eq!(Value::text('x'), Value::String("x".to_owned()));
    }
}
