//! JSON numbers.
//!
//! Integers and floats are stored apart so that integral values survive a
//! round trip unchanged, but equality and ordering are by numeric value:
//! `Number::Int(1) == Number::Float(1.0)`.

use std::cmp::Ordering;
use std::fmt;

// 2^63 and 2^64, exactly representable as f64.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;
// Largest magnitude below which every integer is exact in an f64.
const F64_EXACT_INT: u64 = 1 << 53;

#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    /// Only used for values above `i64::MAX`.
    UInt(u64),
    Float(f64),
}

impl Number {
    pub fn from_u64(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(v) => Number::Int(v),
            Err(_) => Number::UInt(value),
        }
    }

    pub fn is_integer(&self) -> bool {
        match self {
            Number::Int(_) | Number::UInt(_) => true,
            Number::Float(_) => false,
        }
    }

    pub fn is_float(&self) -> bool {
        !self.is_integer()
    }

    /// The value as `i64` if that is lossless.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Number::Int(v) => Some(v),
            Number::UInt(v) => i64::try_from(v).ok(),
            Number::Float(f) => {
                if f.fract() == 0.0 && f >= -I64_BOUND && f < I64_BOUND {
                    Some(f as i64)
                } else {
                    None
                }
            }
        }
    }

    /// The value as `u64` if that is lossless.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Number::Int(v) => u64::try_from(v).ok(),
            Number::UInt(v) => Some(v),
            Number::Float(f) => {
                if f.fract() == 0.0 && f >= 0.0 && f < U64_BOUND {
                    Some(f as u64)
                } else {
                    None
                }
            }
        }
    }

    /// The value as `f64` if that is lossless.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Number::Int(v) if v.unsigned_abs() <= F64_EXACT_INT => Some(v as f64),
            Number::UInt(v) if v <= F64_EXACT_INT => Some(v as f64),
            Number::Float(f) => Some(f),
            _ => None,
        }
    }

    /// The value as `f64`, rounding large integers.
    pub fn to_f64(&self) -> f64 {
        match *self {
            Number::Int(v) => v as f64,
            Number::UInt(v) => v as f64,
            Number::Float(f) => f,
        }
    }

    pub fn is_zero(&self) -> bool {
        match *self {
            Number::Int(v) => v == 0,
            Number::UInt(v) => v == 0,
            Number::Float(f) => f == 0.0,
        }
    }

    fn as_i128(&self) -> Option<i128> {
        match *self {
            Number::Int(v) => Some(i128::from(v)),
            Number::UInt(v) => Some(i128::from(v)),
            Number::Float(_) => None,
        }
    }

    pub fn to_json_number(&self) -> Option<serde_json::Number> {
        match *self {
            Number::Int(v) => Some(v.into()),
            Number::UInt(v) => Some(v.into()),
            Number::Float(f) => serde_json::Number::from_f64(f),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.as_i128(), other.as_i128()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{v}"),
            Number::UInt(v) => write!(f, "{v}"),
            Number::Float(_) => match self.to_json_number() {
                Some(n) => write!(f, "{n}"),
                None => f.write_str("null"),
            },
        }
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Number {
            fn from(v: $t) -> Self {
                Number::Int(i64::from(v))
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Number {
            fn from(v: $t) -> Self {
                Number::from_u64(u64::from(v))
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<usize> for Number {
    fn from(v: usize) -> Self {
        Number::from_u64(v as u64)
    }
}

impl From<isize> for Number {
    fn from(v: isize) -> Self {
        Number::Int(v as i64)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

impl From<f32> for Number {
    fn from(v: f32) -> Self {
        Number::Float(f64::from(v))
    }
}

impl From<&serde_json::Number> for Number {
    fn from(n: &serde_json::Number) -> Self {
        if let Some(v) = n.as_i64() {
            Number::Int(v)
        } else if let Some(v) = n.as_u64() {
            Number::UInt(v)
        } else {
            Number::Float(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}
