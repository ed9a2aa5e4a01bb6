//! Numeric command arguments.
//!
//! TSPL accepts plain decimal text for every numeric field. Callers may
//! hand over either integers or floats; fields the printer only accepts as
//! non-negative integers (label size, speed, density, sensor distance and
//! offset) go through [`Number::to_non_negative`], which rejects fractional
//! and negative values instead of truncating or forwarding them.

use std::fmt;

use crate::CommandError;

/// A numeric argument as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// An integer value.
    Int(i64),
    /// A floating point value.
    Float(f64),
}

impl Number {
    /// Return the value as an integer, failing if it has a fractional part
    /// or is not finite.
    pub fn to_integer(self, field: &'static str) -> Result<i64, CommandError> {
        match self {
            Number::Int(v) => Ok(v),
            Number::Float(v) => {
                if !v.is_finite() {
                    return Err(CommandError::invalid(field, format!("{v} is not finite")));
                }
                if v.fract() != 0.0 {
                    return Err(CommandError::invalid(
                        field,
                        format!("{v} must be an integer"),
                    ));
                }
                if v < i64::MIN as f64 || v >= i64::MAX as f64 {
                    return Err(CommandError::invalid(field, format!("{v} is out of range")));
                }
                Ok(v as i64)
            }
        }
    }

    /// Like [`to_integer`](Self::to_integer) but also rejects negative values.
    pub fn to_non_negative(self, field: &'static str) -> Result<u64, CommandError> {
        let v = self.to_integer(field)?;
        u64::try_from(v).map_err(|_| CommandError::invalid(field, format!("{v} must not be negative")))
    }
}

/// Canonical decimal rendering: no locale separators, no exponent, and no
/// trailing zeros (`2.0` renders as `2`, `1.50` as `1.5`).
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(v) => write!(f, "{v}"),
            Number::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{}", v as i64)
            }
            // Rust's shortest round-trip float formatting never emits an
            // exponent or trailing zeros for `{}`.
            Number::Float(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! number_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Number {
            fn from(v: $t) -> Self {
                Number::Int(i64::from(v))
            }
        })*
    };
}

number_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for Number {
    fn from(v: usize) -> Self {
        Number::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f32> for Number {
    fn from(v: f32) -> Self {
        Number::Float(f64::from(v))
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_integers_plainly() {
        assert_eq!(Number::from(100).to_string(), "100");
        assert_eq!(Number::from(-3).to_string(), "-3");
        assert_eq!(Number::from(1_000_000u32).to_string(), "1000000");
    }

    #[test]
    fn renders_floats_without_trailing_zeros() {
        assert_eq!(Number::from(2.0).to_string(), "2");
        assert_eq!(Number::from(1.5).to_string(), "1.5");
        assert_eq!(Number::from(0.25).to_string(), "0.25");
        assert_eq!(Number::from(-4.0).to_string(), "-4");
    }

    #[test]
    fn integer_valued_float_is_accepted() {
        assert_eq!(Number::from(4.0).to_integer("speed"), Ok(4));
        assert_eq!(Number::from(7).to_integer("speed"), Ok(7));
    }

    #[test]
    fn fractional_value_is_rejected() {
        let err = Number::from(4.5).to_integer("speed").unwrap_err();
        match err {
            CommandError::InvalidArgument { field, .. } => assert_eq!(field, "speed"),
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(Number::from(f64::NAN).to_integer("width").is_err());
        assert!(Number::from(f64::INFINITY).to_integer("width").is_err());
    }

    #[test]
    fn floats_beyond_i64_are_rejected_not_clamped() {
        assert!(Number::from(9.223372036854775807e18).to_integer("width").is_err());
        assert!(Number::from(-9.3e18).to_integer("width").is_err());
        assert_eq!(Number::from(-9.2e18).to_integer("width"), Ok(-9_200_000_000_000_000_000));
    }

    #[test]
    fn negative_rejected_when_non_negative_required() {
        assert!(Number::from(-1).to_non_negative("height").is_err());
        assert_eq!(Number::from(0).to_non_negative("height"), Ok(0));
    }
}
