use derive_more::Display;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A scalar kind a [`Field`](crate::Field) can be typed over.
///
/// The set of implementors is closed: `bool`, the 8/16/32-bit integers,
/// `f64` and [`Token`]. 7-bit wire values ride in `u8`; their 7-bit-ness is a
/// property of the wire binding width, not of the value kind.
///
/// The scaling law works in the continuous domain. Each kind knows how to
/// embed into that domain and how to round back to its own representable
/// precision.
pub trait Scalar:
    Copy + PartialEq + PartialOrd + Debug + Serialize + DeserializeOwned + 'static
{
    /// Returns the value a fresh field starts from.
    fn neutral() -> Self;

    /// Embeds this value into the continuous domain.
    fn to_continuous(self) -> f64;

    /// Rounds a continuous value to the nearest representable value of this
    /// kind, clamping into its range. Total function.
    fn from_continuous(value: f64) -> Self;

    /// Applies a signed offset for relative ("change by") semantics. With a
    /// positive bound, the result is clamped into `[-bound, bound]`.
    ///
    /// Kinds without meaningful arithmetic return `None`.
    fn offset_by(self, step: f64, bound: Option<f64>) -> Option<Self> {
        let _ = (step, bound);
        None
    }
}

fn offset_continuous(current: f64, step: f64, bound: Option<f64>) -> f64 {
    let moved = current + step;
    match bound {
        Some(b) if b > 0.0 => num::clamp(moved, -b, b),
        _ => moved,
    }
}

macro_rules! impl_int_scalar {
    ($($t:ty),*) => {
        $(
            impl Scalar for $t {
                fn neutral() -> Self {
                    0
                }

                fn to_continuous(self) -> f64 {
                    self as f64
                }

                fn from_continuous(value: f64) -> Self {
                    num::clamp(value.round(), <$t>::MIN as f64, <$t>::MAX as f64) as $t
                }

                fn offset_by(self, step: f64, bound: Option<f64>) -> Option<Self> {
                    Some(Self::from_continuous(offset_continuous(
                        self as f64,
                        step,
                        bound,
                    )))
                }
            }
        )*
    };
}

impl_int_scalar!(u8, i8, u16, i16, u32, i32);

impl Scalar for bool {
    fn neutral() -> Self {
        false
    }

    fn to_continuous(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }

    fn from_continuous(value: f64) -> Self {
        value >= 0.5
    }
}

impl Scalar for f64 {
    fn neutral() -> Self {
        0.0
    }

    fn to_continuous(self) -> f64 {
        self
    }

    fn from_continuous(value: f64) -> Self {
        value
    }

    fn offset_by(self, step: f64, bound: Option<f64>) -> Option<Self> {
        Some(offset_continuous(self, step, bound))
    }
}

/// Opaque handle identifying one entry of a
/// [`TranslationMap`](crate::TranslationMap). Covers enumerated and free-text
/// parameter kinds.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Serialize, Deserialize,
)]
#[display(fmt = "#{}", _0)]
pub struct Token(u32);

impl Token {
    pub const fn new(index: u32) -> Token {
        Token(index)
    }

    /// Returns the entry index this token stands for.
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl Scalar for Token {
    fn neutral() -> Self {
        Token(0)
    }

    fn to_continuous(self) -> f64 {
        self.0 as f64
    }

    fn from_continuous(value: f64) -> Self {
        Token(num::clamp(value.round(), 0.0, u32::MAX as f64) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_rounding() {
        assert_eq!(u8::from_continuous(50.4), 50);
        assert_eq!(u8::from_continuous(63.5), 64);
        assert_eq!(u8::from_continuous(-3.0), 0);
        assert_eq!(u8::from_continuous(300.0), 255);
        assert_eq!(i8::from_continuous(-63.5), -64);
    }

    #[test]
    fn bool_embedding() {
        assert_eq!(true.to_continuous(), 1.0);
        assert_eq!(false.to_continuous(), 0.0);
        assert!(bool::from_continuous(0.5));
        assert!(!bool::from_continuous(0.49));
    }

    #[test]
    fn offset_clamps_symmetrically() {
        assert_eq!(10i32.offset_by(5.0, Some(12.0)), Some(12));
        assert_eq!(10i32.offset_by(-30.0, Some(12.0)), Some(-12));
        assert_eq!(10i32.offset_by(5.0, None), Some(15));
        // Zero bound means unclamped.
        assert_eq!(10i32.offset_by(5.0, Some(0.0)), Some(15));
    }

    #[test]
    fn no_arithmetic_kinds() {
        assert_eq!(true.offset_by(1.0, None), None);
        assert_eq!(Token::new(3).offset_by(1.0, None), None);
    }
}
