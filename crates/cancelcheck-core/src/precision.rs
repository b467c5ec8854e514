//! IEEE-754 precision descriptors and raw exponent extraction.
//!
//! The backend only ever looks at the *stored* (biased) exponent field of a
//! value. Sign and significand are ignored, and subnormals naturally map to a
//! field of zero.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two binary interchange formats the backend intercepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecisionKind {
    /// IEEE-754 binary32 (`f32`)
    Binary32,
    /// IEEE-754 binary64 (`f64`)
    Binary64,
}

impl PrecisionKind {
    /// Name used in option keys and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Binary32 => "binary32",
            Self::Binary64 => "binary64",
        }
    }

    /// Largest value the exponent field can hold (all ones).
    #[must_use]
    pub const fn max_exponent_field(self) -> u32 {
        match self {
            Self::Binary32 => <f32 as Precision>::EXPONENT_MASK as u32,
            Self::Binary64 => <f64 as Precision>::EXPONENT_MASK as u32,
        }
    }
}

impl fmt::Display for PrecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Floating-point semantics the cancellation evaluator is generic over.
pub trait Precision: Copy + Send + Sync + 'static {
    /// Which format this is.
    const KIND: PrecisionKind;

    /// Number of explicitly stored significand bits (integer bit excluded).
    const SIGNIFICAND_BITS: u32;

    /// Mask of the exponent field once shifted down to bit zero.
    const EXPONENT_MASK: u64;

    /// Raw IEEE-754 encoding, widened to 64 bits.
    fn raw_bits(self) -> u64;

    /// Stored (biased) exponent field, not the unbiased exponent.
    #[inline]
    fn exponent_field(self) -> u32 {
        ((self.raw_bits() >> Self::SIGNIFICAND_BITS) & Self::EXPONENT_MASK) as u32
    }
}

impl Precision for f32 {
    const KIND: PrecisionKind = PrecisionKind::Binary32;
    const SIGNIFICAND_BITS: u32 = f32::MANTISSA_DIGITS - 1;
    const EXPONENT_MASK: u64 = 0xff;

    #[inline]
    fn raw_bits(self) -> u64 {
        u64::from(self.to_bits())
    }
}

impl Precision for f64 {
    const KIND: PrecisionKind = PrecisionKind::Binary64;
    const SIGNIFICAND_BITS: u32 = f64::MANTISSA_DIGITS - 1;
    const EXPONENT_MASK: u64 = 0x7ff;

    #[inline]
    fn raw_bits(self) -> u64 {
        self.to_bits()
    }
}

/// Free-function form of [`Precision::exponent_field`].
#[inline]
#[must_use]
pub fn exponent_field<P: Precision>(value: P) -> u32 {
    value.exponent_field()
}
