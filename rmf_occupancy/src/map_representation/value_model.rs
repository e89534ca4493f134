//! Raw cell value to occupancy probability conversion.
//!
//! Two conventions exist and a grid uses exactly one of them, chosen by the
//! raw element type it was loaded from:
//!
//! | Convention      | Raw type | Probability       | Unknown       |
//! |-----------------|----------|-------------------|---------------|
//! | `UnsignedByte`  | `u8`     | `1 - value / 255` | n/a           |
//! | `SignedPercent` | `i8`     | `value / 100`     | `-1` -> `0.5` |
//!
//! Image-derived maps draw obstacles dark and free space bright, hence the
//! inversion for bytes.

use std::fmt;

use na::{DMatrix, Scalar};

use crate::map_representation::grid_storage::CellBuffer;

/// Probability reported for anything the grid has no information about.
pub const UNKNOWN_PROBABILITY: f64 = 0.5;

/// Sentinel for an unobserved cell under the signed-percent convention.
pub const UNKNOWN_PERCENT: i8 = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueConvention {
    /// Grayscale image bytes, dark is occupied
    UnsignedByte,
    /// Percent occupied with a `-1` unknown sentinel
    SignedPercent,
}

impl fmt::Display for ValueConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueConvention::UnsignedByte => write!(f, "unsigned-byte"),
            ValueConvention::SignedPercent => write!(f, "signed-percent"),
        }
    }
}

pub fn unsigned_byte_probability(value: u8) -> f64 {
    1f64 - value as f64 / u8::MAX as f64
}

pub fn signed_percent_probability(value: i8) -> f64 {
    if value == UNKNOWN_PERCENT {
        UNKNOWN_PROBABILITY
    } else {
        value as f64 / 100f64
    }
}

/// A raw element type a grid can be loaded from.
///
/// The element type alone decides which [`ValueConvention`] the grid uses.
pub trait RawCell: Scalar + Copy + Into<i16> {
    const CONVENTION: ValueConvention;

    fn probability(self) -> f64;

    /// Whether the value is meaningful under this convention
    fn is_representable(self) -> bool {
        true
    }

    fn into_buffer(cells: DMatrix<Self>) -> CellBuffer;
}

impl RawCell for u8 {
    const CONVENTION: ValueConvention = ValueConvention::UnsignedByte;

    fn probability(self) -> f64 {
        unsigned_byte_probability(self)
    }

    fn into_buffer(cells: DMatrix<Self>) -> CellBuffer {
        CellBuffer::UnsignedByte(cells)
    }
}

impl RawCell for i8 {
    const CONVENTION: ValueConvention = ValueConvention::SignedPercent;

    fn probability(self) -> f64 {
        signed_percent_probability(self)
    }

    fn is_representable(self) -> bool {
        self == UNKNOWN_PERCENT || (0..=100).contains(&self)
    }

    fn into_buffer(cells: DMatrix<Self>) -> CellBuffer {
        CellBuffer::SignedPercent(cells)
    }
}
