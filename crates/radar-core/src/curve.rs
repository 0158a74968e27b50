//! # Normalization Curves
//!
//! Saturating maps from raw counts into [0, 1].
//!
//! - `linear`: `min(x, sat) / sat`
//! - `logarithmic`: `log2(x + 1) / log2(sat + 1)`, capped at 1.0, so that
//!   returns diminish well before the saturation point
//!
//! The logarithm is computed in Q16 fixed point with integer squaring only,
//! which keeps results bit-identical across platforms.

use crate::types::Score;

/// Fractional bits of the fixed-point logarithm.
const LOG_FRACTION_BITS: u32 = 16;

/// Working precision of the mantissa while squaring.
const MANTISSA_BITS: u32 = 32;

/// `log2(x)` in Q16 fixed point. `log2(0)` is defined as 0.
#[must_use]
pub fn log2_fixed(x: u64) -> u64 {
    if x == 0 {
        return 0;
    }

    let integer = u64::from(x.ilog2());
    let one = 1u128 << MANTISSA_BITS;
    let two = one << 1;

    // Mantissa in [1, 2) with MANTISSA_BITS of precision.
    let mut mantissa = (u128::from(x) << MANTISSA_BITS) >> integer;
    let mut fraction = 0u64;

    for bit in (0..LOG_FRACTION_BITS).rev() {
        mantissa = (mantissa * mantissa) >> MANTISSA_BITS;
        if mantissa >= two {
            mantissa >>= 1;
            fraction |= 1 << bit;
        }
    }

    (integer << LOG_FRACTION_BITS) | fraction
}

/// Linear curve capped at `saturation`.
#[must_use]
pub fn linear(value: u64, saturation: u64) -> Score {
    Score::from_ratio(value.min(saturation), saturation)
}

/// Logarithmic curve reaching 1.0 at `saturation`.
#[must_use]
pub fn logarithmic(value: u64, saturation: u64) -> Score {
    let top = log2_fixed(saturation.saturating_add(1));
    Score::from_ratio(log2_fixed(value.saturating_add(1)), top)
}

// =============================================================================
// TESTS
// =============================================================================
