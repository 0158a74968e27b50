//! # Engine Primitives
//!
//! Hardcoded constants for the radar engine.
//!
//! Every fractional quantity is expressed in basis points: `SCORE_SCALE`
//! (10_000) is 1.0, 7_500 is 0.75. These values are compiled into the binary;
//! only the ring thresholds, reference year, concurrency cap and consistency
//! policy are configurable (see [`crate::config::EngineConfig`]).

/// Fixed-point scale for all scores. 10_000 basis points = 1.0.
pub const SCORE_SCALE: u32 = 10_000;

// =============================================================================
// NORMALIZATION CURVES
// =============================================================================

/// Popularity (stars) at which the logarithmic curve saturates.
pub const POPULARITY_SATURATION: u64 = 50_000;

/// Monthly commits at which the logarithmic curve saturates.
pub const COMMIT_SATURATION: u64 = 400;

/// Monthly releases at which the linear curve saturates.
pub const RELEASE_SATURATION: u64 = 4;

/// Contributors at which the linear curve saturates.
pub const CONTRIBUTOR_SATURATION: u64 = 200;

/// Enterprise mentions at which the linear curve saturates.
pub const ENTERPRISE_SATURATION: u64 = 20;

/// Years since first release at which the age curve saturates.
pub const AGE_SATURATION_YEARS: u64 = 10;

/// Normalized value used for a missing field: the lower quartile of [0,1].
pub const IMPUTED_VALUE: u32 = 2_500;

/// Earliest first-release year accepted before clipping.
pub const EARLIEST_RELEASE_YEAR: i32 = 1950;

// =============================================================================
// MATURITY WEIGHTS (sum to SCORE_SCALE)
// =============================================================================

pub const AGE_WEIGHT: u32 = 2_000;
pub const ACTIVITY_WEIGHT: u32 = 2_500;
pub const COMMUNITY_WEIGHT: u32 = 2_500;
pub const ADOPTION_WEIGHT: u32 = 3_000;

/// Share of commits inside the activity sub-score (releases take the rest).
pub const COMMIT_SHARE: u32 = 6_000;

/// Share of contributors inside the community sub-score (enterprise mentions take the rest).
pub const CONTRIBUTOR_SHARE: u32 = 5_000;

// =============================================================================
// TREND
// =============================================================================

/// Relative margin the recent window must clear to count as rising or declining.
pub const MOMENTUM_MARGIN: u32 = 2_000;

/// Number of most recent observations kept for trend analysis.
pub const LOOKBACK_WINDOW: usize = 12;

/// Volatility = breaking ratio * gain, saturating at 1.0.
pub const VOLATILITY_GAIN: u32 = 2;

// =============================================================================
// COMPOSITE SCORE
// =============================================================================

pub const MATURITY_WEIGHT: u32 = 5_000;
pub const MOMENTUM_WEIGHT: u32 = 3_000;

/// Default score cutoffs, highest ring first.
pub const DEFAULT_ADOPT_THRESHOLD: u16 = 7_500;
pub const DEFAULT_TRIAL_THRESHOLD: u16 = 5_000;
pub const DEFAULT_ASSESS_THRESHOLD: u16 = 3_000;

// =============================================================================
// CONFIDENCE
// =============================================================================

/// Threshold margin at which the score is considered fully decisive.
///
/// The composite tops out at `MATURITY_WEIGHT + MOMENTUM_WEIGHT` (0.80), so
/// an Adopt placement is never more than 0.05 above the default cutoff.
pub const MARGIN_SATURATION: u32 = 500;

/// Confidence lost when every input field is imputed.
pub const IMPUTATION_CONFIDENCE_WEIGHT: u32 = 7_000;

/// Confidence multiplier applied when the trend carries reduced confidence.
pub const REDUCED_TREND_FACTOR: u32 = 9_000;

/// Decisions below this confidence are "low confidence".
pub const LOW_CONFIDENCE_THRESHOLD: u16 = 4_000;

/// Decisions at or above this confidence are "high confidence".
pub const HIGH_CONFIDENCE_THRESHOLD: u16 = 7_000;

// =============================================================================
// RUN DEFAULTS
// =============================================================================

/// Reference year used for "years since first release".
pub const DEFAULT_REFERENCE_YEAR: i32 = 2026;

/// Default number of simultaneous in-flight evaluations.
pub const DEFAULT_MAX_CONCURRENCY: usize = 3;

/// Default maximum fraction of technologies in Adopt before warning.
pub const DEFAULT_MAX_ADOPT_FRACTION: u16 = 6_000;

/// Default minimum radar size before an empty Hold ring is flagged.
pub const DEFAULT_MIN_HOLD_CHECK_SIZE: usize = 5;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum number of technologies in a single run.
pub const MAX_TECHNOLOGIES: usize = 10_000;

/// Maximum length for technology names and quadrant labels.
pub const MAX_LABEL_LENGTH: usize = 256;

/// Maximum number of activity observations accepted per technology.
pub const MAX_HISTORY_LENGTH: usize = 1_000;

/// Upper bound on the concurrency cap.
pub const MAX_CONCURRENCY: usize = 256;

// =============================================================================
// BINARY FORMAT
// =============================================================================

/// Magic bytes for the binary snapshot header.
pub const MAGIC_BYTES: &[u8; 4] = b"RDAR";

/// Current snapshot format version.
pub const FORMAT_VERSION: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maturity_weights_sum_to_one() {
        assert_eq!(
            AGE_WEIGHT + ACTIVITY_WEIGHT + COMMUNITY_WEIGHT + ADOPTION_WEIGHT,
            SCORE_SCALE
        );
    }

    #[test]
    fn composite_ceiling_clears_adopt_by_margin_saturation() {
        let max_composite = MATURITY_WEIGHT + MOMENTUM_WEIGHT;
        assert_eq!(max_composite, 8_000);
        assert_eq!(
            max_composite - u32::from(DEFAULT_ADOPT_THRESHOLD),
            MARGIN_SATURATION
        );
    }

    #[test]
    fn default_thresholds_descend() {
        assert!(DEFAULT_ADOPT_THRESHOLD > DEFAULT_TRIAL_THRESHOLD);
        assert!(DEFAULT_TRIAL_THRESHOLD > DEFAULT_ASSESS_THRESHOLD);
    }

    #[test]
    fn magic_bytes_correct() {
        assert_eq!(MAGIC_BYTES, b"RDAR");
    }
}
