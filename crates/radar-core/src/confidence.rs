//! # Confidence Module
//!
//! Confidence scoring for ring decisions.
//!
//! - Decisiveness: how far the composite score sits from the nearest ring
//!   cutoff. Far from every cutoff = higher confidence.
//! - Imputation: every imputed input field lowers confidence, even when the
//!   score is decisive.
//! - A trend that was assumed rather than measured costs a further 10%.

use crate::config::RingThresholds;
use crate::primitives::{
    HIGH_CONFIDENCE_THRESHOLD, IMPUTATION_CONFIDENCE_WEIGHT, LOW_CONFIDENCE_THRESHOLD,
    MARGIN_SATURATION, REDUCED_TREND_FACTOR, SCORE_SCALE,
};
use crate::types::Score;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative confidence band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    Low,
    Moderate,
    High,
}

impl ConfidenceBand {
    /// Band of a confidence score. Both thresholds are inclusive upwards.
    #[must_use]
    pub fn of(confidence: Score) -> Self {
        if confidence.basis_points() >= u32::from(HIGH_CONFIDENCE_THRESHOLD) {
            ConfidenceBand::High
        } else if confidence.basis_points() >= u32::from(LOW_CONFIDENCE_THRESHOLD) {
            ConfidenceBand::Moderate
        } else {
            ConfidenceBand::Low
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfidenceBand::Low => "low",
            ConfidenceBand::Moderate => "moderate",
            ConfidenceBand::High => "high",
        })
    }
}

/// Check if a confidence score is below the low-confidence threshold.
#[must_use]
pub fn is_low_confidence(confidence: Score) -> bool {
    ConfidenceBand::of(confidence) == ConfidenceBand::Low
}

/// Distance from `composite` to the nearest cutoff of `thresholds`.
#[must_use]
pub fn threshold_margin(composite: Score, thresholds: &RingThresholds) -> Score {
    thresholds
        .table()
        .distance_to_nearest(u64::from(composite.basis_points()))
        .map_or(Score::ONE, |d| Score::new(d.min(u64::from(SCORE_SCALE)) as u32))
}

/// Compute confidence for a decision.
///
/// Scoring algorithm:
/// - Decisiveness = min(1, margin / 0.05)
/// - Base = 0.5 + decisiveness / 2
/// - Multiplied by (1 - 0.7 × imputed fraction)
/// - Multiplied by 0.9 when the trend was not measured
///
/// All arithmetic is integer basis points.
#[must_use]
pub fn compute_confidence(
    composite: Score,
    thresholds: &RingThresholds,
    imputed_fraction: Score,
    reduced_trend: bool,
) -> Score {
    let margin = threshold_margin(composite, thresholds);
    let decisiveness = Score::from_ratio(
        u64::from(margin.basis_points()),
        u64::from(MARGIN_SATURATION),
    );
    let base = Score::new(SCORE_SCALE / 2 + decisiveness.basis_points() / 2);

    let imputation_factor = SCORE_SCALE - imputed_fraction.weighted(IMPUTATION_CONFIDENCE_WEIGHT);
    let confidence = base.scale(imputation_factor);

    if reduced_trend {
        confidence.scale(REDUCED_TREND_FACTOR)
    } else {
        confidence
    }
}

// =============================================================================
// TESTS
// =============================================================================
