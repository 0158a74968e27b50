//! # Trend Analyzer
//!
//! Classifies momentum and volatility from the activity series.
//!
//! - Momentum compares the recent window (last ⌊n/2⌋ observations) with the
//!   baseline (the earlier ones). Rising when the recent rate clears the
//!   baseline by `MOMENTUM_MARGIN`, declining when it falls short by the same
//!   margin, stable otherwise.
//! - Volatility is the breaking-change ratio over the lookback window times
//!   `VOLATILITY_GAIN`, saturating at 1.0.
//!
//! A single observation yields `stable` with reduced confidence. No
//! observation at all is `InsufficientHistory`; callers fall back to
//! [`TrendAssessment::neutral`].
//!
//! When the series was synthesized from monthly counts that lack either the
//! release or the breaking-change count, the ratio has no basis: volatility
//! is reported as unobserved rather than zero.

use crate::metrics::{CleanObservation, SanitizedMetrics};
use crate::primitives::{MOMENTUM_MARGIN, SCORE_SCALE, VOLATILITY_GAIN};
use crate::stage::{RunContext, Stage};
use crate::types::{Momentum, RadarError, Score};
use serde::{Deserialize, Serialize};

/// Result of trend analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendAssessment {
    pub momentum: Momentum,
    /// 0 = no breaking changes, 1 = every other release (or more) breaking.
    pub volatility: Score,
    /// Breaking changes / releases over the lookback window.
    pub breaking_ratio: Score,
    /// Number of observations analyzed.
    pub observations: usize,
    /// Momentum could not be measured and was assumed.
    pub reduced_confidence: bool,
    /// Produced by the neutral fallback rather than from data.
    pub fallback: bool,
    /// False when release or breaking-change counts were unknown, so
    /// `volatility` and `breaking_ratio` carry no information.
    pub volatility_observed: bool,
}

impl TrendAssessment {
    /// Neutral stand-in when there is no history: stable, low volatility,
    /// reduced confidence.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            momentum: Momentum::Stable,
            volatility: Score::ZERO,
            breaking_ratio: Score::ZERO,
            observations: 0,
            reduced_confidence: true,
            fallback: true,
            volatility_observed: false,
        }
    }
}

/// Stage 2: activity series to trend.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendAnalyzer;

impl TrendAnalyzer {
    /// Analyze the lookback window of already sanitized metrics.
    pub fn analyze(&self, clean: &SanitizedMetrics) -> Result<TrendAssessment, RadarError> {
        let trend = Self::assess_series(&clean.series)?;
        if clean.volatility_observed {
            return Ok(trend);
        }
        Ok(TrendAssessment {
            volatility: Score::ZERO,
            breaking_ratio: Score::ZERO,
            volatility_observed: false,
            ..trend
        })
    }

    /// Analyze an already-clipped series, oldest first.
    pub fn assess_series(series: &[CleanObservation]) -> Result<TrendAssessment, RadarError> {
        if series.is_empty() {
            return Err(RadarError::InsufficientHistory);
        }

        let breaking: u64 = series.iter().map(|o| o.breaking_changes).sum();
        let releases: u64 = series.iter().map(|o| o.releases).sum();
        let breaking_ratio = Score::from_ratio(breaking, releases);
        let volatility = Score::new(breaking_ratio.basis_points().saturating_mul(VOLATILITY_GAIN));

        let (momentum, reduced_confidence) = if series.len() == 1 {
            (Momentum::Stable, true)
        } else {
            (classify_momentum(series), false)
        };

        Ok(TrendAssessment {
            momentum,
            volatility,
            breaking_ratio,
            observations: series.len(),
            reduced_confidence,
            fallback: false,
            volatility_observed: true,
        })
    }
}

impl Stage for TrendAnalyzer {
    const NAME: &'static str = "trend_analyzer";
    type Input<'a> = &'a SanitizedMetrics;
    type Output = Result<TrendAssessment, RadarError>;

    fn run(&self, input: Self::Input<'_>, _ctx: &RunContext) -> Self::Output {
        self.analyze(input)
    }
}

/// Compare recent and baseline average activity. Requires `series.len() >= 2`.
fn classify_momentum(series: &[CleanObservation]) -> Momentum {
    let recent_len = series.len() / 2;
    let (baseline, recent) = series.split_at(series.len() - recent_len);

    let recent_sum: u128 = recent.iter().map(|o| u128::from(o.activity())).sum();
    let baseline_sum: u128 = baseline.iter().map(|o| u128::from(o.activity())).sum();

    // Cross-multiplied averages: recent_sum / recent_len vs baseline_sum / baseline_len.
    let recent_rate = recent_sum * baseline.len() as u128 * u128::from(SCORE_SCALE);
    let baseline_rate = baseline_sum * recent.len() as u128 * u128::from(SCORE_SCALE);
    let margin = baseline_sum * recent.len() as u128 * u128::from(MOMENTUM_MARGIN);

    if recent_rate > baseline_rate && recent_rate - baseline_rate >= margin {
        Momentum::Rising
    } else if recent_rate < baseline_rate && baseline_rate - recent_rate >= margin {
        Momentum::Declining
    } else {
        Momentum::Stable
    }
}

// =============================================================================
// TESTS
// =============================================================================
