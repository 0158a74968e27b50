//! # Engine Configuration
//!
//! Run-level settings with a default for every field, so a partial TOML or
//! JSON document is a valid configuration. Loading from disk belongs to the
//! application; this module only defines and validates the values.

use crate::primitives::{
    DEFAULT_ADOPT_THRESHOLD, DEFAULT_ASSESS_THRESHOLD, DEFAULT_MAX_ADOPT_FRACTION,
    DEFAULT_MAX_CONCURRENCY, DEFAULT_MIN_HOLD_CHECK_SIZE, DEFAULT_REFERENCE_YEAR,
    DEFAULT_TRIAL_THRESHOLD, EARLIEST_RELEASE_YEAR, MAX_CONCURRENCY,
};
use crate::table::{Step, ThresholdTable};
use crate::types::{RadarError, Ring, Score};
use serde::{Deserialize, Serialize};

// =============================================================================
// RING THRESHOLDS
// =============================================================================

/// Composite-score cutoffs for Adopt, Trial and Assess. Below `assess` is Hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingThresholds {
    pub adopt: Score,
    pub trial: Score,
    pub assess: Score,
}

impl Default for RingThresholds {
    fn default() -> Self {
        Self {
            adopt: Score::new(u32::from(DEFAULT_ADOPT_THRESHOLD)),
            trial: Score::new(u32::from(DEFAULT_TRIAL_THRESHOLD)),
            assess: Score::new(u32::from(DEFAULT_ASSESS_THRESHOLD)),
        }
    }
}

impl RingThresholds {
    /// Cutoffs must be strictly descending: adopt > trial > assess.
    pub fn validate(&self) -> Result<(), RadarError> {
        if self.adopt <= self.trial || self.trial <= self.assess {
            return Err(RadarError::InvalidConfig(format!(
                "ring thresholds must be strictly descending, got adopt={} trial={} assess={}",
                self.adopt, self.trial, self.assess
            )));
        }
        Ok(())
    }

    /// Every cutoff moved by `shift` basis points, clipped to [0, 1].
    #[must_use]
    pub fn shifted(&self, shift: i32) -> Self {
        let apply = |s: Score| Score::from_signed(i64::from(s.basis_points()) + i64::from(shift));
        Self {
            adopt: apply(self.adopt),
            trial: apply(self.trial),
            assess: apply(self.assess),
        }
    }

    /// The cutoffs as a ring table (inclusive on the higher ring).
    #[must_use]
    pub fn table(&self) -> ThresholdTable<Ring> {
        ThresholdTable::new(
            [
                Step::new(u64::from(self.adopt.basis_points()), Ring::Adopt),
                Step::new(u64::from(self.trial.basis_points()), Ring::Trial),
                Step::new(u64::from(self.assess.basis_points()), Ring::Assess),
            ],
            Ring::Hold,
        )
    }
}

// =============================================================================
// CONSISTENCY POLICY
// =============================================================================

/// Tunables of the cross-technology consistency checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyPolicy {
    /// Warn when strictly more than this fraction of the radar is in Adopt.
    pub max_adopt_fraction: Score,
    /// The "no Hold" check only applies to radars at least this large.
    pub min_hold_check_size: usize,
}

impl Default for ConsistencyPolicy {
    fn default() -> Self {
        Self {
            max_adopt_fraction: Score::new(u32::from(DEFAULT_MAX_ADOPT_FRACTION)),
            min_hold_check_size: DEFAULT_MIN_HOLD_CHECK_SIZE,
        }
    }
}

// =============================================================================
// ENGINE CONFIG
// =============================================================================

/// Everything the engine needs besides the inputs and the org context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub thresholds: RingThresholds,
    /// Year used for "years since first release".
    pub reference_year: i32,
    /// Maximum number of technologies evaluated simultaneously.
    pub max_concurrency: usize,
    pub consistency: ConsistencyPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: RingThresholds::default(),
            reference_year: DEFAULT_REFERENCE_YEAR,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            consistency: ConsistencyPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Check every field; the first problem found is reported.
    pub fn validate(&self) -> Result<(), RadarError> {
        self.thresholds.validate()?;

        if self.reference_year < EARLIEST_RELEASE_YEAR {
            return Err(RadarError::InvalidConfig(format!(
                "reference_year {} is before {}",
                self.reference_year, EARLIEST_RELEASE_YEAR
            )));
        }

        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY {
            return Err(RadarError::InvalidConfig(format!(
                "max_concurrency must be between 1 and {}, got {}",
                MAX_CONCURRENCY, self.max_concurrency
            )));
        }

        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
