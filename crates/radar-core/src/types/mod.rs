//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the radar engine:
//! - Fixed-point scores (`Score`)
//! - Ordered outcomes (`Ring`, `RiskLevel`, `Momentum`)
//! - Raw metric field identifiers (`MetricField`)
//! - Error types (`RadarError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Clamp instead of overflowing

use crate::primitives::SCORE_SCALE;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// SCORE
// =============================================================================

/// A value in [0,1] stored as basis points (0..=10_000).
///
/// Construction always clamps, so a `Score` can never leave its domain.
/// Deserialization rejects out-of-range values instead of clamping them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u16", into = "u16")]
pub struct Score(u16);

impl Score {
    pub const ZERO: Score = Score(0);
    pub const HALF: Score = Score(5_000);
    pub const ONE: Score = Score(SCORE_SCALE as u16);

    /// Create a score from basis points, clamping to 1.0.
    #[must_use]
    pub const fn new(basis_points: u32) -> Self {
        if basis_points > SCORE_SCALE {
            Self(SCORE_SCALE as u16)
        } else {
            Self(basis_points as u16)
        }
    }

    /// Create a score from a signed basis-point value, clipping to [0, 1].
    #[must_use]
    pub fn from_signed(basis_points: i64) -> Self {
        Self::new(basis_points.clamp(0, i64::from(SCORE_SCALE)) as u32)
    }

    /// `numerator / denominator`, clipped to [0, 1].
    ///
    /// A zero denominator yields 1.0 for a positive numerator and 0.0 otherwise.
    #[must_use]
    pub fn from_ratio(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            return if numerator > 0 { Self::ONE } else { Self::ZERO };
        }
        let bp = u128::from(numerator).saturating_mul(u128::from(SCORE_SCALE))
            / u128::from(denominator);
        Self::new(bp.min(u128::from(SCORE_SCALE)) as u32)
    }

    /// Raw basis points.
    #[must_use]
    pub const fn basis_points(self) -> u32 {
        self.0 as u32
    }

    /// Multiply by a basis-point factor (`factor` of 10_000 is identity).
    #[must_use]
    pub fn scale(self, factor: u32) -> Self {
        Self::new(self.basis_points().saturating_mul(factor.min(SCORE_SCALE)) / SCORE_SCALE)
    }

    /// Contribution of this score under a basis-point weight, in basis points.
    #[must_use]
    pub const fn weighted(self, weight: u32) -> u32 {
        self.basis_points() * weight / SCORE_SCALE
    }

    /// Absolute distance between two scores.
    #[must_use]
    pub const fn distance(self, other: Score) -> Score {
        Self(self.0.abs_diff(other.0))
    }
}

impl TryFrom<u16> for Score {
    type Error = RadarError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if u32::from(value) > SCORE_SCALE {
            return Err(RadarError::InvalidConfig(format!(
                "score {} exceeds {} basis points",
                value, SCORE_SCALE
            )));
        }
        Ok(Self(value))
    }
}

impl From<Score> for u16 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    /// Two decimals, truncated: 7_499 renders as "0.74".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bp = self.basis_points();
        write!(f, "{}.{:02}", bp / SCORE_SCALE, (bp % SCORE_SCALE) / 100)
    }
}

/// Render a signed basis-point shift as "+0.05" / "-0.03" / "0.00".
#[must_use]
pub fn format_shift(basis_points: i32) -> String {
    let magnitude = Score::new(basis_points.unsigned_abs());
    match basis_points.signum() {
        1 => format!("+{}", magnitude),
        -1 => format!("-{}", magnitude),
        _ => magnitude.to_string(),
    }
}

// =============================================================================
// RING
// =============================================================================

/// Radar ring, ordered from least to most recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Ring {
    Hold,
    Assess,
    Trial,
    Adopt,
}

impl Ring {
    /// All rings, least permissive first.
    pub const ALL: [Ring; 4] = [Ring::Hold, Ring::Assess, Ring::Trial, Ring::Adopt];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Ring::Hold => "Hold",
            Ring::Assess => "Assess",
            Ring::Trial => "Trial",
            Ring::Adopt => "Adopt",
        }
    }

    /// Position in [`Ring::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Move `notches` rings towards Adopt (positive) or Hold (negative),
    /// stopping at either end.
    #[must_use]
    pub fn shift(self, notches: i8) -> Ring {
        let target = (self.index() as i64 + i64::from(notches)).clamp(0, 3) as usize;
        Ring::ALL[target]
    }

    /// The more conservative (lower) of two rings.
    #[must_use]
    pub fn more_conservative(self, other: Ring) -> Ring {
        self.min(other)
    }
}

impl fmt::Display for Ring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// RISK LEVEL
// =============================================================================

/// Risk level, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    /// The most permissive ring a technology at this level may receive.
    #[must_use]
    pub fn ceiling(&self) -> Ring {
        match self {
            RiskLevel::Critical => Ring::Hold,
            RiskLevel::High => Ring::Assess,
            RiskLevel::Medium => Ring::Trial,
            RiskLevel::Low => Ring::Adopt,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// MOMENTUM
// =============================================================================

/// Direction of activity over time, ordered declining < stable < rising.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Momentum {
    Declining,
    Stable,
    Rising,
}

impl Momentum {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Momentum::Declining => "declining",
            Momentum::Stable => "stable",
            Momentum::Rising => "rising",
        }
    }

    /// Momentum bonus (-1, 0, +1) scaled into [0, 1].
    #[must_use]
    pub fn contribution(&self) -> Score {
        match self {
            Momentum::Declining => Score::ZERO,
            Momentum::Stable => Score::HALF,
            Momentum::Rising => Score::ONE,
        }
    }
}

impl fmt::Display for Momentum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// METRIC FIELDS
// =============================================================================

/// Identifies one input field of a raw metric set.
///
/// Used to trace sub-scores back to their inputs and to record which
/// fields were imputed or clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    Popularity,
    MonthlyCommits,
    MonthlyReleases,
    Contributors,
    FirstReleaseYear,
    EnterpriseMentions,
    SecurityAdvisories,
    BreakingChanges,
    PricingVolatility,
    VendorLockIn,
    History,
}

impl MetricField {
    /// Every field that counts towards the imputation fraction.
    pub const ALL: [MetricField; 11] = [
        MetricField::Popularity,
        MetricField::MonthlyCommits,
        MetricField::MonthlyReleases,
        MetricField::Contributors,
        MetricField::FirstReleaseYear,
        MetricField::EnterpriseMentions,
        MetricField::SecurityAdvisories,
        MetricField::BreakingChanges,
        MetricField::PricingVolatility,
        MetricField::VendorLockIn,
        MetricField::History,
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            MetricField::Popularity => "popularity",
            MetricField::MonthlyCommits => "monthly_commits",
            MetricField::MonthlyReleases => "monthly_releases",
            MetricField::Contributors => "contributors",
            MetricField::FirstReleaseYear => "first_release_year",
            MetricField::EnterpriseMentions => "enterprise_mentions",
            MetricField::SecurityAdvisories => "security_advisories",
            MetricField::BreakingChanges => "breaking_changes",
            MetricField::PricingVolatility => "pricing_volatility",
            MetricField::VendorLockIn => "vendor_lock_in",
            MetricField::History => "history",
        }
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// INVARIANT BREACH
// =============================================================================

/// A decision whose ring is more permissive than its ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeilingBreach {
    pub technology: String,
    pub ring: Ring,
    pub ceiling: Ring,
}

impl fmt::Display for CeilingBreach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} placed in {} above ceiling {}",
            self.technology, self.ring, self.ceiling
        )
    }
}

fn join_breaches(breaches: &[CeilingBreach]) -> String {
    breaches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the radar engine.
///
/// `InsufficientHistory` and `MalformedMetric` are recoverable: the engine
/// substitutes a neutral trend or a clipped value and keeps going.
/// `InvariantViolation` blocks snapshot production.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RadarError {
    /// No activity observation is available for trend analysis.
    #[error("Insufficient history: no activity observations")]
    InsufficientHistory,

    /// A raw metric was negative or out of range and has been clipped.
    #[error("Malformed metric {field}: {value} clipped to {clipped}")]
    MalformedMetric {
        field: MetricField,
        value: i64,
        clipped: i64,
    },

    /// At least one final ring exceeds its risk ceiling.
    #[error("Ring ceiling invariant violated: {}", join_breaches(.breaches))]
    InvariantViolation { breaches: Vec<CeilingBreach> },

    /// The engine configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The evaluation request is invalid.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl RadarError {
    /// Whether the engine can continue after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RadarError::InsufficientHistory | RadarError::MalformedMetric { .. }
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
