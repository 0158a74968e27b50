//! # Organizational Context
//!
//! Maps organization constraints onto run-wide adjustments:
//! - a threshold shift applied to every ring cutoff,
//! - a ceiling shift of at most one ring in either direction,
//! - a compliance penalty subtracted from the composite score.
//!
//! Compliance dominates risk tolerance: a regulated organization never gets a
//! ceiling above the unadjusted risk ceiling, whatever its tolerance.

use crate::config::RingThresholds;
use crate::risk::RiskAssessment;
use crate::stage::{RunContext, Stage};
use crate::types::{RiskLevel, Ring, Score};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CONTEXT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrgSize {
    Startup,
    #[default]
    Mid,
    Enterprise,
}

impl OrgSize {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            OrgSize::Startup => "startup",
            OrgSize::Mid => "mid",
            OrgSize::Enterprise => "enterprise",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Conservative,
    #[default]
    Balanced,
    Aggressive,
}

impl RiskTolerance {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            RiskTolerance::Conservative => "conservative",
            RiskTolerance::Balanced => "balanced",
            RiskTolerance::Aggressive => "aggressive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceTier {
    #[default]
    Unregulated,
    Elevated,
    Regulated,
}

impl ComplianceTier {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ComplianceTier::Unregulated => "unregulated",
            ComplianceTier::Elevated => "elevated",
            ComplianceTier::Regulated => "regulated",
        }
    }
}

/// The organization a radar is built for. One per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrgContext {
    pub size: OrgSize,
    pub risk_tolerance: RiskTolerance,
    pub compliance: ComplianceTier,
}

impl OrgContext {
    #[must_use]
    pub fn new(size: OrgSize, risk_tolerance: RiskTolerance, compliance: ComplianceTier) -> Self {
        Self {
            size,
            risk_tolerance,
            compliance,
        }
    }
}

impl fmt::Display for OrgContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.risk_tolerance.name(),
            self.size.name(),
            self.compliance.name()
        )
    }
}

// =============================================================================
// ADJUSTMENT
// =============================================================================

/// Run-wide adjustments derived from an [`OrgContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgAdjustment {
    /// Added to every ring cutoff, in basis points.
    pub threshold_shift: i32,
    /// Rings added to (positive) or removed from (negative) the risk ceiling.
    pub ceiling_shift: i8,
    /// Subtracted from the composite score.
    pub compliance_penalty: Score,
    /// Informational strictness indicator.
    pub strictness: Score,
    /// Ceiling may never rise above the unadjusted risk ceiling.
    pub regulated: bool,
}

impl OrgAdjustment {
    /// No shift, no penalty.
    #[must_use]
    pub fn neutral() -> Self {
        OrgContextAdjuster.adjust(&OrgContext::default())
    }

    /// Apply the ceiling shift to a risk assessment's ceiling.
    ///
    /// A critical risk stays at Hold, and a regulated organization can only
    /// lower the ceiling.
    #[must_use]
    pub fn adjusted_ceiling(&self, risk: &RiskAssessment) -> Ring {
        if risk.level == RiskLevel::Critical {
            return Ring::Hold;
        }
        let shift = if self.regulated {
            self.ceiling_shift.min(0)
        } else {
            self.ceiling_shift
        };
        risk.ceiling.shift(shift)
    }

    /// Ring cutoffs after the threshold shift.
    #[must_use]
    pub fn adjusted_thresholds(&self, base: &RingThresholds) -> RingThresholds {
        base.shifted(self.threshold_shift)
    }
}

// =============================================================================
// ADJUSTER
// =============================================================================

/// Stage 4: organization constraints to adjustments.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrgContextAdjuster;

impl OrgContextAdjuster {
    #[must_use]
    pub fn adjust(&self, org: &OrgContext) -> OrgAdjustment {
        let (tolerance_shift, ceiling_shift) = match org.risk_tolerance {
            RiskTolerance::Conservative => (500, -1),
            RiskTolerance::Balanced => (0, 0),
            RiskTolerance::Aggressive => (-500, 1),
        };
        let (size_shift, strictness) = match org.size {
            OrgSize::Startup => (-250, 3_000),
            OrgSize::Mid => (0, 6_000),
            OrgSize::Enterprise => (250, 9_000),
        };
        let compliance_penalty = match org.compliance {
            ComplianceTier::Unregulated => 0,
            ComplianceTier::Elevated => 500,
            ComplianceTier::Regulated => 1_000,
        };

        OrgAdjustment {
            threshold_shift: tolerance_shift + size_shift,
            ceiling_shift,
            compliance_penalty: Score::new(compliance_penalty),
            strictness: Score::new(strictness),
            regulated: org.compliance == ComplianceTier::Regulated,
        }
    }
}

impl Stage for OrgContextAdjuster {
    const NAME: &'static str = "org_context_adjuster";
    type Input<'a> = &'a OrgContext;
    type Output = OrgAdjustment;

    fn run(&self, input: Self::Input<'_>, _ctx: &RunContext) -> Self::Output {
        self.adjust(input)
    }
}

// =============================================================================
// TESTS
// =============================================================================
