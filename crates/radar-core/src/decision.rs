//! # Ring Decider
//!
//! Combines maturity, momentum and the adjusted risk ceiling into a final
//! ring.
//!
//! ```text
//! composite = 0.5 × maturity + 0.3 × momentum − compliance penalty
//! proposed  = ring table (adjusted thresholds) applied to composite
//! final     = min(proposed, adjusted ceiling)
//! ```
//!
//! Momentum contributes 1 when rising, 0.5 when stable and 0 when declining,
//! so the composite never exceeds 0.80 and Adopt needs rising momentum under
//! the default thresholds. Volatility reaches the ring only through the
//! instability risk ceiling.
//!
//! The justification always names the dominant driver first.

use crate::confidence::{ConfidenceBand, compute_confidence};
use crate::config::RingThresholds;
use crate::org::OrgAdjustment;
use crate::primitives::{MATURITY_WEIGHT, MOMENTUM_WEIGHT};
use crate::profile::TechnologyProfile;
use crate::risk::RiskAssessment;
use crate::stage::{RunContext, Stage};
use crate::trend::TrendAssessment;
use crate::types::{Momentum, RiskLevel, Ring, Score, format_shift};
use serde::{Deserialize, Serialize};

// =============================================================================
// DECISION
// =============================================================================

/// Final placement of one technology. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingDecision {
    /// Final ring: never above `ceiling`.
    pub ring: Ring,
    /// Ring proposed by the composite score alone.
    pub proposed: Ring,
    /// Risk ceiling after organizational adjustment.
    pub ceiling: Ring,
    pub risk_level: RiskLevel,
    pub composite: Score,
    pub maturity: Score,
    pub momentum: Momentum,
    pub confidence: Score,
    /// Ordered reasons, dominant driver first.
    pub justification: Vec<String>,
}

impl RingDecision {
    /// Whether the ceiling lowered the proposed ring.
    #[must_use]
    pub fn is_capped(&self) -> bool {
        self.ring < self.proposed
    }

    #[must_use]
    pub fn confidence_band(&self) -> ConfidenceBand {
        ConfidenceBand::of(self.confidence)
    }
}

/// Input of the decision stage.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInputs<'a> {
    pub profile: &'a TechnologyProfile,
    pub trend: &'a TrendAssessment,
    pub risk: &'a RiskAssessment,
    pub adjustment: &'a OrgAdjustment,
}

/// Composite score, clipped to [0, 1].
///
/// Non-decreasing in maturity and momentum.
#[must_use]
pub fn composite_score(maturity: Score, momentum: Momentum, penalty: Score) -> Score {
    let positive =
        maturity.weighted(MATURITY_WEIGHT) + momentum.contribution().weighted(MOMENTUM_WEIGHT);
    Score::from_signed(i64::from(positive) - i64::from(penalty.basis_points()))
}

// =============================================================================
// DECIDER
// =============================================================================

/// Stage 5: profile, trend, risk and org adjustment to a ring.
#[derive(Debug, Clone, Copy, Default)]
pub struct RingDecider;

impl RingDecider {
    #[must_use]
    pub fn decide(&self, input: DecisionInputs<'_>, ctx: &RunContext) -> RingDecision {
        let DecisionInputs {
            profile,
            trend,
            risk,
            adjustment,
        } = input;

        let thresholds = adjustment.adjusted_thresholds(&ctx.thresholds);
        let table = thresholds.table();
        let ceiling = adjustment.adjusted_ceiling(risk);

        let composite = composite_score(
            profile.maturity(),
            trend.momentum,
            adjustment.compliance_penalty,
        );
        let proposed = table.classify(u64::from(composite.basis_points()));
        let ring = proposed.more_conservative(ceiling);

        let confidence = compute_confidence(
            composite,
            &thresholds,
            profile.imputation().imputed_fraction(),
            trend.reduced_confidence,
        );

        let explain = Explanation {
            profile,
            trend,
            risk,
            adjustment,
            ctx,
            thresholds: &thresholds,
            composite,
            proposed,
            ceiling,
            ring,
            confidence,
        };

        RingDecision {
            ring,
            proposed,
            ceiling,
            risk_level: risk.level,
            composite,
            maturity: profile.maturity(),
            momentum: trend.momentum,
            confidence,
            justification: explain.lines(),
        }
    }
}

impl Stage for RingDecider {
    const NAME: &'static str = "ring_decider";
    type Input<'a> = DecisionInputs<'a>;
    type Output = RingDecision;

    fn run(&self, input: Self::Input<'_>, ctx: &RunContext) -> Self::Output {
        self.decide(input, ctx)
    }
}

// =============================================================================
// JUSTIFICATION
// =============================================================================

struct Explanation<'a> {
    profile: &'a TechnologyProfile,
    trend: &'a TrendAssessment,
    risk: &'a RiskAssessment,
    adjustment: &'a OrgAdjustment,
    ctx: &'a RunContext,
    thresholds: &'a RingThresholds,
    composite: Score,
    proposed: Ring,
    ceiling: Ring,
    ring: Ring,
    confidence: Score,
}

impl Explanation<'_> {
    fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.dominant_driver()];

        lines.push(format!(
            "composite score {} against thresholds adopt {} / trial {} / assess {} (org shift {})",
            self.composite,
            self.thresholds.adopt,
            self.thresholds.trial,
            self.thresholds.assess,
            format_shift(self.adjustment.threshold_shift),
        ));
        lines.push(self.momentum_line());
        lines.push(self.volatility_line());
        lines.push(self.risk_line());
        lines.push(format!(
            "ceiling {} (risk ceiling {}, org {}, strictness {})",
            self.ceiling, self.risk.ceiling, self.ctx.org, self.adjustment.strictness
        ));

        let imputation = self.profile.imputation();
        if !imputation.imputed.is_empty() {
            lines.push(format!(
                "imputed fields: {}",
                join_names(imputation.imputed.iter().map(|f| f.name()))
            ));
        }
        if !imputation.malformed.is_empty() {
            lines.push(format!(
                "clipped fields: {}",
                join_names(imputation.malformed.iter().map(|f| f.name()))
            ));
        }

        lines.push(format!(
            "confidence {} ({})",
            self.confidence,
            ConfidenceBand::of(self.confidence)
        ));
        lines
    }

    fn dominant_driver(&self) -> String {
        if self.ring < self.proposed {
            return format!(
                "capped by risk ceiling {} (risk {}: {}); score alone proposed {}",
                self.ceiling,
                self.risk.level,
                join_names(self.risk.drivers().map(|c| c.name())),
                self.proposed
            );
        }

        let penalty = self.adjustment.compliance_penalty;
        if penalty > Score::ZERO {
            let unpenalized =
                composite_score(self.profile.maturity(), self.trend.momentum, Score::ZERO);
            if self.classify(unpenalized) > self.proposed {
                return format!(
                    "lowered by compliance penalty of {} ({})",
                    penalty,
                    self.ctx.org.compliance.name()
                );
            }
        }

        if self.trend.momentum != Momentum::Stable {
            let steady = composite_score(self.profile.maturity(), Momentum::Stable, penalty);
            if self.classify(steady) != self.proposed {
                return format!("driven by {} momentum", self.trend.momentum);
            }
        }

        format!(
            "driven by maturity score of {} (strongest component: {})",
            self.profile.maturity(),
            self.profile.strongest_component().name()
        )
    }

    fn classify(&self, composite: Score) -> Ring {
        self.thresholds
            .table()
            .classify(u64::from(composite.basis_points()))
    }

    fn momentum_line(&self) -> String {
        if self.trend.fallback {
            "momentum assumed stable: insufficient history".to_string()
        } else if self.trend.reduced_confidence {
            format!(
                "momentum {} from a single observation (reduced confidence)",
                self.trend.momentum
            )
        } else {
            format!(
                "momentum {} over {} observations",
                self.trend.momentum, self.trend.observations
            )
        }
    }

    fn volatility_line(&self) -> String {
        if self.trend.volatility_observed {
            format!(
                "volatility {} (breaking-change ratio {})",
                self.trend.volatility, self.trend.breaking_ratio
            )
        } else {
            "volatility unknown: no release and breaking-change counts".to_string()
        }
    }

    fn risk_line(&self) -> String {
        let factors = self.risk.factors.iter().map(|f| {
            if f.observed {
                format!("{} {}", f.category, f.level)
            } else {
                format!("{} {} (assumed)", f.category, f.level)
            }
        });
        format!("risk {}: {}", self.risk.level, factors.collect::<Vec<_>>().join(", "))
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

// =============================================================================
// TESTS
// =============================================================================
