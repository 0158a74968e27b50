//! # Risk Assessor
//!
//! Computes a risk level and ring ceiling from four independent categories.
//! The overall level is the worst category, never an average.
//!
//! | Category | Signal | Medium | High | Critical | Unknown |
//! |----------|--------|--------|------|----------|---------|
//! | security | advisory count | >= 1 | >= 2 | >= 4 | medium |
//! | instability | breaking ratio | >= 0.30 | >= 0.60 | >= 0.90 | medium |
//! | lock-in | single-vendor flag | set | - | - | low |
//! | cost | pricing volatility flag | set | - | - | low |
//!
//! The breaking ratio is unknown when the trend fell back or when release or
//! breaking-change counts were missing.
//!
//! Boundaries are inclusive, so a value on a boundary takes the more severe
//! level. The ceiling mapping is fixed: critical → Hold, high → Assess,
//! medium → Trial, low → Adopt.

use crate::metrics::SanitizedMetrics;
use crate::stage::{RunContext, Stage};
use crate::table::{Step, ThresholdTable};
use crate::trend::TrendAssessment;
use crate::types::{RiskLevel, Ring};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CATEGORIES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Security,
    Instability,
    LockIn,
    Cost,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 4] = [
        RiskCategory::Security,
        RiskCategory::Instability,
        RiskCategory::LockIn,
        RiskCategory::Cost,
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            RiskCategory::Security => "security",
            RiskCategory::Instability => "instability",
            RiskCategory::LockIn => "lock-in",
            RiskCategory::Cost => "cost",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Risk of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub category: RiskCategory,
    pub level: RiskLevel,
    /// False when the level is a conservative default for a missing signal.
    pub observed: bool,
}

// =============================================================================
// ASSESSMENT
// =============================================================================

/// Overall risk and the ring ceiling it implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    /// One factor per category, in [`RiskCategory::ALL`] order.
    pub factors: Vec<RiskFactor>,
    /// Most permissive ring allowed, before organizational adjustment.
    pub ceiling: Ring,
}

impl RiskAssessment {
    /// Combine category factors: worst level wins.
    #[must_use]
    pub fn from_factors(factors: Vec<RiskFactor>) -> Self {
        let level = factors
            .iter()
            .map(|f| f.level)
            .max()
            .unwrap_or(RiskLevel::Low);
        Self {
            level,
            ceiling: level.ceiling(),
            factors,
        }
    }

    #[must_use]
    pub fn factor(&self, category: RiskCategory) -> Option<&RiskFactor> {
        self.factors.iter().find(|f| f.category == category)
    }

    /// Categories at the overall level (the reasons for the ceiling).
    pub fn drivers(&self) -> impl Iterator<Item = RiskCategory> + '_ {
        self.factors
            .iter()
            .filter(move |f| f.level == self.level)
            .map(|f| f.category)
    }
}

/// Input of the risk stage.
#[derive(Debug, Clone, Copy)]
pub struct RiskInputs<'a> {
    pub metrics: &'a SanitizedMetrics,
    pub trend: &'a TrendAssessment,
}

// =============================================================================
// ASSESSOR
// =============================================================================

/// Stage 3: risk signals to risk level and ceiling.
#[derive(Debug, Clone)]
pub struct RiskAssessor {
    security: ThresholdTable<RiskLevel>,
    instability: ThresholdTable<RiskLevel>,
    flag: ThresholdTable<RiskLevel>,
}

impl Default for RiskAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskAssessor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            security: security_table(),
            instability: instability_table(),
            flag: flag_table(),
        }
    }

    /// Assess one technology from its sanitized metrics.
    #[must_use]
    pub fn assess(&self, metrics: &SanitizedMetrics, trend: &TrendAssessment) -> RiskAssessment {
        let security = match metrics.security_advisories {
            Some(count) => observed(RiskCategory::Security, self.security.classify(count)),
            None => assumed(RiskCategory::Security, RiskLevel::Medium),
        };

        let instability = if trend.fallback || !trend.volatility_observed {
            assumed(RiskCategory::Instability, RiskLevel::Medium)
        } else {
            observed(
                RiskCategory::Instability,
                self.instability
                    .classify(u64::from(trend.breaking_ratio.basis_points())),
            )
        };

        let lock_in = self.flag_factor(RiskCategory::LockIn, metrics.vendor_lock_in);
        let cost = self.flag_factor(RiskCategory::Cost, metrics.pricing_volatility);

        RiskAssessment::from_factors(vec![security, instability, lock_in, cost])
    }

    fn flag_factor(&self, category: RiskCategory, flag: Option<bool>) -> RiskFactor {
        match flag {
            Some(set) => observed(category, self.flag.classify(u64::from(set))),
            None => assumed(category, RiskLevel::Low),
        }
    }
}

impl Stage for RiskAssessor {
    const NAME: &'static str = "risk_assessor";
    type Input<'a> = RiskInputs<'a>;
    type Output = RiskAssessment;

    fn run(&self, input: Self::Input<'_>, _ctx: &RunContext) -> Self::Output {
        self.assess(input.metrics, input.trend)
    }
}

fn observed(category: RiskCategory, level: RiskLevel) -> RiskFactor {
    RiskFactor {
        category,
        level,
        observed: true,
    }
}

fn assumed(category: RiskCategory, level: RiskLevel) -> RiskFactor {
    RiskFactor {
        category,
        level,
        observed: false,
    }
}

// =============================================================================
// TABLES
// =============================================================================

/// Security advisory count.
#[must_use]
pub fn security_table() -> ThresholdTable<RiskLevel> {
    ThresholdTable::new(
        [
            Step::new(4, RiskLevel::Critical),
            Step::new(2, RiskLevel::High),
            Step::new(1, RiskLevel::Medium),
        ],
        RiskLevel::Low,
    )
}

/// Breaking-change ratio in basis points.
#[must_use]
pub fn instability_table() -> ThresholdTable<RiskLevel> {
    ThresholdTable::new(
        [
            Step::new(9_000, RiskLevel::Critical),
            Step::new(6_000, RiskLevel::High),
            Step::new(3_000, RiskLevel::Medium),
        ],
        RiskLevel::Low,
    )
}

/// Boolean indicators (0 / 1).
#[must_use]
pub fn flag_table() -> ThresholdTable<RiskLevel> {
    ThresholdTable::new([Step::new(1, RiskLevel::Medium)], RiskLevel::Low)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{CleanObservation, RawMetricSet};
    use crate::trend::TrendAnalyzer;
    use crate::types::Score;

    fn calm_trend() -> TrendAssessment {
        TrendAnalyzer::assess_series(&[CleanObservation {
            commits: 100,
            releases: 4,
            breaking_changes: 0,
        }])
        .expect("trend")
    }

    fn clean_metrics() -> RawMetricSet {
        RawMetricSet {
            security_advisories: Some(0),
            pricing_volatility: Some(false),
            vendor_lock_in: Some(false),
            ..RawMetricSet::default()
        }
    }

    fn assess(metrics: &RawMetricSet, trend: &TrendAssessment) -> RiskAssessment {
        RiskAssessor::new().assess(&metrics.sanitize(2026), trend)
    }

    #[test]
    fn security_boundaries() {
        let table = security_table();
        assert_eq!(table.classify(0), RiskLevel::Low);
        assert_eq!(table.classify(1), RiskLevel::Medium);
        assert_eq!(table.classify(2), RiskLevel::High);
        assert_eq!(table.classify(3), RiskLevel::High);
        assert_eq!(table.classify(4), RiskLevel::Critical);
        assert_eq!(table.classify(50), RiskLevel::Critical);
    }

    #[test]
    fn instability_boundaries_round_up() {
        let table = instability_table();
        assert_eq!(table.classify(2_999), RiskLevel::Low);
        assert_eq!(table.classify(3_000), RiskLevel::Medium);
        assert_eq!(table.classify(6_000), RiskLevel::High);
        assert_eq!(table.classify(9_000), RiskLevel::Critical);
    }

    #[test]
    fn clean_signals_are_low_risk_adopt_ceiling() {
        let risk = assess(&clean_metrics(), &calm_trend());
        assert_eq!(risk.level, RiskLevel::Low);
        assert_eq!(risk.ceiling, Ring::Adopt);
        assert!(risk.factors.iter().all(|f| f.observed));
    }

    #[test]
    fn critical_security_forces_hold() {
        let metrics = RawMetricSet {
            security_advisories: Some(5),
            ..clean_metrics()
        };
        let risk = assess(&metrics, &calm_trend());
        assert_eq!(risk.level, RiskLevel::Critical);
        assert_eq!(risk.ceiling, Ring::Hold);
        assert_eq!(risk.drivers().collect::<Vec<_>>(), vec![RiskCategory::Security]);
    }

    #[test]
    fn worst_category_wins() {
        let metrics = RawMetricSet {
            vendor_lock_in: Some(true),
            pricing_volatility: Some(true),
            ..clean_metrics()
        };
        let risk = assess(&metrics, &calm_trend());
        assert_eq!(risk.level, RiskLevel::Medium);
        assert_eq!(risk.ceiling, Ring::Trial);
        assert_eq!(
            risk.drivers().collect::<Vec<_>>(),
            vec![RiskCategory::LockIn, RiskCategory::Cost]
        );
    }

    #[test]
    fn breaking_ratio_drives_instability() {
        let trend = TrendAssessment {
            breaking_ratio: Score::new(6_500),
            ..calm_trend()
        };
        let risk = assess(&clean_metrics(), &trend);
        assert_eq!(risk.level, RiskLevel::High);
        assert_eq!(risk.ceiling, Ring::Assess);
    }

    #[test]
    fn unknown_signals_are_conservative() {
        let risk = assess(&RawMetricSet::unknown(), &TrendAssessment::neutral());
        assert_eq!(risk.level, RiskLevel::Medium);
        assert_eq!(risk.ceiling, Ring::Trial);

        let security = risk.factor(RiskCategory::Security).expect("security");
        assert!(!security.observed);
        let cost = risk.factor(RiskCategory::Cost).expect("cost");
        assert_eq!(cost.level, RiskLevel::Low);
    }

    #[test]
    fn negative_advisory_count_clips_to_zero() {
        let metrics = RawMetricSet {
            security_advisories: Some(-3),
            ..clean_metrics()
        };
        let clean = metrics.sanitize(2026);
        assert_eq!(clean.security_advisories, Some(0));
        assert_eq!(clean.malformed.len(), 1);

        let risk = RiskAssessor::new().assess(&clean, &calm_trend());
        assert_eq!(risk.level, RiskLevel::Low);
        let security = risk.factor(RiskCategory::Security).expect("security");
        assert!(security.observed);
    }

    #[test]
    fn unobserved_volatility_is_assumed_medium() {
        let trend = TrendAssessment {
            volatility_observed: false,
            ..calm_trend()
        };
        let risk = assess(&clean_metrics(), &trend);
        let instability = risk.factor(RiskCategory::Instability).expect("instability");
        assert_eq!(instability.level, RiskLevel::Medium);
        assert!(!instability.observed);
        assert_eq!(risk.ceiling, Ring::Trial);
    }

    #[test]
    fn lone_breaking_change_without_release_count_is_not_critical() {
        let metrics = RawMetricSet {
            monthly_commits: Some(120),
            breaking_changes: Some(1),
            ..clean_metrics()
        };
        let clean = metrics.sanitize(2026);
        let trend = TrendAnalyzer.analyze(&clean).expect("trend");
        let risk = RiskAssessor::new().assess(&clean, &trend);

        assert_eq!(risk.level, RiskLevel::Medium);
        assert_eq!(risk.ceiling, Ring::Trial);
        let instability = risk.factor(RiskCategory::Instability).expect("instability");
        assert!(!instability.observed);
    }
}
