//! # Consistency Validator
//!
//! The barrier step: runs once over every decision of a run.
//!
//! Soft anomalies become [`ConsistencyWarning`]s attached to the snapshot:
//! - more than the configured fraction of the radar in Adopt,
//! - no Hold at all in a large, risk-diverse radar.
//!
//! A ring above its ceiling is not a warning. It is a defect in the decision
//! stage and blocks the snapshot with [`RadarError::InvariantViolation`].

use crate::config::ConsistencyPolicy;
use crate::decision::RingDecision;
use crate::org::OrgContext;
use crate::primitives::SCORE_SCALE;
use crate::types::{CeilingBreach, RadarError, RiskLevel, Ring, Score};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// =============================================================================
// WARNINGS
// =============================================================================

/// Non-blocking structural anomaly of a radar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyWarning {
    /// Thresholds do not discriminate enough.
    AdoptHeavy {
        adopt: usize,
        total: usize,
        limit: Score,
    },
    /// Risk signals do not seem to be applied.
    NoHold { total: usize, risk_levels: usize },
}

impl fmt::Display for ConsistencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyWarning::AdoptHeavy {
                adopt,
                total,
                limit,
            } => write!(
                f,
                "{} of {} technologies in Adopt exceeds the {} limit; thresholds may not discriminate",
                adopt, total, limit
            ),
            ConsistencyWarning::NoHold { total, risk_levels } => write!(
                f,
                "no technology in Hold across {} technologies with {} distinct risk levels; risk signals may not be applied",
                total, risk_levels
            ),
        }
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// One decided technology, before grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadarEntry {
    pub name: String,
    pub quadrant: String,
    pub decision: RingDecision,
}

/// The validated radar: decisions grouped by quadrant, plus warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadarSnapshot {
    pub org: OrgContext,
    /// quadrant → technology name → decision.
    pub quadrants: BTreeMap<String, BTreeMap<String, RingDecision>>,
    pub warnings: Vec<ConsistencyWarning>,
    /// True when no warning was raised.
    pub is_consistent: bool,
}

impl RadarSnapshot {
    /// Number of technologies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quadrants.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every decision as (quadrant, name, decision), sorted by quadrant then name.
    pub fn decisions(&self) -> impl Iterator<Item = (&str, &str, &RingDecision)> {
        self.quadrants.iter().flat_map(|(quadrant, techs)| {
            techs
                .iter()
                .map(move |(name, decision)| (quadrant.as_str(), name.as_str(), decision))
        })
    }

    /// Decision for `name`, whatever its quadrant.
    #[must_use]
    pub fn decision(&self, name: &str) -> Option<&RingDecision> {
        self.quadrants.values().find_map(|techs| techs.get(name))
    }

    /// How many technologies landed in each ring (all rings present).
    #[must_use]
    pub fn ring_counts(&self) -> BTreeMap<Ring, usize> {
        let mut counts: BTreeMap<Ring, usize> = Ring::ALL.iter().map(|r| (*r, 0)).collect();
        for (_, _, decision) in self.decisions() {
            *counts.entry(decision.ring).or_insert(0) += 1;
        }
        counts
    }
}

// =============================================================================
// VALIDATOR
// =============================================================================

/// Stage 6: aggregate checks over a complete run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyValidator {
    policy: ConsistencyPolicy,
}

impl ConsistencyValidator {
    #[must_use]
    pub fn new(policy: ConsistencyPolicy) -> Self {
        Self { policy }
    }

    /// Validate every decision and build the snapshot.
    ///
    /// # Errors
    ///
    /// - `InvariantViolation` if any ring exceeds its ceiling
    /// - `InvalidInput` if a technology name appears twice
    pub fn validate(
        &self,
        entries: Vec<RadarEntry>,
        org: OrgContext,
    ) -> Result<RadarSnapshot, RadarError> {
        let breaches = ceiling_breaches(&entries);
        if !breaches.is_empty() {
            tracing::error!(
                count = breaches.len(),
                "ring ceiling invariant violated; snapshot blocked"
            );
            return Err(RadarError::InvariantViolation { breaches });
        }

        let warnings = self.check(&entries);
        for warning in &warnings {
            tracing::warn!(%warning, "consistency warning");
        }

        let mut quadrants: BTreeMap<String, BTreeMap<String, RingDecision>> = BTreeMap::new();
        let mut seen = BTreeSet::new();
        for entry in entries {
            if !seen.insert(entry.name.clone()) {
                return Err(RadarError::InvalidInput(format!(
                    "duplicate technology '{}'",
                    entry.name
                )));
            }
            quadrants
                .entry(entry.quadrant)
                .or_default()
                .insert(entry.name, entry.decision);
        }

        Ok(RadarSnapshot {
            org,
            quadrants,
            is_consistent: warnings.is_empty(),
            warnings,
        })
    }

    /// Soft checks only.
    #[must_use]
    pub fn check(&self, entries: &[RadarEntry]) -> Vec<ConsistencyWarning> {
        let mut warnings = Vec::new();
        let total = entries.len();
        if total == 0 {
            return warnings;
        }

        let adopt = entries
            .iter()
            .filter(|e| e.decision.ring == Ring::Adopt)
            .count();
        let limit = self.policy.max_adopt_fraction;
        let adopt_share = (adopt as u128) * u128::from(SCORE_SCALE);
        if adopt_share > (total as u128) * u128::from(limit.basis_points()) {
            warnings.push(ConsistencyWarning::AdoptHeavy {
                adopt,
                total,
                limit,
            });
        }

        let has_hold = entries.iter().any(|e| e.decision.ring == Ring::Hold);
        let risk_levels: BTreeSet<RiskLevel> =
            entries.iter().map(|e| e.decision.risk_level).collect();
        if !has_hold && total >= self.policy.min_hold_check_size && risk_levels.len() >= 2 {
            warnings.push(ConsistencyWarning::NoHold {
                total,
                risk_levels: risk_levels.len(),
            });
        }

        warnings
    }
}

fn ceiling_breaches(entries: &[RadarEntry]) -> Vec<CeilingBreach> {
    entries
        .iter()
        .filter(|e| e.decision.ring > e.decision.ceiling)
        .map(|e| CeilingBreach {
            technology: e.name.clone(),
            ring: e.decision.ring,
            ceiling: e.decision.ceiling,
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Momentum;

    fn decision(ring: Ring, ceiling: Ring, risk_level: RiskLevel) -> RingDecision {
        RingDecision {
            ring,
            proposed: ring,
            ceiling,
            risk_level,
            composite: Score::HALF,
            maturity: Score::HALF,
            momentum: Momentum::Stable,
            confidence: Score::HALF,
            justification: vec!["test".to_string()],
        }
    }

    fn entry(name: &str, ring: Ring, risk_level: RiskLevel) -> RadarEntry {
        RadarEntry {
            name: name.to_string(),
            quadrant: "tools".to_string(),
            decision: decision(ring, Ring::Adopt, risk_level),
        }
    }

    fn validator() -> ConsistencyValidator {
        ConsistencyValidator::new(ConsistencyPolicy::default())
    }

    #[test]
    fn empty_radar_is_consistent() {
        let snapshot = validator()
            .validate(Vec::new(), OrgContext::default())
            .expect("validate");
        assert!(snapshot.is_empty());
        assert!(snapshot.is_consistent);
    }

    #[test]
    fn eight_of_ten_adopt_warns() {
        let mut entries: Vec<RadarEntry> = (0..8)
            .map(|i| entry(&format!("adopt-{}", i), Ring::Adopt, RiskLevel::Low))
            .collect();
        entries.push(entry("trial", Ring::Trial, RiskLevel::Medium));
        entries.push(entry("assess", Ring::Assess, RiskLevel::High));

        let snapshot = validator()
            .validate(entries, OrgContext::default())
            .expect("warnings are not errors");
        assert!(!snapshot.is_consistent);
        assert_eq!(snapshot.len(), 10);
        assert!(snapshot.warnings.contains(&ConsistencyWarning::AdoptHeavy {
            adopt: 8,
            total: 10,
            limit: Score::new(6_000),
        }));
        assert!(snapshot.warnings.contains(&ConsistencyWarning::NoHold {
            total: 10,
            risk_levels: 3,
        }));
    }

    #[test]
    fn adopt_fraction_limit_is_strict() {
        // Exactly 60% does not warn.
        let mut entries: Vec<RadarEntry> = (0..3)
            .map(|i| entry(&format!("a{}", i), Ring::Adopt, RiskLevel::Low))
            .collect();
        entries.push(entry("h0", Ring::Hold, RiskLevel::Critical));
        entries.push(entry("h1", Ring::Hold, RiskLevel::Critical));
        assert!(validator().check(&entries).is_empty());

        entries.pop();
        assert_eq!(validator().check(&entries).len(), 1);
    }

    #[test]
    fn no_hold_needs_size_and_diversity() {
        let small: Vec<RadarEntry> = (0..4)
            .map(|i| entry(&format!("t{}", i), Ring::Trial, RiskLevel::Medium))
            .collect();
        assert!(validator().check(&small).is_empty());

        let uniform: Vec<RadarEntry> = (0..6)
            .map(|i| entry(&format!("t{}", i), Ring::Trial, RiskLevel::Medium))
            .collect();
        assert!(validator().check(&uniform).is_empty());

        let mut diverse = uniform;
        diverse.push(entry("risky", Ring::Assess, RiskLevel::High));
        assert_eq!(
            validator().check(&diverse),
            vec![ConsistencyWarning::NoHold {
                total: 7,
                risk_levels: 2
            }]
        );
    }

    #[test]
    fn ceiling_breach_blocks_snapshot() {
        let entries = vec![
            entry("fine", Ring::Trial, RiskLevel::Low),
            RadarEntry {
                name: "broken".to_string(),
                quadrant: "tools".to_string(),
                decision: decision(Ring::Adopt, Ring::Hold, RiskLevel::Critical),
            },
        ];
        let err = validator()
            .validate(entries, OrgContext::default())
            .expect_err("must block");
        assert!(!err.is_recoverable());
        assert!(matches!(
            &err,
            RadarError::InvariantViolation { breaches }
                if breaches.len() == 1 && breaches[0].technology == "broken"
        ));
        assert!(err.to_string().contains("broken placed in Adopt above ceiling Hold"));
    }

    #[test]
    fn duplicate_names_rejected() {
        let entries = vec![
            entry("same", Ring::Trial, RiskLevel::Low),
            entry("same", Ring::Assess, RiskLevel::Low),
        ];
        assert!(matches!(
            validator().validate(entries, OrgContext::default()),
            Err(RadarError::InvalidInput(_))
        ));
    }

    #[test]
    fn snapshot_groups_by_quadrant() {
        let mut lang = entry("rust", Ring::Adopt, RiskLevel::Low);
        lang.quadrant = "languages".to_string();
        let entries = vec![lang, entry("cargo", Ring::Trial, RiskLevel::Low)];

        let snapshot = validator()
            .validate(entries, OrgContext::default())
            .expect("validate");
        assert_eq!(
            snapshot.quadrants.keys().collect::<Vec<_>>(),
            vec!["languages", "tools"]
        );
        assert_eq!(snapshot.decision("cargo").map(|d| d.ring), Some(Ring::Trial));
        assert_eq!(snapshot.ring_counts()[&Ring::Hold], 0);
        assert_eq!(snapshot.ring_counts()[&Ring::Adopt], 1);
    }
}
