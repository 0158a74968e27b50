//! # Evaluation Engine
//!
//! Composes the stages in a fixed order:
//!
//! ```text
//! RawMetricSet ─► sanitize ─► ProfileNormalizer ─┐
//!                          ├► TrendAnalyzer ─────┼► RingDecider ─► (barrier) ConsistencyValidator
//!                          └► RiskAssessor ──────┘        ▲
//! OrgContext ──► OrgContextAdjuster ──────────────────────┘
//! ```
//!
//! Metrics are sanitized once per technology; every stage reads the same
//! clipped view.
//!
//! Technologies are independent, so they are evaluated on a dedicated thread
//! pool whose size is the configured concurrency cap. Results are collected
//! in name order before the consistency barrier, so the snapshot does not
//! depend on scheduling.

use crate::consistency::{ConsistencyValidator, RadarEntry, RadarSnapshot};
use crate::config::EngineConfig;
use crate::decision::{DecisionInputs, RingDecider, RingDecision};
use crate::metrics::{RawMetricSet, TechnologyInput};
use crate::org::{OrgAdjustment, OrgContext, OrgContextAdjuster};
use crate::primitives::{MAX_HISTORY_LENGTH, MAX_LABEL_LENGTH, MAX_TECHNOLOGIES};
use crate::profile::ProfileNormalizer;
use crate::risk::{RiskAssessor, RiskInputs};
use crate::stage::{RunContext, Stage};
use crate::trend::{TrendAnalyzer, TrendAssessment};
use crate::types::RadarError;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// The ring-decision engine.
pub struct Engine {
    config: EngineConfig,
    pool: rayon::ThreadPool,
    normalizer: ProfileNormalizer,
    trend: TrendAnalyzer,
    risk: RiskAssessor,
    adjuster: OrgContextAdjuster,
    decider: RingDecider,
    validator: ConsistencyValidator,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Build an engine after validating `config`.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration is invalid or the worker pool
    /// cannot be created.
    pub fn new(config: EngineConfig) -> Result<Self, RadarError> {
        config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_concurrency)
            .thread_name(|i| format!("radar-eval-{}", i))
            .build()
            .map_err(|e| RadarError::InvalidConfig(format!("worker pool: {}", e)))?;

        Ok(Self {
            config,
            pool,
            normalizer: ProfileNormalizer,
            trend: TrendAnalyzer,
            risk: RiskAssessor::new(),
            adjuster: OrgContextAdjuster,
            decider: RingDecider,
            validator: ConsistencyValidator::new(config.consistency),
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate a whole radar.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the request exceeds the input limits
    /// - `InvariantViolation` if a decision breaks its ceiling (a defect)
    pub fn evaluate(
        &self,
        technologies: &BTreeMap<String, TechnologyInput>,
        org: OrgContext,
    ) -> Result<RadarSnapshot, RadarError> {
        validate_request(technologies)?;

        let ctx = RunContext::new(org, &self.config);
        let adjustment = self.adjuster.run(&ctx.org, &ctx);

        tracing::info!(
            technologies = technologies.len(),
            org = %ctx.org,
            workers = self.config.max_concurrency,
            "evaluating radar"
        );

        let entries: Vec<RadarEntry> = self.pool.install(|| {
            technologies
                .par_iter()
                .map(|(name, input)| RadarEntry {
                    name: name.clone(),
                    quadrant: input.quadrant.clone(),
                    decision: self.decide(name, &input.metrics, &ctx, &adjustment),
                })
                .collect()
        });

        let snapshot = self.validator.validate(entries, org)?;
        tracing::info!(
            technologies = snapshot.len(),
            warnings = snapshot.warnings.len(),
            "radar evaluated"
        );
        Ok(snapshot)
    }

    /// Evaluate one technology outside of a radar (no consistency checks).
    #[must_use]
    pub fn evaluate_technology(&self, metrics: &RawMetricSet, org: OrgContext) -> RingDecision {
        let ctx = RunContext::new(org, &self.config);
        let adjustment = self.adjuster.run(&ctx.org, &ctx);
        self.decide("technology", metrics, &ctx, &adjustment)
    }

    fn decide(
        &self,
        name: &str,
        metrics: &RawMetricSet,
        ctx: &RunContext,
        adjustment: &OrgAdjustment,
    ) -> RingDecision {
        let clean = metrics.sanitize(ctx.reference_year);
        for err in &clean.malformed {
            tracing::warn!(technology = name, error = %err, "malformed metric clipped");
        }

        let profile = self.normalizer.run(&clean, ctx);

        let trend = self.trend.run(&clean, ctx).unwrap_or_else(|err| {
            tracing::warn!(technology = name, error = %err, "using neutral trend");
            TrendAssessment::neutral()
        });

        let risk = self.risk.run(
            RiskInputs {
                metrics: &clean,
                trend: &trend,
            },
            ctx,
        );

        let decision = self.decider.run(
            DecisionInputs {
                profile: &profile,
                trend: &trend,
                risk: &risk,
                adjustment,
            },
            ctx,
        );

        tracing::debug!(
            technology = name,
            ring = %decision.ring,
            ceiling = %decision.ceiling,
            composite = %decision.composite,
            confidence = %decision.confidence,
            "technology evaluated"
        );
        decision
    }
}

/// Check a request against the input limits.
///
/// # Errors
///
/// `InvalidInput` naming the first offending technology.
pub fn validate_request(technologies: &BTreeMap<String, TechnologyInput>) -> Result<(), RadarError> {
    if technologies.len() > MAX_TECHNOLOGIES {
        return Err(RadarError::InvalidInput(format!(
            "{} technologies exceeds the limit of {}",
            technologies.len(),
            MAX_TECHNOLOGIES
        )));
    }

    for (name, input) in technologies {
        check_label("technology name", name)?;
        check_label(&format!("quadrant of '{}'", name), &input.quadrant)?;
        if input.metrics.history.len() > MAX_HISTORY_LENGTH {
            return Err(RadarError::InvalidInput(format!(
                "history of '{}' has {} observations, limit is {}",
                name,
                input.metrics.history.len(),
                MAX_HISTORY_LENGTH
            )));
        }
    }
    Ok(())
}

fn check_label(what: &str, label: &str) -> Result<(), RadarError> {
    if label.trim().is_empty() {
        return Err(RadarError::InvalidInput(format!("{} is empty", what)));
    }
    if label.len() > MAX_LABEL_LENGTH {
        return Err(RadarError::InvalidInput(format!(
            "{} exceeds {} bytes",
            what, MAX_LABEL_LENGTH
        )));
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ActivityObservation;
    use crate::types::Ring;

    fn engine() -> Engine {
        Engine::new(EngineConfig::default()).expect("engine")
    }

    fn strong() -> RawMetricSet {
        RawMetricSet {
            popularity: Some(80_000),
            monthly_commits: Some(600),
            monthly_releases: Some(4),
            contributors: Some(400),
            first_release_year: Some(2012),
            enterprise_mentions: Some(30),
            security_advisories: Some(0),
            breaking_changes: Some(0),
            pricing_volatility: Some(false),
            vendor_lock_in: Some(false),
            history: vec![
                ActivityObservation::new(400, 4, 0),
                ActivityObservation::new(400, 4, 0),
                ActivityObservation::new(500, 5, 0),
                ActivityObservation::new(500, 5, 0),
            ],
        }
    }

    #[test]
    fn invalid_config_rejected() {
        let config = EngineConfig {
            max_concurrency: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            Engine::new(config),
            Err(RadarError::InvalidConfig(_))
        ));
    }

    #[test]
    fn single_technology_evaluation() {
        let decision = engine().evaluate_technology(&strong(), OrgContext::default());
        assert_eq!(decision.ring, Ring::Adopt);
        assert_eq!(decision.momentum, crate::types::Momentum::Rising);
    }

    #[test]
    fn unknown_metrics_still_decided() {
        let mut techs = BTreeMap::new();
        techs.insert(
            "mystery".to_string(),
            TechnologyInput::new("tools", RawMetricSet::unknown()),
        );
        let snapshot = engine()
            .evaluate(&techs, OrgContext::default())
            .expect("evaluate");
        let decision = snapshot.decision("mystery").expect("decision");
        assert!(decision.ring <= Ring::Trial);
        assert!(crate::confidence::is_low_confidence(decision.confidence));
    }

    #[test]
    fn empty_label_rejected() {
        let mut techs = BTreeMap::new();
        techs.insert(" ".to_string(), TechnologyInput::new("tools", strong()));
        assert!(matches!(
            engine().evaluate(&techs, OrgContext::default()),
            Err(RadarError::InvalidInput(_))
        ));

        let mut techs = BTreeMap::new();
        techs.insert("rust".to_string(), TechnologyInput::new("", strong()));
        assert!(validate_request(&techs).is_err());
    }

    #[test]
    fn oversized_history_rejected() {
        let mut metrics = strong();
        metrics.history = vec![ActivityObservation::new(1, 1, 0); MAX_HISTORY_LENGTH + 1];
        let mut techs = BTreeMap::new();
        techs.insert("rust".to_string(), TechnologyInput::new("languages", metrics));
        assert!(validate_request(&techs).is_err());
    }

    #[test]
    fn negative_advisories_clipped_once_and_reported() {
        let metrics = RawMetricSet {
            security_advisories: Some(-2),
            ..strong()
        };
        let decision = engine().evaluate_technology(&metrics, OrgContext::default());
        assert_eq!(decision.risk_level, crate::types::RiskLevel::Low);
        assert_eq!(
            decision
                .justification
                .iter()
                .filter(|l| l.starts_with("clipped fields:"))
                .collect::<Vec<_>>(),
            vec!["clipped fields: security_advisories"]
        );
        assert!(decision.justification.iter().any(|l| l.contains("security low,")));
    }

    #[test]
    fn concurrency_cap_does_not_change_results() {
        let mut techs = BTreeMap::new();
        for i in 0..20 {
            let mut metrics = strong();
            metrics.security_advisories = Some(i % 5);
            metrics.popularity = Some(i * 1_000);
            techs.insert(format!("tech-{:02}", i), TechnologyInput::new("tools", metrics));
        }

        let serial = Engine::new(EngineConfig {
            max_concurrency: 1,
            ..EngineConfig::default()
        })
        .expect("engine")
        .evaluate(&techs, OrgContext::default())
        .expect("evaluate");
        let parallel = Engine::new(EngineConfig {
            max_concurrency: 8,
            ..EngineConfig::default()
        })
        .expect("engine")
        .evaluate(&techs, OrgContext::default())
        .expect("evaluate");

        assert_eq!(serial, parallel);
    }
}
