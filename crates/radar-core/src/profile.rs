//! # Profile Normalizer
//!
//! Converts a raw metric set into a [`TechnologyProfile`]: four sub-scores in
//! [0, 1] and a weighted maturity score.
//!
//! | Sub-score | Inputs | Curve |
//! |-----------|--------|-------|
//! | age | first release year | linear, 10 years |
//! | activity | monthly commits (60%), monthly releases (40%) | log 400 / linear 4 |
//! | community | contributors (50%), enterprise mentions (50%) | linear 200 / linear 20 |
//! | adoption | popularity | log 50 000 |
//!
//! Missing inputs are imputed at the lower quartile (0.25), never zero, and
//! the profile records which fields were imputed or clipped.

use crate::curve::{linear, logarithmic};
use crate::metrics::SanitizedMetrics;
use crate::primitives::{
    ACTIVITY_WEIGHT, ADOPTION_WEIGHT, AGE_SATURATION_YEARS, AGE_WEIGHT, COMMIT_SATURATION,
    COMMIT_SHARE, COMMUNITY_WEIGHT, CONTRIBUTOR_SATURATION, CONTRIBUTOR_SHARE,
    ENTERPRISE_SATURATION, IMPUTED_VALUE, POPULARITY_SATURATION, RELEASE_SATURATION, SCORE_SCALE,
};
use crate::stage::{RunContext, Stage};
use crate::types::{MetricField, Score};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// COMPONENTS
// =============================================================================

/// The four maturity components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Age,
    Activity,
    Community,
    Adoption,
}

impl Component {
    pub const ALL: [Component; 4] = [
        Component::Age,
        Component::Activity,
        Component::Community,
        Component::Adoption,
    ];

    /// Fixed weight in the maturity score (weights sum to 1.0).
    #[must_use]
    pub fn weight(&self) -> u32 {
        match self {
            Component::Age => AGE_WEIGHT,
            Component::Activity => ACTIVITY_WEIGHT,
            Component::Community => COMMUNITY_WEIGHT,
            Component::Adoption => ADOPTION_WEIGHT,
        }
    }

    /// Raw fields this component is computed from.
    #[must_use]
    pub fn sources(&self) -> &'static [MetricField] {
        match self {
            Component::Age => &[MetricField::FirstReleaseYear],
            Component::Activity => &[MetricField::MonthlyCommits, MetricField::MonthlyReleases],
            Component::Community => &[MetricField::Contributors, MetricField::EnterpriseMentions],
            Component::Adoption => &[MetricField::Popularity],
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Component::Age => "age",
            Component::Activity => "activity",
            Component::Community => "community",
            Component::Adoption => "adoption",
        }
    }
}

/// Normalized sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScores {
    pub age: Score,
    pub activity: Score,
    pub community: Score,
    pub adoption: Score,
}

impl SubScores {
    #[must_use]
    pub fn get(&self, component: Component) -> Score {
        match component {
            Component::Age => self.age,
            Component::Activity => self.activity,
            Component::Community => self.community,
            Component::Adoption => self.adoption,
        }
    }

    /// Weighted sum of the sub-scores, always within [0, 1].
    #[must_use]
    pub fn maturity(&self) -> Score {
        let total: u32 = Component::ALL
            .iter()
            .map(|c| self.get(*c).weighted(c.weight()))
            .sum();
        Score::new(total)
    }
}

// =============================================================================
// IMPUTATION RECORD
// =============================================================================

/// Which inputs were observed, imputed or clipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImputationRecord {
    /// Fields with no observation.
    pub imputed: BTreeSet<MetricField>,
    /// Fields that were present but out of range.
    pub malformed: BTreeSet<MetricField>,
}

impl ImputationRecord {
    #[must_use]
    pub fn from_sanitized(clean: &SanitizedMetrics) -> Self {
        Self {
            imputed: clean.imputed_fields(),
            malformed: clean.malformed_fields(),
        }
    }

    /// Share of input fields that were imputed.
    #[must_use]
    pub fn imputed_fraction(&self) -> Score {
        Score::from_ratio(self.imputed.len() as u64, MetricField::ALL.len() as u64)
    }

    #[must_use]
    pub fn is_imputed(&self, field: MetricField) -> bool {
        self.imputed.contains(&field)
    }

    /// Whether there was no activity history at all.
    #[must_use]
    pub fn history_missing(&self) -> bool {
        self.is_imputed(MetricField::History)
    }
}

// =============================================================================
// TECHNOLOGY PROFILE
// =============================================================================

/// Normalized view of one technology. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologyProfile {
    maturity: Score,
    sub_scores: SubScores,
    imputation: ImputationRecord,
}

impl TechnologyProfile {
    /// Build a profile; maturity is derived from the sub-scores.
    #[must_use]
    pub fn new(sub_scores: SubScores, imputation: ImputationRecord) -> Self {
        Self {
            maturity: sub_scores.maturity(),
            sub_scores,
            imputation,
        }
    }

    #[must_use]
    pub fn maturity(&self) -> Score {
        self.maturity
    }

    #[must_use]
    pub fn sub_scores(&self) -> &SubScores {
        &self.sub_scores
    }

    #[must_use]
    pub fn imputation(&self) -> &ImputationRecord {
        &self.imputation
    }

    /// Component contributing the most weighted score.
    #[must_use]
    pub fn strongest_component(&self) -> Component {
        Component::ALL
            .iter()
            .copied()
            .max_by_key(|c| (self.sub_scores.get(*c).weighted(c.weight()), std::cmp::Reverse(*c)))
            .unwrap_or(Component::Adoption)
    }
}

// =============================================================================
// NORMALIZER
// =============================================================================

/// Stage 1: raw metrics to profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileNormalizer;

impl ProfileNormalizer {
    /// Normalize already sanitized metrics.
    #[must_use]
    pub fn normalize(&self, clean: &SanitizedMetrics) -> TechnologyProfile {
        TechnologyProfile::new(
            Self::sub_scores(clean),
            ImputationRecord::from_sanitized(clean),
        )
    }

    fn sub_scores(clean: &SanitizedMetrics) -> SubScores {
        let age = observed_or_imputed(clean.years_since_release, |years| {
            linear(years, AGE_SATURATION_YEARS)
        });

        let commits = observed_or_imputed(clean.monthly_commits, |n| {
            logarithmic(n, COMMIT_SATURATION)
        });
        let releases = observed_or_imputed(clean.monthly_releases, |n| {
            linear(n, RELEASE_SATURATION)
        });

        let contributors = observed_or_imputed(clean.contributors, |n| {
            linear(n, CONTRIBUTOR_SATURATION)
        });
        let enterprise = observed_or_imputed(clean.enterprise_mentions, |n| {
            linear(n, ENTERPRISE_SATURATION)
        });

        let adoption = observed_or_imputed(clean.popularity, |n| {
            logarithmic(n, POPULARITY_SATURATION)
        });

        SubScores {
            age,
            activity: blend(commits, releases, COMMIT_SHARE),
            community: blend(contributors, enterprise, CONTRIBUTOR_SHARE),
            adoption,
        }
    }
}

impl Stage for ProfileNormalizer {
    const NAME: &'static str = "profile_normalizer";
    type Input<'a> = &'a SanitizedMetrics;
    type Output = TechnologyProfile;

    fn run(&self, input: Self::Input<'_>, _ctx: &RunContext) -> Self::Output {
        self.normalize(input)
    }
}

fn observed_or_imputed(value: Option<u64>, curve: impl Fn(u64) -> Score) -> Score {
    value.map_or(Score::new(IMPUTED_VALUE), curve)
}

/// `first * share + second * (1 - share)`.
fn blend(first: Score, second: Score, share: u32) -> Score {
    Score::new(first.weighted(share) + second.weighted(SCORE_SCALE - share))
}

// =============================================================================
// TESTS
// =============================================================================
