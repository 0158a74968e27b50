//! # Raw Metrics
//!
//! The input contract of the engine: per-technology observations as gathered
//! by an upstream collector, plus the clipping pass that turns them into
//! values the pipeline can trust.
//!
//! Every field is optional. `None` means "unknown" and is never treated as
//! zero; downstream stages impute a conservative value and record that they
//! did so. Counts are signed on input so that negative values can be detected
//! and reported as `MalformedMetric` before being clipped to 0.

use crate::primitives::{EARLIEST_RELEASE_YEAR, LOOKBACK_WINDOW};
use crate::types::{MetricField, RadarError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// INPUT TYPES
// =============================================================================

/// One period of activity (typically a month), oldest first in a history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityObservation {
    pub commits: i64,
    pub releases: i64,
    /// Releases in this period that bumped the major version.
    pub breaking_changes: i64,
}

impl ActivityObservation {
    #[must_use]
    pub const fn new(commits: i64, releases: i64, breaking_changes: i64) -> Self {
        Self {
            commits,
            releases,
            breaking_changes,
        }
    }
}

/// Raw, possibly incomplete metrics for one technology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMetricSet {
    /// Popularity count (e.g. repository stars).
    pub popularity: Option<i64>,
    pub monthly_commits: Option<i64>,
    pub monthly_releases: Option<i64>,
    pub contributors: Option<i64>,
    pub first_release_year: Option<i32>,
    pub enterprise_mentions: Option<i64>,
    pub security_advisories: Option<i64>,
    /// Major version bumps in the most recent period.
    pub breaking_changes: Option<i64>,
    pub pricing_volatility: Option<bool>,
    /// Single-vendor dependency indicator.
    pub vendor_lock_in: Option<bool>,
    /// Time-ordered activity observations, oldest first.
    pub history: Vec<ActivityObservation>,
}

/// A technology as handed to the engine: its quadrant label and metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologyInput {
    /// Quadrant / category label (e.g. "Framework", "Platform").
    pub quadrant: String,
    #[serde(default)]
    pub metrics: RawMetricSet,
}

impl TechnologyInput {
    #[must_use]
    pub fn new(quadrant: impl Into<String>, metrics: RawMetricSet) -> Self {
        Self {
            quadrant: quadrant.into(),
            metrics,
        }
    }
}

// =============================================================================
// SANITIZED VIEW
// =============================================================================

/// An activity observation after clipping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanObservation {
    pub commits: u64,
    pub releases: u64,
    pub breaking_changes: u64,
}

impl CleanObservation {
    /// Activity volume used for momentum comparison.
    #[must_use]
    pub fn activity(&self) -> u64 {
        self.commits.saturating_add(self.releases)
    }
}

/// Metrics clipped into their valid domains.
///
/// Unknown fields stay `None`. Every clipped value is reported in
/// `malformed` as a recoverable `RadarError::MalformedMetric`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedMetrics {
    pub popularity: Option<u64>,
    pub monthly_commits: Option<u64>,
    pub monthly_releases: Option<u64>,
    pub contributors: Option<u64>,
    pub years_since_release: Option<u64>,
    pub enterprise_mentions: Option<u64>,
    pub security_advisories: Option<u64>,
    pub breaking_changes: Option<u64>,
    pub pricing_volatility: Option<bool>,
    pub vendor_lock_in: Option<bool>,
    /// Lookback window of activity, oldest first. Synthesized from the
    /// monthly counts when no explicit history was supplied.
    pub series: Vec<CleanObservation>,
    /// Whether `series` carries real release and breaking-change counts.
    /// False for a synthesized snapshot missing either count.
    pub volatility_observed: bool,
    pub malformed: Vec<RadarError>,
}

impl SanitizedMetrics {
    /// Fields that had no observation and will be imputed.
    #[must_use]
    pub fn imputed_fields(&self) -> BTreeSet<MetricField> {
        let unknown = [
            (MetricField::Popularity, self.popularity.is_none()),
            (MetricField::MonthlyCommits, self.monthly_commits.is_none()),
            (MetricField::MonthlyReleases, self.monthly_releases.is_none()),
            (MetricField::Contributors, self.contributors.is_none()),
            (MetricField::FirstReleaseYear, self.years_since_release.is_none()),
            (MetricField::EnterpriseMentions, self.enterprise_mentions.is_none()),
            (MetricField::SecurityAdvisories, self.security_advisories.is_none()),
            (MetricField::BreakingChanges, self.breaking_changes.is_none()),
            (MetricField::PricingVolatility, self.pricing_volatility.is_none()),
            (MetricField::VendorLockIn, self.vendor_lock_in.is_none()),
            (MetricField::History, self.series.is_empty()),
        ];
        unknown
            .into_iter()
            .filter_map(|(field, missing)| missing.then_some(field))
            .collect()
    }

    /// Fields that were clipped.
    #[must_use]
    pub fn malformed_fields(&self) -> BTreeSet<MetricField> {
        self.malformed
            .iter()
            .filter_map(|err| match err {
                RadarError::MalformedMetric { field, .. } => Some(*field),
                _ => None,
            })
            .collect()
    }
}

impl RawMetricSet {
    /// A metric set where every field is unknown.
    #[must_use]
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Clip every field into its valid domain.
    ///
    /// `reference_year` bounds the first-release year from above; it comes
    /// from the run context, never from a clock.
    #[must_use]
    pub fn sanitize(&self, reference_year: i32) -> SanitizedMetrics {
        let mut malformed = Vec::new();

        let popularity = clip_count(MetricField::Popularity, self.popularity, &mut malformed);
        let monthly_commits =
            clip_count(MetricField::MonthlyCommits, self.monthly_commits, &mut malformed);
        let monthly_releases =
            clip_count(MetricField::MonthlyReleases, self.monthly_releases, &mut malformed);
        let contributors =
            clip_count(MetricField::Contributors, self.contributors, &mut malformed);
        let enterprise_mentions = clip_count(
            MetricField::EnterpriseMentions,
            self.enterprise_mentions,
            &mut malformed,
        );
        let security_advisories = clip_count(
            MetricField::SecurityAdvisories,
            self.security_advisories,
            &mut malformed,
        );
        let breaking_changes =
            clip_count(MetricField::BreakingChanges, self.breaking_changes, &mut malformed);

        let years_since_release = self.first_release_year.map(|year| {
            let earliest = EARLIEST_RELEASE_YEAR.min(reference_year);
            let clipped = year.clamp(earliest, reference_year);
            if clipped != year {
                malformed.push(RadarError::MalformedMetric {
                    field: MetricField::FirstReleaseYear,
                    value: i64::from(year),
                    clipped: i64::from(clipped),
                });
            }
            u64::from(reference_year.abs_diff(clipped))
        });

        let (series, volatility_observed) = if self.history.is_empty() {
            (
                synthesize_snapshot(monthly_commits, monthly_releases, breaking_changes),
                monthly_releases.is_some() && breaking_changes.is_some(),
            )
        } else {
            let start = self.history.len().saturating_sub(LOOKBACK_WINDOW);
            let series = self.history[start..]
                .iter()
                .map(|obs| clean_observation(obs, &mut malformed))
                .collect();
            (series, true)
        };

        SanitizedMetrics {
            popularity,
            monthly_commits,
            monthly_releases,
            contributors,
            years_since_release,
            enterprise_mentions,
            security_advisories,
            breaking_changes,
            pricing_volatility: self.pricing_volatility,
            vendor_lock_in: self.vendor_lock_in,
            series,
            volatility_observed,
            malformed,
        }
    }
}

fn clip_count(
    field: MetricField,
    value: Option<i64>,
    malformed: &mut Vec<RadarError>,
) -> Option<u64> {
    value.map(|raw| {
        if raw < 0 {
            malformed.push(RadarError::MalformedMetric {
                field,
                value: raw,
                clipped: 0,
            });
        }
        raw.max(0) as u64
    })
}

fn clean_observation(obs: &ActivityObservation, malformed: &mut Vec<RadarError>) -> CleanObservation {
    for raw in [obs.commits, obs.releases, obs.breaking_changes] {
        if raw < 0 {
            malformed.push(RadarError::MalformedMetric {
                field: MetricField::History,
                value: raw,
                clipped: 0,
            });
        }
    }
    CleanObservation {
        commits: obs.commits.max(0) as u64,
        releases: obs.releases.max(0) as u64,
        breaking_changes: obs.breaking_changes.max(0) as u64,
    }
}

/// One observation from the monthly counts, or nothing when both activity
/// counts are unknown.
///
/// Release and breaking-change counts are only kept when both are known;
/// otherwise they are left at 0 and the caller marks volatility unobserved.
fn synthesize_snapshot(
    commits: Option<u64>,
    releases: Option<u64>,
    breaking_changes: Option<u64>,
) -> Vec<CleanObservation> {
    if commits.is_none() && releases.is_none() {
        return Vec::new();
    }
    let (releases_seen, breaking_seen) = match (releases, breaking_changes) {
        (Some(r), Some(b)) => (r, b),
        (r, _) => (r.unwrap_or(0), 0),
    };
    vec![CleanObservation {
        commits: commits.unwrap_or(0),
        releases: releases_seen,
        breaking_changes: breaking_seen,
    }]
}

// =============================================================================
// TESTS
// =============================================================================
