//! # Pipeline Stages
//!
//! The capability interface shared by every evaluation component.
//!
//! Each component (profile normalization, trend analysis, risk assessment,
//! organizational adjustment, ring decision) implements [`Stage`]: a single
//! pure function from its input and the run context to its output. The
//! [`crate::Engine`] composes them in a fixed order; there is no dynamic lookup.
//!
//! [`RunContext`] carries run-level configuration as an immutable value so
//! that no stage reads ambient or global state.

use crate::config::{EngineConfig, RingThresholds};
use crate::org::OrgContext;
use serde::{Deserialize, Serialize};

/// Run-level context threaded through every stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    /// Organization the radar is built for.
    pub org: OrgContext,
    /// Ring cutoffs before organizational adjustment.
    pub thresholds: RingThresholds,
    /// Year used to compute "years since first release".
    pub reference_year: i32,
}

impl RunContext {
    /// Build the context for one run.
    #[must_use]
    pub fn new(org: OrgContext, config: &EngineConfig) -> Self {
        Self {
            org,
            thresholds: config.thresholds,
            reference_year: config.reference_year,
        }
    }
}

/// A pure evaluation step.
///
/// Implementations must be deterministic: the same input and context always
/// produce the same output, with no clocks, randomness or shared mutable state.
pub trait Stage: Send + Sync {
    /// Stable name, used in logs.
    const NAME: &'static str;

    /// Borrowed input.
    type Input<'a>;

    /// Produced value.
    type Output;

    /// Run the stage.
    fn run(&self, input: Self::Input<'_>, ctx: &RunContext) -> Self::Output;
}
