//! # Threshold Tables
//!
//! Ordered boundary lists with associated outcomes.
//!
//! Every cutoff chain in the engine (ring placement, each risk category) is a
//! `ThresholdTable` rather than an if/else ladder, so boundaries are data and
//! can be tested one at a time.
//!
//! A value maps to the outcome of the highest boundary it reaches. Boundaries
//! are inclusive: a value exactly on a boundary takes that boundary's outcome,
//! which is always the higher (more permissive ring / more severe risk) one.

use serde::{Deserialize, Serialize};

/// One boundary: values `>= at_least` map to `outcome`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step<T> {
    pub at_least: u64,
    pub outcome: T,
}

impl<T> Step<T> {
    #[must_use]
    pub const fn new(at_least: u64, outcome: T) -> Self {
        Self { at_least, outcome }
    }
}

/// Ordered boundary list plus the outcome for values below every boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdTable<T> {
    steps: Vec<Step<T>>,
    floor: T,
}

impl<T: Copy> ThresholdTable<T> {
    /// Build a table. Steps are sorted highest boundary first, so callers
    /// may list them in any order; equal boundaries keep their given order.
    #[must_use]
    pub fn new(steps: impl Into<Vec<Step<T>>>, floor: T) -> Self {
        let mut steps = steps.into();
        steps.sort_by(|a, b| b.at_least.cmp(&a.at_least));
        Self { steps, floor }
    }

    /// Outcome for `value`.
    #[must_use]
    pub fn classify(&self, value: u64) -> T {
        self.steps
            .iter()
            .find(|step| value >= step.at_least)
            .map_or(self.floor, |step| step.outcome)
    }

    /// Outcome for values below every boundary.
    #[must_use]
    pub fn floor(&self) -> T {
        self.floor
    }

    /// Boundaries, highest first.
    pub fn boundaries(&self) -> impl Iterator<Item = u64> + '_ {
        self.steps.iter().map(|step| step.at_least)
    }

    /// Distance from `value` to the closest boundary, `None` for an empty table.
    #[must_use]
    pub fn distance_to_nearest(&self, value: u64) -> Option<u64> {
        self.boundaries().map(|b| b.abs_diff(value)).min()
    }

    /// Number of boundaries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the table has no boundaries (everything maps to the floor).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
