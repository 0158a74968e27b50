//! # radar-core
//!
//! The deterministic Ring-Decision Engine for technology radars.
//!
//! Raw, possibly incomplete adoption signals go in; risk-capped ring
//! placements with confidence and justification come out.
//!
//! ## Pipeline
//!
//! Per technology, in a fixed order:
//! 1. [`ProfileNormalizer`]: raw metrics → maturity profile
//! 2. [`TrendAnalyzer`]: activity history → momentum and volatility
//! 3. [`RiskAssessor`]: risk signals → risk level and ring ceiling
//! 4. [`OrgContextAdjuster`]: organization → threshold and ceiling shifts
//! 5. [`RingDecider`]: everything above → [`RingDecision`]
//!
//! Then once per run, as a barrier, [`ConsistencyValidator`] checks the
//! whole radar and produces the [`RadarSnapshot`].
//!
//! ## Architectural Constraints
//!
//! - No async, no network, no file I/O
//! - Integer fixed-point arithmetic only (no floats)
//! - `BTreeMap`/`BTreeSet` only, no clocks, no randomness
//! - Same inputs, org context and configuration ⇒ byte-identical output

// =============================================================================
// MODULES
// =============================================================================

pub mod confidence;
pub mod config;
pub mod consistency;
pub mod curve;
pub mod decision;
pub mod engine;
pub mod formats;
pub mod metrics;
pub mod org;
pub mod primitives;
pub mod profile;
pub mod risk;
pub mod stage;
pub mod table;
pub mod trend;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{CeilingBreach, MetricField, Momentum, RadarError, RiskLevel, Ring, Score};

// =============================================================================
// RE-EXPORTS: Pipeline
// =============================================================================

pub use config::{ConsistencyPolicy, EngineConfig, RingThresholds};
pub use consistency::{ConsistencyValidator, ConsistencyWarning, RadarEntry, RadarSnapshot};
pub use decision::{RingDecider, RingDecision};
pub use engine::Engine;
pub use metrics::{ActivityObservation, RawMetricSet, TechnologyInput};
pub use org::{ComplianceTier, OrgAdjustment, OrgContext, OrgContextAdjuster, OrgSize, RiskTolerance};
pub use profile::{ProfileNormalizer, TechnologyProfile};
pub use risk::{RiskAssessment, RiskAssessor};
pub use stage::{RunContext, Stage};
pub use table::{Step, ThresholdTable};
pub use trend::{TrendAnalyzer, TrendAssessment};

// =============================================================================
// RE-EXPORTS: Formats
// =============================================================================

pub use formats::{SnapshotHeader, snapshot_from_bytes, snapshot_to_bytes};

#[cfg(feature = "crypto-hash")]
pub use formats::{snapshot_digest, verify_digest};
