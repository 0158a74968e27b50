//! # API Request/Response Types
//!
//! JSON structures for the HTTP API.

use radar_core::{OrgContext, RadarError, RadarSnapshot, Ring, TechnologyInput};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// EVALUATE REQUEST/RESPONSE
// =============================================================================

/// A radar evaluation request.
///
/// ```json
/// {
///   "org": { "size": "enterprise", "risk_tolerance": "conservative", "compliance": "regulated" },
///   "technologies": {
///     "rust": { "quadrant": "languages", "metrics": { "popularity": 90000 } }
///   }
/// }
/// ```
///
/// A missing `org` means a mid-size, balanced, unregulated organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub org: OrgContext,
    pub technologies: BTreeMap<String, TechnologyInput>,
}

/// Result of a radar evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub success: bool,
    pub snapshot: Option<RadarSnapshot>,
    /// BLAKE3 hex digest of the canonical snapshot bytes.
    pub digest: Option<String>,
    /// Consistency warnings as readable sentences.
    pub warnings: Vec<String>,
    /// Number of technologies per ring, every ring present.
    pub ring_counts: BTreeMap<String, usize>,
    pub error: Option<String>,
}

impl EvaluateResponse {
    pub fn success(snapshot: RadarSnapshot, digest: String) -> Self {
        let warnings = snapshot.warnings.iter().map(ToString::to_string).collect();
        let counts = snapshot.ring_counts();
        let ring_counts = Ring::ALL
            .iter()
            .map(|ring| {
                (
                    ring.name().to_string(),
                    counts.get(ring).copied().unwrap_or(0),
                )
            })
            .collect();

        Self {
            success: true,
            snapshot: Some(snapshot),
            digest: Some(digest),
            warnings,
            ring_counts,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            snapshot: None,
            digest: None,
            warnings: Vec::new(),
            ring_counts: BTreeMap::new(),
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// ERROR KINDS
// =============================================================================

/// Stable machine-readable name of an error, used in logs and CLI JSON output.
pub fn error_kind(err: &RadarError) -> &'static str {
    match err {
        RadarError::InsufficientHistory => "insufficient_history",
        RadarError::MalformedMetric { .. } => "malformed_metric",
        RadarError::InvariantViolation { .. } => "invariant_violation",
        RadarError::InvalidConfig(_) => "invalid_config",
        RadarError::InvalidInput(_) => "invalid_input",
        RadarError::SerializationError(_) => "serialization_error",
        RadarError::DeserializationError(_) => "deserialization_error",
        RadarError::IoError(_) => "io_error",
    }
}
