//! # Snapshot Format
//!
//! Binary serialization for radar snapshots.
//!
//! Format: Header (5 bytes) + postcard-serialized snapshot.
//! - 4 bytes: Magic ("RDAR")
//! - 1 byte: Version
//!
//! Encoding is canonical: every map in a snapshot is a `BTreeMap` and every
//! score is an integer, so identical runs produce identical bytes.
//!
//! Decoding checks the size limit and the header before touching the payload.

use crate::consistency::RadarSnapshot;
use crate::primitives::{FORMAT_VERSION, MAGIC_BYTES};
use crate::types::RadarError;

/// Maximum accepted encoded snapshot size.
pub const MAX_SNAPSHOT_SIZE: usize = 64 * 1024 * 1024; // 64 MB

const HEADER_SIZE: usize = 5;

// =============================================================================
// HEADER
// =============================================================================

/// The header precedes every encoded snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl SnapshotHeader {
    /// Header for the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *MAGIC_BYTES,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), RadarError> {
        if &self.magic != MAGIC_BYTES {
            return Err(RadarError::DeserializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != FORMAT_VERSION {
            return Err(RadarError::DeserializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RadarError> {
        let Some(header) = bytes.get(..HEADER_SIZE) else {
            return Err(RadarError::DeserializationError(
                "Header too short".to_string(),
            ));
        };
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&header[0..4]);
        Ok(Self {
            magic,
            version: header[4],
        })
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encode a snapshot (header + payload).
pub fn snapshot_to_bytes(snapshot: &RadarSnapshot) -> Result<Vec<u8>, RadarError> {
    let payload =
        postcard::to_stdvec(snapshot).map_err(|e| RadarError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_SIZE + payload.len());
    result.extend_from_slice(&SnapshotHeader::new().to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Decode a snapshot.
///
/// Size and header are validated before the payload is parsed.
pub fn snapshot_from_bytes(bytes: &[u8]) -> Result<RadarSnapshot, RadarError> {
    if bytes.len() > MAX_SNAPSHOT_SIZE {
        return Err(RadarError::DeserializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_SIZE
        )));
    }

    let header = SnapshotHeader::from_bytes(bytes)?;
    header.validate()?;

    postcard::from_bytes(&bytes[HEADER_SIZE..]).map_err(|e| {
        RadarError::DeserializationError(format!("Failed to decode snapshot: {}", e))
    })
}

/// BLAKE3 hex digest of the canonical encoding.
///
/// Identical inputs, org context and configuration yield identical digests.
#[cfg(feature = "crypto-hash")]
pub fn snapshot_digest(snapshot: &RadarSnapshot) -> Result<String, RadarError> {
    let bytes = snapshot_to_bytes(snapshot)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

/// Check encoded bytes against an expected digest.
#[cfg(feature = "crypto-hash")]
#[must_use]
pub fn verify_digest(bytes: &[u8], expected: &str) -> bool {
    blake3::hash(bytes).to_hex().as_str() == expected
}

// =============================================================================
// TESTS
// =============================================================================
