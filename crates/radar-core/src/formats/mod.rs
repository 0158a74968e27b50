//! # Formats
//!
//! Canonical binary encoding of radar snapshots.
//! Pure transformations only; file I/O lives in the app layer.

pub mod snapshot;

pub use snapshot::{SnapshotHeader, snapshot_from_bytes, snapshot_to_bytes};

#[cfg(feature = "crypto-hash")]
pub use snapshot::{snapshot_digest, verify_digest};
