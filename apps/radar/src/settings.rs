//! # Settings
//!
//! Loads [`EngineConfig`] from an optional TOML file and reads input files
//! with size and path checks.
//!
//! ```toml
//! reference_year = 2026
//! max_concurrency = 4
//!
//! [thresholds]
//! adopt = 7500
//! trial = 5000
//! assess = 3000
//!
//! [consistency]
//! max_adopt_fraction = 6000
//! min_hold_check_size = 5
//! ```
//!
//! Scores are basis points (7500 = 0.75). Missing keys keep their defaults.

use radar_core::{EngineConfig, RadarError};
use std::path::{Path, PathBuf};

/// Maximum size of a configuration file (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Load and validate the engine configuration.
///
/// `None` yields the defaults.
pub fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig, RadarError> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };

    let bytes = read_file_limited(path, MAX_CONFIG_FILE_SIZE)?;
    let text = String::from_utf8(bytes)
        .map_err(|e| RadarError::InvalidConfig(format!("config is not UTF-8: {}", e)))?;
    let config = parse_engine_config(&text)?;

    tracing::info!(path = %path.display(), "loaded engine configuration");
    Ok(config)
}

/// Parse and validate a TOML configuration document.
pub fn parse_engine_config(text: &str) -> Result<EngineConfig, RadarError> {
    let config: EngineConfig =
        toml::from_str(text).map_err(|e| RadarError::InvalidConfig(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Render a configuration as TOML.
pub fn render_engine_config(config: &EngineConfig) -> Result<String, RadarError> {
    toml::to_string_pretty(config).map_err(|e| RadarError::SerializationError(e.to_string()))
}

/// Read a regular file after checking its size.
///
/// The path is canonicalized first, so ".." and symlinks are resolved and
/// directories are rejected.
pub fn read_file_limited(path: &Path, max_size: u64) -> Result<Vec<u8>, RadarError> {
    let canonical = validate_file_path(path)?;

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| RadarError::IoError(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > max_size {
        return Err(RadarError::InvalidInput(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }

    std::fs::read(&canonical)
        .map_err(|e| RadarError::IoError(format!("Cannot read '{}': {}", path.display(), e)))
}

fn validate_file_path(path: &Path) -> Result<PathBuf, RadarError> {
    let canonical = path.canonicalize().map_err(|e| {
        RadarError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(RadarError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path: its parent directory must exist.
pub fn validate_output_path(path: &Path) -> Result<PathBuf, RadarError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        RadarError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;
    if !canonical_parent.is_dir() {
        return Err(RadarError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| RadarError::IoError("Output path has no filename".to_string()))?;
    Ok(canonical_parent.join(filename))
}

// =============================================================================
// TESTS
// =============================================================================
