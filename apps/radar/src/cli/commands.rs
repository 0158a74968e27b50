//! # CLI Command Implementations

use super::OutputFormat;
use crate::api::{self, EvaluateRequest, EvaluateResponse};
use crate::settings::{read_file_limited, render_engine_config, validate_output_path};
use radar_core::formats::snapshot::MAX_SNAPSHOT_SIZE;
use radar_core::{
    Engine, EngineConfig, RadarError, RadarSnapshot, snapshot_digest, snapshot_from_bytes,
    snapshot_to_bytes, verify_digest,
};
use std::fmt::Write as _;
use std::path::Path;

/// Maximum size of an evaluation request file (32 MB).
const MAX_REQUEST_FILE_SIZE: u64 = 32 * 1024 * 1024;

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: EngineConfig, host: &str, port: u16) -> Result<(), RadarError> {
    let engine = Engine::new(config)?;

    println!("Radar Ring-Decision Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:        {}", host);
    println!("  Port:        {}", port);
    println!("  Workers:     {}", config.max_concurrency);
    println!("  Thresholds:  {}", describe_thresholds(&config));
    println!();
    println!("Endpoints:");
    println!("  POST /evaluate - Evaluate a radar");
    println!("  GET  /config   - Engine configuration");
    println!("  GET  /health   - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, engine).await
}

fn describe_thresholds(config: &EngineConfig) -> String {
    format!(
        "adopt {} / trial {} / assess {}",
        config.thresholds.adopt, config.thresholds.trial, config.thresholds.assess
    )
}

// =============================================================================
// EVALUATE COMMAND
// =============================================================================

/// Read a request file and parse it.
pub fn load_request(path: &Path) -> Result<EvaluateRequest, RadarError> {
    let bytes = read_file_limited(path, MAX_REQUEST_FILE_SIZE)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| RadarError::InvalidInput(format!("Invalid request JSON: {}", e)))
}

/// Evaluate a radar from `input` and write it in `format`.
///
/// Fails on an invariant violation, which the binary turns into a
/// non-zero exit code.
pub fn cmd_evaluate(
    config: EngineConfig,
    input: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), RadarError> {
    let request = load_request(input)?;
    let engine = Engine::new(config)?;
    let snapshot = engine.evaluate(&request.technologies, request.org)?;
    let digest = snapshot_digest(&snapshot)?;

    let bytes = match format {
        OutputFormat::Json => {
            let response = EvaluateResponse::success(snapshot, digest.clone());
            let mut json = serde_json::to_vec_pretty(&response)
                .map_err(|e| RadarError::SerializationError(e.to_string()))?;
            json.push(b'\n');
            json
        }
        OutputFormat::Text => render_text(&snapshot, &digest).into_bytes(),
        OutputFormat::Binary => {
            if output.is_none() {
                return Err(RadarError::InvalidInput(
                    "binary output requires --output".to_string(),
                ));
            }
            snapshot_to_bytes(&snapshot)?
        }
    };

    match output {
        Some(path) => {
            let target = validate_output_path(path)?;
            std::fs::write(&target, &bytes).map_err(|e| {
                RadarError::IoError(format!("Cannot write '{}': {}", path.display(), e))
            })?;
            tracing::info!(path = %target.display(), bytes = bytes.len(), "wrote radar");
            println!("Wrote {} ({} bytes), digest {}", path.display(), bytes.len(), digest);
        }
        None => print!("{}", String::from_utf8_lossy(&bytes)),
    }
    Ok(())
}

/// Human-readable radar: quadrants, then one line per technology.
pub fn render_text(snapshot: &RadarSnapshot, digest: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Radar for {} ({} technologies)",
        snapshot.org,
        snapshot.len()
    );

    for (quadrant, techs) in &snapshot.quadrants {
        let _ = writeln!(out);
        let _ = writeln!(out, "[{}]", quadrant);
        for (name, decision) in techs {
            let capped = if decision.is_capped() {
                format!(" (capped from {})", decision.proposed)
            } else {
                String::new()
            };
            let _ = writeln!(
                out,
                "  {:<24} {:<6}{}  risk {}, confidence {} ({})",
                name,
                decision.ring.name(),
                capped,
                decision.risk_level,
                decision.confidence,
                decision.confidence_band()
            );
        }
    }

    let _ = writeln!(out);
    if snapshot.warnings.is_empty() {
        let _ = writeln!(out, "Consistency: ok");
    } else {
        let _ = writeln!(out, "Consistency warnings:");
        for warning in &snapshot.warnings {
            let _ = writeln!(out, "  - {}", warning);
        }
    }
    let _ = writeln!(out, "Digest: {}", digest);
    out
}

// =============================================================================
// DIGEST COMMAND
// =============================================================================

/// Validate a binary snapshot and print its digest.
pub fn cmd_digest(input: &Path, expect: Option<&str>, json_mode: bool) -> Result<(), RadarError> {
    let bytes = read_file_limited(input, MAX_SNAPSHOT_SIZE as u64)?;
    let snapshot = snapshot_from_bytes(&bytes)?;
    let digest = snapshot_digest(&snapshot)?;

    if let Some(expected) = expect {
        let canonical = snapshot_to_bytes(&snapshot)?;
        if !verify_digest(&canonical, &expected.trim().to_ascii_lowercase()) {
            return Err(RadarError::InvalidInput(format!(
                "digest mismatch for {}: expected {}, got {}",
                input.display(),
                expected.trim(),
                digest
            )));
        }
        tracing::info!(digest = %digest, "snapshot digest verified");
    }

    if json_mode {
        let output = serde_json::json!({
            "digest": digest,
            "technologies": snapshot.len(),
            "is_consistent": snapshot.is_consistent,
        });
        println!("{}", output);
    } else {
        println!("{}  {}", digest, input.display());
    }
    Ok(())
}

// =============================================================================
// CONFIG COMMAND
// =============================================================================

/// Print the effective engine configuration.
pub fn cmd_config(config: &EngineConfig, json_mode: bool) -> Result<(), RadarError> {
    if json_mode {
        let json = serde_json::to_string_pretty(config)
            .map_err(|e| RadarError::SerializationError(e.to_string()))?;
        println!("{}", json);
    } else {
        print!("{}", render_engine_config(config)?);
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST: &str = r#"{
        "org": { "size": "startup", "risk_tolerance": "aggressive" },
        "technologies": {
            "tokio": {
                "quadrant": "libraries",
                "metrics": {
                    "popularity": 60000,
                    "monthly_commits": 220,
                    "monthly_releases": 3,
                    "contributors": 400,
                    "first_release_year": 2016,
                    "enterprise_mentions": 20,
                    "security_advisories": 0,
                    "breaking_changes": 0,
                    "pricing_volatility": false,
                    "vendor_lock_in": false
                }
            },
            "left-pad": { "quadrant": "libraries" }
        }
    }"#;

    fn write_request(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("request.json");
        std::fs::write(&path, REQUEST).expect("write request");
        path
    }

    #[test]
    fn load_request_applies_org_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let request = load_request(&write_request(dir.path())).expect("load");
        assert_eq!(request.technologies.len(), 2);
        assert_eq!(
            request.org.compliance,
            radar_core::ComplianceTier::Unregulated
        );
    }

    #[test]
    fn load_request_rejects_bad_json() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert!(matches!(
            load_request(&path),
            Err(RadarError::InvalidInput(_))
        ));
    }

    #[test]
    fn binary_then_digest() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = write_request(dir.path());
        let output = dir.path().join("radar.bin");

        cmd_evaluate(
            EngineConfig::default(),
            &input,
            OutputFormat::Binary,
            Some(&output),
        )
        .expect("evaluate");

        let bytes = std::fs::read(&output).expect("read snapshot");
        assert!(bytes.starts_with(b"RDAR"));
        let snapshot = snapshot_from_bytes(&bytes).expect("decode");
        assert_eq!(snapshot.len(), 2);

        cmd_digest(&output, None, true).expect("digest");
    }

    #[test]
    fn digest_expect_accepts_matching_and_rejects_other() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = write_request(dir.path());
        let output = dir.path().join("radar.bin");
        cmd_evaluate(
            EngineConfig::default(),
            &input,
            OutputFormat::Binary,
            Some(&output),
        )
        .expect("evaluate");

        let bytes = std::fs::read(&output).expect("read snapshot");
        let digest = snapshot_digest(&snapshot_from_bytes(&bytes).expect("decode")).expect("digest");

        cmd_digest(&output, Some(&digest), false).expect("matching digest");
        cmd_digest(&output, Some(&digest.to_ascii_uppercase()), false).expect("case-insensitive");

        let err = cmd_digest(&output, Some(&"0".repeat(64)), false).expect_err("mismatch");
        assert!(matches!(err, RadarError::InvalidInput(ref msg) if msg.contains("digest mismatch")));
    }

    #[test]
    fn binary_requires_output() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = write_request(dir.path());
        assert!(matches!(
            cmd_evaluate(EngineConfig::default(), &input, OutputFormat::Binary, None),
            Err(RadarError::InvalidInput(_))
        ));
    }

    #[test]
    fn json_output_file_parses() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = write_request(dir.path());
        let output = dir.path().join("radar.json");

        cmd_evaluate(
            EngineConfig::default(),
            &input,
            OutputFormat::Json,
            Some(&output),
        )
        .expect("evaluate");

        let text = std::fs::read_to_string(&output).expect("read");
        let response: EvaluateResponse = serde_json::from_str(&text).expect("parse");
        assert!(response.success);
        assert_eq!(response.ring_counts.values().sum::<usize>(), 2);
        assert_eq!(response.digest.as_deref().map(str::len), Some(64));
    }

    #[test]
    fn text_rendering_lists_every_technology() {
        let dir = tempfile::tempdir().expect("temp dir");
        let request = load_request(&write_request(dir.path())).expect("load");
        let engine = Engine::new(EngineConfig::default()).expect("engine");
        let snapshot = engine
            .evaluate(&request.technologies, request.org)
            .expect("evaluate");

        let text = render_text(&snapshot, "abc");
        assert!(text.contains("[libraries]"));
        assert!(text.contains("tokio"));
        assert!(text.contains("left-pad"));
        assert!(text.contains("Digest: abc"));
    }

    #[test]
    fn digest_rejects_garbage() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("garbage.bin");
        std::fs::write(&path, b"not a snapshot").expect("write");
        assert!(cmd_digest(&path, None, false).is_err());
    }
}
