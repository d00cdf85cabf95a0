//! Artifact emission.
//!
//! Writes the generator output into a plugin project directory:
//! one capability file per derived id under `capabilities/`, the
//! driver declaration in `app.json`, and the path→id mapping under
//! `data/`. Capability files are write-once so hand-edited metadata
//! survives incremental regeneration.

use crate::error::{GenError, Result};
use crate::walker::GeneratedCapabilities;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Counters reported after a run.
#[derive(Debug, Default)]
pub struct EmitSummary {
    /// Capability files created this run
    pub written: usize,
    /// Capability files that already existed and were left untouched
    pub skipped: usize,
}

/// Write all generated artifacts under `root`.
pub fn write_artifacts(root: &Path, generated: &GeneratedCapabilities) -> Result<EmitSummary> {
    let summary = write_capability_files(&root.join("capabilities"), generated)?;
    update_driver_manifest(&root.join("app.json"), generated)?;
    write_mapping(&root.join("data"), generated)?;
    Ok(summary)
}

fn write_capability_files(dir: &Path, generated: &GeneratedCapabilities) -> Result<EmitSummary> {
    fs::create_dir_all(dir)?;

    let mut summary = EmitSummary::default();
    for (id, capability) in &generated.capabilities {
        let file = dir.join(format!("{id}.json"));
        // Write-once: an existing file may carry manual edits.
        if file.exists() {
            debug!("Capability file {} exists, leaving untouched", file.display());
            summary.skipped += 1;
            continue;
        }
        fs::write(&file, serde_json::to_string_pretty(capability)?)?;
        summary.written += 1;
    }

    info!(
        "Capability files: {} written, {} left untouched",
        summary.written, summary.skipped
    );
    Ok(summary)
}

/// Replace the first driver's capability list with the derived id set,
/// creating the default resource driver when the manifest has none.
fn update_driver_manifest(path: &Path, generated: &GeneratedCapabilities) -> Result<()> {
    let contents = fs::read_to_string(path)
        .map_err(|e| GenError::Manifest(format!("cannot read {}: {e}", path.display())))?;
    let mut manifest: Value = serde_json::from_str(&contents)
        .map_err(|e| GenError::Manifest(format!("{} is not valid JSON: {e}", path.display())))?;

    if !manifest.is_object() {
        return Err(GenError::Manifest(format!(
            "{} root is not an object",
            path.display()
        )));
    }

    let drivers = manifest
        .as_object_mut()
        .and_then(|m| {
            m.entry("drivers")
                .or_insert_with(|| Value::Array(Vec::new()))
                .as_array_mut()
        })
        .ok_or_else(|| GenError::Manifest("'drivers' is not an array".to_string()))?;

    if drivers.is_empty() {
        drivers.push(json!({
            "id": "oss-resource",
            "name": {"en": "OSS Resource"},
            "class": "sensor",
            "capabilities": []
        }));
    }

    let ids: Vec<&String> = generated.capabilities.keys().collect();
    drivers[0]["capabilities"] = json!(ids);

    fs::write(path, serde_json::to_string_pretty(&manifest)?)?;
    info!("Updated driver capabilities in {}", path.display());
    Ok(())
}

fn write_mapping(dir: &Path, generated: &GeneratedCapabilities) -> Result<()> {
    fs::create_dir_all(dir)?;
    let file = dir.join("capability-mapping.json");
    fs::write(&file, serde_json::to_string_pretty(&generated.mapping)?)?;
    info!("Wrote mapping to {}", file.display());
    Ok(())
}
