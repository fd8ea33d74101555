//! JSON output sinks for the extracted process maps.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::mapper::ProcessMap;

pub const DEFAULT_OUTPUT_DIR: &str = "data/output";

/// Write the run's results: Log10 processes for the overlay, external
/// processes for reference (only when any exist), and the combined legacy
/// file consumed by older readers.
pub fn save_process_maps(dir: &Path, map: &ProcessMap) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let log10_path = dir.join("log10_processes.json");
    write_json(&log10_path, &map.log10)?;
    info!("saved {} log10 processes to {}", map.log10.len(), log10_path.display());

    if !map.external.is_empty() {
        let external_path = dir.join("external_processes.json");
        write_json(&external_path, &map.external)?;
        info!(
            "saved {} external processes to {}",
            map.external.len(),
            external_path.display()
        );
    }

    let mut combined: Vec<serde_json::Value> = Vec::with_capacity(map.log10.len() + map.external.len());
    for proc in &map.log10 {
        combined.push(serde_json::to_value(proc)?);
    }
    for proc in &map.external {
        combined.push(serde_json::to_value(proc)?);
    }
    write_json(&dir.join("process_map.json"), &combined)?;

    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

// ── Tests ──
