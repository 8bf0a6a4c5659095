//! On-disk scenario package layout: write and load with integrity checks.
//!
//! A package is a directory named `{crisis_type}_{tier}_s{seed}` containing
//! `manifest.json`, `scenario.json` (the package minus heartbeats, tools,
//! memory files, and persona), `heartbeats.json`, `tools.json`, `persona.md`,
//! and `memories/{key}.md`. All JSON files are written in canonical form, so
//! the bytes on disk are exactly what the manifest hash covers.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use super::hash::{canonical_json, sha256_hex};
use super::types::{MemoryFile, ScenarioManifest, ScenarioPackage, ToolDefinition};
use super::ScenarioError;

/// File name of the integrity manifest.
pub const MANIFEST_FILE: &str = "manifest.json";
/// File name of the package header.
pub const SCENARIO_FILE: &str = "scenario.json";
/// File name of the heartbeat list (the hashed artifact).
pub const HEARTBEATS_FILE: &str = "heartbeats.json";
/// File name of the tool catalogue.
pub const TOOLS_FILE: &str = "tools.json";
/// File name of the persona document.
pub const PERSONA_FILE: &str = "persona.md";
/// Directory holding seeded memory files.
pub const MEMORIES_DIR: &str = "memories";

/// Package fields stored outside `scenario.json`.
const SPLIT_FIELDS: [&str; 4] = [
    "heartbeats",
    "tool_definitions",
    "memory_files",
    "persona_document",
];

/// Write a package to `parent/{scenario_id}/`, returning the package path.
///
/// # Errors
///
/// Returns [`ScenarioError`] on serialization or filesystem failure.
pub fn write_package(package: &ScenarioPackage, parent: &Path) -> Result<PathBuf, ScenarioError> {
    let dir = parent.join(&package.scenario_id);
    create_dir(&dir)?;

    let mut header = serde_json::to_value(package)?;
    if let Value::Object(map) = &mut header {
        for field in SPLIT_FIELDS {
            map.remove(field);
        }
    }

    write_text(&dir.join(SCENARIO_FILE), &canonical_json(&header)?)?;
    write_text(&dir.join(MANIFEST_FILE), &canonical_json(&package.manifest)?)?;
    write_text(&dir.join(HEARTBEATS_FILE), &canonical_json(&package.heartbeats)?)?;
    write_text(&dir.join(TOOLS_FILE), &canonical_json(&package.tool_definitions)?)?;
    write_text(&dir.join(PERSONA_FILE), &package.persona_document)?;

    let memories = dir.join(MEMORIES_DIR);
    create_dir(&memories)?;
    for file in &package.memory_files {
        write_text(&memories.join(format!("{}.md", file.key)), &file.content)?;
    }

    info!(
        scenario_id = %package.scenario_id,
        heartbeats = package.heartbeats.len(),
        path = %dir.display(),
        "scenario package written"
    );
    Ok(dir)
}

/// Load and verify a package from disk.
///
/// Verifies all required files are present, re-hashes the raw bytes of
/// `heartbeats.json` against the manifest, and validates the reconstructed
/// package, all before the caller can make any model call.
///
/// # Errors
///
/// Returns [`ScenarioError`] on a missing file, parse failure, hash
/// mismatch, or invariant violation.
pub fn load_package(dir: &Path) -> Result<ScenarioPackage, ScenarioError> {
    let manifest_raw = read_text(&dir.join(MANIFEST_FILE))?;
    let manifest: ScenarioManifest = parse_json(&dir.join(MANIFEST_FILE), &manifest_raw)?;

    let heartbeats_raw = read_text(&dir.join(HEARTBEATS_FILE))?;
    let actual = sha256_hex(heartbeats_raw.as_bytes());
    if actual != manifest.content_hash.as_str() {
        return Err(ScenarioError::HashMismatch {
            expected: manifest.content_hash.to_string(),
            actual,
        });
    }
    debug!(hash = %actual, "heartbeats content hash verified");

    let header_raw = read_text(&dir.join(SCENARIO_FILE))?;
    let mut header: Value = parse_json(&dir.join(SCENARIO_FILE), &header_raw)?;

    let heartbeats: Value = parse_json(&dir.join(HEARTBEATS_FILE), &heartbeats_raw)?;
    let tools_raw = read_text(&dir.join(TOOLS_FILE))?;
    let tools: Vec<ToolDefinition> = parse_json(&dir.join(TOOLS_FILE), &tools_raw)?;
    let persona = read_text(&dir.join(PERSONA_FILE))?;
    let memory_files = load_memories(&dir.join(MEMORIES_DIR))?;

    match &mut header {
        Value::Object(map) => {
            map.insert("heartbeats".to_owned(), heartbeats);
            map.insert("tool_definitions".to_owned(), serde_json::to_value(tools)?);
            map.insert("memory_files".to_owned(), serde_json::to_value(memory_files)?);
            map.insert("persona_document".to_owned(), Value::String(persona));
        }
        _ => {
            return Err(ScenarioError::Validation(
                "scenario.json is not a JSON object".to_owned(),
            ))
        }
    }

    let package: ScenarioPackage =
        serde_json::from_value(header).map_err(ScenarioError::Serialize)?;
    package.validate()?;

    info!(
        scenario_id = %package.scenario_id,
        tier = %package.noise_tier,
        heartbeats = package.heartbeats.len(),
        "scenario package loaded"
    );
    Ok(package)
}

/// Read every `memories/{key}.md`, sorted by key for determinism.
fn load_memories(dir: &Path) -> Result<Vec<MemoryFile>, ScenarioError> {
    if !dir.is_dir() {
        return Err(ScenarioError::MissingFile(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|source| ScenarioError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ScenarioError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let key = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_owned();
        let content = read_text(&path)?;
        files.push(MemoryFile { key, content });
    }
    files.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(files)
}

fn create_dir(path: &Path) -> Result<(), ScenarioError> {
    fs::create_dir_all(path).map_err(|source| ScenarioError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_text(path: &Path, content: &str) -> Result<(), ScenarioError> {
    fs::write(path, content.as_bytes()).map_err(|source| ScenarioError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_text(path: &Path) -> Result<String, ScenarioError> {
    if !path.is_file() {
        return Err(ScenarioError::MissingFile(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|source| ScenarioError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_json<T: serde::de::DeserializeOwned>(
    path: &Path,
    raw: &str,
) -> Result<T, ScenarioError> {
    serde_json::from_str(raw).map_err(|source| ScenarioError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
