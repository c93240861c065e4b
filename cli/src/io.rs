#![deny(missing_docs)]

//! # Manifest and Document I/O
//!
//! Format is picked from the file extension: `.yaml`/`.yml` is YAML,
//! anything else is JSON.

use apigw_core::error::{AppError, AppResult};
use apigw_core::AppManifest;
use serde::Serialize;
use std::fs;
use std::path::Path;

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Reads and parses a manifest file.
pub fn load_manifest(path: &Path) -> AppResult<AppManifest> {
    if !path.exists() {
        return Err(AppError::General(format!(
            "Manifest file not found: {:?}",
            path
        )));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| AppError::General(format!("Failed to read manifest: {}", e)))?;

    if is_yaml(path) {
        AppManifest::from_yaml(&content)
    } else {
        AppManifest::from_json(&content)
    }
}

/// Renders `value` for `output`; stdout always gets JSON.
pub fn render<T: Serialize>(value: &T, output: Option<&Path>) -> AppResult<String> {
    match output {
        Some(path) if is_yaml(path) => serde_yaml::to_string(value)
            .map_err(|e| AppError::General(format!("YAML serialization failed: {}", e))),
        _ => serde_json::to_string_pretty(value)
            .map_err(|e| AppError::General(format!("JSON serialization failed: {}", e))),
    }
}

/// Writes `value` to `output`, creating parent directories, or prints it.
pub fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> AppResult<()> {
    let rendered = render(value, output)?;

    let Some(out_path) = output else {
        println!("{}", rendered);
        return Ok(());
    };

    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::General(format!("Failed to create output directory: {}", e))
            })?;
        }
    }
    fs::write(out_path, rendered)
        .map_err(|e| AppError::General(format!("Failed to write output file: {}", e)))?;
    tracing::info!("Wrote {:?}", out_path);
    Ok(())
}
