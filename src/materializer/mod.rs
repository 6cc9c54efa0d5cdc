// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! Project file generation
//!
//! Everything that writes into the generated project lives here: embedded
//! templates, `.env` entries, anchored source patches, structured JSON edits
//! and the CI workflow.

pub mod env_file;
pub mod json_edit;
pub mod patch;
pub mod templates;
pub mod workflow;

use serde_json::Value;
use std::path::Path;

use crate::errors::{DankuError, DankuResult};
pub use json_edit::{JsonEdit, PathSegment};
pub use patch::{patch_file, Patch, PatchReport};
pub use templates::TemplateRegistry;

/// Read a JSON or JSONC file into a value
pub fn read_json(path: &Path) -> DankuResult<Value> {
    let source = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DankuError::FileNotFound {
            path: path.to_path_buf(),
            help: None,
        },
        _ => DankuError::read_error(path, e),
    })?;

    json_edit::parse(&source).map_err(|e| DankuError::EditFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Apply `edits` to the JSON(C) file at `path`.
///
/// Comments and untouched values are kept; inserted members follow the
/// indentation of the surrounding object.
pub fn modify_json_file(path: &Path, edits: &[JsonEdit]) -> DankuResult<()> {
    let source = std::fs::read_to_string(path).map_err(|e| DankuError::read_error(path, e))?;

    let updated = json_edit::apply(&source, edits).map_err(|e| DankuError::EditFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    std::fs::write(path, updated).map_err(|e| DankuError::write_error(path, e))?;

    tracing::debug!(
        "Applied {} edit(s) to {}: {}",
        edits.len(),
        path.display(),
        edits.iter().map(JsonEdit::path_string).collect::<Vec<_>>().join(", ")
    );
    Ok(())
}
