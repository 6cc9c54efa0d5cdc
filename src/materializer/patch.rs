// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! Anchored text edits
//!
//! Source files that are not JSON (`.svelte`, `.ts`, `.js`) are patched by
//! finding a fixed anchor string and splicing text next to it, or by
//! replacing a known placeholder. The anchors are part of the template
//! contract: a generated file that no longer contains one is reported and
//! skipped, never treated as fatal.

use std::path::Path;

use crate::errors::{DankuError, DankuResult};
use crate::utils::print_warning;

/// One edit against a text file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Insert `text` right after the first occurrence of `anchor`
    InsertAfter { anchor: String, text: String },
    /// Insert `text` right before the first occurrence of `anchor`
    InsertBefore { anchor: String, text: String },
    /// Replace the first occurrence of `placeholder`
    Replace { placeholder: String, with: String },
}

impl Patch {
    pub fn after(anchor: impl Into<String>, text: impl Into<String>) -> Self {
        Self::InsertAfter {
            anchor: anchor.into(),
            text: text.into(),
        }
    }

    pub fn before(anchor: impl Into<String>, text: impl Into<String>) -> Self {
        Self::InsertBefore {
            anchor: anchor.into(),
            text: text.into(),
        }
    }

    pub fn replace(placeholder: impl Into<String>, with: impl Into<String>) -> Self {
        Self::Replace {
            placeholder: placeholder.into(),
            with: with.into(),
        }
    }

    /// The string this edit needs to find
    pub fn anchor(&self) -> &str {
        match self {
            Self::InsertAfter { anchor, .. } | Self::InsertBefore { anchor, .. } => anchor,
            Self::Replace { placeholder, .. } => placeholder,
        }
    }

    /// Apply to `content`, or `None` when the anchor is missing
    pub fn apply(&self, content: &str) -> Option<String> {
        let pos = content.find(self.anchor())?;
        let mut out = String::with_capacity(content.len() + 64);

        match self {
            Self::InsertAfter { anchor, text } => {
                let at = pos + anchor.len();
                out.push_str(&content[..at]);
                out.push_str(text);
                out.push_str(&content[at..]);
            }
            Self::InsertBefore { text, .. } => {
                out.push_str(&content[..pos]);
                out.push_str(text);
                out.push_str(&content[pos..]);
            }
            Self::Replace { placeholder, with } => {
                out.push_str(&content[..pos]);
                out.push_str(with);
                out.push_str(&content[pos + placeholder.len()..]);
            }
        }

        Some(out)
    }
}

/// What happened when patching a file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub applied: usize,
    /// Anchors that were not found
    pub skipped: Vec<String>,
}

/// Apply `patches` in order; each sees the result of the previous one
pub fn apply_all(content: &str, patches: &[Patch]) -> (String, PatchReport) {
    let mut text = content.to_string();
    let mut report = PatchReport::default();

    for patch in patches {
        match patch.apply(&text) {
            Some(next) => {
                text = next;
                report.applied += 1;
            }
            None => report.skipped.push(patch.anchor().to_string()),
        }
    }

    (text, report)
}

/// Patch a file in place. Missing anchors are warned about and skipped.
pub fn patch_file(path: &Path, patches: &[Patch]) -> DankuResult<PatchReport> {
    if !path.exists() {
        return Err(DankuError::FileNotFound {
            path: path.to_path_buf(),
            help: Some("The file is created by the SvelteKit generator; was it removed?".into()),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| DankuError::read_error(path, e))?;
    let (patched, report) = apply_all(&content, patches);

    for anchor in &report.skipped {
        tracing::warn!("Anchor {:?} not found in {}", anchor, path.display());
        print_warning(&format!(
            "Could not find `{}` in {}. Manual integration may be required.",
            anchor.trim(),
            path.display()
        ));
    }

    if report.applied > 0 {
        std::fs::write(path, patched).map_err(|e| DankuError::write_error(path, e))?;
    }

    Ok(report)
}
