// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! `.env` maintenance

use std::path::Path;

use crate::errors::{DankuError, DankuResult};

/// Set `key=value` in the env file at `path`, creating the file if needed.
///
/// A line whose key is exactly `key` is replaced in place; otherwise the
/// entry is appended on a new line.
pub fn upsert(path: &Path, key: &str, value: &str) -> DankuResult<()> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(DankuError::read_error(path, e)),
    };

    let updated = set_entry(&content, key, value);
    std::fs::write(path, updated).map_err(|e| DankuError::write_error(path, e))?;

    tracing::debug!("Set {} in {}", key, path.display());
    Ok(())
}

fn line_key(line: &str) -> &str {
    let line = line.trim_end_matches(['\r', '\n']);
    line.split_once('=').map_or(line, |(k, _)| k)
}

/// Pure form of [`upsert`]
pub fn set_entry(content: &str, key: &str, value: &str) -> String {
    let entry = format!("{}={}", key, value);
    let mut found = false;
    let mut out = String::with_capacity(content.len() + entry.len() + 1);

    for line in content.split_inclusive('\n') {
        if line_key(line) == key {
            found = true;
            out.push_str(&entry);
            out.push_str(&line[line.trim_end_matches(['\r', '\n']).len()..]);
        } else {
            out.push_str(line);
        }
    }

    if !found {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&entry);
        out.push('\n');
    }

    out
}
