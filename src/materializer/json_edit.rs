// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! Path edits over JSONC documents
//!
//! Edits go through the `jsonc-parser` concrete syntax tree, so comments,
//! key order and the layout of untouched values survive. Missing objects and
//! arrays along a path are created on the way down.

use jsonc_parser::cst::{CstArray, CstInputValue, CstObject, CstRootNode};
use jsonc_parser::ParseOptions;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JsonEditError {
    #[error("{0}")]
    Syntax(String),

    #[error("cannot set '{path}': {reason}")]
    Conflict { path: String, reason: String },
}

/// One step of a path into a JSON document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{}", key),
            Self::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Set `value` at `path`
#[derive(Debug, Clone, PartialEq)]
pub struct JsonEdit {
    pub path: Vec<PathSegment>,
    pub value: Value,
}

impl JsonEdit {
    /// Build an edit from a dotted path such as `routes[0].pattern`.
    ///
    /// Keys may contain `:` (`scripts.db:migrate`) but not `.` or `[`.
    pub fn at(path: &str, value: impl Into<Value>) -> Self {
        let mut segments = Vec::new();

        for part in path.split('.').filter(|p| !p.is_empty()) {
            let (key, mut rest) = match part.find('[') {
                Some(i) => (&part[..i], &part[i..]),
                None => (part, ""),
            };
            if !key.is_empty() {
                segments.push(PathSegment::Key(key.to_string()));
            }
            while let Some(close) = rest.find(']') {
                match rest[1..close].parse::<usize>() {
                    Ok(index) => segments.push(PathSegment::Index(index)),
                    Err(_) => segments.push(PathSegment::Key(rest[1..close].to_string())),
                }
                rest = &rest[close + 1..];
            }
        }

        Self {
            path: segments,
            value: value.into(),
        }
    }

    /// Human readable form of the path
    pub fn path_string(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            if matches!(segment, PathSegment::Key(_)) && !out.is_empty() {
                out.push('.');
            }
            out.push_str(&segment.to_string());
        }
        out
    }

    fn conflict(&self, reason: impl Into<String>) -> JsonEditError {
        JsonEditError::Conflict {
            path: self.path_string(),
            reason: reason.into(),
        }
    }
}

enum Container {
    Object(CstObject),
    Array(CstArray),
}

/// Parse JSONC into a `serde_json::Value`
pub fn parse(source: &str) -> Result<Value, JsonEditError> {
    jsonc_parser::parse_to_serde_value(source, &ParseOptions::default())
        .map_err(|e| JsonEditError::Syntax(e.to_string()))?
        .ok_or_else(|| JsonEditError::Syntax("empty document".into()))
}

/// Apply `edits` in order and return the new text
pub fn apply(source: &str, edits: &[JsonEdit]) -> Result<String, JsonEditError> {
    let root = CstRootNode::parse(source, &ParseOptions::default())
        .map_err(|e| JsonEditError::Syntax(e.to_string()))?;

    for edit in edits {
        set(&root, edit)?;
    }

    Ok(root.to_string())
}

fn set(root: &CstRootNode, edit: &JsonEdit) -> Result<(), JsonEditError> {
    let Some((last, parents)) = edit.path.split_last() else {
        return Err(edit.conflict("empty path"));
    };

    let first = parents.first().unwrap_or(last);
    let mut container = match first {
        PathSegment::Key(_) => root.object_value_or_create().map(Container::Object),
        PathSegment::Index(_) => root.array_value_or_create().map(Container::Array),
    }
    .ok_or_else(|| edit.conflict("the document root has a different type"))?;

    for (i, segment) in parents.iter().enumerate() {
        let next = &edit.path[i + 1];
        container = match (container, segment) {
            (Container::Object(object), PathSegment::Key(key)) => child_of_object(&object, key, next),
            (Container::Array(array), PathSegment::Index(index)) => {
                child_of_array(&array, *index, next)
            }
            _ => None,
        }
        .ok_or_else(|| edit.conflict(format!("'{}' is not a container of the right type", segment)))?;
    }

    let value = input_value(&edit.value);
    match (container, last) {
        (Container::Object(object), PathSegment::Key(key)) => {
            match object.get(key) {
                Some(prop) => prop.set_value(value),
                None => {
                    object.append(key, value);
                }
            }
            Ok(())
        }
        (Container::Array(array), PathSegment::Index(index)) => {
            let len = array.elements().len();
            if *index == len {
                array.append(value);
                Ok(())
            } else if *index < len {
                Err(edit.conflict("replacing an existing array element is not supported"))
            } else {
                Err(edit.conflict(format!("index {} is past the end of the array", index)))
            }
        }
        _ => Err(edit.conflict("path does not match the document")),
    }
}

fn child_of_object(object: &CstObject, key: &str, next: &PathSegment) -> Option<Container> {
    match next {
        PathSegment::Key(_) => object.object_value_or_create(key).map(Container::Object),
        PathSegment::Index(_) => object.array_value_or_create(key).map(Container::Array),
    }
}

fn child_of_array(array: &CstArray, index: usize, next: &PathSegment) -> Option<Container> {
    let elements = array.elements();
    let node = if index < elements.len() {
        elements.into_iter().nth(index)?
    } else if index == elements.len() {
        let empty = match next {
            PathSegment::Key(_) => CstInputValue::Object(Vec::new()),
            PathSegment::Index(_) => CstInputValue::Array(Vec::new()),
        };
        array.append(empty)
    } else {
        return None;
    };

    match next {
        PathSegment::Key(_) => node.as_object().map(Container::Object),
        PathSegment::Index(_) => node.as_array().map(Container::Array),
    }
}

fn input_value(value: &Value) -> CstInputValue {
    match value {
        Value::Null => CstInputValue::Null,
        Value::Bool(b) => CstInputValue::Bool(*b),
        Value::Number(n) => CstInputValue::Number(n.to_string()),
        Value::String(s) => CstInputValue::String(s.clone()),
        Value::Array(items) => CstInputValue::Array(items.iter().map(input_value).collect()),
        Value::Object(map) => CstInputValue::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), input_value(value)))
                .collect(),
        ),
    }
}
