// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! Error types
//!
//! Everything that can stop a scaffolding run ends up as a [`DankuError`].
//! Remote API failures are first produced as [`RemoteError`] values by the
//! providers so that callers can decide whether they are fatal.

mod recovery;
mod remote;

pub use recovery::RecoverySuggestion;
pub use remote::{exists_or_not_found, RemoteError, RemoteResult};

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for danku operations
pub type DankuResult<T> = Result<T, DankuError>;

/// Main error type for danku
#[derive(Error, Debug, Diagnostic)]
pub enum DankuError {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Created default configuration file at {}", path.display())]
    #[diagnostic(
        code(danku::config_created),
        help("Please update the configuration file before running this command again")
    )]
    ConfigCreated { path: PathBuf },

    #[error("Configuration file already exists: {}", path.display())]
    #[diagnostic(
        code(danku::config_exists),
        help("Pass --force to overwrite it with the default template")
    )]
    ConfigExists { path: PathBuf },

    #[error("Configuration parsing failed: {message}")]
    #[diagnostic(code(danku::config_syntax))]
    ConfigSyntax {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Configuration validation failed: {}", errors.join(", "))]
    #[diagnostic(
        code(danku::config_invalid),
        help("Exactly one deploymentTarget and one gitProvider must be configured; boilerplate is optional")
    )]
    ConfigInvalid { errors: Vec<String> },

    #[error("Cannot determine home directory")]
    #[diagnostic(
        code(danku::no_home),
        help("Pass the configuration file explicitly with --config")
    )]
    NoHomeDirectory,

    // ─────────────────────────────────────────────────────────────────────────
    // Precondition Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Directory {} already exists", path.display())]
    #[diagnostic(
        code(danku::directory_exists),
        help("Choose another project name or remove the directory")
    )]
    DirectoryExists { path: PathBuf },

    #[error("Repository {name} already exists")]
    #[diagnostic(code(danku::repository_exists))]
    RepositoryExists { name: String },

    #[error("Repository {name} does not exist")]
    #[diagnostic(
        code(danku::repository_missing),
        help("Run the command from a project created with `danku new`")
    )]
    RepositoryMissing { name: String },

    #[error("Resource {name} already exists")]
    #[diagnostic(code(danku::resource_exists))]
    ResourceExists { name: String },

    #[error("Invalid project name '{name}': {reason}")]
    #[diagnostic(
        code(danku::invalid_project_name),
        help("Use lowercase letters, digits, '-' and '_' only")
    )]
    InvalidProjectName { name: String, reason: String },

    #[error("Please run this command inside of a SvelteKit project directory")]
    #[diagnostic(code(danku::not_sveltekit))]
    NotSvelteKitProject { path: PathBuf },

    #[error("Tool '{tool}' not found")]
    #[diagnostic(code(danku::tool_not_found), help("{suggestion}"))]
    ToolNotFound { tool: String, suggestion: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Remote Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(transparent)]
    Remote(#[from] RemoteError),

    // ─────────────────────────────────────────────────────────────────────────
    // Subprocess Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Command `{command}` failed with exit code {}", code.map_or_else(|| "unknown".to_string(), |c| c.to_string()))]
    #[diagnostic(code(danku::command_failed))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("Failed to execute command `{command}`: {error}")]
    #[diagnostic(code(danku::command_spawn))]
    CommandSpawn {
        command: String,
        error: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Materializer Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Template not found: {name}")]
    #[diagnostic(code(danku::template_not_found))]
    TemplateNotFound {
        name: String,
        #[help]
        help: Option<String>,
    },

    #[error("Cannot edit {}: {reason}", path.display())]
    #[diagnostic(code(danku::edit_failed))]
    EditFailed { path: PathBuf, reason: String },

    #[error("File not found: {}", path.display())]
    #[diagnostic(code(danku::file_not_found))]
    FileNotFound {
        path: PathBuf,
        #[help]
        help: Option<String>,
    },

    #[error("Failed to read file '{}': {error}", path.display())]
    #[diagnostic(code(danku::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{}': {error}", path.display())]
    #[diagnostic(code(danku::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(danku::io_error))]
    Io { message: String },

    #[error("YAML serialization error: {message}")]
    #[diagnostic(code(danku::yaml_error))]
    Yaml { message: String },

    #[error("JSON error: {message}")]
    #[diagnostic(code(danku::json_error))]
    Json { message: String },
}

impl From<std::io::Error> for DankuError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for DankuError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for DankuError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl DankuError {
    /// Create a tool not found error with installation suggestion
    pub fn tool_not_found(tool: &str) -> Self {
        let suggestion = match tool {
            "pnpm" => "Install pnpm: https://pnpm.io/installation".to_string(),
            "git" => "Install git: https://git-scm.com/downloads".to_string(),
            _ => format!("Install {} and ensure it's in your PATH", tool),
        };

        Self::ToolNotFound {
            tool: tool.to_string(),
            suggestion,
        }
    }

    /// Wrap an IO failure while reading `path`
    pub fn read_error(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::FileReadError {
            path: path.into(),
            error: error.to_string(),
        }
    }

    /// Wrap an IO failure while writing `path`
    pub fn write_error(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::FileWriteError {
            path: path.into(),
            error: error.to_string(),
        }
    }

    /// The recovery suggestion to print alongside this error, if any
    pub fn recovery(&self) -> Option<RecoverySuggestion> {
        match self {
            Self::ConfigCreated { path } => Some(RecoverySuggestion::edit_config(Some(path.as_path()))),
            Self::ConfigInvalid { .. } | Self::ConfigSyntax { .. } => {
                Some(RecoverySuggestion::edit_config(None))
            }
            Self::ToolNotFound { tool, .. } => Some(RecoverySuggestion::install_tool(tool)),
            Self::Remote(remote) => remote.recovery(),
            Self::DirectoryExists { path } => Some(RecoverySuggestion::remove_directory(path)),
            _ => None,
        }
    }
}
