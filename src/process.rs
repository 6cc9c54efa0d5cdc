// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! External commands (`pnpm`, `git`)
//!
//! Commands run with inherited stdio so generator prompts and install
//! progress reach the terminal unchanged.

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::errors::{DankuError, DankuResult};

/// A command line and the directory it runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(program: &str, args: &[&str], cwd: &Path) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            cwd: cwd.to_path_buf(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Runs a program to completion; a non-zero exit is an error
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[&str], cwd: &Path) -> DankuResult<()>;
}

/// Resolve `tool` on the PATH
pub fn require_tool(tool: &str) -> DankuResult<PathBuf> {
    which::which(tool).map_err(|_| DankuError::tool_not_found(tool))
}

/// Runs commands on the host with tokio
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[&str], cwd: &Path) -> DankuResult<()> {
        let invocation = Invocation::new(program, args, cwd);
        // Resolving through `which` also finds `pnpm.cmd` style shims on Windows
        let executable = require_tool(program)?;

        tracing::debug!("Running `{}` in {}", invocation, cwd.display());

        let status = Command::new(executable)
            .args(args)
            .current_dir(cwd)
            .status()
            .await
            .map_err(|e| DankuError::CommandSpawn {
                command: invocation.to_string(),
                error: e.to_string(),
                help: Some(format!("Check that {} exists", cwd.display())),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(DankuError::CommandFailed {
                command: invocation.to_string(),
                code: status.code(),
            })
        }
    }
}

#[cfg(test)]
pub(crate) use recording::RecordingRunner;
