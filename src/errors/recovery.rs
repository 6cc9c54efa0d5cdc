// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! Error recovery suggestions
//!
//! Provides actionable suggestions for recovering from errors.

use std::path::Path;

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// Suggest installing a missing tool
    pub fn install_tool(tool: &str) -> Self {
        match tool {
            "pnpm" => Self {
                action: "Install pnpm".into(),
                steps: vec![
                    "pnpm drives the SvelteKit generator and installs dependencies".into(),
                    "Choose an installation method below".into(),
                ],
                commands: vec![
                    "# Using Corepack (Node.js 16.13+):".into(),
                    "corepack enable pnpm".into(),
                    "".into(),
                    "# Using npm:".into(),
                    "npm install -g pnpm".into(),
                ],
            },
            "git" => Self {
                action: "Install git".into(),
                steps: vec!["git is required to commit and push the new project".into()],
                commands: vec![
                    "# Using Homebrew (macOS/Linux):".into(),
                    "brew install git".into(),
                ],
            },
            _ => Self {
                action: format!("Install {}", tool),
                steps: vec![format!("Install {} and ensure it's in your PATH", tool)],
                commands: vec![],
            },
        }
    }

    /// Suggest editing the configuration file
    pub fn edit_config(path: Option<&Path>) -> Self {
        let location = path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "the configuration file".to_string());

        Self {
            action: "Edit the configuration".into(),
            steps: vec![
                format!("Open {}", location),
                "Uncomment exactly one deploymentTarget and one gitProvider".into(),
                "Optionally uncomment one boilerplate (marketing or saasFs)".into(),
                "Fill in every token, id and key".into(),
            ],
            commands: vec![
                "# Check the result without creating anything:".into(),
                "danku config check".into(),
            ],
        }
    }

    /// Suggest replacing a rejected API token
    pub fn replace_token(provider: &str) -> Self {
        let steps = match provider {
            "GitHub" => vec![
                "Create a token at https://github.com/settings/tokens".into(),
                "The token needs access to your organization's repositories".into(),
            ],
            "Cloudflare" => vec![
                "Create a token at https://dash.cloudflare.com/profile/api-tokens".into(),
                "Make sure the account id matches the account the token belongs to".into(),
            ],
            _ => vec![format!("Create a new {} API token", provider)],
        };

        Self {
            action: format!("Replace the {} token in your configuration", provider),
            steps,
            commands: vec!["danku config path".into()],
        }
    }

    /// Suggest widening token permissions
    pub fn grant_permissions(provider: &str) -> Self {
        let steps = match provider {
            "GitHub" => vec![
                "The token must be able to create organization repositories".into(),
                "It also needs Actions secrets, variables and environments write access".into(),
            ],
            "Cloudflare" => vec![
                "The token needs Workers Scripts, D1 and Zone read permissions".into(),
                "Workers Routes edit access is required for the reverse proxy domain".into(),
            ],
            _ => vec![format!("Grant the {} token the permissions it needs", provider)],
        };

        Self {
            action: format!("Grant the {} token more permissions", provider),
            steps,
            commands: vec![],
        }
    }

    /// Suggest checking connectivity
    pub fn check_network(provider: &str) -> Self {
        Self {
            action: format!("Check your connection to {}", provider),
            steps: vec![
                "The API could not be reached".into(),
                "Nothing was retried; re-run the command once the network is back".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest removing a directory left behind by an earlier run
    pub fn remove_directory(path: &Path) -> Self {
        Self {
            action: "Remove the existing directory or pick another name".into(),
            steps: vec![
                format!("{} already exists", path.display()),
                "A failed earlier run is not rolled back and may have left it behind".into(),
            ],
            commands: vec![format!("rm -rf {}", path.display())],
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}
