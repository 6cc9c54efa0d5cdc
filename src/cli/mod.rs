// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! CLI command definitions and handlers

pub mod config;
pub mod module;
pub mod new;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::errors::DankuResult;
use crate::process::SystemRunner;
use crate::providers::{self, Endpoints};

/// SvelteKit project scaffolding with GitHub and Cloudflare provisioning
#[derive(Parser, Debug)]
#[clap(
    name = "danku",
    version,
    about = "Scaffold, provision and push SvelteKit projects",
    long_about = None,
    after_help = "Examples:\n\
        danku config init               Write the commented configuration file\n\
        danku config check              Validate the configuration\n\
        danku new my-site               Create, provision and push my-site\n\
        danku module analytics          Add PostHog to the current project\n\n\
        See 'danku <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Configuration file (default: ~/.danku/cli/node/config.jsonc)
    #[clap(long, global = true, env = "DANKU_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    #[clap(long, global = true, hide = true, env = "DANKU_GITHUB_API_URL")]
    pub github_api_url: Option<String>,

    #[clap(long, global = true, hide = true, env = "DANKU_CLOUDFLARE_API_URL")]
    pub cloudflare_api_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, provision and push a new SvelteKit project
    New {
        /// Name of the project, its repository and its worker
        name: String,
    },

    /// Apply a module to the SvelteKit project in the current directory
    Module {
        #[clap(subcommand)]
        module: ModuleKind,
    },

    /// Configuration file management
    Config {
        #[clap(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// SEO head tags, sitemap, robots.txt and the BASE_URL variable
    Marketing,
    /// PostHog page view and page leave capture
    Analytics,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the configuration file location
    Path,
    /// Write the commented default configuration
    Init {
        /// Overwrite an existing file
        #[clap(short, long)]
        force: bool,
    },
    /// Load and validate the configuration
    Check,
}

impl Cli {
    pub fn config_path(&self) -> DankuResult<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => crate::config::default_config_path(),
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        let defaults = Endpoints::default();
        Endpoints {
            github: self.github_api_url.clone().unwrap_or(defaults.github),
            cloudflare: self.cloudflare_api_url.clone().unwrap_or(defaults.cloudflare),
        }
    }
}

/// Dispatch a parsed command line
pub async fn execute(cli: &Cli) -> DankuResult<()> {
    let config_path = cli.config_path()?;
    let runner = SystemRunner;

    match &cli.command {
        Commands::Config { action } => config::run(action, &config_path),
        Commands::New { name } => {
            let config = crate::config::load(&config_path)?;
            let endpoints = cli.endpoints();
            let git = providers::git_provider(&config.git_provider, &endpoints);
            let target = providers::deployment_target(&config.deployment_target, &endpoints);

            new::run(&config, git.as_ref(), target.as_ref(), &runner, name).await
        }
        Commands::Module {
            module: ModuleKind::Marketing,
        } => {
            let config = crate::config::load(&config_path)?;
            let git = providers::git_provider(&config.git_provider, &cli.endpoints());
            module::apply_marketing(git.as_ref(), &std::env::current_dir()?).await
        }
        Commands::Module {
            module: ModuleKind::Analytics,
        } => module::apply_analytics(&runner, &std::env::current_dir()?).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_new_with_config_override() {
        let cli = Cli::try_parse_from(["danku", "--config", "/tmp/c.jsonc", "new", "acme"]).unwrap();

        assert_eq!(cli.config_path().unwrap(), PathBuf::from("/tmp/c.jsonc"));
        assert!(matches!(cli.command, Commands::New { ref name } if name == "acme"));
    }

    #[test]
    fn test_endpoint_overrides() {
        let cli = Cli::try_parse_from([
            "danku",
            "--github-api-url",
            "http://127.0.0.1:9000",
            "module",
            "analytics",
        ])
        .unwrap();

        let endpoints = cli.endpoints();
        assert_eq!(endpoints.github, "http://127.0.0.1:9000");
        assert_eq!(endpoints.cloudflare, Endpoints::default().cloudflare);
    }
}
