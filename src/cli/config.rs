// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! Config command - locate, bootstrap and check the configuration file

use colored::Colorize;
use std::path::Path;

use super::ConfigAction;
use crate::config::{self, Boilerplate, DeploymentTargetConfig, GitProviderConfig};
use crate::errors::DankuResult;
use crate::utils::{print_bullet, print_success};

/// Run the config command
pub fn run(action: &ConfigAction, path: &Path) -> DankuResult<()> {
    match action {
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigAction::Init { force } => {
            config::write_default(path, *force)?;
            print_success(&format!("Wrote {}", path.display()));
            println!();
            println!("Next steps:");
            println!("  1. Fill in the tokens and keys in {}", path.display().to_string().cyan());
            println!("  2. Run {} to validate it", "danku config check".cyan());
            Ok(())
        }
        ConfigAction::Check => check(path),
    }
}

fn check(path: &Path) -> DankuResult<()> {
    let config = config::load(path)?;

    print_success(&format!("{} is valid", path.display()));

    let boilerplate = config.boilerplate.as_ref().map_or("none", Boilerplate::name);
    let target = match &config.deployment_target {
        DeploymentTargetConfig::CloudFlare(cf) => format!("Cloudflare ({})", cf.url),
    };
    let git = match &config.git_provider {
        GitProviderConfig::GitHub(_) => "GitHub",
    };

    print_bullet(&format!("Boilerplate: {}", boilerplate));
    print_bullet(&format!("Deployment target: {}", target));
    print_bullet(&format!("Git provider: {}", git));
    Ok(())
}
