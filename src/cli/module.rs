// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! Module commands - add features to an existing SvelteKit project

use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::errors::{DankuError, DankuResult};
use crate::materializer::{self, patch_file, templates, Patch, TemplateRegistry};
use crate::process::CommandRunner;
use crate::providers::GitProvider;
use crate::reconcile::provision_env_variable;
use crate::utils::{print_info, print_success};

const SCRIPT_OPEN: &str = "<script lang=\"ts\">";
const SCRIPT_CLOSE: &str = "</script>";
const LAYOUT: &str = "src/routes/+layout.svelte";

const SEO_IMPORTS: &str =
    "\n\timport { PUBLIC_BASE_URL } from '$env/static/public';\n\timport { page } from '$app/state';";

const SEO_HEAD: &str = "\n\n<svelte:head>
\t<meta property=\"og:url\" content={PUBLIC_BASE_URL + page.url.pathname} />
\t<link rel=\"canonical\" href={PUBLIC_BASE_URL + page.url.pathname} />
\t<meta property=\"og:description\" content={page.data.description} />
\t<meta property=\"og:image\" content={PUBLIC_BASE_URL + '/og.png'} />
\t<meta name=\"description\" content={page.data.description} />
\t<meta property=\"og:title\" content={page.data.title} />
\t<meta property=\"og:type\" content=\"website\" />
\t<title>{page.data.title}</title>
</svelte:head>";

const ANALYTICS_IMPORTS: &str = "
  import { beforeNavigate, afterNavigate } from '$app/navigation';
  import { browser, dev } from '$app/environment';
  import posthog from 'posthog-js';";

const ANALYTICS_CAPTURE: &str = "
  if (browser && !dev) {
    beforeNavigate(() => posthog.capture('$pageleave'));
    afterNavigate(() => posthog.capture('$pageview'));
  }
";

/// A project whose `package.json` lists `@sveltejs/kit` as a dev dependency
pub fn is_sveltekit_project(dir: &Path) -> bool {
    materializer::read_json(&dir.join("package.json"))
        .map(|package| !package["devDependencies"]["@sveltejs/kit"].is_null())
        .unwrap_or(false)
}

fn require_sveltekit_project(dir: &Path) -> DankuResult<()> {
    if is_sveltekit_project(dir) {
        Ok(())
    } else {
        Err(DankuError::NotSvelteKitProject {
            path: dir.to_path_buf(),
        })
    }
}

fn require_layout(dir: &Path) -> DankuResult<PathBuf> {
    let layout = dir.join(LAYOUT);
    if layout.exists() {
        Ok(layout)
    } else {
        Err(DankuError::FileNotFound {
            path: layout,
            help: Some(format!("Could not find layout file at {}", LAYOUT)),
        })
    }
}

/// Site URL from the route pattern in `wrangler.jsonc`
fn site_url(dir: &Path) -> DankuResult<String> {
    let wrangler = dir.join("wrangler.jsonc");
    if !wrangler.exists() {
        return Err(DankuError::FileNotFound {
            path: wrangler,
            help: Some("Could not find wrangler.jsonc file".into()),
        });
    }

    let config = materializer::read_json(&wrangler)?;
    match config["routes"][0]["pattern"].as_str() {
        Some(pattern) if !pattern.is_empty() => Ok(format!("https://{}", pattern)),
        _ => Err(DankuError::EditFailed {
            path: wrangler,
            reason: "routes[0].pattern is not set".into(),
        }),
    }
}

/// Create or update the marketing module in the project at `dir`.
///
/// The repository is the one named after the project directory; it has to
/// exist already because the base URL is stored on it.
pub async fn apply_marketing(git: &dyn GitProvider, dir: &Path) -> DankuResult<()> {
    require_sveltekit_project(dir)?;
    let url = site_url(dir)?;
    let layout = require_layout(dir)?;

    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| DankuError::InvalidProjectName {
            name: dir.display().to_string(),
            reason: "the project directory has no name".into(),
        })?;

    let repo = git.connect(&name).await?;
    if !git.repository_exists(&repo).await? {
        return Err(DankuError::RepositoryMissing { name });
    }

    println!("{} Creating or updating the marketing module", "DANKU🧊".bold());

    let outcome =
        provision_env_variable(git, &repo, dir, "BASE_URL", "http://localhost:5173", &url).await?;
    tracing::info!("BASE_URL variable {}", outcome);

    TemplateRegistry::new().copy(templates::MARKETING, dir)?;
    print_info("Copied the marketing template");

    patch_file(
        &layout,
        &[
            Patch::after(SCRIPT_OPEN, SEO_IMPORTS),
            Patch::after(SCRIPT_CLOSE, SEO_HEAD),
        ],
    )?;

    println!(
        "{} Successfully created or updated the marketing module",
        "DANKU✅".bold()
    );
    Ok(())
}

/// Add PostHog page-view tracking to the project at `dir`
pub async fn apply_analytics(runner: &dyn CommandRunner, dir: &Path) -> DankuResult<()> {
    require_sveltekit_project(dir)?;
    let layout = require_layout(dir)?;

    runner.run("pnpm", &["add", "posthog-js"], dir).await?;
    TemplateRegistry::new().copy(templates::POSTHOG, dir)?;

    let report = patch_file(
        &layout,
        &[
            Patch::after(SCRIPT_OPEN, ANALYTICS_IMPORTS),
            Patch::before(SCRIPT_CLOSE, ANALYTICS_CAPTURE),
        ],
    )?;
    tracing::debug!("Analytics layout patches: {:?}", report);

    print_success("Analytics module applied successfully");
    Ok(())
}
