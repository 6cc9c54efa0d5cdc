// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! Environment values that live both in CI and in the local `.env`

use std::path::Path;

use super::Outcome;
use crate::errors::DankuResult;
use crate::materializer::env_file;
use crate::providers::{GitProvider, RepoRef, Scope};

/// Deployment environment every value is attached to
pub const PRODUCTION: &str = "Production";

/// Push `prod` as a `Production` environment secret and mirror `dev` into
/// `<project_dir>/.env` under the same key.
pub async fn provision_env_secret(
    git: &dyn GitProvider,
    repo: &RepoRef,
    project_dir: &Path,
    key: &str,
    dev: &str,
    prod: &str,
) -> DankuResult<Outcome> {
    git.ensure_environment(repo, PRODUCTION).await?;
    let outcome = git
        .upsert_secret(repo, &Scope::Environment(PRODUCTION.into()), key, prod)
        .await?;

    env_file::upsert(&project_dir.join(".env"), key, dev)?;
    Ok(outcome)
}

/// Push `prod` as a `Production` environment variable and mirror `dev` into
/// `.env` as `PUBLIC_<key>`, the prefix SvelteKit exposes to the browser.
pub async fn provision_env_variable(
    git: &dyn GitProvider,
    repo: &RepoRef,
    project_dir: &Path,
    key: &str,
    dev: &str,
    prod: &str,
) -> DankuResult<Outcome> {
    git.ensure_environment(repo, PRODUCTION).await?;
    let outcome = git
        .upsert_variable(repo, &Scope::Environment(PRODUCTION.into()), key, prod)
        .await?;

    env_file::upsert(&project_dir.join(".env"), &format!("PUBLIC_{}", key), dev)?;
    Ok(outcome)
}
