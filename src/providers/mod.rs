// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! Remote providers
//!
//! A git host implements [`GitProvider`] and a hosting platform implements
//! [`DeploymentTarget`]. The validated configuration decides which
//! implementation is built; nothing downstream looks at provider names.
//!
//! Authentication state is explicit: `connect` and `verify` return the
//! resolved owner or zone, and every later call takes it as an argument.

pub mod cloudflare;
pub mod github;
mod http;

#[cfg(test)]
pub(crate) mod testing;

pub use cloudflare::CloudflareTarget;
pub use github::GitHubProvider;

use async_trait::async_trait;
use std::fmt;
use url::Url;

use crate::config::{DeploymentTargetConfig, GitProviderConfig};
use crate::errors::RemoteResult;
use crate::reconcile::{Outcome, Reconciled};

/// Where CI secrets and variables are stored
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Visible to every workflow in the repository
    Repository,
    /// Visible only to jobs running in the named deployment environment
    Environment(String),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Repository => write!(f, "repository"),
            Scope::Environment(env) => write!(f, "{} environment", env),
        }
    }
}

/// A repository on the git host, with its resolved owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A verified deployment account and the DNS zone serving the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSession {
    pub zone_id: String,
    /// Registrable domain of the site URL (`example.co.uk` for `www.example.co.uk`)
    pub domain: String,
}

/// Git hosting capability
#[async_trait]
pub trait GitProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Validate the token and resolve who will own `repository`
    async fn connect(&self, repository: &str) -> RemoteResult<RepoRef>;

    async fn repository_exists(&self, repo: &RepoRef) -> RemoteResult<bool>;

    /// Create a private repository and return its clone URL
    async fn create_repository(&self, repo: &RepoRef) -> RemoteResult<String>;

    async fn ensure_environment(&self, repo: &RepoRef, environment: &str) -> RemoteResult<Outcome>;

    async fn upsert_secret(
        &self,
        repo: &RepoRef,
        scope: &Scope,
        name: &str,
        value: &str,
    ) -> RemoteResult<Outcome>;

    async fn upsert_variable(
        &self,
        repo: &RepoRef,
        scope: &Scope,
        name: &str,
        value: &str,
    ) -> RemoteResult<Outcome>;
}

/// Hosting platform capability
#[async_trait]
pub trait DeploymentTarget: Send + Sync {
    fn name(&self) -> &'static str;

    /// Check the credentials and find the zone serving the site URL
    async fn verify(&self) -> RemoteResult<TargetSession>;

    /// Whether a worker script or database called `name` already exists
    async fn resource_exists(&self, session: &TargetSession, name: &str) -> RemoteResult<bool>;

    /// Create the project database unless present; the value is its id
    async fn ensure_database(
        &self,
        session: &TargetSession,
        name: &str,
    ) -> RemoteResult<Reconciled<String>>;

    /// Deploy the analytics reverse proxy and return the URL it answers on
    async fn deploy_reverse_proxy(&self, session: &TargetSession) -> RemoteResult<Url>;
}

/// Base URLs of the provider APIs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub github: String,
    pub cloudflare: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            github: github::DEFAULT_API_URL.to_string(),
            cloudflare: cloudflare::DEFAULT_API_URL.to_string(),
        }
    }
}

/// Build the git provider selected by the configuration
pub fn git_provider(config: &GitProviderConfig, endpoints: &Endpoints) -> Box<dyn GitProvider> {
    match config {
        GitProviderConfig::GitHub(gh) => {
            Box::new(GitHubProvider::with_base_url(&gh.token, &endpoints.github))
        }
    }
}

/// Build the deployment target selected by the configuration
pub fn deployment_target(
    config: &DeploymentTargetConfig,
    endpoints: &Endpoints,
) -> Box<dyn DeploymentTarget> {
    match config {
        DeploymentTargetConfig::CloudFlare(cf) => Box::new(CloudflareTarget::with_base_url(
            &cf.account_id,
            &cf.token,
            cf.url.clone(),
            &endpoints.cloudflare,
        )),
    }
}
