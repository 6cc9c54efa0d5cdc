// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! GitHub REST API

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use crypto_box::aead::OsRng;
use crypto_box::PublicKey;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::http::ApiClient;
use super::{GitProvider, RepoRef, Scope};
use crate::errors::{exists_or_not_found, RemoteError, RemoteResult};
use crate::reconcile::{self, Outcome, RemoteResource};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const PROVIDER: &str = "GitHub";

const HEADERS: &[(&str, &str)] = &[
    ("Accept", "application/vnd.github+json"),
    ("X-GitHub-Api-Version", "2022-11-28"),
];

/// Git provider backed by a GitHub organisation
#[derive(Debug, Clone)]
pub struct GitHubProvider {
    api: ApiClient,
}

#[derive(Debug, Deserialize)]
struct Membership {
    organization: Organization,
}

#[derive(Debug, Deserialize)]
struct Organization {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ActionsPublicKey {
    key_id: String,
    key: String,
}

impl GitHubProvider {
    pub fn with_base_url(token: &str, base_url: &str) -> Self {
        Self {
            api: ApiClient::new(PROVIDER, base_url, token, HEADERS),
        }
    }

    /// `/repos/{owner}/{repo}/actions` or `/repos/{owner}/{repo}/environments/{env}`
    fn scope_path(repo: &RepoRef, scope: &Scope) -> String {
        match scope {
            Scope::Repository => format!("/repos/{}/{}/actions", repo.owner, repo.name),
            Scope::Environment(env) => {
                format!("/repos/{}/{}/environments/{}", repo.owner, repo.name, env)
            }
        }
    }

    async fn probe(&self, path: &str) -> RemoteResult<bool> {
        let req = self.api.request(Method::GET, path);
        exists_or_not_found(self.api.send(req, path).await.map(drop))
    }

    async fn public_key(&self, repo: &RepoRef, scope: &Scope) -> RemoteResult<ActionsPublicKey> {
        let path = format!("{}/secrets/public-key", Self::scope_path(repo, scope));
        self.api
            .json(self.api.request(Method::GET, &path), &path)
            .await
    }
}

/// Encrypt `value` as a libsodium sealed box for the base64 `public_key`
pub fn seal_secret(public_key: &str, value: &str) -> RemoteResult<String> {
    let key_bytes = BASE64
        .decode(public_key)
        .map_err(|e| RemoteError::Encryption {
            message: format!("public key is not valid base64: {}", e),
        })?;
    let key: [u8; 32] = key_bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| RemoteError::Encryption {
            message: format!("public key must be 32 bytes, got {}", bytes.len()),
        })?;

    let sealed = PublicKey::from(key)
        .seal(&mut OsRng, value.as_bytes())
        .map_err(|e| RemoteError::Encryption {
            message: e.to_string(),
        })?;

    Ok(BASE64.encode(sealed))
}

#[async_trait]
impl GitProvider for GitHubProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn connect(&self, repository: &str) -> RemoteResult<RepoRef> {
        let path = "/user/memberships/orgs";
        let memberships: Vec<Membership> = self
            .api
            .json(self.api.request(Method::GET, path), path)
            .await?;

        let owner = memberships
            .into_iter()
            .next()
            .map(|m| m.organization.login)
            .ok_or_else(|| RemoteError::Rejected {
                provider: PROVIDER,
                message: "You do not have access to any organizations. Please try again with a different token.".into(),
            })?;

        tracing::debug!("Repository {} will be owned by {}", repository, owner);
        Ok(RepoRef::new(owner, repository))
    }

    async fn repository_exists(&self, repo: &RepoRef) -> RemoteResult<bool> {
        self.probe(&format!("/repos/{}/{}", repo.owner, repo.name))
            .await
            .map_err(|e| {
                if e.is_auth() {
                    e
                } else {
                    e.context("Failed to check repository")
                }
            })
    }

    async fn create_repository(&self, repo: &RepoRef) -> RemoteResult<String> {
        let path = format!("/orgs/{}/repos", repo.owner);
        let req = self
            .api
            .request(Method::POST, &path)
            .json(&json!({ "name": repo.name, "private": true }));

        self.api
            .execute(req, &path)
            .await
            .map_err(|e| e.context("Failed to create repository"))?;

        Ok(format!("https://github.com/{}/{}.git", repo.owner, repo.name))
    }

    async fn ensure_environment(&self, repo: &RepoRef, environment: &str) -> RemoteResult<Outcome> {
        let env = Environment {
            github: self,
            repo,
            name: environment,
        };
        Ok(reconcile::ensure(&env).await?.outcome)
    }

    async fn upsert_secret(
        &self,
        repo: &RepoRef,
        scope: &Scope,
        name: &str,
        value: &str,
    ) -> RemoteResult<Outcome> {
        let secret = Secret {
            github: self,
            repo,
            scope,
            name,
            value,
        };
        let outcome = secret
            .put()
            .await
            .map_err(|e| e.context(format!("Failed to add/update {}", secret.describe())))?;
        tracing::debug!("{} {}", secret.describe(), outcome);
        Ok(outcome)
    }

    async fn upsert_variable(
        &self,
        repo: &RepoRef,
        scope: &Scope,
        name: &str,
        value: &str,
    ) -> RemoteResult<Outcome> {
        let variable = Variable {
            github: self,
            repo,
            scope,
            name,
            value,
        };
        Ok(reconcile::upsert(&variable).await?.outcome)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reconciled resources
// ─────────────────────────────────────────────────────────────────────────────

struct Environment<'a> {
    github: &'a GitHubProvider,
    repo: &'a RepoRef,
    name: &'a str,
}

#[async_trait]
impl<'a> RemoteResource for Environment<'a> {
    type Id = ();

    fn describe(&self) -> String {
        format!("environment {}", self.name)
    }

    async fn lookup(&self) -> RemoteResult<Option<()>> {
        let path = GitHubProvider::scope_path(self.repo, &Scope::Environment(self.name.into()));
        Ok(self.github.probe(&path).await?.then_some(()))
    }

    async fn create(&self) -> RemoteResult<()> {
        let path = GitHubProvider::scope_path(self.repo, &Scope::Environment(self.name.into()));
        let api = &self.github.api;
        api.execute(api.request(Method::PUT, &path).json(&json!({})), &path)
            .await
            .map(drop)
    }

    async fn update(&self, _: ()) -> RemoteResult<()> {
        self.create().await
    }
}

struct Secret<'a> {
    github: &'a GitHubProvider,
    repo: &'a RepoRef,
    scope: &'a Scope,
    name: &'a str,
    value: &'a str,
}

impl Secret<'_> {
    fn path(&self) -> String {
        format!(
            "{}/secrets/{}",
            GitHubProvider::scope_path(self.repo, self.scope),
            self.name
        )
    }

    fn describe(&self) -> String {
        match self.scope {
            Scope::Repository => format!("secret {}", self.name),
            Scope::Environment(_) => format!("environment secret {}", self.name),
        }
    }

    /// The secrets PUT is create-or-update; its status tells which happened
    async fn put(&self) -> RemoteResult<Outcome> {
        let key = self.github.public_key(self.repo, self.scope).await?;
        let encrypted_value = seal_secret(&key.key, self.value)?;

        let path = self.path();
        let api = &self.github.api;
        let req = api.request(Method::PUT, &path).json(&json!({
            "encrypted_value": encrypted_value,
            "key_id": key.key_id,
        }));

        match api.execute(req, &path).await? {
            StatusCode::CREATED => Ok(Outcome::Created),
            _ => Ok(Outcome::Updated),
        }
    }
}

struct Variable<'a> {
    github: &'a GitHubProvider,
    repo: &'a RepoRef,
    scope: &'a Scope,
    name: &'a str,
    value: &'a str,
}

impl Variable<'_> {
    fn collection(&self) -> String {
        format!("{}/variables", GitHubProvider::scope_path(self.repo, self.scope))
    }
}

#[async_trait]
impl<'a> RemoteResource for Variable<'a> {
    type Id = ();

    fn describe(&self) -> String {
        match self.scope {
            Scope::Repository => format!("variable {}", self.name),
            Scope::Environment(_) => format!("environment variable {}", self.name),
        }
    }

    async fn lookup(&self) -> RemoteResult<Option<()>> {
        let path = format!("{}/{}", self.collection(), self.name);
        Ok(self.github.probe(&path).await?.then_some(()))
    }

    async fn create(&self) -> RemoteResult<()> {
        let path = self.collection();
        let api = &self.github.api;
        let req = api
            .request(Method::POST, &path)
            .json(&json!({ "name": self.name, "value": self.value }));
        api.execute(req, &path).await.map(drop)
    }

    async fn update(&self, _: ()) -> RemoteResult<()> {
        let path = format!("{}/{}", self.collection(), self.name);
        let api = &self.github.api;
        let req = api
            .request(Method::PATCH, &path)
            .json(&json!({ "name": self.name, "value": self.value }));
        api.execute(req, &path).await.map(drop)
    }
}
