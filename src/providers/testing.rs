// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! In-memory providers for tests

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use url::Url;

use super::{DeploymentTarget, GitProvider, RepoRef, Scope, TargetSession};
use crate::errors::RemoteResult;
use crate::reconcile::{Outcome, Reconciled};

pub(crate) const OWNER: &str = "acme-org";
pub(crate) const DATABASE_ID: &str = "6f1c1f7e-1f0a-4c7e-9d0e-2b1a0c9d8e7f";

fn scope_key(scope: &Scope) -> String {
    match scope {
        Scope::Repository => "repository".to_string(),
        Scope::Environment(env) => env.clone(),
    }
}

#[derive(Default)]
struct GitState {
    repositories: BTreeSet<String>,
    environments: BTreeSet<String>,
    secrets: BTreeMap<(String, String), String>,
    variables: BTreeMap<(String, String), String>,
    calls: Vec<String>,
}

/// Git host that remembers everything it was asked to store
#[derive(Default)]
pub(crate) struct FakeGit {
    state: Mutex<GitState>,
}

impl FakeGit {
    pub fn with_repository(name: &str) -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().repositories.insert(name.to_string());
        fake
    }

    pub fn variable(&self, env: &str, name: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.variables.get(&(env.to_string(), name.to_string())).cloned()
    }

    pub fn secret(&self, env: &str, name: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.secrets.get(&(env.to_string(), name.to_string())).cloned()
    }

    pub fn repo_variable(&self, name: &str) -> Option<String> {
        self.variable("repository", name)
    }

    pub fn repo_secret(&self, name: &str) -> Option<String> {
        self.secret("repository", name)
    }

    pub fn has_environment(&self, env: &str) -> bool {
        self.state.lock().unwrap().environments.contains(env)
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

fn upsert(map: &mut BTreeMap<(String, String), String>, key: (String, String), value: &str) -> Outcome {
    match map.insert(key, value.to_string()) {
        Some(_) => Outcome::Updated,
        None => Outcome::Created,
    }
}

#[async_trait]
impl GitProvider for FakeGit {
    fn name(&self) -> &'static str {
        "FakeGit"
    }

    async fn connect(&self, repository: &str) -> RemoteResult<RepoRef> {
        self.record(format!("connect {}", repository));
        Ok(RepoRef::new(OWNER, repository))
    }

    async fn repository_exists(&self, repo: &RepoRef) -> RemoteResult<bool> {
        self.record(format!("repository_exists {}", repo));
        Ok(self.state.lock().unwrap().repositories.contains(&repo.name))
    }

    async fn create_repository(&self, repo: &RepoRef) -> RemoteResult<String> {
        self.record(format!("create_repository {}", repo));
        self.state.lock().unwrap().repositories.insert(repo.name.clone());
        Ok(format!("https://github.com/{}.git", repo))
    }

    async fn ensure_environment(&self, repo: &RepoRef, environment: &str) -> RemoteResult<Outcome> {
        self.record(format!("ensure_environment {} {}", repo, environment));
        let created = self.state.lock().unwrap().environments.insert(environment.to_string());
        Ok(if created { Outcome::Created } else { Outcome::AlreadyExists })
    }

    async fn upsert_secret(
        &self,
        _repo: &RepoRef,
        scope: &Scope,
        name: &str,
        value: &str,
    ) -> RemoteResult<Outcome> {
        self.record(format!("upsert_secret {} {}", scope_key(scope), name));
        let mut state = self.state.lock().unwrap();
        Ok(upsert(&mut state.secrets, (scope_key(scope), name.to_string()), value))
    }

    async fn upsert_variable(
        &self,
        _repo: &RepoRef,
        scope: &Scope,
        name: &str,
        value: &str,
    ) -> RemoteResult<Outcome> {
        self.record(format!("upsert_variable {} {}", scope_key(scope), name));
        let mut state = self.state.lock().unwrap();
        Ok(upsert(&mut state.variables, (scope_key(scope), name.to_string()), value))
    }
}

#[derive(Default)]
struct TargetState {
    resources: BTreeSet<String>,
    databases: BTreeMap<String, String>,
    calls: Vec<String>,
}

/// Deployment target serving `my-cute-website.com`
pub(crate) struct FakeTarget {
    domain: String,
    state: Mutex<TargetState>,
}

impl Default for FakeTarget {
    fn default() -> Self {
        Self {
            domain: "my-cute-website.com".into(),
            state: Mutex::default(),
        }
    }
}

impl FakeTarget {
    pub fn with_resource(name: &str) -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().resources.insert(name.to_string());
        fake
    }

    pub fn database(&self, name: &str) -> Option<String> {
        self.state.lock().unwrap().databases.get(name).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl DeploymentTarget for FakeTarget {
    fn name(&self) -> &'static str {
        "FakeTarget"
    }

    async fn verify(&self) -> RemoteResult<TargetSession> {
        self.record("verify".to_string());
        Ok(TargetSession {
            zone_id: "zone-1".into(),
            domain: self.domain.clone(),
        })
    }

    async fn resource_exists(&self, _session: &TargetSession, name: &str) -> RemoteResult<bool> {
        self.record(format!("resource_exists {}", name));
        let state = self.state.lock().unwrap();
        Ok(state.resources.contains(name) || state.databases.contains_key(name))
    }

    async fn ensure_database(
        &self,
        _session: &TargetSession,
        name: &str,
    ) -> RemoteResult<Reconciled<String>> {
        self.record(format!("ensure_database {}", name));
        let mut state = self.state.lock().unwrap();
        if let Some(id) = state.databases.get(name) {
            return Ok(Reconciled {
                outcome: Outcome::AlreadyExists,
                value: id.clone(),
            });
        }
        state.databases.insert(name.to_string(), DATABASE_ID.to_string());
        Ok(Reconciled {
            outcome: Outcome::Created,
            value: DATABASE_ID.to_string(),
        })
    }

    async fn deploy_reverse_proxy(&self, session: &TargetSession) -> RemoteResult<Url> {
        self.record("deploy_reverse_proxy".to_string());
        Ok(Url::parse(&format!("https://a.{}/", session.domain)).unwrap())
    }
}
