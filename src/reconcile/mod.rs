// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! Idempotent reconciliation of remote resources
//!
//! Named things danku provisions (variables, environments, databases, the
//! reverse-proxy script) are described as a [`RemoteResource`]
//! and driven through [`ensure`] or [`upsert`]. The provider only has to say
//! how to look the resource up, create it and update it.

mod mirror;

pub use mirror::{provision_env_secret, provision_env_variable, PRODUCTION};

use async_trait::async_trait;
use std::fmt;

use crate::errors::RemoteResult;

/// What reconciliation did to the remote side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    AlreadyExists,
    Created,
    Updated,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::AlreadyExists => write!(f, "already exists"),
            Outcome::Created => write!(f, "created"),
            Outcome::Updated => write!(f, "updated"),
        }
    }
}

/// Outcome plus whatever identifies the resource afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled<T> {
    pub outcome: Outcome,
    pub value: T,
}

/// A single named resource on a remote provider
#[async_trait]
pub trait RemoteResource: Send + Sync {
    /// Identifier handed back after lookup or creation (e.g. a database id)
    type Id: Send;

    /// Human-readable kind and name, used in error messages
    fn describe(&self) -> String;

    /// Existence check. A 404 from the provider must come back as `Ok(None)`.
    async fn lookup(&self) -> RemoteResult<Option<Self::Id>>;

    async fn create(&self) -> RemoteResult<Self::Id>;

    async fn update(&self, existing: Self::Id) -> RemoteResult<Self::Id>;
}

/// Create the resource unless it already exists
pub async fn ensure<R: RemoteResource + ?Sized>(resource: &R) -> RemoteResult<Reconciled<R::Id>> {
    let what = resource.describe();

    if let Some(id) = resource
        .lookup()
        .await
        .map_err(|e| e.context(format!("Failed to check {}", what)))?
    {
        tracing::debug!("{} already exists", what);
        return Ok(Reconciled {
            outcome: Outcome::AlreadyExists,
            value: id,
        });
    }

    let id = resource
        .create()
        .await
        .map_err(|e| e.context(format!("Failed to create {}", what)))?;
    tracing::debug!("{} created", what);

    Ok(Reconciled {
        outcome: Outcome::Created,
        value: id,
    })
}

/// Create the resource, or update it in place when it already exists
pub async fn upsert<R: RemoteResource + ?Sized>(resource: &R) -> RemoteResult<Reconciled<R::Id>> {
    let what = resource.describe();
    let failed = |e: crate::errors::RemoteError| e.context(format!("Failed to add/update {}", what));

    let existing = resource.lookup().await.map_err(failed)?;
    let (outcome, id) = match existing {
        Some(id) => (Outcome::Updated, resource.update(id).await.map_err(failed)?),
        None => (Outcome::Created, resource.create().await.map_err(failed)?),
    };
    tracing::debug!("{} {}", what, outcome);

    Ok(Reconciled { outcome, value: id })
}
