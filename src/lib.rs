// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! # danku - SvelteKit project scaffolding
//!
//! `danku` creates a SvelteKit project with the `sv` generator, layers a
//! boilerplate over it, provisions the git repository, CI secrets and
//! Cloudflare resources it needs, and pushes the initial commit.
//!
//! ## Quick Start
//!
//! ```bash
//! # Write the configuration and fill in the tokens
//! danku config init
//!
//! # Create, provision and push a project
//! danku new my-site
//!
//! # Add analytics to an existing project
//! danku module analytics
//! ```
//!
//! Remote provisioning is idempotent. Variables, environments, databases and
//! the proxy worker go through [`reconcile::ensure`] or [`reconcile::upsert`];
//! secrets use GitHub's create-or-update PUT directly.

pub mod cli;
pub mod config;
pub mod errors;
pub mod materializer;
pub mod process;
pub mod providers;
pub mod reconcile;
pub mod utils;

pub use config::Config;
pub use errors::{DankuError, DankuResult, RemoteError};
pub use providers::{DeploymentTarget, GitProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
