// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! GitHub Actions workflow for Workers deployments

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

use crate::config::Boilerplate;
use crate::errors::{DankuError, DankuResult};

/// Location of the workflow inside the project
pub const WORKFLOW_PATH: &str = ".github/workflows/deploy-to-cloudflare.yml";

/// A workflow with a single deployment job
#[derive(Debug, Clone, Serialize)]
pub struct Workflow {
    pub name: String,
    pub on: Trigger,
    pub jobs: Jobs,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trigger {
    pub push: Push,
}

#[derive(Debug, Clone, Serialize)]
pub struct Push {
    pub branches: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Jobs {
    #[serde(rename = "build-and-deploy")]
    pub build_and_deploy: Job,
}

#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub environment: String,
    pub name: String,
    #[serde(rename = "runs-on")]
    pub runs_on: String,
    pub steps: Vec<WorkflowStep>,
}

/// One job step; `uses` and `run` are mutually exclusive in practice
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkflowStep {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
    #[serde(skip_serializing_if = "Mapping::is_empty")]
    pub env: Mapping,
    #[serde(rename = "with", skip_serializing_if = "Mapping::is_empty")]
    pub with: Mapping,
}

impl WorkflowStep {
    pub fn uses(name: &str, action: &str) -> Self {
        Self {
            name: name.into(),
            uses: Some(action.into()),
            ..Default::default()
        }
    }

    pub fn run(name: &str, command: &str) -> Self {
        Self {
            name: name.into(),
            run: Some(command.into()),
            ..Default::default()
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.with.insert(key.into(), value.into());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

fn var(name: &str) -> String {
    format!("${{{{ vars.{} }}}}", name)
}

fn secret(name: &str) -> String {
    format!("${{{{ secrets.{} }}}}", name)
}

fn wrangler_action(name: &str) -> WorkflowStep {
    WorkflowStep::uses(name, "cloudflare/wrangler-action@v3")
        .with("accountId", var("CLOUDFLARE_ACCOUNT_ID"))
        .with("apiToken", secret("CLOUDFLARE_API_TOKEN"))
}

/// Build-and-deploy workflow for `project`.
///
/// The build step receives the environment the selected boilerplate reads at
/// build time; the SaaS boilerplate also applies D1 migrations.
pub fn deploy_to_cloudflare(project: &str, boilerplate: Option<&Boilerplate>) -> Workflow {
    let build = WorkflowStep::run("Build project", "pnpm run build");
    let build = match boilerplate {
        None => build,
        Some(Boilerplate::Marketing(_)) => build
            .env("PUBLIC_BASE_URL", &var("BASE_URL"))
            .env("PUBLIC_POSTHOG_API_KEY", &var("POSTHOG_API_KEY")),
        Some(Boilerplate::SaasFs(_)) => build
            .env("AUTH_SECRET", &secret("AUTH_SECRET"))
            .env("PUBLIC_BASE_URL", &var("BASE_URL"))
            .env("PUBLIC_POSTHOG_API_KEY", &var("POSTHOG_API_KEY"))
            .env("PUBLIC_STRIPE_PUBLISHABLE_KEY", &var("STRIPE_PUBLISHABLE_KEY"))
            .env("STRIPE_SECRET_KEY", &secret("STRIPE_SECRET_KEY"))
            .env("STRIPE_WEBHOOK_SECRET", &secret("STRIPE_WEBHOOK_SECRET")),
    };

    let mut steps = vec![
        WorkflowStep::uses("Checkout", "actions/checkout@v4"),
        WorkflowStep::uses("Setup pnpm", "pnpm/action-setup@v4").with("version", 10),
        WorkflowStep::uses("Setup Node.js environment", "actions/setup-node@v4")
            .with("cache", "pnpm")
            .with("node-version", 22),
        WorkflowStep::run("Install dependencies", "pnpm install"),
        build,
        wrangler_action("Deploy to Cloudflare Workers with Wrangler").with("packageManager", "pnpm"),
    ];

    if let Some(Boilerplate::SaasFs(_)) = boilerplate {
        steps.push(
            wrangler_action("Run D1 Migrations with Wrangler")
                .with("command", format!("d1 migrations apply {} --remote", project)),
        );
    }

    Workflow {
        name: "Deploy to Cloudflare Workers".into(),
        on: Trigger {
            push: Push {
                branches: vec!["main".into()],
            },
        },
        jobs: Jobs {
            build_and_deploy: Job {
                environment: "Production".into(),
                name: "Build and Deploy to Production".into(),
                runs_on: "ubuntu-latest".into(),
                steps,
            },
        },
    }
}

impl Workflow {
    pub fn to_yaml(&self) -> DankuResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write to [`WORKFLOW_PATH`] under `project_dir`
    pub fn write(&self, project_dir: &Path) -> DankuResult<PathBuf> {
        let path = project_dir.join(WORKFLOW_PATH);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DankuError::write_error(parent, e))?;
        }
        std::fs::write(&path, self.to_yaml()?).map_err(|e| DankuError::write_error(&path, e))?;
        Ok(path)
    }
}
