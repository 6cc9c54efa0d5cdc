// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! Run configuration
//!
//! The configuration file is JSONC and deliberately loose (everything is an
//! optional key so the commented template parses). Validation turns it into
//! [`Config`], where "exactly one deployment target" and "exactly one git
//! provider" are encoded in the types rather than checked again later.

mod loader;

pub use loader::{default_config_path, load, load_from, write_default, DEFAULT_CONFIG};

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use url::Url;

/// Validated configuration for a single command invocation
#[derive(Debug, Clone)]
pub struct Config {
    pub boilerplate: Option<Boilerplate>,
    pub deployment_target: DeploymentTargetConfig,
    pub git_provider: GitProviderConfig,
}

/// Starter bundle layered over the generated project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Boilerplate {
    Marketing(MarketingConfig),
    SaasFs(SaasFsConfig),
}

impl Boilerplate {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Marketing(_) => "marketing",
            Self::SaasFs(_) => "saasFs",
        }
    }

    /// PostHog project key, shared by both boilerplates
    pub fn post_hog_api_key(&self) -> Option<&str> {
        match self {
            Self::Marketing(m) => m.post_hog_api_key.as_deref(),
            Self::SaasFs(s) => s.post_hog_api_key.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MarketingConfig {
    #[serde(default)]
    pub post_hog_api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SaasFsConfig {
    pub stripe_publishable_key: String,
    pub stripe_publishable_key_dev: String,
    pub stripe_secret_key: String,
    pub stripe_secret_key_dev: String,
    pub stripe_webhook_secret: String,
    #[serde(default)]
    pub post_hog_api_key: Option<String>,
}

/// Where the generated project is deployed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentTargetConfig {
    CloudFlare(CloudFlareConfig),
}

impl DeploymentTargetConfig {
    /// Public URL of the deployed site
    pub fn url(&self) -> &Url {
        match self {
            Self::CloudFlare(cf) => &cf.url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudFlareConfig {
    pub account_id: String,
    pub token: String,
    pub url: Url,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawCloudFlare {
    account_id: String,
    token: String,
    url: String,
}

/// Which host the repository lives on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitProviderConfig {
    GitHub(GitHubConfig),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitHubConfig {
    pub token: String,
}

fn site_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https://(www\.)?[\w-]+(\.[\w-]+)+.*[^/]$").expect("valid site URL regex")
    })
}

impl Config {
    /// Validate a parsed configuration document.
    ///
    /// Every violation is collected as a `path: message` string.
    pub fn from_value(value: &Value) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();

        let Some(root) = value.as_object() else {
            return Err(vec!["(root): must be an object".to_string()]);
        };

        let boilerplate = section(root, "boilerplate", &mut errors)
            .and_then(|s| validate_boilerplate(s, &mut errors));
        let deployment_target = section(root, "deploymentTarget", &mut errors)
            .and_then(|s| validate_deployment_target(s, &mut errors));
        let git_provider = section(root, "gitProvider", &mut errors)
            .and_then(|s| validate_git_provider(s, &mut errors));

        match (boilerplate, deployment_target, git_provider) {
            (Some(boilerplate), Some(deployment_target), Some(git_provider)) if errors.is_empty() => {
                Ok(Self {
                    boilerplate,
                    deployment_target,
                    git_provider,
                })
            }
            _ => Err(errors),
        }
    }

    /// The SaaS boilerplate settings, when that boilerplate is selected
    pub fn saas_fs(&self) -> Option<&SaasFsConfig> {
        match &self.boilerplate {
            Some(Boilerplate::SaasFs(s)) => Some(s),
            _ => None,
        }
    }
}

fn section<'a>(
    root: &'a Map<String, Value>,
    name: &str,
    errors: &mut Vec<String>,
) -> Option<&'a Map<String, Value>> {
    match root.get(name) {
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            errors.push(format!("{}: must be an object", name));
            None
        }
        None => {
            errors.push(format!("{}: must be present", name));
            None
        }
    }
}

/// Deserialize one provider entry, recording serde errors under `path`
fn entry<T: DeserializeOwned>(value: &Value, path: &str, errors: &mut Vec<String>) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            errors.push(format!("{}: {}", path, e));
            None
        }
    }
}

fn require_non_empty(path: &str, field: &str, value: &str, errors: &mut Vec<String>) {
    if value.is_empty() {
        errors.push(format!("{}.{}: must be non-empty", path, field));
    }
}

/// Keys that are set (a `null` value counts as absent)
fn configured<'a>(map: &'a Map<String, Value>) -> Vec<(&'a String, &'a Value)> {
    map.iter().filter(|(_, v)| !v.is_null()).collect()
}

fn validate_boilerplate(
    map: &Map<String, Value>,
    errors: &mut Vec<String>,
) -> Option<Option<Boilerplate>> {
    let entries = configured(map);
    if entries.len() > 1 {
        errors.push("boilerplate: Only one boilerplate can be configured at a time".into());
        return None;
    }

    let Some((kind, value)) = entries.first() else {
        return Some(None);
    };

    match kind.as_str() {
        "marketing" => {
            entry::<MarketingConfig>(value, "boilerplate.marketing", errors)
                .map(|m| Some(Boilerplate::Marketing(m)))
        }
        "saasFs" => {
            let saas: SaasFsConfig = entry(value, "boilerplate.saasFs", errors)?;
            let before = errors.len();
            for (field, v) in [
                ("stripePublishableKey", &saas.stripe_publishable_key),
                ("stripePublishableKeyDev", &saas.stripe_publishable_key_dev),
                ("stripeSecretKey", &saas.stripe_secret_key),
                ("stripeSecretKeyDev", &saas.stripe_secret_key_dev),
                ("stripeWebhookSecret", &saas.stripe_webhook_secret),
            ] {
                require_non_empty("boilerplate.saasFs", field, v, errors);
            }
            (errors.len() == before).then_some(Some(Boilerplate::SaasFs(saas)))
        }
        other => {
            errors.push(format!("boilerplate.{}: unknown boilerplate", other));
            None
        }
    }
}

fn validate_deployment_target(
    map: &Map<String, Value>,
    errors: &mut Vec<String>,
) -> Option<DeploymentTargetConfig> {
    let entries = configured(map);
    match entries.len() {
        0 => {
            errors.push("deploymentTarget: At least one target platform must be configured".into());
            return None;
        }
        1 => {}
        _ => {
            errors.push("deploymentTarget: Only one target platform can be configured at a time".into());
            return None;
        }
    }

    let (kind, value) = entries[0];
    match kind.as_str() {
        "cloudFlare" => {
            let path = "deploymentTarget.cloudFlare";
            let raw: RawCloudFlare = entry(value, path, errors)?;
            let before = errors.len();
            require_non_empty(path, "accountId", &raw.account_id, errors);
            require_non_empty(path, "token", &raw.token, errors);

            let url = if site_url_pattern().is_match(&raw.url) {
                match Url::parse(&raw.url) {
                    Ok(url) => Some(url),
                    Err(e) => {
                        errors.push(format!("{}.url: {}", path, e));
                        None
                    }
                }
            } else {
                errors.push(format!(
                    "{}.url: must be an https URL without a trailing slash (was \"{}\")",
                    path, raw.url
                ));
                None
            };

            match url {
                Some(url) if errors.len() == before => {
                    Some(DeploymentTargetConfig::CloudFlare(CloudFlareConfig {
                        account_id: raw.account_id,
                        token: raw.token,
                        url,
                    }))
                }
                _ => None,
            }
        }
        other => {
            errors.push(format!("deploymentTarget.{}: unknown target platform", other));
            None
        }
    }
}

fn validate_git_provider(
    map: &Map<String, Value>,
    errors: &mut Vec<String>,
) -> Option<GitProviderConfig> {
    let entries = configured(map);
    match entries.len() {
        0 => {
            errors.push("gitProvider: At least one Git provider must be configured".into());
            return None;
        }
        1 => {}
        _ => {
            errors.push("gitProvider: Only one Git Provider can be configured at a time".into());
            return None;
        }
    }

    let (kind, value) = entries[0];
    match kind.as_str() {
        "gitHub" => {
            let github: GitHubConfig = entry(value, "gitProvider.gitHub", errors)?;
            if github.token.is_empty() {
                errors.push("gitProvider.gitHub.token: must be non-empty".into());
                return None;
            }
            Some(GitProviderConfig::GitHub(github))
        }
        other => {
            errors.push(format!("gitProvider.{}: unknown Git provider", other));
            None
        }
    }
}
