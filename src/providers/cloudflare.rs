// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! Cloudflare v4 API (Workers, D1, zones)

use async_trait::async_trait;
use regex::Regex;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::OnceLock;
use url::Url;

use super::http::ApiClient;
use super::{DeploymentTarget, TargetSession};
use crate::errors::{RemoteError, RemoteResult};
use crate::reconcile::{self, Reconciled, RemoteResource};

pub const DEFAULT_API_URL: &str = "https://api.cloudflare.com/client/v4";

/// Worker script name of the analytics reverse proxy
pub const PROXY_SCRIPT_NAME: &str = "posthog-reverse-proxy";

const PROXY_SCRIPT: &str = include_str!("../../templates/workers/posthog-reverse-proxy.js");

const PROVIDER: &str = "Cloudflare";

const PAGE_SIZE: u32 = 100;

/// Today's date in the `YYYY-MM-DD` form Workers expect
pub fn compatibility_date() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

fn uuid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
            .expect("valid UUID regex")
    })
}

/// Standard response wrapper of the v4 API
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: Option<u32>,
    #[serde(default)]
    total_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TokenStatus {
    status: String,
}

#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Script {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Database {
    uuid: String,
    #[serde(default)]
    name: String,
}

/// Deployment target backed by a Cloudflare account
#[derive(Debug, Clone)]
pub struct CloudflareTarget {
    api: ApiClient,
    account_id: String,
    site_url: Url,
}

impl CloudflareTarget {
    pub fn with_base_url(account_id: &str, token: &str, site_url: Url, base_url: &str) -> Self {
        Self {
            api: ApiClient::new(PROVIDER, base_url, token, &[]),
            account_id: account_id.to_string(),
            site_url,
        }
    }

    fn account_path(&self, rest: &str) -> String {
        format!("/accounts/{}{}", self.account_id, rest)
    }

    /// Send a request and unwrap the `{success, errors, result}` envelope
    async fn call<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
        resource: &str,
    ) -> RemoteResult<(T, Option<ResultInfo>)> {
        let envelope: Envelope<T> = self.api.json(req, resource).await?;

        if !envelope.success {
            let message = envelope
                .errors
                .iter()
                .map(|e| format!("{} (code {})", e.message, e.code))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(RemoteError::Api {
                provider: PROVIDER,
                status: 200,
                message,
            });
        }

        let result = envelope
            .result
            .ok_or_else(|| RemoteError::decode(PROVIDER, format!("{} returned no result", resource)))?;
        Ok((result, envelope.result_info))
    }

    /// Registrable domain of the site (`example.co.uk` for `www.example.co.uk`)
    fn registrable_domain(&self) -> RemoteResult<String> {
        self.site_url
            .host_str()
            .and_then(psl::domain_str)
            .map(str::to_string)
            .ok_or_else(|| RemoteError::Rejected {
                provider: PROVIDER,
                message: format!("{} does not have a registrable domain", self.site_url),
            })
    }

    /// The site URL with its host swapped for `a.<domain>`
    pub fn proxy_url(&self, session: &TargetSession) -> RemoteResult<Url> {
        let mut url = self.site_url.clone();
        url.set_host(Some(&format!("a.{}", session.domain)))
            .map_err(|e| RemoteError::decode(PROVIDER, e))?;
        Ok(url)
    }

    /// Every item of an account listing, following `result_info` pages
    async fn list_all<T: DeserializeOwned>(&self, path: &str) -> RemoteResult<Vec<T>> {
        let mut all = Vec::new();
        let mut page = 1u32;

        loop {
            let req = self
                .api
                .request(Method::GET, path)
                .query(&[("page", page), ("per_page", PAGE_SIZE)]);
            let (batch, info): (Vec<T>, _) = self.call(req, path).await?;
            let fetched = batch.len();
            all.extend(batch);

            // without paging info the listing is a single page
            let last_page = match info {
                Some(ResultInfo {
                    total_pages: Some(total),
                    ..
                }) => page >= total,
                Some(ResultInfo {
                    total_count: Some(total),
                    ..
                }) => all.len() >= total as usize,
                _ => true,
            };
            if last_page || fetched == 0 {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    async fn scripts(&self) -> RemoteResult<Vec<Script>> {
        self.list_all(&self.account_path("/workers/scripts")).await
    }

    async fn databases(&self) -> RemoteResult<Vec<Database>> {
        self.list_all(&self.account_path("/d1/database")).await
    }

    async fn find_resource(&self, name: &str) -> RemoteResult<bool> {
        if self.scripts().await?.iter().any(|s| s.id == name) {
            return Ok(true);
        }
        Ok(self.databases().await?.iter().any(|d| d.name == name))
    }

    async fn upload_proxy_script(&self) -> RemoteResult<()> {
        let metadata = json!({
            "main_module": "index.js",
            "compatibility_date": compatibility_date(),
        });

        let form = Form::new()
            .part(
                "metadata",
                Part::text(metadata.to_string())
                    .mime_str("application/json")
                    .map_err(|e| RemoteError::decode(PROVIDER, e))?,
            )
            .part(
                "index.js",
                Part::text(PROXY_SCRIPT)
                    .file_name("index.js")
                    .mime_str("application/javascript+module")
                    .map_err(|e| RemoteError::decode(PROVIDER, e))?,
            );

        let path = self.account_path(&format!("/workers/scripts/{}", PROXY_SCRIPT_NAME));
        let req = self.api.request(Method::PUT, &path).multipart(form);
        self.call::<Value>(req, &path).await.map(drop)
    }
}

#[async_trait]
impl DeploymentTarget for CloudflareTarget {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn verify(&self) -> RemoteResult<TargetSession> {
        let path = self.account_path("/tokens/verify");
        let (token, _): (TokenStatus, _) = self
            .call(self.api.request(Method::GET, &path), &path)
            .await
            .map_err(|e| {
                if e.is_auth() || e.is_not_found() {
                    RemoteError::Rejected {
                        provider: PROVIDER,
                        message: "Invalid Cloudflare account ID or API token".into(),
                    }
                } else {
                    e
                }
            })?;

        if token.status != "active" {
            return Err(RemoteError::Rejected {
                provider: PROVIDER,
                message: "Cloudflare API token is not active".into(),
            });
        }

        let domain = self.registrable_domain()?;
        let req = self
            .api
            .request(Method::GET, "/zones")
            .query(&[("name", domain.as_str())]);
        let (zones, _): (Vec<Zone>, _) = self.call(req, "/zones").await?;

        let zone = zones.into_iter().next().ok_or_else(|| RemoteError::Rejected {
            provider: PROVIDER,
            message: "Cloudflare account does not have a zone with the specified URL".into(),
        })?;

        tracing::debug!("Zone {} serves {}", zone.id, domain);
        Ok(TargetSession {
            zone_id: zone.id,
            domain,
        })
    }

    async fn resource_exists(&self, _session: &TargetSession, name: &str) -> RemoteResult<bool> {
        self.find_resource(name)
            .await
            .map_err(|e| e.context("Failed to check resources"))
    }

    async fn ensure_database(
        &self,
        _session: &TargetSession,
        name: &str,
    ) -> RemoteResult<Reconciled<String>> {
        reconcile::ensure(&D1Database { target: self, name }).await
    }

    async fn deploy_reverse_proxy(&self, session: &TargetSession) -> RemoteResult<Url> {
        reconcile::upsert(&ProxyScript { target: self }).await?;

        let url = self.proxy_url(session)?;
        let hostname = url.host_str().unwrap_or_default().to_string();

        let path = self.account_path("/workers/domains");
        let req = self.api.request(Method::PUT, &path).json(&json!({
            "environment": "production",
            "hostname": hostname,
            "service": PROXY_SCRIPT_NAME,
            "zone_id": session.zone_id,
        }));
        self.call::<Value>(req, &path)
            .await
            .map_err(|e| e.context(format!("Failed to attach custom domain {}", hostname)))?;

        Ok(url)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reconciled resources
// ─────────────────────────────────────────────────────────────────────────────

struct D1Database<'a> {
    target: &'a CloudflareTarget,
    name: &'a str,
}

#[async_trait]
impl<'a> RemoteResource for D1Database<'a> {
    type Id = String;

    fn describe(&self) -> String {
        format!("D1 database {}", self.name)
    }

    async fn lookup(&self) -> RemoteResult<Option<String>> {
        Ok(self
            .target
            .databases()
            .await?
            .into_iter()
            .find(|d| d.name == self.name)
            .map(|d| d.uuid))
    }

    async fn create(&self) -> RemoteResult<String> {
        let path = self.target.account_path("/d1/database");
        let req = self
            .target
            .api
            .request(Method::POST, &path)
            .json(&json!({ "name": self.name }));
        let (db, _): (Database, _) = self.target.call(req, &path).await?;

        if !uuid_pattern().is_match(&db.uuid) {
            return Err(RemoteError::decode(
                PROVIDER,
                format!("database id '{}' is not a UUID", db.uuid),
            ));
        }
        Ok(db.uuid)
    }

    async fn update(&self, existing: String) -> RemoteResult<String> {
        Ok(existing)
    }
}

struct ProxyScript<'a> {
    target: &'a CloudflareTarget,
}

#[async_trait]
impl<'a> RemoteResource for ProxyScript<'a> {
    type Id = ();

    fn describe(&self) -> String {
        format!("worker script {}", PROXY_SCRIPT_NAME)
    }

    async fn lookup(&self) -> RemoteResult<Option<()>> {
        let scripts = self.target.scripts().await?;
        Ok(scripts.iter().any(|s| s.id == PROXY_SCRIPT_NAME).then_some(()))
    }

    async fn create(&self) -> RemoteResult<()> {
        self.target.upload_proxy_script().await
    }

    async fn update(&self, _: ()) -> RemoteResult<()> {
        self.target.upload_proxy_script().await
    }
}
