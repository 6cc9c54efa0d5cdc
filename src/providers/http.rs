// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! Shared HTTP plumbing for provider clients

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{RemoteError, RemoteResult};

const USER_AGENT: &str = concat!("danku/", env!("CARGO_PKG_VERSION"));

/// Authenticated client bound to one API base URL
#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    provider: &'static str,
    default_headers: &'static [(&'static str, &'static str)],
}

impl ApiClient {
    pub fn new(
        provider: &'static str,
        base_url: &str,
        token: impl Into<String>,
        default_headers: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            provider,
            default_headers,
        }
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self
            .http
            .request(method, self.url(path))
            .bearer_auth(&self.token)
            .header(reqwest::header::USER_AGENT, USER_AGENT);
        for (name, value) in self.default_headers {
            req = req.header(*name, *value);
        }
        req
    }

    /// Send a request, turning any non-2xx status into a [`RemoteError`]
    pub async fn send(&self, req: RequestBuilder, resource: &str) -> RemoteResult<Response> {
        let resp = req
            .send()
            .await
            .map_err(|e| RemoteError::network(self.provider, e))?;

        let status = resp.status();
        tracing::debug!("{} {} -> {}", self.provider, resource, status);

        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(RemoteError::from_status(
            self.provider,
            status.as_u16(),
            resource,
            error_message(status, &body),
        ))
    }

    /// Send and decode a JSON body
    pub async fn json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        resource: &str,
    ) -> RemoteResult<T> {
        let resp = self.send(req, resource).await?;
        resp.json::<T>()
            .await
            .map_err(|e| RemoteError::decode(self.provider, e))
    }

    /// Send and discard the body, keeping the status
    pub async fn execute(&self, req: RequestBuilder, resource: &str) -> RemoteResult<StatusCode> {
        Ok(self.send(req, resource).await?.status())
    }
}

/// Best human-readable message from an error body.
///
/// Understands `{"message": ...}` (GitHub) and `{"errors": [{"message": ...}]}`
/// (Cloudflare); anything else is returned as text.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = json.get("message").and_then(Value::as_str) {
            return msg.to_string();
        }
        if let Some(errors) = json.get("errors").and_then(Value::as_array) {
            let messages: Vec<&str> = errors
                .iter()
                .filter_map(|e| e.get("message").and_then(Value::as_str))
                .collect();
            if !messages.is_empty() {
                return messages.join("; ");
            }
        }
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.trim().to_string()
    }
}
