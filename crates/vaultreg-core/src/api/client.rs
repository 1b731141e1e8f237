//! API client for posting member registrations.
//!
//! This module provides the `ApiClient` struct, which sends a validated
//! `MemberPayload` to the registration endpoint as a single JSON POST.

use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use reqwest::{header, Client, Url};
use tracing::{debug, info, warn};

use super::{ApiError, MemberRegistrar};
use crate::config::Config;
use crate::models::MemberPayload;

/// API client for the member registry.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    endpoint: Url,
}

impl ApiClient {
    /// Create a client for the endpoint and timeout in `config`.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_endpoint(&config.endpoint(), config.request_timeout())
    }

    pub fn with_endpoint(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid registration endpoint: {}", endpoint))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// POST one registration. Exactly one attempt is made; there is no retry.
    pub async fn register_member(&self, payload: &MemberPayload) -> Result<(), ApiError> {
        debug!(url = %self.endpoint, "Posting member registration");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(status = status.as_u16(), "Registration accepted");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Registration rejected");
            Err(ApiError::from_status(status, &body))
        }
    }
}

impl MemberRegistrar for ApiClient {
    fn register<'a>(&'a self, payload: &'a MemberPayload) -> BoxFuture<'a, Result<(), ApiError>> {
        Box::pin(self.register_member(payload))
    }
}
