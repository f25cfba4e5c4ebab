//! HTTP delivery of alerts to an incident.io alert source webhook.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use crate::alert::{AlertPayload, AlertSink};
use crate::config::{ApiToken, Config};
use crate::error::AlertError;

/// Posts alert payloads as JSON with a bearer token.
pub struct HttpAlertSink {
    client: reqwest::Client,
    webhook_url: Url,
    api_token: ApiToken,
}

impl HttpAlertSink {
    /// Creates a sink from the startup configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, AlertError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.sink.timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(AlertError::Client)?;

        Ok(Self {
            client,
            webhook_url: config.webhook_url.clone(),
            api_token: config.api_token.clone(),
        })
    }
}

#[async_trait]
impl AlertSink for HttpAlertSink {
    async fn send(&self, payload: &AlertPayload) -> Result<(), AlertError> {
        tracing::debug!(
            deduplication_key = %payload.deduplication_key,
            status = %payload.status,
            "Posting alert to webhook"
        );

        let response = self
            .client
            .post(self.webhook_url.clone())
            .bearer_auth(self.api_token.expose())
            .json(payload)
            .send()
            .await
            .map_err(AlertError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %body, "Webhook rejected alert");
            return Err(AlertError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}
