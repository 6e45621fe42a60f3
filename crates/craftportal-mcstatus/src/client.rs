use std::time::Duration;

use craftportal_core::{Edition, ServerStatus};
use reqwest::{Client, Url};

use crate::error::StatusError;
use crate::types::UpstreamStatus;

/// Client for the Minecraft status API.
#[derive(Debug, Clone)]
pub struct McStatusClient {
    client: Client,
    base_url: Url,
}

impl McStatusClient {
    /// # Errors
    ///
    /// Returns [`StatusError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`StatusError::InvalidBaseUrl`] if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, StatusError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;

        let parsed = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            StatusError::InvalidBaseUrl {
                base_url: base_url.to_string(),
                reason: e.to_string(),
            }
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(StatusError::InvalidBaseUrl {
                base_url: base_url.to_string(),
                reason: "expected an absolute http(s) URL".to_string(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Queries the status of `ip:port`. Port 19132 is treated as a Bedrock
    /// server.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError`] on network failure, a non-2xx upstream status,
    /// or an undecodable body.
    pub async fn fetch(&self, ip: &str, port: u16) -> Result<ServerStatus, StatusError> {
        let edition = Edition::for_port(port);
        let url = self.status_url(ip, port, edition);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), ip, port, "status API request failed");
            return Err(StatusError::Upstream {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let upstream: UpstreamStatus =
            serde_json::from_str(&body).map_err(|e| StatusError::Deserialize {
                context: format!("status of {ip}:{port}"),
                source: e,
            })?;

        Ok(upstream.into_status(edition))
    }

    /// Like [`McStatusClient::fetch`], but folds every failure into an offline
    /// status so callers can always render something.
    pub async fn fetch_or_offline(&self, ip: &str, port: u16) -> ServerStatus {
        match self.fetch(ip, port).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(error = %e, ip, port, "server status unavailable");
                ServerStatus::unreachable()
            }
        }
    }

    fn status_url(&self, ip: &str, port: u16, edition: Edition) -> Url {
        let mut url = self.base_url.clone();
        let target = format!("{ip}:{port}");
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "status", target.as_str()]);
        }
        if edition == Edition::Bedrock {
            url.query_pairs_mut().append_pair("bedrock", "true");
        }
        url
    }
}
