//! HTTP client for the community backend REST API.
//!
//! Every path is resolved under the website-scoped base URL
//! (`<backend>/website/<website_id>`). Non-2xx responses are surfaced as
//! [`BackendError::Api`] carrying the backend's own `message` so callers can
//! show it to the user verbatim.

use std::time::Duration;

use craftportal_core::{Coupon, MarketplaceSettings, Product};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::BackendError;
use crate::types::{
    ChestItem, GameServer, PurchaseRequest, PurchaseResult, RedeemRequest, RedeemResult,
    VoteProvider, VoteProvidersResponse, VoteRequest, VoteResult,
};

/// Client for the community backend.
///
/// Use [`BackendClient::new`] with the website-scoped base URL and attach a
/// user token with [`BackendClient::with_token`] for endpoints that need a
/// signed-in user (purchase, chest, redeem, vote).
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl BackendClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`BackendError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let parsed = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            BackendError::InvalidBaseUrl {
                base_url: base_url.to_string(),
                reason: e.to_string(),
            }
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(BackendError::InvalidBaseUrl {
                base_url: base_url.to_string(),
                reason: "expected an absolute http(s) URL".to_string(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            token: None,
        })
    }

    /// Returns a copy of this client that sends `token` as a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Like [`BackendClient::with_token`], leaving the client anonymous on `None`.
    #[must_use]
    pub fn with_optional_token(self, token: Option<String>) -> Self {
        match token {
            Some(t) => self.with_token(t),
            None => self,
        }
    }

    /// Fetches a single store product.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure, a non-2xx status, or an
    /// unexpected response shape.
    pub async fn get_product(&self, product_id: &str) -> Result<Product, BackendError> {
        self.get_json(&["store", "products", product_id], "get_product")
            .await
    }

    /// Fetches marketplace settings, including the bulk discount if any.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure, a non-2xx status, or an
    /// unexpected response shape.
    pub async fn get_marketplace_settings(&self) -> Result<MarketplaceSettings, BackendError> {
        self.get_json(&["marketplace", "settings"], "get_marketplace_settings")
            .await
    }

    /// Looks a coupon up by code. An unknown code is a 404 [`BackendError::Api`].
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure, a non-2xx status, or an
    /// unexpected response shape.
    pub async fn get_coupon(&self, code: &str) -> Result<Coupon, BackendError> {
        self.get_json(&["marketplace", "coupons", code], "get_coupon")
            .await
    }

    /// Buys the given products, optionally redeeming a coupon.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure, a non-2xx status, or an
    /// unexpected response shape.
    pub async fn purchase(
        &self,
        product_ids: &[String],
        coupon_code: Option<&str>,
    ) -> Result<PurchaseResult, BackendError> {
        let body = PurchaseRequest {
            product_ids,
            coupon_code,
        };
        self.post_json(&["marketplace", "purchase"], &body, "purchase")
            .await
    }

    /// Lists the chest of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure, a non-2xx status, or an
    /// unexpected response shape.
    pub async fn get_chest_items(&self, user_id: &str) -> Result<Vec<ChestItem>, BackendError> {
        self.get_json(&["chest", user_id], "get_chest_items").await
    }

    /// Redeems a gift or promo code for the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure, a non-2xx status, or an
    /// unexpected response shape.
    pub async fn redeem_code(&self, code: &str) -> Result<RedeemResult, BackendError> {
        self.post_json(&["redeem"], &RedeemRequest { code }, "redeem_code")
            .await
    }

    /// Lists configured vote providers.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure, a non-2xx status, or an
    /// unexpected response shape.
    pub async fn list_vote_providers(&self) -> Result<Vec<VoteProvider>, BackendError> {
        let envelope: VoteProvidersResponse = self
            .get_json(&["config", "vote-providers"], "list_vote_providers")
            .await?;
        Ok(envelope.providers)
    }

    /// Fetches one vote provider.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure, a non-2xx status, or an
    /// unexpected response shape.
    pub async fn get_vote_provider(&self, provider_id: &str) -> Result<VoteProvider, BackendError> {
        self.get_json(&["config", "vote-providers", provider_id], "get_vote_provider")
            .await
    }

    /// Registers a vote; a cooldown comes back as an [`BackendError::Api`] with
    /// code `VOTE_COOLDOWN`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure, a non-2xx status, or an
    /// unexpected response shape.
    pub async fn send_vote(&self, provider_id: &str) -> Result<VoteResult, BackendError> {
        self.post_json(
            &["config", "vote-providers", "vote"],
            &VoteRequest { provider_id },
            "send_vote",
        )
        .await
    }

    /// Lists the community's game servers.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure, a non-2xx status, or an
    /// unexpected response shape.
    pub async fn list_servers(&self) -> Result<Vec<GameServer>, BackendError> {
        self.get_json(&["servers"], "list_servers").await
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        context: &str,
    ) -> Result<T, BackendError> {
        let url = self.endpoint(segments);
        self.send(self.client.get(url), context).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
        context: &str,
    ) -> Result<T, BackendError> {
        let url = self.endpoint(segments);
        self.send(self.client.post(url).json(body), context).await
    }

    /// Sends the request, maps non-2xx statuses to [`BackendError::Api`] and
    /// decodes the body as `T`.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, BackendError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), context, "backend request failed");
            return Err(Self::api_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| BackendError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    /// Builds an [`BackendError::Api`] from an error body, preferring the
    /// backend's `message` and `type` fields when the body is JSON.
    fn api_error(status: reqwest::StatusCode, body: &str) -> BackendError {
        let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
        let field = |name: &str| {
            parsed
                .as_ref()
                .and_then(|v| v.get(name))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        };

        let message = field("message").unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

        BackendError::Api {
            status: status.as_u16(),
            message,
            code: field("type"),
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
