//! Backend request and response types.
//!
//! Marketplace models (products, coupons, settings) live in `craftportal-core`
//! because pricing needs them; everything here is only seen by the client and
//! its callers.

use craftportal_core::money::lenient_decimal;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Marketplace
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PurchaseRequest<'a> {
    pub product_ids: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Chest
// ---------------------------------------------------------------------------

/// A purchased or redeemed item waiting for in-game delivery.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChestItem {
    pub id: String,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default, alias = "productName")]
    pub name: Option<String>,
    /// Whether the item has already been claimed in game.
    #[serde(default)]
    pub used: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Used/available tally shown above the chest listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChestCounts {
    pub total: usize,
    pub used: usize,
    pub available: usize,
}

impl ChestCounts {
    #[must_use]
    pub fn from_items(items: &[ChestItem]) -> Self {
        let used = items.iter().filter(|i| i.used).count();
        Self {
            total: items.len(),
            used,
            available: items.len() - used,
        }
    }
}

// ---------------------------------------------------------------------------
// Redeem codes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct RedeemRequest<'a> {
    pub code: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedeemedProduct {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedeemResult {
    #[serde(default)]
    pub message: Option<String>,
    /// Wallet credit granted by the code.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub bonus: Option<Decimal>,
    #[serde(default)]
    pub products: Vec<RedeemedProduct>,
}

impl RedeemResult {
    /// A code "worked" when it granted credit or at least one product.
    #[must_use]
    pub fn granted_anything(&self) -> bool {
        self.bonus.is_some_and(|b| b > Decimal::ZERO) || !self.products.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Voting
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct VoteProvidersResponse {
    #[serde(default)]
    pub providers: Vec<VoteProvider>,
}

/// A server-list site users can vote on. The provider's secret key is
/// deliberately not decoded.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteProvider {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub logo: Option<String>,
}

impl VoteProvider {
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.kind.as_str() {
            "serversmc" => "ServersMC",
            other => other,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VoteRequest<'a> {
    pub provider_id: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResult {
    pub status: bool,
    pub message: String,
    /// Next allowed vote, `YYYY-MM-DD HH:mm:ss`.
    #[serde(default)]
    pub can_vote_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Game servers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GameServer {
    pub id: String,
    pub name: String,
    pub ip: String,
    pub port: u16,
}

/// Picks the server to advertise: the first one on the default Java port,
/// otherwise the first one listed.
#[must_use]
pub fn primary_server(servers: &[GameServer]) -> Option<&GameServer> {
    servers
        .iter()
        .find(|s| s.port == craftportal_core::DEFAULT_JAVA_PORT)
        .or_else(|| servers.first())
}
