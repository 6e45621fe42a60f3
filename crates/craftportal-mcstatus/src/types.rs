//! Upstream payload shape. Only the fields the proxy exposes are decoded.

use craftportal_core::{Edition, PlayerCounts, ServerStatus};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(crate) struct UpstreamStatus {
    #[serde(default)]
    pub offline: bool,
    #[serde(default, deserialize_with = "lenient_players")]
    pub players: Option<PlayerCounts>,
    #[serde(default)]
    pub version: Option<UpstreamVersion>,
    #[serde(default)]
    pub motd: Option<UpstreamMotd>,
}

/// Player counts are best effort: a `players` value that is not an object
/// drops the counts, and each count is floored and clamped into `u32`.
fn lenient_players<'de, D>(deserializer: D) -> Result<Option<PlayerCounts>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_object).map(|players| PlayerCounts {
        online: players.get("online").map_or(0, count),
        max: players.get("max").map_or(0, count),
    }))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count(value: &Value) -> u32 {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).unwrap_or(u32::MAX);
    }
    match value.as_f64() {
        Some(n) if n.is_finite() => n.floor().clamp(0.0, f64::from(u32::MAX)) as u32,
        _ => 0,
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpstreamVersion {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpstreamMotd {
    #[serde(default)]
    pub clean: Option<MotdText>,
}

/// Java servers report one line per array entry; Bedrock sends a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum MotdText {
    Single(String),
    Lines(Vec<String>),
}

impl MotdText {
    fn into_text(self) -> String {
        match self {
            MotdText::Single(s) => s,
            MotdText::Lines(lines) => lines.join("\n"),
        }
    }
}

impl UpstreamStatus {
    pub(crate) fn into_status(self, edition: Edition) -> ServerStatus {
        ServerStatus {
            online: !self.offline,
            edition: Some(edition),
            players: self.players,
            version: self.version.and_then(|v| v.name),
            motd: self.motd.and_then(|m| m.clean).map(MotdText::into_text),
            error: None,
        }
    }
}
