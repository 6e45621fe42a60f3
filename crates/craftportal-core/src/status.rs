use serde::{Deserialize, Serialize};

pub const DEFAULT_JAVA_PORT: u16 = 25565;
/// Port that marks a server as Bedrock edition.
pub const BEDROCK_PORT: u16 = 19132;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    Java,
    Bedrock,
}

impl Edition {
    #[must_use]
    pub fn for_port(port: u16) -> Self {
        if port == BEDROCK_PORT {
            Self::Bedrock
        } else {
            Self::Java
        }
    }
}

impl std::fmt::Display for Edition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edition::Java => write!(f, "java"),
            Edition::Bedrock => write!(f, "bedrock"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCounts {
    #[serde(default)]
    pub online: u32,
    #[serde(default)]
    pub max: u32,
}

/// Normalized Minecraft server status returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub online: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<Edition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<PlayerCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServerStatus {
    /// Failure-safe status: offline, with a reason for the caller.
    #[must_use]
    pub fn unreachable() -> Self {
        Self {
            online: false,
            edition: None,
            players: None,
            version: None,
            motd: None,
            error: Some("server unreachable or returned an invalid response".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bedrock_only_on_bedrock_port() {
        assert_eq!(Edition::for_port(BEDROCK_PORT), Edition::Bedrock);
        assert_eq!(Edition::for_port(DEFAULT_JAVA_PORT), Edition::Java);
        assert_eq!(Edition::for_port(25566), Edition::Java);
    }

    #[test]
    fn unreachable_serializes_minimal_shape() {
        let json = serde_json::to_value(ServerStatus::unreachable()).unwrap();
        assert_eq!(json["online"], false);
        assert!(json.get("type").is_none());
        assert!(json["error"].is_string());
    }
}
