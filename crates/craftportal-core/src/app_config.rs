use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Root of the remote community backend, e.g. `https://api.example.com`.
    pub backend_url: String,
    /// Website identifier appended to every backend path.
    pub website_id: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Bearer token sent to the backend on behalf of the CLI user.
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Root of the upstream Minecraft status API.
    pub status_api_url: String,
    pub status_timeout_secs: u64,
    pub rate_limit_max_requests: usize,
    pub rate_limit_window_secs: u64,
    /// File holding the CLI's session cart.
    pub cart_path: PathBuf,
}

impl AppConfig {
    /// Backend base URL scoped to this website, without a trailing slash.
    #[must_use]
    pub fn website_base_url(&self) -> String {
        format!(
            "{}/website/{}",
            self.backend_url.trim_end_matches('/'),
            self.website_id
        )
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("backend_url", &self.backend_url)
            .field("website_id", &self.website_id)
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("status_api_url", &self.status_api_url)
            .field("status_timeout_secs", &self.status_timeout_secs)
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("cart_path", &self.cart_path)
            .finish()
    }
}
