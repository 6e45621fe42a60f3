use thiserror::Error;

/// Errors returned by the community backend client.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    ///
    /// `message` is the backend's own `message` field when it sent one.
    #[error("backend returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
        /// Machine-readable error `type`, e.g. `VOTE_COOLDOWN`.
        code: Option<String>,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid backend base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl BackendError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::Api { status: 404, .. })
    }

    /// Message suitable for showing to an end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Api { message, .. } => message.clone(),
            BackendError::Http(_) => "could not reach the server, please try again".to_string(),
            BackendError::Deserialize { .. } | BackendError::InvalidBaseUrl { .. } => {
                "unexpected response from the server".to_string()
            }
        }
    }
}
