//! Error types for the Infobip transport.

/// Result type alias for Infobip operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Infobip transport error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request error, including non-2xx statuses when `http_errors`
    /// is enabled.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Required configuration value is missing or blank.
    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),

    /// Configuration value is present but unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Message has neither a sender nor a from address.
    #[error("Message has no sender or from address")]
    MissingSender,

    /// Message has no to, cc or bcc recipients.
    #[error("Message has no recipients")]
    NoRecipients,
}

impl Error {
    /// Returns true if the message itself was rejected before any request
    /// was built.
    #[must_use]
    pub const fn is_malformed_message(&self) -> bool {
        matches!(self, Self::MissingSender | Self::NoRecipients)
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::MissingConfig(_) | Self::InvalidConfig(_) | Self::Url(_)
        )
    }
}
