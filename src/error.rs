//! Error types for the crypticker application.

use thiserror::Error;

/// The main error type for crypticker.
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal output errors
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid market specification
    #[error("Invalid market '{market}': {reason}")]
    InvalidMarket { market: String, reason: String },

    /// Network connectivity errors
    #[error("Network error: {0}")]
    Network(String),

    /// Vendor quota exhausted
    #[error("Rate limited by market data API")]
    RateLimited,
}

/// Alias for Result with our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl Error {
    /// Create a new terminal error.
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    /// Create a new config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new invalid market error.
    pub fn invalid_market(market: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidMarket {
            market: market.into(),
            reason: reason.into(),
        }
    }

    /// Create a new network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Check if this error is recoverable (the next poll may succeed).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Http(_) | Self::RateLimited | Self::Serialization(_)
        )
    }
}
