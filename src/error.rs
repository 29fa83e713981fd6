use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Missing required parameters: start and end")]
    #[diagnostic(code(inviteday::missing_required_fields))]
    MissingRequiredFields,

    #[error("Invalid date format: {0}. Use ISO 8601 (e.g., 2025-03-10T18:00:00+02:00)")]
    #[diagnostic(code(inviteday::unparsable_timestamp))]
    UnparsableTimestamp(String),

    #[error("Invalid event data: {0}")]
    #[diagnostic(code(inviteday::invalid_event_data))]
    InvalidEventData(String),

    #[error("Provider link failure: {0}")]
    #[diagnostic(code(inviteday::provider_link))]
    ProviderLinkFailure(String),

    #[error("Network failure: {0}")]
    #[diagnostic(code(inviteday::network))]
    NetworkFailure(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(inviteday::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(inviteday::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(inviteday::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(inviteday::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(inviteday::other))]
    Other(String),
}

impl Error {
    /// Whether the error comes from bad caller input rather than a failure on our side
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MissingRequiredFields | Error::UnparsableTimestamp(_)
        )
    }
}

// Implement From for TOML serialization errors
impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type InviteResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create unparsable timestamp errors
pub fn timestamp_error(value: &str) -> Error {
    Error::UnparsableTimestamp(value.to_string())
}

/// Helper to create invalid event data errors
pub fn event_data_error(message: &str) -> Error {
    Error::InvalidEventData(message.to_string())
}

/// Helper to create provider link errors
pub fn link_error(message: &str) -> Error {
    Error::ProviderLinkFailure(message.to_string())
}

/// Helper to create network errors
pub fn network_error(message: &str) -> Error {
    Error::NetworkFailure(message.to_string())
}

