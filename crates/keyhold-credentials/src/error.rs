//! Error types for credential hashing and verification.

use thiserror::Error;

/// Result type for credential operations.
pub type Result<T> = std::result::Result<T, CredentialError>;

/// Errors that can occur while hashing or verifying credentials.
///
/// A wrong secret is not an error: [`crate::Hasher::verify`] reports it as
/// `Ok(false)`. Likewise a missing identifier is `None` from the store.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Hasher parameters are outside the supported range.
    #[error("invalid hasher configuration: {0}")]
    Configuration(String),

    /// The secret to hash was empty.
    #[error("secret must not be empty")]
    EmptySecret,

    /// The entropy source could not produce a salt.
    #[error("random source unavailable: {0}")]
    RandomSource(String),

    /// A stored hash record could not be parsed or is not one of ours.
    #[error("malformed hash record: {0}")]
    MalformedRecord(String),

    /// The hash primitive itself failed.
    #[error("hashing failed: {0}")]
    Hashing(String),
}

impl CredentialError {
    /// Whether the same call may succeed if retried later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RandomSource(_))
    }

    /// Short machine-readable kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::EmptySecret => "empty_secret",
            Self::RandomSource(_) => "random_source",
            Self::MalformedRecord(_) => "malformed_record",
            Self::Hashing(_) => "hashing",
        }
    }
}
