//! Plaintext secret wrapper that stays out of logs.

use serde::Deserialize;
use std::fmt;
use zeroize::Zeroizing;

/// A plaintext secret as received from a caller.
///
/// `Debug` and `Display` print `[REDACTED]`, and the buffer is zeroized on
/// drop.
#[derive(Clone, Deserialize)]
#[serde(from = "String")]
pub struct SecretString {
    inner: Zeroizing<String>,
}

impl SecretString {
    /// Wrap a secret.
    pub fn new(s: impl Into<String>) -> Self {
        Self {
            inner: Zeroizing::new(s.into()),
        }
    }

    /// Exposes the secret value.
    ///
    /// Use this sparingly and only when necessary.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Returns whether the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
