//! Enrollment and authentication on top of the hasher and a store.

use tracing::{debug, error, warn};

use crate::error::{CredentialError, Result};
use crate::hasher::{self, HashRecord, Hasher, HasherConfig};
use crate::store::CredentialStore;

/// Verified against on a lookup miss so unknown identifiers cost as much as
/// a wrong secret.
const DUMMY_SECRET: &str = "keyhold-timing-equalizer";

/// Internal result of an authentication attempt.
///
/// Only [`AuthOutcome::Authenticated`] is a success. Transports must report
/// every other variant identically to the outside world.
#[derive(Debug)]
pub enum AuthOutcome {
    /// The secret matched the stored record.
    Authenticated,
    /// No record is stored for the identifier.
    UnknownIdentifier,
    /// A record exists but the secret does not match it.
    SecretMismatch,
    /// The stored record could not be verified at all.
    MalformedRecord(CredentialError),
}

impl AuthOutcome {
    /// Returns true only for [`AuthOutcome::Authenticated`].
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }

    /// Label used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authenticated => "authenticated",
            Self::UnknownIdentifier => "unknown_identifier",
            Self::SecretMismatch => "secret_mismatch",
            Self::MalformedRecord(_) => "malformed_record",
        }
    }
}

/// Credential issuance and verification service.
#[derive(Debug)]
pub struct CredentialService<S> {
    hasher: Hasher,
    store: S,
    dummy: HashRecord,
}

impl<S: CredentialStore> CredentialService<S> {
    /// Create a service hashing new records with `config`.
    pub fn new(config: HasherConfig, store: S) -> Result<Self> {
        let hasher = Hasher::new(config)?;
        let dummy = hasher.hash_default(DUMMY_SECRET)?;

        Ok(Self {
            hasher,
            store,
            dummy,
        })
    }

    /// The hasher used for new records.
    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Hash `secret` and store it under `identifier`, replacing any prior
    /// record. Nothing is stored on failure.
    pub fn enroll(&self, identifier: &str, secret: &str) -> Result<()> {
        let record = self.hasher.hash_default(secret)?;
        self.store.put(identifier, record);

        debug!(identifier = %identifier, "Credential enrolled");
        Ok(())
    }

    /// Check `secret` against the record stored for `identifier`.
    pub fn authenticate(&self, identifier: &str, secret: &str) -> AuthOutcome {
        let outcome = match self.store.get(identifier) {
            Some(record) => match hasher::verify(secret, &record) {
                Ok(true) => AuthOutcome::Authenticated,
                Ok(false) => AuthOutcome::SecretMismatch,
                Err(e) => AuthOutcome::MalformedRecord(e),
            },
            None => {
                let _ = hasher::verify(secret, &self.dummy);
                AuthOutcome::UnknownIdentifier
            }
        };

        match &outcome {
            AuthOutcome::Authenticated => {
                debug!(identifier = %identifier, "Authentication succeeded");
            }
            AuthOutcome::UnknownIdentifier | AuthOutcome::SecretMismatch => {
                warn!(
                    identifier = %identifier,
                    reason = outcome.as_str(),
                    "Authentication failed"
                );
            }
            AuthOutcome::MalformedRecord(e) => {
                error!(
                    identifier = %identifier,
                    error = %e,
                    "Stored credential record is malformed"
                );
            }
        }

        outcome
    }
}
