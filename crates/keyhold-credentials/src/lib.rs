//! # Keyhold Credentials
//!
//! Credential hashing, verification, and storage.
//!
//! This crate provides:
//! - **Hasher**: Argon2id hashing into self-describing PHC records, with a
//!   tunable work-factor stored inside each record
//! - **Store**: A concurrency-safe identifier → record mapping behind the
//!   [`CredentialStore`] trait
//! - **Service**: `enroll` / `authenticate` on top of both, with a dummy
//!   verification on unknown identifiers
//!
//! ## Example
//!
//! ```rust
//! use keyhold_credentials::{CredentialService, HasherConfig, MemoryStore};
//!
//! let config = HasherConfig { work_factor: 1, memory_kib: 64 };
//! let service = CredentialService::new(config, MemoryStore::new()).unwrap();
//!
//! service.enroll("a@x.com", "correct-pw").unwrap();
//!
//! assert!(service.authenticate("a@x.com", "correct-pw").is_authenticated());
//! assert!(!service.authenticate("a@x.com", "wrong-pw").is_authenticated());
//! assert!(!service.authenticate("b@x.com", "correct-pw").is_authenticated());
//! ```
//!
//! ## Errors
//!
//! Hashing and verification return [`CredentialError`]; neither logs. A
//! wrong secret is `Ok(false)` from [`verify`], a missing identifier is
//! `None` from the store, and a corrupted record is
//! [`CredentialError::MalformedRecord`].

pub mod error;
pub mod hasher;
pub mod secret;
pub mod service;
pub mod store;

// Re-export main types
pub use error::{CredentialError, Result};
pub use hasher::{
    verify, HashRecord, Hasher, HasherConfig, RecordParams, ALGORITHM, DEFAULT_MEMORY_KIB,
    DEFAULT_WORK_FACTOR, MAX_MEMORY_KIB, MAX_WORK_FACTOR, MIN_MEMORY_KIB, MIN_WORK_FACTOR,
    SALT_LEN,
};
pub use secret::SecretString;
pub use service::{AuthOutcome, CredentialService};
pub use store::{CredentialStore, MemoryStore};

/// Version of the credentials crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
