//! Adaptive credential hashing and verification.
//!
//! Secrets are hashed with Argon2id. The work-factor is the Argon2 time cost
//! (number of passes over memory); memory cost comes from [`HasherConfig`]
//! and parallelism is pinned to a single lane so one call never fans out
//! across cores.
//!
//! Every [`HashRecord`] is a PHC string carrying everything needed to verify
//! it later:
//!
//! ```text
//! $argon2id$v=19$m=19456,t=2,p=1$<salt b64>$<digest b64>
//! ```
//!
//! Verification always uses the parameters embedded in the record, so raising
//! the configured work-factor never invalidates existing records.

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, Salt, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CredentialError, Result};

/// Algorithm tag embedded in every record.
pub const ALGORITHM: &str = "argon2id";

/// Salt width in bytes. Fresh for every record.
pub const SALT_LEN: usize = 16;

/// Digest width in bytes.
pub const DIGEST_LEN: usize = 32;

/// Lowest accepted work-factor.
pub const MIN_WORK_FACTOR: u32 = 1;

/// Highest accepted work-factor.
pub const MAX_WORK_FACTOR: u32 = 10;

/// Work-factor used when none is configured.
pub const DEFAULT_WORK_FACTOR: u32 = 2;

/// Lowest accepted memory cost in KiB (Argon2 requires 8 KiB per lane).
pub const MIN_MEMORY_KIB: u32 = 8;

/// Highest accepted memory cost in KiB (256 MiB).
pub const MAX_MEMORY_KIB: u32 = 256 * 1024;

/// Memory cost used when none is configured (19 MiB).
pub const DEFAULT_MEMORY_KIB: u32 = 19 * 1024;

const LANES: u32 = 1;

/// Tunable cost parameters for new hash records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherConfig {
    /// Argon2 time cost applied to new records.
    pub work_factor: u32,
    /// Argon2 memory cost in KiB applied to new records.
    pub memory_kib: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            work_factor: DEFAULT_WORK_FACTOR,
            memory_kib: DEFAULT_MEMORY_KIB,
        }
    }
}

impl HasherConfig {
    /// Reject parameters outside the supported range.
    ///
    /// Values are never clamped.
    pub fn validate(&self) -> Result<()> {
        check_work_factor(self.work_factor)?;
        check_memory_kib(self.memory_kib)
    }
}

fn check_work_factor(work_factor: u32) -> Result<()> {
    if !(MIN_WORK_FACTOR..=MAX_WORK_FACTOR).contains(&work_factor) {
        return Err(CredentialError::Configuration(format!(
            "work factor {} outside supported range {}..={}",
            work_factor, MIN_WORK_FACTOR, MAX_WORK_FACTOR
        )));
    }
    Ok(())
}

fn check_memory_kib(memory_kib: u32) -> Result<()> {
    if !(MIN_MEMORY_KIB..=MAX_MEMORY_KIB).contains(&memory_kib) {
        return Err(CredentialError::Configuration(format!(
            "memory cost {} KiB outside supported range {}..={}",
            memory_kib, MIN_MEMORY_KIB, MAX_MEMORY_KIB
        )));
    }
    Ok(())
}

/// A self-describing hash record in PHC string form.
///
/// The wrapped string is opaque to callers. Construction from a raw string
/// does not validate it; [`verify`] and [`HashRecord::params`] report a
/// [`CredentialError::MalformedRecord`] for anything that does not parse.
///
/// Two records for the same secret differ (fresh salts), so records must
/// never be compared to decide whether secrets match.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashRecord(String);

impl HashRecord {
    /// The serialized record.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the record, returning its serialized form.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Decode the parameters embedded in this record.
    pub fn params(&self) -> Result<RecordParams> {
        let parsed = self.parse()?;
        let params = Params::try_from(&parsed)
            .map_err(|e| CredentialError::MalformedRecord(e.to_string()))?;

        Ok(RecordParams {
            work_factor: params.t_cost(),
            memory_kib: params.m_cost(),
        })
    }

    /// Whether this record was produced with parameters other than `config`.
    ///
    /// Callers that want rehash-on-login use this after a successful verify.
    pub fn needs_rehash(&self, config: &HasherConfig) -> Result<bool> {
        let params = self.params()?;
        Ok(params.work_factor != config.work_factor || params.memory_kib != config.memory_kib)
    }

    fn parse(&self) -> Result<PasswordHash<'_>> {
        let parsed =
            PasswordHash::new(&self.0).map_err(|e| CredentialError::MalformedRecord(e.to_string()))?;

        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return Err(CredentialError::MalformedRecord(format!(
                "unsupported algorithm tag: {}",
                parsed.algorithm
            )));
        }

        if parsed.version != Some(Version::V0x13 as u32) {
            return Err(CredentialError::MalformedRecord(format!(
                "unsupported version: {:?}",
                parsed.version
            )));
        }

        let (Some(salt), Some(digest)) = (parsed.salt, parsed.hash) else {
            return Err(CredentialError::MalformedRecord(
                "missing salt or digest".to_string(),
            ));
        };

        let mut salt_buf = [0u8; Salt::MAX_LENGTH];
        let salt_len = salt
            .decode_b64(&mut salt_buf)
            .map_err(|e| CredentialError::MalformedRecord(e.to_string()))?
            .len();
        if salt_len != SALT_LEN {
            return Err(CredentialError::MalformedRecord(format!(
                "salt is {} bytes, expected {}",
                salt_len, SALT_LEN
            )));
        }
        if digest.len() != DIGEST_LEN {
            return Err(CredentialError::MalformedRecord(format!(
                "digest is {} bytes, expected {}",
                digest.len(),
                DIGEST_LEN
            )));
        }

        let params = Params::try_from(&parsed)
            .map_err(|e| CredentialError::MalformedRecord(e.to_string()))?;
        if params.p_cost() != LANES {
            return Err(CredentialError::MalformedRecord(format!(
                "unsupported lane count: {}",
                params.p_cost()
            )));
        }
        check_work_factor(params.t_cost())
            .and_then(|_| check_memory_kib(params.m_cost()))
            .map_err(|e| CredentialError::MalformedRecord(e.to_string()))?;

        Ok(parsed)
    }
}

impl From<String> for HashRecord {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<HashRecord> for String {
    fn from(record: HashRecord) -> Self {
        record.0
    }
}

impl fmt::Display for HashRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Keep digests out of logs.
impl fmt::Debug for HashRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.params() {
            Ok(p) => write!(
                f,
                "HashRecord({}, t={}, m={})",
                ALGORITHM, p.work_factor, p.memory_kib
            ),
            Err(_) => f.write_str("HashRecord(<malformed>)"),
        }
    }
}

/// Cost parameters decoded from a [`HashRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordParams {
    /// Time cost the record was produced with.
    pub work_factor: u32,
    /// Memory cost in KiB the record was produced with.
    pub memory_kib: u32,
}

/// Produces new hash records. Holds no shared state.
#[derive(Debug, Clone)]
pub struct Hasher {
    config: HasherConfig,
}

impl Hasher {
    /// Create a hasher, rejecting out-of-range parameters.
    pub fn new(config: HasherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The parameters applied to new records.
    pub fn config(&self) -> &HasherConfig {
        &self.config
    }

    /// Hash `secret` at `work_factor` with a salt from the OS CSPRNG.
    pub fn hash(&self, secret: &str, work_factor: u32) -> Result<HashRecord> {
        self.hash_with_rng(secret, work_factor, &mut OsRng)
    }

    /// Hash `secret` at the configured work-factor.
    pub fn hash_default(&self, secret: &str) -> Result<HashRecord> {
        self.hash(secret, self.config.work_factor)
    }

    /// Hash `secret` drawing the salt from `rng`.
    ///
    /// Inputs are validated before any randomness is consumed.
    pub fn hash_with_rng<R: RngCore + ?Sized>(
        &self,
        secret: &str,
        work_factor: u32,
        rng: &mut R,
    ) -> Result<HashRecord> {
        check_inputs(secret, work_factor)?;

        let mut salt = [0u8; SALT_LEN];
        rng.try_fill_bytes(&mut salt)
            .map_err(|e| CredentialError::RandomSource(e.to_string()))?;

        self.derive(secret, work_factor, &salt)
    }

    /// Hash `secret` with an explicit salt. Deterministic.
    pub fn hash_with_salt(&self, secret: &str, work_factor: u32, salt: &[u8]) -> Result<HashRecord> {
        check_inputs(secret, work_factor)?;
        if salt.len() != SALT_LEN {
            return Err(CredentialError::Configuration(format!(
                "salt must be {} bytes, got {}",
                SALT_LEN,
                salt.len()
            )));
        }

        self.derive(secret, work_factor, salt)
    }

    /// Check `secret` against `record`. See [`verify`].
    pub fn verify(&self, secret: &str, record: &HashRecord) -> Result<bool> {
        verify(secret, record)
    }

    fn derive(&self, secret: &str, work_factor: u32, salt: &[u8]) -> Result<HashRecord> {
        let salt =
            SaltString::encode_b64(salt).map_err(|e| CredentialError::Hashing(e.to_string()))?;
        let params = Params::new(self.config.memory_kib, work_factor, LANES, Some(DIGEST_LEN))
            .map_err(|e| CredentialError::Configuration(e.to_string()))?;

        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| HashRecord(hash.to_string()))
            .map_err(|e| CredentialError::Hashing(e.to_string()))
    }
}

fn check_inputs(secret: &str, work_factor: u32) -> Result<()> {
    if secret.is_empty() {
        return Err(CredentialError::EmptySecret);
    }
    check_work_factor(work_factor)
}

/// Check `secret` against `record`.
///
/// The digest is re-derived from the salt and cost parameters embedded in
/// the record and compared in constant time. Returns `Ok(false)` on a
/// mismatch and [`CredentialError::MalformedRecord`] when the record cannot
/// be used at all; the two must not be conflated.
pub fn verify(secret: &str, record: &HashRecord) -> Result<bool> {
    let parsed = record.parse()?;

    // Argon2's output comparison is constant-time.
    match Argon2::default().verify_password(secret.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CredentialError::MalformedRecord(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHEAP: HasherConfig = HasherConfig {
        work_factor: 1,
        memory_kib: 64,
    };

    fn hasher() -> Hasher {
        Hasher::new(CHEAP).unwrap()
    }

    /// Entropy source that always fails.
    struct DeadRng;

    impl RngCore for DeadRng {
        fn next_u32(&mut self) -> u32 {
            unreachable!()
        }

        fn next_u64(&mut self) -> u64 {
            unreachable!()
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            unreachable!()
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            Err(rand::Error::new("entropy pool exhausted"))
        }
    }

    #[test]
    fn test_hash_then_verify() {
        let hasher = hasher();
        let record = hasher.hash("correct-pw", 1).unwrap();

        assert!(verify("correct-pw", &record).unwrap());
        assert!(!verify("wrong-pw", &record).unwrap());
    }

    #[test]
    fn test_record_format() {
        let record = hasher().hash("correct-pw", 2).unwrap();

        assert!(record.as_str().starts_with("$argon2id$v=19$m=64,t=2,p=1$"));
        assert_eq!(
            record.params().unwrap(),
            RecordParams {
                work_factor: 2,
                memory_kib: 64
            }
        );
    }

    #[test]
    fn test_same_secret_different_records() {
        let hasher = hasher();
        let a = hasher.hash("same-secret", 1).unwrap();
        let b = hasher.hash("same-secret", 1).unwrap();

        assert_ne!(a, b);
        assert!(verify("same-secret", &a).unwrap());
        assert!(verify("same-secret", &b).unwrap());
    }

    #[test]
    fn test_fixed_salt_is_deterministic() {
        let hasher = hasher();
        let salt = [7u8; SALT_LEN];

        let a = hasher.hash_with_salt("pw", 1, &salt).unwrap();
        let b = hasher.hash_with_salt("pw", 1, &salt).unwrap();
        assert_eq!(a, b);

        let c = hasher.hash_with_salt("pw", 1, &[8u8; SALT_LEN]).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_salt_width_enforced() {
        let err = hasher().hash_with_salt("pw", 1, &[0u8; 4]).unwrap_err();
        assert!(matches!(err, CredentialError::Configuration(_)));
    }

    #[test]
    fn test_work_factor_out_of_range() {
        let hasher = hasher();

        for wf in [0, MAX_WORK_FACTOR + 1, u32::MAX] {
            let err = hasher.hash("pw", wf).unwrap_err();
            assert!(matches!(err, CredentialError::Configuration(_)), "wf={}", wf);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = Hasher::new(HasherConfig {
            work_factor: 0,
            memory_kib: 64,
        })
        .unwrap_err();
        assert!(matches!(err, CredentialError::Configuration(_)));

        let err = Hasher::new(HasherConfig {
            work_factor: 1,
            memory_kib: 4,
        })
        .unwrap_err();
        assert!(matches!(err, CredentialError::Configuration(_)));

        assert!(HasherConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let err = hasher().hash("", 1).unwrap_err();
        assert!(matches!(err, CredentialError::EmptySecret));
    }

    #[test]
    fn test_random_source_failure() {
        let err = hasher().hash_with_rng("pw", 1, &mut DeadRng).unwrap_err();
        assert!(matches!(err, CredentialError::RandomSource(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_invalid_input_checked_before_entropy() {
        // DeadRng would report RandomSource if it were consulted.
        let err = hasher().hash_with_rng("pw", 0, &mut DeadRng).unwrap_err();
        assert!(matches!(err, CredentialError::Configuration(_)));
    }

    #[test]
    fn test_malformed_records() {
        let cases = [
            "",
            "not a hash",
            "$argon2id$v=19$m=64,t=1,p=1",
            // bcrypt record
            "$2b$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy",
            // argon2i instead of argon2id
            "$argon2i$v=19$m=64,t=1,p=1$c29tZXNhbHRzb21lc2FsdA$aGFzaGhhc2hoYXNoaGFzaGhhc2hoYXNoaGFzaGhhc2g",
            // old version
            "$argon2id$v=16$m=64,t=1,p=1$c29tZXNhbHRzb21lc2FsdA$aGFzaGhhc2hoYXNoaGFzaGhhc2hoYXNoaGFzaGhhc2g",
            // work factor out of range
            "$argon2id$v=19$m=64,t=99,p=1$c29tZXNhbHRzb21lc2FsdA$aGFzaGhhc2hoYXNoaGFzaGhhc2hoYXNoaGFzaGhhc2g",
        ];

        for case in cases {
            let record = HashRecord::from(case.to_string());
            let err = verify("pw", &record).unwrap_err();
            assert!(
                matches!(err, CredentialError::MalformedRecord(_)),
                "expected malformed for {:?}",
                case
            );
        }
    }

    /// A genuine Argon2id record with arbitrary salt and digest widths.
    fn foreign_record(salt: &[u8], digest_len: usize) -> HashRecord {
        let salt = SaltString::encode_b64(salt).unwrap();
        let params = Params::new(64, 1, 1, Some(digest_len)).unwrap();
        let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password(b"pw", &salt)
            .unwrap();
        HashRecord::from(hash.to_string())
    }

    #[test]
    fn test_foreign_salt_and_digest_widths_rejected() {
        let cases = [
            foreign_record(&[1u8; 8], 10),
            foreign_record(&[1u8; 8], DIGEST_LEN),
            foreign_record(&[1u8; SALT_LEN], 10),
            foreign_record(&[1u8; 24], DIGEST_LEN),
        ];

        for record in &cases {
            let err = verify("pw", record).unwrap_err();
            assert!(
                matches!(err, CredentialError::MalformedRecord(_)),
                "expected malformed for {}",
                record
            );
            assert!(record.params().is_err());
        }

        // Same construction at our widths is accepted.
        let ours = foreign_record(&[1u8; SALT_LEN], DIGEST_LEN);
        assert!(verify("pw", &ours).unwrap());
    }

    #[test]
    fn test_verify_uses_embedded_parameters() {
        let old = hasher().hash("pw", 1).unwrap();

        // A later hasher with a higher default still verifies old records.
        let upgraded = Hasher::new(HasherConfig {
            work_factor: 3,
            memory_kib: 128,
        })
        .unwrap();
        assert!(upgraded.verify("pw", &old).unwrap());
        assert!(old.needs_rehash(upgraded.config()).unwrap());
        assert!(!old.needs_rehash(&CHEAP).unwrap());
    }

    #[test]
    fn test_debug_hides_digest() {
        let record = hasher().hash("pw", 1).unwrap();
        let debug = format!("{:?}", record);

        assert_eq!(debug, "HashRecord(argon2id, t=1, m=64)");
        assert!(!debug.contains('$'));
    }

    #[test]
    fn test_serde_is_plain_string() {
        let record = hasher().hash("pw", 1).unwrap();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, format!("\"{}\"", record.as_str()));

        let back: HashRecord = serde_json::from_str(&json).unwrap();
        assert!(verify("pw", &back).unwrap());
    }
}
