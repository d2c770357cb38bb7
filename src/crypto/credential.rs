use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::error::RelayError;

/// One-way hash of a credential, encoded as a PHC string
/// (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedCredential(String);

impl HashedCredential {
    /// Wrap an encoded hash without checking it. A malformed value surfaces
    /// later as a verification error.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Wrap an encoded hash after checking that it is a well-formed PHC string.
    pub fn parse(encoded: impl Into<String>) -> Result<Self, RelayError> {
        let encoded = encoded.into();
        PasswordHash::new(&encoded)
            .map_err(|e| RelayError::Verification(format!("parse hash: {e}")))?;
        Ok(Self(encoded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Hash a credential with Argon2id, default work factor and a random salt.
pub fn hash_credential(secret: &str) -> Result<HashedCredential, RelayError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| HashedCredential(hash.to_string()))
        .map_err(|e| RelayError::Hashing(e.to_string()))
}

/// Check a credential against a hash.
///
/// A mismatch is `Ok(false)`. Only a hash that cannot be parsed or uses an
/// unsupported algorithm/version is an error.
pub fn verify_credential(secret: &str, hashed: &HashedCredential) -> Result<bool, RelayError> {
    let parsed = PasswordHash::new(hashed.as_str())
        .map_err(|e| RelayError::Verification(format!("parse hash: {e}")))?;

    match Argon2::default().verify_password(secret.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(RelayError::Verification(e.to_string())),
    }
}
