//! Credential hashing using unsalted SHA-256
//!
//! The digest is deterministic so a login attempt can be matched by looking up
//! `{username, digest}` directly. There is no per-user salt.

use sha2::{Digest as _, Sha256};
use std::fmt;

/// Fixed-width (32 byte) one-way digest of a credential
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Rebuild a digest from stored bytes; `None` unless exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(bytes).ok().map(Self)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Credential hasher
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hash a password
    pub fn hash(&self, password: &str) -> Digest {
        let mut out = [0u8; 32];
        out.copy_from_slice(&Sha256::digest(password.as_bytes()));
        Digest(out)
    }

    /// Verify a password against a stored digest
    pub fn verify(&self, password: &str, digest: &Digest) -> bool {
        self.hash(password) == *digest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let hasher = PasswordHasher::new();
        assert_eq!(hasher.hash("secret1"), hasher.hash("secret1"));
    }

    #[test]
    fn test_known_vector() {
        let hasher = PasswordHasher::new();
        assert_eq!(
            hasher.hash("").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_verify_fails_with_wrong_password() {
        let hasher = PasswordHasher::new();
        let digest = hasher.hash("TestPassword123!");

        assert!(hasher.verify("TestPassword123!", &digest));
        assert!(!hasher.verify("WrongPassword", &digest));
    }

    #[test]
    fn test_from_slice_requires_32_bytes() {
        let digest = PasswordHasher::new().hash("abc");
        assert_eq!(Digest::from_slice(digest.as_bytes()), Some(digest));
        assert_eq!(Digest::from_slice(&[0u8; 31]), None);
    }
}
