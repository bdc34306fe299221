//! # rb-auth-simple
//!
//! Delete-password policies implementing `AuthProvider`.
//!
//! `PlaintextAuthProvider` is the default: passwords are stored as submitted
//! and compared by equality, which keeps the creation response echoing the
//! password the poster chose. Anyone with read access to the store can delete
//! any post. `Argon2AuthProvider` stores PHC hashes instead.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use rb_core::traits::AuthProvider;

/// Stores the password verbatim. Known weakness, kept for compatibility.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaintextAuthProvider;

#[async_trait]
impl AuthProvider for PlaintextAuthProvider {
    fn seal_password(&self, password: &str) -> anyhow::Result<String> {
        Ok(password.to_string())
    }

    async fn verify_password(&self, candidate: &str, stored: &str) -> bool {
        candidate == stored
    }
}

/// Stores an Argon2id PHC string; the plaintext never reaches the store.
#[derive(Default)]
pub struct Argon2AuthProvider {
    hasher: Argon2<'static>,
}

impl Argon2AuthProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthProvider for Argon2AuthProvider {
    fn seal_password(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("failed to hash delete password: {e}"))?;
        Ok(hash.to_string())
    }

    /// A stored value that is not a valid PHC string never matches.
    async fn verify_password(&self, candidate: &str, stored: &str) -> bool {
        let parsed_hash = match PasswordHash::new(stored) {
            Ok(p) => p,
            Err(_) => return false,
        };
        self.hasher
            .verify_password(candidate.as_bytes(), &parsed_hash)
            .is_ok()
    }
}
