//! Salted one-way password hashing (Argon2id, PHC string encoding).
//!
//! Both directions are CPU-bound by construction, so they run on the blocking
//! pool and are awaited like any other I/O.

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use super::errors::AuthError;
use crate::config::HashingConfig;

const SALT_BYTES: usize = 16;

#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    pub fn new(cfg: &HashingConfig) -> Result<Self, AuthError> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| AuthError::internal(format!("invalid argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Returns the PHC-encoded hash of `password` under a fresh random salt.
    pub async fn hash(&self, password: &str) -> Result<Vec<u8>, AuthError> {
        let argon2 = self.argon2();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash_blocking(&argon2, &password)).await?
    }

    /// Checks `password` against a hash produced by [`PasswordHasher::hash`].
    ///
    /// Returns `Ok(false)` on mismatch. A hash that cannot be decoded is an
    /// internal failure.
    pub async fn verify(&self, password: &str, pass_hash: &[u8]) -> Result<bool, AuthError> {
        let password = password.to_owned();
        let pass_hash = pass_hash.to_vec();
        tokio::task::spawn_blocking(move || verify_blocking(&password, &pass_hash)).await?
    }
}

fn hash_blocking(argon2: &Argon2<'_>, password: &str) -> Result<Vec<u8>, AuthError> {
    let mut salt_bytes = [0u8; SALT_BYTES];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| AuthError::internal(format!("salt generation failed: {e}")))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AuthError::internal(format!("salt encoding failed: {e}")))?;

    let phc = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::internal(format!("password hashing failed: {e}")))?;
    Ok(phc.to_string().into_bytes())
}

fn verify_blocking(password: &str, pass_hash: &[u8]) -> Result<bool, AuthError> {
    let encoded = std::str::from_utf8(pass_hash)
        .map_err(|_| AuthError::internal("stored password hash is not utf-8"))?;
    let parsed = PasswordHash::new(encoded)
        .map_err(|e| AuthError::internal(format!("stored password hash is malformed: {e}")))?;

    // Parameters come from the PHC string, not from the current config.
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::internal(format!("password verification failed: {e}"))),
    }
}

#[cfg(test)]
pub(crate) fn cheap_config() -> HashingConfig {
    HashingConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}
