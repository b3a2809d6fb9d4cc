//! Argon2id credential hashes stored as PHC strings.
//!
//! The algorithm, version, cost parameters, and salt travel inside the stored
//! string, so raising the cost for new hashes keeps older credentials valid.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use tracing::warn;

use crate::domain::CredentialHash;
use crate::domain::ports::{CredentialError, CredentialVerifier};

/// [`CredentialVerifier`] producing Argon2id PHC hashes.
#[derive(Debug, Clone)]
pub struct Argon2CredentialVerifier {
    params: Params,
}

impl Argon2CredentialVerifier {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Verifier with explicit memory (KiB) and iteration costs, single lane.
    ///
    /// # Errors
    /// Returns [`CredentialError::Hashing`] when argon2 rejects the costs.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self, CredentialError> {
        Params::new(memory_kib, iterations, 1, None)
            .map(Self::new)
            .map_err(|err| CredentialError::hashing(err.to_string()))
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2CredentialVerifier {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl CredentialVerifier for Argon2CredentialVerifier {
    fn hash(&self, password: &str) -> Result<CredentialHash, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        self.hasher()
            .hash_password(password.as_bytes(), &salt)
            .map(|phc| CredentialHash::new(phc.to_string()))
            .map_err(|err| CredentialError::hashing(err.to_string()))
    }

    fn verify(&self, password: &str, stored: &CredentialHash) -> bool {
        let parsed = match PasswordHash::new(stored.as_str()) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(error = %err, "stored credential is not a PHC string");
                return false;
            }
        };
        // Costs are read from the stored hash, not from `self.params`.
        self.hasher()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
