//! Port for credential hashing and verification.

use crate::domain::CredentialHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised while producing a credential hash.
    pub enum CredentialError {
        /// The password could not be hashed.
        Hashing { message: String } => "credential hashing failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait CredentialVerifier: Send + Sync {
    /// Produce a stored hash for a plain-text password.
    fn hash(&self, password: &str) -> Result<CredentialHash, CredentialError>;

    /// Whether `password` matches `stored`.
    fn verify(&self, password: &str, stored: &CredentialHash) -> bool;
}
