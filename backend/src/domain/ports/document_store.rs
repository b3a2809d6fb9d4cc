//! Port resolving uploaded bytes to a stable path string.
//!
//! The core stores and returns the path only; it never inspects file bytes.

use async_trait::async_trait;

use crate::domain::{EntryId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// The supplied file name cannot be stored safely.
        InvalidName { message: String } => "invalid document name: {message}",
        /// Writing the document failed.
        Io { message: String } => "document storage failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist `bytes` for a ledger entry and return the stored path.
    async fn store(
        &self,
        patient_id: &UserId,
        entry_id: &EntryId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, DocumentStoreError>;

    /// Remove a previously stored document. Missing paths are not an error.
    async fn discard(&self, path: &str) -> Result<(), DocumentStoreError>;
}

/// Store that returns a deterministic path without writing anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDocumentStore;

#[async_trait]
impl DocumentStore for FixtureDocumentStore {
    async fn store(
        &self,
        patient_id: &UserId,
        entry_id: &EntryId,
        file_name: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, DocumentStoreError> {
        Ok(format!("{patient_id}/{entry_id}/{file_name}"))
    }

    async fn discard(&self, _path: &str) -> Result<(), DocumentStoreError> {
        Ok(())
    }
}
