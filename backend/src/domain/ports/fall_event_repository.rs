//! Port for append-only fall event storage.

use async_trait::async_trait;

use crate::domain::{FallEvent, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by fall event repository adapters.
    pub enum FallEventPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "fall event repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "fall event repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FallEventRepository: Send + Sync {
    /// Persist an event. Referenced users are not checked.
    async fn insert(&self, event: &FallEvent) -> Result<(), FallEventPersistenceError>;

    /// Events reported for a patient, newest first.
    async fn list_for_patient(
        &self,
        patient_id: &UserId,
    ) -> Result<Vec<FallEvent>, FallEventPersistenceError>;
}

/// Repository that discards writes and returns no events.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFallEventRepository;

#[async_trait]
impl FallEventRepository for FixtureFallEventRepository {
    async fn insert(&self, _event: &FallEvent) -> Result<(), FallEventPersistenceError> {
        Ok(())
    }

    async fn list_for_patient(
        &self,
        _patient_id: &UserId,
    ) -> Result<Vec<FallEvent>, FallEventPersistenceError> {
        Ok(Vec::new())
    }
}
