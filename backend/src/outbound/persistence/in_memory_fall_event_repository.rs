//! In-process append-only `FallEventRepository`.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{FallEventPersistenceError, FallEventRepository};
use crate::domain::{FallEvent, UserId};

/// Vector-backed event log; insertion order is report order.
#[derive(Clone, Default)]
pub struct InMemoryFallEventRepository {
    events: Arc<RwLock<Vec<FallEvent>>>,
}

impl InMemoryFallEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored event, oldest first.
    pub async fn all(&self) -> Vec<FallEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl FallEventRepository for InMemoryFallEventRepository {
    async fn insert(&self, event: &FallEvent) -> Result<(), FallEventPersistenceError> {
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn list_for_patient(
        &self,
        patient_id: &UserId,
    ) -> Result<Vec<FallEvent>, FallEventPersistenceError> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .rev()
            .filter(|event| event.patient_id == *patient_id)
            .cloned()
            .collect())
    }
}
