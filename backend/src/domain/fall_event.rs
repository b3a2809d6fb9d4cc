//! Recorded fall events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FallEventId, UserId};

/// Immutable record of a reported fall.
///
/// Created before the referenced patient and doctor are resolved, so the ids
/// may point at users that do not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallEvent {
    pub id: FallEventId,
    pub patient_id: UserId,
    pub email: String,
    pub location: String,
    pub doctor_id: UserId,
    pub reported_at: DateTime<Utc>,
}
