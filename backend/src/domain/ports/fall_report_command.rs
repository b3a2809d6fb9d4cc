//! Driving ports for fall reporting and fall history.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Actor, AlertId, Error, FallEvent, UserId};

/// A fall reported by (or on behalf of) a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFallRequest {
    pub reporter_id: UserId,
    pub email: String,
    pub location: String,
    pub doctor_id: UserId,
}

/// State committed by a successful report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallReport {
    pub event: FallEvent,
    pub alert_id: AlertId,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FallReportCommand: Send + Sync {
    /// Record the event, push the doctor inbox alert, update the patient's
    /// location, then notify the doctor.
    ///
    /// # Errors
    /// - `not_found` when either user is missing; the event stays stored.
    /// - `partial_failure` when only the notification failed; details carry
    ///   the committed `eventId` and `alertId`.
    async fn report_fall(
        &self,
        actor: &Actor,
        request: ReportFallRequest,
    ) -> Result<FallReport, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FallHistoryQuery: Send + Sync {
    /// Fall events for a patient, newest first.
    async fn list_fall_events(
        &self,
        actor: &Actor,
        patient_id: &UserId,
    ) -> Result<Vec<FallEvent>, Error>;
}
