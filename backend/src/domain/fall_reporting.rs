//! Fall event pipeline.
//!
//! The event is stored before the referenced users are resolved, so a report
//! naming an unknown patient or doctor leaves an orphan event behind while
//! returning `not_found`. A notification failure never rolls back the
//! committed writes; it is surfaced as `partial_failure`.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{error, info};

use crate::domain::alerts::AlertService;
use crate::domain::ports::{
    FallEventPersistenceError, FallEventRepository, FallHistoryQuery, FallReport,
    FallReportCommand, NotificationSender, ReportFallRequest, UserRepository,
};
use crate::domain::user_store::UserStore;
use crate::domain::{
    Action, Actor, Error, FallEvent, FallEventId, Role, Subject, UserId, can, can_on,
};

fn map_event_error(error: FallEventPersistenceError) -> Error {
    match error {
        FallEventPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("fall event repository unavailable: {message}"))
        }
        FallEventPersistenceError::Query { message } => {
            Error::internal(format!("fall event repository error: {message}"))
        }
    }
}

/// Alert message pushed to the doctor's inbox.
pub fn fall_alert_message(patient_name: &str, location: &str) -> String {
    format!("Fall detected for {patient_name} at {location}")
}

/// Fall pipeline implementing [`FallReportCommand`] and [`FallHistoryQuery`].
pub struct FallReportService<R, F, N> {
    users: UserStore<R>,
    alerts: AlertService<R>,
    events: Arc<F>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<R, F, N> Clone for FallReportService<R, F, N> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            alerts: self.alerts.clone(),
            events: Arc::clone(&self.events),
            notifier: Arc::clone(&self.notifier),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, F, N> FallReportService<R, F, N>
where
    R: UserRepository,
    F: FallEventRepository,
    N: NotificationSender,
{
    pub fn new(users: Arc<R>, events: Arc<F>, notifier: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: UserStore::new(Arc::clone(&users)),
            alerts: AlertService::new(users, Arc::clone(&clock)),
            events,
            notifier,
            clock,
        }
    }
}

#[async_trait]
impl<R, F, N> FallReportCommand for FallReportService<R, F, N>
where
    R: UserRepository,
    F: FallEventRepository,
    N: NotificationSender,
{
    async fn report_fall(
        &self,
        actor: &Actor,
        request: ReportFallRequest,
    ) -> Result<FallReport, Error> {
        can_on(actor, Action::ReportFall, Subject::unresolved(request.reporter_id))?;
        let location = request.location.trim().to_owned();
        if location.is_empty() {
            return Err(Error::validation("location must not be empty")
                .with_details(json!({ "field": "location" })));
        }

        let event = FallEvent {
            id: FallEventId::random(),
            patient_id: request.reporter_id,
            email: request.email,
            location,
            doctor_id: request.doctor_id,
            reported_at: self.clock.utc(),
        };
        self.events.insert(&event).await.map_err(map_event_error)?;
        info!(
            event_id = %event.id,
            patient_id = %event.patient_id,
            doctor_id = %event.doctor_id,
            "fall event recorded"
        );

        let patient = self
            .users
            .load_with_role(&event.patient_id, Role::Patient)
            .await?;
        let doctor = self
            .users
            .load_with_role(&event.doctor_id, Role::Doctor)
            .await?;

        let alert = self
            .alerts
            .push_doctor_alert(
                &doctor.id(),
                &fall_alert_message(patient.name(), &event.location),
                Some(patient.id()),
            )
            .await?;

        let location = event.location.clone();
        self.users
            .mutate(&event.patient_id, |patient| {
                patient.set_last_known_location(location.clone());
                Ok(())
            })
            .await?;

        if let Err(err) = self
            .notifier
            .send_fall_alert_email(doctor.email(), patient.name(), &event.location)
            .await
        {
            error!(
                event_id = %event.id,
                doctor_id = %doctor.id(),
                error = %err,
                "fall notification failed"
            );
            return Err(Error::partial_failure(format!(
                "fall recorded but the doctor could not be notified: {err}"
            ))
            .with_details(json!({
                "eventId": event.id,
                "alertId": alert.id(),
                "notification": "failed",
            })));
        }

        Ok(FallReport {
            event,
            alert_id: alert.id(),
        })
    }
}

#[async_trait]
impl<R, F, N> FallHistoryQuery for FallReportService<R, F, N>
where
    R: UserRepository,
    F: FallEventRepository,
    N: NotificationSender,
{
    async fn list_fall_events(
        &self,
        actor: &Actor,
        patient_id: &UserId,
    ) -> Result<Vec<FallEvent>, Error> {
        let patient = self.users.load_with_role(patient_id, Role::Patient).await?;
        can(actor, Action::ReadPatientRecord, &patient)?;
        self.events
            .list_for_patient(patient_id)
            .await
            .map_err(map_event_error)
    }
}

#[cfg(test)]
#[path = "fall_reporting_tests.rs"]
mod tests;
