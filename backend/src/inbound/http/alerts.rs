//! Alert handlers.
//!
//! Patient-held alerts are addressed by patient id. Doctor views always act
//! on the signed-in doctor's own inbox.
//!
//! ```text
//! POST   /api/v1/patients/{id}/alerts {"message":"..."}
//! POST   /api/v1/patients/{id}/alerts/{alertId}/dismiss
//! GET    /api/v1/doctors/me/alerts/computed
//! GET    /api/v1/doctors/me/alerts/falls
//! DELETE /api/v1/doctors/me/alerts/{alertId}
//! DELETE /api/v1/doctors/me/alerts
//! GET    /api/v1/doctors/me/patient-alerts
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Alert, AlertId, ComputedAlert, PatientAlertView, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    AlertSchema, ComputedAlertSchema, ErrorSchema, PatientAlertSchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_id};

const PATIENT_ID: FieldName = FieldName::new("patientId");
const ALERT_ID: FieldName = FieldName::new("alertId");
const MESSAGE: FieldName = FieldName::new("message");

/// Body of `POST /patients/{id}/alerts`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientAlertRequest {
    #[schema(example = "Take evening medication")]
    pub message: Option<String>,
}

/// Number of inbox alerts removed by a clear.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClearedAlerts {
    pub cleared: usize,
}

/// Store an alert on a patient's record.
#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/alerts",
    params(("id" = String, Path, description = "Patient id")),
    request_body = PatientAlertRequest,
    responses(
        (status = 201, description = "Stored alert", body = AlertSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not the assigned doctor", body = ErrorSchema),
        (status = 404, description = "Unknown patient", body = ErrorSchema)
    ),
    tags = ["alerts"],
    operation_id = "pushPatientAlert"
)]
#[post("/patients/{id}/alerts")]
pub async fn push_patient_alert(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PatientAlertRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor()?;
    let patient_id: UserId = parse_id(&path.into_inner(), PATIENT_ID)?;
    let message = payload
        .into_inner()
        .message
        .ok_or_else(|| missing_field_error(MESSAGE))?;
    let alert = state
        .alerts
        .push_patient_alert(&actor, &patient_id, message)
        .await?;
    Ok(HttpResponse::Created().json(alert))
}

/// Flag a patient-held alert as dismissed. The alert stays on record.
#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/alerts/{alertId}/dismiss",
    params(
        ("id" = String, Path, description = "Patient id"),
        ("alertId" = String, Path, description = "Alert id")
    ),
    responses(
        (status = 200, description = "Dismissed alert", body = AlertSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "Unknown patient or alert", body = ErrorSchema)
    ),
    tags = ["alerts"],
    operation_id = "dismissPatientAlert"
)]
#[post("/patients/{id}/alerts/{alert_id}/dismiss")]
pub async fn dismiss_patient_alert(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Alert>> {
    let actor = session.require_actor()?;
    let (patient, alert) = path.into_inner();
    let patient_id: UserId = parse_id(&patient, PATIENT_ID)?;
    let alert_id: AlertId = parse_id(&alert, ALERT_ID)?;
    let alert = state
        .alerts
        .dismiss_patient_alert(&actor, &patient_id, &alert_id)
        .await?;
    Ok(web::Json(alert))
}

/// Clinical alerts derived from the ledgers of the doctor's patients.
#[utoipa::path(
    get,
    path = "/api/v1/doctors/me/alerts/computed",
    responses(
        (status = 200, description = "Derived alerts", body = [ComputedAlertSchema]),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Signed-in user is not a doctor", body = ErrorSchema)
    ),
    tags = ["alerts"],
    operation_id = "computeDoctorAlerts"
)]
#[get("/doctors/me/alerts/computed")]
pub async fn computed_alerts(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ComputedAlert>>> {
    let actor = session.require_actor()?;
    let alerts = state
        .alerts_query
        .compute_doctor_alerts(&actor, &actor.id)
        .await?;
    Ok(web::Json(alerts))
}

/// Fall-tagged alerts in the doctor's inbox.
#[utoipa::path(
    get,
    path = "/api/v1/doctors/me/alerts/falls",
    responses(
        (status = 200, description = "Fall alerts", body = [AlertSchema]),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Signed-in user is not a doctor", body = ErrorSchema)
    ),
    tags = ["alerts"],
    operation_id = "listDoctorFallAlerts"
)]
#[get("/doctors/me/alerts/falls")]
pub async fn fall_alerts(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Alert>>> {
    let actor = session.require_actor()?;
    let alerts = state
        .alerts_query
        .list_doctor_fall_alerts(&actor, &actor.id)
        .await?;
    Ok(web::Json(alerts))
}

/// Remove one alert from the doctor's inbox.
#[utoipa::path(
    delete,
    path = "/api/v1/doctors/me/alerts/{alertId}",
    params(("alertId" = String, Path, description = "Alert id")),
    responses(
        (status = 204, description = "Alert removed"),
        (status = 400, description = "Malformed alert id", body = ErrorSchema),
        (status = 404, description = "Unknown alert", body = ErrorSchema)
    ),
    tags = ["alerts"],
    operation_id = "clearDoctorAlert"
)]
#[delete("/doctors/me/alerts/{alert_id}")]
pub async fn clear_alert(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor()?;
    let alert_id: AlertId = parse_id(&path.into_inner(), ALERT_ID)?;
    state
        .alerts
        .clear_doctor_alert(&actor, &actor.id, &alert_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Empty the doctor's inbox.
#[utoipa::path(
    delete,
    path = "/api/v1/doctors/me/alerts",
    responses(
        (status = 200, description = "Number of alerts removed", body = ClearedAlerts),
        (status = 404, description = "Signed-in user is not a doctor", body = ErrorSchema)
    ),
    tags = ["alerts"],
    operation_id = "clearDoctorAlerts"
)]
#[delete("/doctors/me/alerts")]
pub async fn clear_alerts(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ClearedAlerts>> {
    let actor = session.require_actor()?;
    let cleared = state.alerts.clear_doctor_alerts(&actor, &actor.id).await?;
    Ok(web::Json(ClearedAlerts { cleared }))
}

/// Undismissed alerts held by the doctor's patients.
#[utoipa::path(
    get,
    path = "/api/v1/doctors/me/patient-alerts",
    responses(
        (status = 200, description = "Patient alerts", body = [PatientAlertSchema]),
        (status = 404, description = "Signed-in user is not a doctor", body = ErrorSchema)
    ),
    tags = ["alerts"],
    operation_id = "listPatientAlerts"
)]
#[get("/doctors/me/patient-alerts")]
pub async fn patient_alerts(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<PatientAlertView>>> {
    let actor = session.require_actor()?;
    let alerts = state
        .alerts_query
        .list_patient_alerts(&actor, &actor.id)
        .await?;
    Ok(web::Json(alerts))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(push_patient_alert)
        .service(dismiss_patient_alert)
        .service(computed_alerts)
        .service(fall_alerts)
        .service(clear_alert)
        .service(clear_alerts)
        .service(patient_alerts);
}
