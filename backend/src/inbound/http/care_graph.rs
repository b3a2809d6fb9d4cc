//! Care graph handlers.
//!
//! ```text
//! POST   /api/v1/care-links {"doctorId":"...","patientId":"..."}
//! DELETE /api/v1/patients/{id}/doctor
//! ```

use actix_web::{delete, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::UserId;
use crate::domain::ports::CareLinkPair;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserView};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_id};

const DOCTOR_ID: FieldName = FieldName::new("doctorId");
const PATIENT_ID: FieldName = FieldName::new("patientId");

/// Assignment request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CareLinkRequest {
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
}

/// Both sides of an assignment after it was written.
#[derive(Debug, Serialize, ToSchema)]
pub struct CareLinkResponse {
    pub doctor: UserView,
    pub patient: UserView,
}

impl From<CareLinkPair> for CareLinkResponse {
    fn from(pair: CareLinkPair) -> Self {
        Self {
            doctor: UserView::from(pair.doctor),
            patient: UserView::from(pair.patient),
        }
    }
}

/// Assign a patient to a doctor. Repeating an assignment is a no-op.
#[utoipa::path(
    post,
    path = "/api/v1/care-links",
    request_body = CareLinkRequest,
    responses(
        (status = 200, description = "Updated doctor and patient", body = CareLinkResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "Unknown doctor or patient", body = ErrorSchema),
        (status = 409, description = "Concurrent update", body = ErrorSchema)
    ),
    tags = ["care-graph"],
    operation_id = "assignPatient"
)]
#[post("/care-links")]
pub async fn assign(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CareLinkRequest>,
) -> ApiResult<web::Json<CareLinkResponse>> {
    let actor = session.require_actor()?;
    let CareLinkRequest {
        doctor_id,
        patient_id,
    } = payload.into_inner();
    let doctor_id: UserId = parse_id(
        &doctor_id.ok_or_else(|| missing_field_error(DOCTOR_ID))?,
        DOCTOR_ID,
    )?;
    let patient_id: UserId = parse_id(
        &patient_id.ok_or_else(|| missing_field_error(PATIENT_ID))?,
        PATIENT_ID,
    )?;
    let pair = state
        .care_graph
        .assign(&actor, &doctor_id, &patient_id)
        .await?;
    Ok(web::Json(pair.into()))
}

/// Detach a patient from their doctor.
#[utoipa::path(
    delete,
    path = "/api/v1/patients/{id}/doctor",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Updated patient", body = UserView),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "Unknown patient", body = ErrorSchema),
        (status = 409, description = "Patient has no doctor", body = ErrorSchema)
    ),
    tags = ["care-graph"],
    operation_id = "unassignPatient"
)]
#[delete("/patients/{id}/doctor")]
pub async fn unassign(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserView>> {
    let actor = session.require_actor()?;
    let patient_id: UserId = parse_id(&path.into_inner(), PATIENT_ID)?;
    let patient = state.care_graph.unassign(&actor, &patient_id).await?;
    Ok(web::Json(patient.into()))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(assign).service(unassign);
}
