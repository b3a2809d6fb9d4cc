//! Fall reporting handlers.
//!
//! ```text
//! POST /api/v1/falls {"email":"...","location":"Room 4","doctorId":"..."}
//! GET  /api/v1/patients/{id}/falls
//! ```
//!
//! A report whose doctor notification fails answers `207 Multi-Status` with
//! the committed event and alert ids in `details`.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{FallReport, ReportFallRequest};
use crate::domain::{FallEvent, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, FallEventSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_id};

const DOCTOR_ID: FieldName = FieldName::new("doctorId");
const PATIENT_ID: FieldName = FieldName::new("patientId");
const LOCATION: FieldName = FieldName::new("location");

/// Body of `POST /falls`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FallReportRequest {
    /// Contact address captured with the event.
    #[schema(example = "ada@example.test")]
    #[serde(default)]
    pub email: String,
    #[schema(example = "Room 4")]
    pub location: Option<String>,
    pub doctor_id: Option<String>,
    /// Patient the fall concerns. Defaults to the signed-in user.
    pub patient_id: Option<String>,
}

/// Committed fall report.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FallReportView {
    #[schema(value_type = FallEventSchema)]
    pub event: FallEvent,
    #[schema(value_type = String, format = Uuid)]
    pub alert_id: String,
}

impl From<FallReport> for FallReportView {
    fn from(report: FallReport) -> Self {
        Self {
            alert_id: report.alert_id.to_string(),
            event: report.event,
        }
    }
}

/// Report a fall and alert the patient's doctor.
#[utoipa::path(
    post,
    path = "/api/v1/falls",
    request_body = FallReportRequest,
    responses(
        (status = 201, description = "Fall recorded and doctor notified", body = FallReportView),
        (status = 207, description = "Fall recorded but notification failed", body = ErrorSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "Unknown patient or doctor", body = ErrorSchema)
    ),
    tags = ["falls"],
    operation_id = "reportFall"
)]
#[post("/falls")]
pub async fn report_fall(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<FallReportRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor()?;
    let FallReportRequest {
        email,
        location,
        doctor_id,
        patient_id,
    } = payload.into_inner();
    let doctor_id: UserId = parse_id(
        &doctor_id.ok_or_else(|| missing_field_error(DOCTOR_ID))?,
        DOCTOR_ID,
    )?;
    let reporter_id = match patient_id {
        Some(raw) => parse_id(&raw, PATIENT_ID)?,
        None => actor.id,
    };
    let location = location.ok_or_else(|| missing_field_error(LOCATION))?;
    let report = state
        .falls
        .report_fall(
            &actor,
            ReportFallRequest {
                reporter_id,
                email,
                location,
                doctor_id,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(FallReportView::from(report)))
}

/// Fall events recorded for a patient, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}/falls",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Fall events", body = [FallEventSchema]),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "Unknown patient", body = ErrorSchema)
    ),
    tags = ["falls"],
    operation_id = "listFallEvents"
)]
#[get("/patients/{id}/falls")]
pub async fn list_falls(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<FallEvent>>> {
    let actor = session.require_actor()?;
    let patient_id: UserId = parse_id(&path.into_inner(), PATIENT_ID)?;
    let events = state
        .fall_history
        .list_fall_events(&actor, &patient_id)
        .await?;
    Ok(web::Json(events))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(report_fall).service(list_falls);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    use crate::domain::{Actor, Role};
    use crate::inbound::http::test_utils::{sign_in, test_app};
    use crate::test_support::world::TestWorld;

    fn fall_body(doctor: UserId) -> Value {
        json!({
            "email": "ada@example.test",
            "location": "Kitchen",
            "doctorId": doctor.to_string(),
        })
    }

    #[actix_web::test]
    async fn patient_reports_a_fall() {
        let world = TestWorld::new();
        let (doctor, patient) = world.linked_pair("Grace", "Ada").await;
        let app = test::init_service(test_app(world.http_state(), configure)).await;
        let cookie = sign_in(&app, &Actor::new(patient.id(), Role::Patient)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/falls")
                .cookie(cookie.clone())
                .set_json(fall_body(doctor.id()))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let report: Value = test::read_body_json(res).await;
        assert_eq!(report["event"]["patientId"], patient.id().to_string());
        assert_eq!(report["event"]["location"], "Kitchen");

        let stored_doctor = world.stored(&doctor.id()).await;
        assert_eq!(stored_doctor.alerts().len(), 1);
        assert!(stored_doctor.alerts()[0].is_fall());
        assert_eq!(
            world.stored(&patient.id()).await.last_known_location(),
            Some("Kitchen")
        );
        assert_eq!(
            world.notifier.sent(),
            vec![("grace@example.test".to_owned(), "Ada".to_owned(), "Kitchen".to_owned())]
        );

        let events: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/patients/{}/falls", patient.id()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(events.as_array().map(Vec::len), Some(1));
    }

    #[actix_web::test]
    async fn failed_notification_is_multi_status() {
        let world = TestWorld::new();
        let (doctor, patient) = world.linked_pair("Grace", "Ada").await;
        world.notifier.fail_sends(true);
        let app = test::init_service(test_app(world.http_state(), configure)).await;
        let cookie = sign_in(&app, &Actor::new(patient.id(), Role::Patient)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/falls")
                .cookie(cookie)
                .set_json(fall_body(doctor.id()))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::MULTI_STATUS);
        let value: Value = test::read_body_json(res).await;
        assert_eq!(value["code"], "partial_failure");
        assert_eq!(value["details"]["notification"], "failed");
        assert_eq!(world.events.all().await.len(), 1);
        assert_eq!(world.stored(&doctor.id()).await.alerts().len(), 1);
    }

    #[actix_web::test]
    async fn unknown_doctor_leaves_an_orphan_event() {
        let world = TestWorld::new();
        let (_, patient) = world.linked_pair("Grace", "Ada").await;
        let app = test::init_service(test_app(world.http_state(), configure)).await;
        let cookie = sign_in(&app, &Actor::new(patient.id(), Role::Patient)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/falls")
                .cookie(cookie)
                .set_json(fall_body(UserId::random()))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(world.events.all().await.len(), 1);
        assert!(world.notifier.sent().is_empty());
    }

    #[actix_web::test]
    async fn patients_cannot_report_for_others() {
        let world = TestWorld::new();
        let (doctor, patient) = world.linked_pair("Grace", "Ada").await;
        let (_, other) = world.linked_pair("Hopper", "Bea").await;
        let app = test::init_service(test_app(world.http_state(), configure)).await;
        let cookie = sign_in(&app, &Actor::new(other.id(), Role::Patient)).await;

        let mut body = fall_body(doctor.id());
        body["patientId"] = json!(patient.id().to_string());
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/falls")
                .cookie(cookie)
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(world.events.all().await.is_empty());
    }

    #[actix_web::test]
    async fn missing_location_is_reported() {
        let world = TestWorld::new();
        let (doctor, patient) = world.linked_pair("Grace", "Ada").await;
        let app = test::init_service(test_app(world.http_state(), configure)).await;
        let cookie = sign_in(&app, &Actor::new(patient.id(), Role::Patient)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/falls")
                .cookie(cookie)
                .set_json(json!({ "doctorId": doctor.id().to_string() }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let value: Value = test::read_body_json(res).await;
        assert_eq!(value["details"]["field"], "location");
    }
}
