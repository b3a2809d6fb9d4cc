//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer
//! - **Schemas**: wrappers in [`crate::inbound::http::schemas`] that describe
//!   domain types without coupling them to utoipa, plus request and response
//!   bodies owned by the handlers
//! - **Security**: session cookie authentication scheme
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::alerts::{ClearedAlerts, PatientAlertRequest};
use crate::inbound::http::care_graph::{CareLinkRequest, CareLinkResponse};
use crate::inbound::http::falls::{FallReportRequest, FallReportView};
use crate::inbound::http::medical_history::{
    AttachDocumentBody, AttachDocumentView, DiseaseRequest, EntryRequest, VitalRequest,
};
use crate::inbound::http::schemas::{
    AlertSchema, ComputedAlertSchema, DiseaseSchema, ErrorCodeSchema, ErrorSchema,
    FallEventSchema, MedicalHistoryEntrySchema, PatientAlertSchema, UserView, VitalSchema,
};
use crate::inbound::http::users::{LoginRequest, PasswordRequest, ProfileRequest};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Carelink backend API",
        description = "Care graph, medical history, alerts, and fall reporting for elderly care.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::change_password,
        crate::inbound::http::care_graph::assign,
        crate::inbound::http::care_graph::unassign,
        crate::inbound::http::medical_history::list_history,
        crate::inbound::http::medical_history::append_entry,
        crate::inbound::http::medical_history::attach_document,
        crate::inbound::http::medical_history::upload_document,
        crate::inbound::http::alerts::push_patient_alert,
        crate::inbound::http::alerts::dismiss_patient_alert,
        crate::inbound::http::alerts::computed_alerts,
        crate::inbound::http::alerts::fall_alerts,
        crate::inbound::http::alerts::clear_alert,
        crate::inbound::http::alerts::clear_alerts,
        crate::inbound::http::alerts::patient_alerts,
        crate::inbound::http::falls::report_fall,
        crate::inbound::http::falls::list_falls,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserView,
        AlertSchema,
        ComputedAlertSchema,
        PatientAlertSchema,
        VitalSchema,
        DiseaseSchema,
        MedicalHistoryEntrySchema,
        FallEventSchema,
        LoginRequest,
        ProfileRequest,
        PasswordRequest,
        CareLinkRequest,
        CareLinkResponse,
        EntryRequest,
        VitalRequest,
        DiseaseRequest,
        AttachDocumentBody,
        AttachDocumentView,
        PatientAlertRequest,
        ClearedAlerts,
        FallReportRequest,
        FallReportView,
    )),
    tags(
        (name = "users", description = "Sessions and personal profiles"),
        (name = "care-graph", description = "Doctor and patient assignments"),
        (name = "medical-history", description = "Patient ledgers and attached documents"),
        (name = "alerts", description = "Stored and computed alerts"),
        (name = "falls", description = "Fall reports and history"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI registration and schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "message")]
    #[case("UserView", "doctorRef")]
    #[case("MedicalHistoryEntry", "vitals")]
    #[case("FallEvent", "doctorId")]
    fn schemas_expose_wire_fields(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let found = schemas
            .get(schema)
            .unwrap_or_else(|| panic!("{schema} schema registered"));
        assert_object_schema_has_field(found, field);
    }

    #[rstest]
    #[case("/api/v1/login")]
    #[case("/api/v1/care-links")]
    #[case("/api/v1/patients/{id}/history/{entryId}/documents/upload")]
    #[case("/api/v1/doctors/me/alerts/computed")]
    #[case("/api/v1/falls")]
    #[case("/health/ready")]
    fn paths_are_registered(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
