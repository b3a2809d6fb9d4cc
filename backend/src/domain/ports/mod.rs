//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`UserRepository`, `FallEventRepository`,
//! `NotificationSender`, `DocumentStore`, `CredentialVerifier`) are
//! implemented by outbound adapters. Driving ports (`*Command`, `*Query`,
//! `LoginService`) are implemented by domain services and called by inbound
//! adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod alert_command;
mod care_graph_command;
mod credential_verifier;
mod document_store;
mod fall_event_repository;
mod fall_report_command;
mod login_service;
mod medical_history_command;
mod notification_sender;
mod profile_command;
mod user_repository;

pub use alert_command::{AlertCommand, AlertQuery};
#[cfg(test)]
pub use alert_command::{MockAlertCommand, MockAlertQuery};
pub use care_graph_command::{CareGraphCommand, CareLinkPair};
#[cfg(test)]
pub use care_graph_command::MockCareGraphCommand;
pub use credential_verifier::{CredentialError, CredentialVerifier};
#[cfg(test)]
pub use credential_verifier::MockCredentialVerifier;
pub use document_store::{DocumentStore, DocumentStoreError, FixtureDocumentStore};
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use fall_event_repository::{
    FallEventPersistenceError, FallEventRepository, FixtureFallEventRepository,
};
#[cfg(test)]
pub use fall_event_repository::MockFallEventRepository;
pub use fall_report_command::{FallHistoryQuery, FallReport, FallReportCommand, ReportFallRequest};
#[cfg(test)]
pub use fall_report_command::{MockFallHistoryQuery, MockFallReportCommand};
pub use login_service::{FixtureLoginService, LoginService};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use medical_history_command::{
    AttachDocumentRequest, AttachDocumentResponse, MedicalHistoryCommand, MedicalHistoryQuery,
    UploadDocumentRequest,
};
#[cfg(test)]
pub use medical_history_command::{MockMedicalHistoryCommand, MockMedicalHistoryQuery};
pub use notification_sender::{FixtureNotificationSender, NotificationError, NotificationSender};
#[cfg(test)]
pub use notification_sender::MockNotificationSender;
pub use profile_command::{ProfileCommand, ProfileQuery};
#[cfg(test)]
pub use profile_command::{MockProfileCommand, MockProfileQuery};
pub use user_repository::{FixtureUserRepository, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
