//! Domain primitives, policy, and services.
//!
//! Purpose: hold the care graph, the medical history ledger, the alert
//! engine, and the fall pipeline behind ports, free of transport and storage
//! concerns.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failures with stable codes.
//! - `User` and its closed `Role` union, with role-specific `CareLinks`.
//! - `can` / `can_on`: the authorisation gate every mutation passes.
//! - Services implementing the driving ports in [`ports`].

pub mod accounts;
pub mod alert;
pub mod alerts;
pub mod auth;
pub mod authorization;
pub mod care_graph;
pub mod clinical;
pub mod error;
pub mod fall_event;
pub mod fall_reporting;
pub mod ids;
pub mod medical_history;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_store;

pub use self::accounts::{AccountService, NewUser};
pub use self::alert::{Alert, AlertSeverity, ComputedAlert, FALL_TAG, PatientAlertView};
pub use self::alerts::AlertService;
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::authorization::{Action, Actor, Subject, can, can_on};
pub use self::care_graph::{CareGraphService, RepairReport};
pub use self::clinical::{
    ClinicalStatus, ClinicalValidationError, Disease, DiseaseDraft, DocumentPlacement, EntryDraft,
    MedicalHistoryEntry, UnknownStatus, Vital, VitalDraft,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::fall_event::FallEvent;
pub use self::fall_reporting::FallReportService;
pub use self::ids::{AlertId, EntryId, FallEventId, IdParseError, UserId};
pub use self::medical_history::MedicalHistoryService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    CareLinks, CredentialHash, Email, Profile, ProfileUpdate, Role, RoleMismatch, UnknownRole,
    User, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use carelink::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::unauthorized("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
