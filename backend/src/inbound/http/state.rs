//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AlertCommand, AlertQuery, CareGraphCommand, FallHistoryQuery, FallReportCommand,
    LoginService, MedicalHistoryCommand, MedicalHistoryQuery, ProfileCommand, ProfileQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub profile: Arc<dyn ProfileCommand>,
    pub profile_query: Arc<dyn ProfileQuery>,
    pub care_graph: Arc<dyn CareGraphCommand>,
    pub history: Arc<dyn MedicalHistoryCommand>,
    pub history_query: Arc<dyn MedicalHistoryQuery>,
    pub alerts: Arc<dyn AlertCommand>,
    pub alerts_query: Arc<dyn AlertQuery>,
    pub falls: Arc<dyn FallReportCommand>,
    pub fall_history: Arc<dyn FallHistoryQuery>,
}
