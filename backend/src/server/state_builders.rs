//! Builders wiring adapters into the domain services behind [`HttpState`].

use std::io;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use reqwest::Url;
use tracing::{info, warn};

use carelink::domain::{
    AccountService, AlertService, CareGraphService, FallReportService, MedicalHistoryService,
};
use carelink::inbound::http::state::HttpState;
use carelink::outbound::credentials::Argon2CredentialVerifier;
use carelink::outbound::documents::CapStdDocumentStore;
use carelink::outbound::notification::{HttpEmailRelay, LoggingNotifier, Notifier};
use carelink::outbound::persistence::{InMemoryFallEventRepository, InMemoryUserRepository};

use super::ServiceSettings;

/// Account service type shared by the HTTP state and startup seeding.
pub(super) type Accounts = AccountService<InMemoryUserRepository, Argon2CredentialVerifier>;

/// Services built for one server instance.
pub(super) struct Services {
    pub(super) accounts: Accounts,
    pub(super) http_state: HttpState,
}

/// Pick the relay adapter when an endpoint is configured, logging otherwise.
pub(super) fn build_notifier(settings: &ServiceSettings) -> io::Result<Notifier> {
    let Some(raw) = settings.notification_endpoint.as_deref() else {
        warn!("no notification endpoint configured; fall emails are only logged");
        return Ok(Notifier::Log(LoggingNotifier));
    };
    let endpoint = Url::parse(raw)
        .map_err(|e| io::Error::other(format!("invalid notification endpoint {raw}: {e}")))?;
    let timeout = settings.notification_timeout();
    let relay = HttpEmailRelay::new(endpoint, timeout)
        .map_err(|e| io::Error::other(format!("notification client setup failed: {e}")))?;
    info!(endpoint = raw, ?timeout, "notification relay configured");
    Ok(Notifier::Relay(relay))
}

/// Build every service over the in-memory repositories.
///
/// # Errors
/// Returns an I/O error when the document root cannot be opened or the
/// notification endpoint is invalid.
pub(super) fn build_services(settings: &ServiceSettings) -> io::Result<Services> {
    let users = Arc::new(InMemoryUserRepository::new());
    let events = Arc::new(InMemoryFallEventRepository::new());
    let document_root = settings.document_root();
    let documents = Arc::new(CapStdDocumentStore::open(&document_root).map_err(|e| {
        io::Error::other(format!(
            "failed to open document root {}: {e}",
            document_root.display()
        ))
    })?);
    let notifier = Arc::new(build_notifier(settings)?);
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let accounts = AccountService::new(
        Arc::clone(&users),
        Arc::new(Argon2CredentialVerifier::default()),
    );
    let care_graph = CareGraphService::new(Arc::clone(&users));
    let history = MedicalHistoryService::new(Arc::clone(&users), documents, Arc::clone(&clock));
    let alerts = AlertService::new(Arc::clone(&users), Arc::clone(&clock));
    let falls = FallReportService::new(users, events, notifier, clock);

    let http_state = HttpState {
        login: Arc::new(accounts.clone()),
        profile: Arc::new(accounts.clone()),
        profile_query: Arc::new(accounts.clone()),
        care_graph: Arc::new(care_graph),
        history: Arc::new(history.clone()),
        history_query: Arc::new(history),
        alerts: Arc::new(alerts.clone()),
        alerts_query: Arc::new(alerts),
        falls: Arc::new(falls.clone()),
        fall_history: Arc::new(falls),
    };
    Ok(Services {
        accounts,
        http_state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn settings_in(dir: &tempfile::TempDir, endpoint: Option<&str>) -> ServiceSettings {
        ServiceSettings {
            document_root: Some(dir.path().join("documents")),
            notification_endpoint: endpoint.map(str::to_owned),
            ..ServiceSettings::default()
        }
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some("http://relay.invalid/send"), true)]
    fn notifier_follows_the_endpoint(#[case] endpoint: Option<&str>, #[case] relay: bool) {
        let dir = tempfile::tempdir().expect("tempdir");
        let notifier = build_notifier(&settings_in(&dir, endpoint)).expect("notifier");
        assert_eq!(matches!(notifier, Notifier::Relay(_)), relay);
    }

    #[rstest]
    fn malformed_endpoint_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = build_services(&settings_in(&dir, Some("not a url")))
            .err()
            .expect("invalid endpoint");
        assert!(err.to_string().contains("invalid notification endpoint"));
    }

    #[rstest]
    fn services_create_the_document_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        build_services(&settings_in(&dir, None)).expect("services");
        assert!(dir.path().join("documents").is_dir());
    }
}
