//! HTTP server configuration object and the layered service settings.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_NOTIFICATION_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_DOCUMENT_ROOT: &str = "./var/documents";

/// Service settings loaded from CLI arguments, `CARELINK_*` environment
/// variables, and configuration files.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CARELINK")]
pub struct ServiceSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// Email relay endpoint. Without one, fall emails are only logged.
    pub notification_endpoint: Option<String>,
    /// Upper bound on a single relay call.
    pub notification_timeout_ms: Option<u64>,
    /// Directory uploaded documents are written under.
    pub document_root: Option<PathBuf>,
    /// JSON file of accounts to provision at startup.
    pub seed_file: Option<PathBuf>,
}

impl ServiceSettings {
    /// Configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))
    }

    /// Relay timeout, falling back to five seconds.
    pub fn notification_timeout(&self) -> Duration {
        Duration::from_millis(
            self.notification_timeout_ms
                .unwrap_or(DEFAULT_NOTIFICATION_TIMEOUT_MS),
        )
    }

    /// Document root, falling back to `./var/documents`.
    pub fn document_root(&self) -> PathBuf {
        self.document_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCUMENT_ROOT))
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) settings: ServiceSettings,
}

impl ServerConfig {
    /// Construct a server configuration from session preferences.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            settings: ServiceSettings::default(),
        }
    }

    /// Attach the adapter settings used to build the services.
    #[must_use]
    pub fn with_settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(test),
        expect(dead_code, reason = "Exercised by configuration tests")
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
