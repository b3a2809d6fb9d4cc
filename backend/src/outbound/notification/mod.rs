//! Notification outbound adapters.
//!
//! [`HttpEmailRelay`] delivers through an HTTP relay. [`LoggingNotifier`] is
//! used when no relay is configured and only records the message.

mod http_relay;

pub use http_relay::HttpEmailRelay;

use async_trait::async_trait;
use tracing::info;

use crate::domain::Email;
use crate::domain::ports::{NotificationError, NotificationSender};

/// Sender that logs instead of delivering.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNotifier;

#[async_trait]
impl NotificationSender for LoggingNotifier {
    async fn send_fall_alert_email(
        &self,
        to: &Email,
        patient_name: &str,
        location: &str,
    ) -> Result<(), NotificationError> {
        info!(%to, patient_name, location, "fall notification (relay not configured)");
        Ok(())
    }
}

/// Runtime-selected sender, so wiring code can hold one concrete type.
pub enum Notifier {
    Relay(HttpEmailRelay),
    Log(LoggingNotifier),
}

#[async_trait]
impl NotificationSender for Notifier {
    async fn send_fall_alert_email(
        &self,
        to: &Email,
        patient_name: &str,
        location: &str,
    ) -> Result<(), NotificationError> {
        match self {
            Self::Relay(relay) => relay.send_fall_alert_email(to, patient_name, location).await,
            Self::Log(log) => log.send_fall_alert_email(to, patient_name, location).await,
        }
    }
}
