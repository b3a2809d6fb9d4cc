//! Port for outbound fall notifications.
//!
//! Adapters must bound every call with a timeout; the fall pipeline treats a
//! failure here as non-fatal and reports it to the caller.

use async_trait::async_trait;

use crate::domain::Email;

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification adapters.
    pub enum NotificationError {
        /// The relay did not answer within the configured timeout.
        Timeout { message: String } => "notification timed out: {message}",
        /// The relay answered with a rejection.
        Rejected { message: String } => "notification rejected: {message}",
        /// The request could not be delivered.
        Transport { message: String } => "notification transport failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Email a doctor that a patient fell.
    async fn send_fall_alert_email(
        &self,
        to: &Email,
        patient_name: &str,
        location: &str,
    ) -> Result<(), NotificationError>;
}

/// Sender that accepts every message without delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationSender;

#[async_trait]
impl NotificationSender for FixtureNotificationSender {
    async fn send_fall_alert_email(
        &self,
        _to: &Email,
        _patient_name: &str,
        _location: &str,
    ) -> Result<(), NotificationError> {
        Ok(())
    }
}
