//! Reqwest-backed email relay adapter.
//!
//! Posts a JSON message to a relay endpoint that owns actual mail delivery.
//! This adapter owns transport details only: payload shape, timeout, and
//! HTTP error mapping.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crate::domain::Email;
use crate::domain::ports::{NotificationError, NotificationSender};

const DEFAULT_USER_AGENT: &str = "carelink-backend-notifier/0.1";

/// Message body accepted by the relay.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct RelayMessage<'a> {
    to: &'a str,
    subject: String,
    text: String,
}

fn fall_message<'a>(to: &'a Email, patient_name: &str, location: &str) -> RelayMessage<'a> {
    RelayMessage {
        to: to.as_str(),
        subject: format!("Fall alert: {patient_name}"),
        text: format!(
            "{patient_name} reported a fall at {location}. Open the care dashboard for details."
        ),
    }
}

/// Notification adapter that POSTs to one relay endpoint.
pub struct HttpEmailRelay {
    client: Client,
    endpoint: Url,
}

impl HttpEmailRelay {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl NotificationSender for HttpEmailRelay {
    async fn send_fall_alert_email(
        &self,
        to: &Email,
        patient_name: &str,
        location: &str,
    ) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&fall_message(to, patient_name, location))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status, body.as_ref()))
    }
}

fn map_transport_error(error: reqwest::Error) -> NotificationError {
    if error.is_timeout() {
        NotificationError::timeout(error.to_string())
    } else {
        NotificationError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> NotificationError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            NotificationError::timeout(message)
        }
        _ if status.is_client_error() => NotificationError::rejected(message),
        _ => NotificationError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 120;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the mapping helpers and the bounded request timeout.

    use std::time::Instant;

    use super::*;
    use rstest::rstest;
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accept one connection and hold it open without ever replying.
    async fn silent_relay() -> (Url, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let handle = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.expect("accept");
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });
        let url = Url::parse(&format!("http://{addr}/send")).expect("url");
        (url, handle)
    }

    fn recipient() -> Email {
        Email::new("grace@example.test").expect("email")
    }

    #[rstest]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, "Timeout")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case::bad_request(StatusCode::UNPROCESSABLE_ENTITY, "Rejected")]
    #[case::server_error(StatusCode::BAD_GATEWAY, "Transport")]
    fn maps_http_statuses(#[case] status: StatusCode, #[case] expected: &str) {
        let error = map_status_error(status, b"{\"error\": \"mailbox full\"}");
        let matched = match expected {
            "Timeout" => matches!(error, NotificationError::Timeout { .. }),
            "Rejected" => matches!(error, NotificationError::Rejected { .. }),
            "Transport" => matches!(error, NotificationError::Transport { .. }),
            _ => panic!("unsupported test expectation: {expected}"),
        };
        assert!(matched, "{status} should map to {expected}, got {error:?}");
    }

    #[test]
    fn long_bodies_are_truncated_in_messages() {
        let body = "x".repeat(500);
        let error = map_status_error(StatusCode::BAD_REQUEST, body.as_bytes());
        assert!(error.to_string().ends_with("..."));
    }

    #[test]
    fn message_names_patient_and_location() {
        let to = Email::new("grace@example.test").expect("email");
        let message = fall_message(&to, "Ada", "Room 4");
        assert_eq!(message.to, "grace@example.test");
        assert_eq!(message.subject, "Fall alert: Ada");
        assert!(message.text.contains("Ada reported a fall at Room 4"));
    }

    #[tokio::test]
    async fn unresponsive_relay_times_out_within_the_bound() {
        let (url, server) = silent_relay().await;
        let relay = HttpEmailRelay::new(url, Duration::from_millis(100)).expect("client");

        let started = Instant::now();
        let err = relay
            .send_fall_alert_email(&recipient(), "Ada", "Room 4")
            .await
            .expect_err("timeout");

        assert!(matches!(err, NotificationError::Timeout { .. }), "got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);
        let url = Url::parse(&format!("http://{addr}/send")).expect("url");
        let relay = HttpEmailRelay::new(url, Duration::from_secs(2)).expect("client");

        let err = relay
            .send_fall_alert_email(&recipient(), "Ada", "Room 4")
            .await
            .expect_err("refused");

        assert!(matches!(err, NotificationError::Transport { .. }), "got {err:?}");
    }
}
