//! Alert records and their derived projections.
//!
//! Two kinds of alert exist side by side:
//! - stored alerts ([`Alert`]) appended to a user's inbox, and
//! - computed alerts ([`ComputedAlert`]) derived from ledger contents at read
//!   time and never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AlertId, UserId};

/// Tag that classifies an inbox alert as a fall alert.
pub const FALL_TAG: &str = "fall";

/// Severity of a computed alert. Wire values are `high` and `critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    High,
    Critical,
}

/// An alert stored on a user record.
///
/// Dismissal is a flag; only the explicit inbox clear operations remove an
/// alert physically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    id: AlertId,
    message: String,
    created_at: DateTime<Utc>,
    dismissed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    related_patient: Option<UserId>,
}

impl Alert {
    /// Build a fresh, undismissed alert.
    pub fn new(
        id: AlertId,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
        related_patient: Option<UserId>,
    ) -> Self {
        Self {
            id,
            message: message.into(),
            created_at,
            dismissed: false,
            related_patient,
        }
    }

    pub fn id(&self) -> AlertId {
        self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    pub fn related_patient(&self) -> Option<UserId> {
        self.related_patient
    }

    /// Whether the message carries the fall classification tag as a whole
    /// word, ignoring case.
    pub fn is_fall(&self) -> bool {
        self.message
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word.eq_ignore_ascii_case(FALL_TAG))
    }

    /// Mark the alert as dismissed. Idempotent.
    pub fn dismiss(&mut self) {
        self.dismissed = true;
    }
}

/// Alert derived from a patient's ledger for the assigned doctor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedAlert {
    pub patient_id: UserId,
    pub message: String,
    pub severity: AlertSeverity,
}

/// Undismissed patient-held alert flattened with its owner for a doctor view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientAlertView {
    pub patient_id: UserId,
    pub patient_name: String,
    #[serde(flatten)]
    pub alert: Alert,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Fall detected for Ada at Room 4", true)]
    #[case("FALL reported", true)]
    #[case("Medication reminder missed", false)]
    #[case("Heavy rainfall expected, keep windows shut", false)]
    #[case("Relay fallback engaged", false)]
    #[case("Patient fell; possible fall-related bruising", true)]
    fn fall_classification_matches_tag(#[case] message: &str, #[case] expected: bool) {
        let alert = Alert::new(AlertId::random(), message, Utc::now(), None);
        assert_eq!(alert.is_fall(), expected);
    }

    #[rstest]
    fn new_alerts_start_undismissed() {
        let mut alert = Alert::new(AlertId::random(), "check in", Utc::now(), None);
        assert!(!alert.is_dismissed());
        alert.dismiss();
        alert.dismiss();
        assert!(alert.is_dismissed());
    }

    #[rstest]
    fn severity_serialises_lowercase() {
        let value = serde_json::to_value(AlertSeverity::Critical).expect("serialise");
        assert_eq!(value, serde_json::json!("critical"));
    }
}
