//! Clinical data carried by a patient's medical history ledger.
//!
//! Status values form a closed, wire-visible set. Anything outside
//! [`ClinicalStatus`] is rejected before a ledger entry is built.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AlertSeverity, EntryId};

/// Clinical status attached to an entry and to each vital.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClinicalStatus {
    /// Within expected range. Used when a payload omits the status.
    #[default]
    Normal,
    /// Above expected range.
    High,
    /// Below expected range.
    Low,
    /// Reviewed and acceptable.
    #[serde(rename = "OK")]
    Ok,
    /// Requires immediate attention.
    Danger,
}

impl ClinicalStatus {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::High => "High",
            Self::Low => "Low",
            Self::Ok => "OK",
            Self::Danger => "Danger",
        }
    }

    /// Severity of the computed alert this status raises, if any.
    ///
    /// `Danger` escalates to critical; `High` and `Low` are high.
    pub const fn alert_severity(self) -> Option<AlertSeverity> {
        match self {
            Self::Danger => Some(AlertSeverity::Critical),
            Self::High | Self::Low => Some(AlertSeverity::High),
            Self::Normal | Self::Ok => None,
        }
    }
}

impl fmt::Display for ClinicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown clinical status '{0}'; expected Normal, High, Low, OK, or Danger")]
pub struct UnknownStatus(pub String);

impl FromStr for ClinicalStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Normal" => Ok(Self::Normal),
            "High" => Ok(Self::High),
            "Low" => Ok(Self::Low),
            "OK" => Ok(Self::Ok),
            "Danger" => Ok(Self::Danger),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// A single measured vital sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vital {
    pub name: String,
    pub value: String,
    pub status: ClinicalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

/// A diagnosed condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disease {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

/// Unvalidated vital as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalDraft {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Unvalidated disease as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseDraft {
    pub name: String,
}

/// Unvalidated ledger entry contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDraft {
    #[serde(default)]
    pub vitals: Vec<VitalDraft>,
    #[serde(default)]
    pub diseases: Vec<DiseaseDraft>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Validation failures raised while building a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClinicalValidationError {
    /// The overall entry status is outside the closed set.
    #[error("entry {0}")]
    EntryStatus(UnknownStatus),
    /// A vital's status is outside the closed set.
    #[error("vital {index}: {source}")]
    VitalStatus { index: usize, source: UnknownStatus },
    /// A vital has no name.
    #[error("vital {index}: name must not be empty")]
    EmptyVitalName { index: usize },
    /// A disease has no name.
    #[error("disease {index}: name must not be empty")]
    EmptyDiseaseName { index: usize },
}

impl ClinicalValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EntryStatus(_) => "status",
            Self::VitalStatus { .. } => "vitals.status",
            Self::EmptyVitalName { .. } => "vitals.name",
            Self::EmptyDiseaseName { .. } => "diseases.name",
        }
    }
}

fn parse_status(raw: Option<&str>) -> Result<ClinicalStatus, UnknownStatus> {
    raw.map_or(Ok(ClinicalStatus::default()), ClinicalStatus::from_str)
}

/// Where an attached document ended up inside an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "target")]
pub enum DocumentPlacement {
    /// Stored on the vital at this index.
    Vital { index: usize },
    /// Appended to the entry's untyped document list.
    Entry,
}

/// One immutable clinical record in a patient's ledger.
///
/// Only document paths are ever patched into an existing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalHistoryEntry {
    id: EntryId,
    recorded_at: DateTime<Utc>,
    vitals: Vec<Vital>,
    diseases: Vec<Disease>,
    notes: String,
    documents: Vec<String>,
    status: ClinicalStatus,
}

impl MedicalHistoryEntry {
    /// Validate a draft and stamp it with the server-assigned id and time.
    pub fn from_draft(
        id: EntryId,
        recorded_at: DateTime<Utc>,
        draft: EntryDraft,
    ) -> Result<Self, ClinicalValidationError> {
        let status =
            parse_status(draft.status.as_deref()).map_err(ClinicalValidationError::EntryStatus)?;

        let vitals = draft
            .vitals
            .into_iter()
            .enumerate()
            .map(|(index, vital)| {
                if vital.name.trim().is_empty() {
                    return Err(ClinicalValidationError::EmptyVitalName { index });
                }
                let status = parse_status(vital.status.as_deref())
                    .map_err(|source| ClinicalValidationError::VitalStatus { index, source })?;
                Ok(Vital {
                    name: vital.name,
                    value: vital.value,
                    status,
                    document: None,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let diseases = draft
            .diseases
            .into_iter()
            .enumerate()
            .map(|(index, disease)| {
                if disease.name.trim().is_empty() {
                    return Err(ClinicalValidationError::EmptyDiseaseName { index });
                }
                Ok(Disease {
                    name: disease.name,
                    document: None,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id,
            recorded_at,
            vitals,
            diseases,
            notes: draft.notes,
            documents: Vec::new(),
            status,
        })
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn vitals(&self) -> &[Vital] {
        &self.vitals
    }

    pub fn diseases(&self) -> &[Disease] {
        &self.diseases
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn status(&self) -> ClinicalStatus {
        self.status
    }

    /// Attach a document path.
    ///
    /// A `vital_index` naming an existing vital sets that vital's document;
    /// anything else falls back to the generic list so the path is never
    /// dropped.
    pub fn attach_document(&mut self, vital_index: Option<usize>, path: String) -> DocumentPlacement {
        if let Some(index) = vital_index {
            if let Some(vital) = self.vitals.get_mut(index) {
                vital.document = Some(path);
                return DocumentPlacement::Vital { index };
            }
        }
        self.documents.push(path);
        DocumentPlacement::Entry
    }
}
