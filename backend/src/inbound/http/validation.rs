//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use serde_json::json;

use crate::domain::{Error, IdParseError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidEmail,
    EmptyPassword,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidEmail => "invalid_email",
            Self::EmptyPassword => "empty_password",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::validation(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {}", field.as_str()),
    )
}

pub(crate) fn invalid_email_error(field: FieldName, reason: impl std::fmt::Display) -> Error {
    field_error(field, ErrorCode::InvalidEmail, reason.to_string())
}

pub(crate) fn empty_password_error(field: FieldName) -> Error {
    field_error(field, ErrorCode::EmptyPassword, "password must not be empty")
}

/// Parse a typed identifier, reporting the offending field and value.
pub(crate) fn parse_id<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = IdParseError>,
{
    value.parse().map_err(|err: IdParseError| {
        Error::validation(format!("{} {err}", field.as_str())).with_details(json!({
            "field": field.as_str(),
            "value": value,
            "code": ErrorCode::InvalidUuid.as_str(),
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode as DomainCode, UserId};
    use rstest::rstest;

    const PATIENT_ID: FieldName = FieldName::new("patientId");

    #[rstest]
    fn parse_id_accepts_uuids() {
        let id = UserId::random();
        let parsed: UserId = parse_id(&id.to_string(), PATIENT_ID).expect("valid");
        assert_eq!(parsed, id);
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    fn parse_id_reports_field_and_value(#[case] raw: &str) {
        let err = parse_id::<UserId>(raw, PATIENT_ID).expect_err("invalid");
        assert_eq!(err.code(), DomainCode::Validation);
        let details = err.details().expect("details");
        assert_eq!(details["field"], "patientId");
        assert_eq!(details["value"], raw);
        assert_eq!(details["code"], "invalid_uuid");
    }

    #[rstest]
    fn missing_field_names_the_field() {
        let err = missing_field_error(FieldName::new("message"));
        assert_eq!(err.message(), "missing required field: message");
    }
}
