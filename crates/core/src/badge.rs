//! Badge print requests and their validation.
//!
//! [`PrintRequest`] is the raw JSON body accepted at the HTTP boundary; every
//! field is optional so that a missing value becomes a descriptive
//! validation error instead of a deserialization failure.
//! [`PrintRequest::into_payload`] turns it into a typed [`BadgePayload`].

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

/// Maximum length of any single text field on a badge.
pub const MAX_FIELD_LEN: u64 = 120;

// ---------------------------------------------------------------------------
// Raw request
// ---------------------------------------------------------------------------

/// Incoming print request body, as posted by the check-in desk.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PrintRequest {
    #[serde(rename = "type")]
    pub badge_type: Option<String>,

    #[validate(length(max = 120, message = "fullName must be at most 120 characters"))]
    pub full_name: Option<String>,

    #[validate(length(max = 120, message = "studyProgram must be at most 120 characters"))]
    pub study_program: Option<String>,

    #[validate(length(max = 120, message = "university must be at most 120 characters"))]
    pub university: Option<String>,

    #[validate(length(max = 120, message = "position must be at most 120 characters"))]
    pub position: Option<String>,

    #[validate(length(max = 120, message = "companyName must be at most 120 characters"))]
    pub company_name: Option<String>,
}

impl PrintRequest {
    /// Validate the request and convert it into a typed badge payload.
    ///
    /// Rules:
    /// - `type` must be `"student"` or `"company"`.
    /// - `fullName` must be present and not blank.
    /// - Students need `studyProgram`; companies need `companyName`.
    /// - No field may exceed [`MAX_FIELD_LEN`] characters.
    ///
    /// Values are trimmed; blank optional fields are dropped.
    pub fn into_payload(self) -> Result<BadgePayload, CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        let badge_type = non_blank(self.badge_type)
            .ok_or_else(|| CoreError::Validation("type is required".to_string()))?;

        let full_name = non_blank(self.full_name)
            .ok_or_else(|| CoreError::Validation("fullName is required".to_string()))?;

        match badge_type.as_str() {
            "student" => {
                let study_program = non_blank(self.study_program).ok_or_else(|| {
                    CoreError::Validation(
                        "studyProgram is required for student badges".to_string(),
                    )
                })?;
                Ok(BadgePayload::Student(StudentBadge {
                    full_name,
                    study_program,
                    university: non_blank(self.university),
                }))
            }
            "company" => {
                let company_name = non_blank(self.company_name).ok_or_else(|| {
                    CoreError::Validation(
                        "companyName is required for company badges".to_string(),
                    )
                })?;
                Ok(BadgePayload::Company(CompanyBadge {
                    full_name,
                    company_name,
                    position: non_blank(self.position),
                }))
            }
            other => Err(CoreError::Validation(format!(
                "type must be 'student' or 'company', got '{other}'"
            ))),
        }
    }
}

/// Trim a value and treat blank strings as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Validated payload
// ---------------------------------------------------------------------------

/// A validated badge, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BadgePayload {
    Student(StudentBadge),
    Company(CompanyBadge),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentBadge {
    pub full_name: String,
    pub study_program: String,
    pub university: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyBadge {
    pub full_name: String,
    pub company_name: String,
    pub position: Option<String>,
}

impl BadgePayload {
    /// Name of the badge holder.
    pub fn full_name(&self) -> &str {
        match self {
            BadgePayload::Student(s) => &s.full_name,
            BadgePayload::Company(c) => &c.full_name,
        }
    }

    /// Wire name of the badge type (`"student"` / `"company"`).
    pub fn kind(&self) -> &'static str {
        match self {
            BadgePayload::Student(_) => "student",
            BadgePayload::Company(_) => "company",
        }
    }
}
