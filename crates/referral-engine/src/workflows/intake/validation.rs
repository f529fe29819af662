use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::domain::{
    CaseAttributes, CaseSubmission, ContactDetails, IncidentType, InjurySeverity, SubmissionId,
    SubmissionMetadata,
};

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 100;
const PHONE_MIN: usize = 10;
const LOCATION_MIN: usize = 3;
const DESCRIPTION_MIN: usize = 20;
const DESCRIPTION_MAX: usize = 2000;

/// Raw intake form body as posted by the public site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub incident_type: String,
    #[serde(default)]
    pub incident_date: String,
    #[serde(default)]
    pub incident_location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub injury_severity: String,
    #[serde(default)]
    pub medical_treatment: bool,
    #[serde(default)]
    pub hospitalized: bool,
    #[serde(default)]
    pub has_insurance: bool,
    #[serde(default)]
    pub insurance_provider: Option<String>,
    #[serde(default)]
    pub has_attorney: bool,
    #[serde(default)]
    pub consent_to_contact: bool,
    #[serde(default)]
    pub consent_to_referral: bool,
    #[serde(default)]
    pub acknowledge_disclaimer: bool,
}

/// One rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every field the guard rejected, in form order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|error| error.field.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields().any(|candidate| candidate == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect();
        write!(f, "validation failed ({})", rendered.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Guard responsible for turning an `IntakeForm` into a `CaseSubmission`.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    /// Validate the form as of `now`. The submission id is left as `pending` for the service
    /// to fill in.
    pub fn case_from_form(
        &self,
        form: IntakeForm,
        metadata: SubmissionMetadata,
        now: DateTime<Utc>,
    ) -> Result<CaseSubmission, ValidationErrors> {
        let mut errors = Vec::new();
        let mut reject = |field: &str, message: &str| {
            errors.push(FieldError {
                field: field.to_string(),
                message: message.to_string(),
            })
        };

        let full_name = form.full_name.trim().to_string();
        let name_length = full_name.chars().count();
        if name_length < NAME_MIN {
            reject("fullName", "Full name must be at least 2 characters");
        } else if name_length > NAME_MAX {
            reject("fullName", "Name too long");
        }

        let email = form.email.trim().to_string();
        if !email_pattern().is_match(&email) {
            reject("email", "Invalid email address");
        }

        let phone = form.phone.trim().to_string();
        if phone.chars().count() < PHONE_MIN {
            reject("phone", "Please enter a valid phone number");
        } else if !phone_pattern().is_match(&phone) {
            reject("phone", "Invalid phone format");
        }

        let incident_type = IncidentType::parse(&form.incident_type);
        if !incident_type.is_recognized() {
            reject("incidentType", "Please select an incident type");
        }

        let incident_date = if form.incident_date.trim().is_empty() {
            reject("incidentDate", "Incident date is required");
            None
        } else {
            match parse_incident_date(&form.incident_date) {
                Some(date) if date > now.date_naive() => {
                    reject("incidentDate", "Incident date cannot be in the future");
                    None
                }
                Some(date) => Some(date),
                None => {
                    reject("incidentDate", "Incident date must be formatted as YYYY-MM-DD");
                    None
                }
            }
        };

        let incident_location = form.incident_location.trim().to_string();
        if incident_location.chars().count() < LOCATION_MIN {
            reject("incidentLocation", "Please provide the incident location");
        }

        let description_length = form.description.chars().count();
        if description_length < DESCRIPTION_MIN {
            reject(
                "description",
                "Please provide at least 20 characters describing your case",
            );
        } else if description_length > DESCRIPTION_MAX {
            reject(
                "description",
                "Description too long (max 2000 characters)",
            );
        }

        let injury_severity = InjurySeverity::parse(&form.injury_severity);
        if !injury_severity.is_recognized() {
            reject("injurySeverity", "Please select injury severity");
        }

        if !form.consent_to_contact {
            reject("consentToContact", "You must consent to be contacted");
        }
        if !form.consent_to_referral {
            reject(
                "consentToReferral",
                "You must consent to the referral terms under Texas Rule 1.04(f)",
            );
        }
        if !form.acknowledge_disclaimer {
            reject("acknowledgeDisclaimer", "You must acknowledge the disclaimer");
        }

        let incident_date = match incident_date {
            Some(date) if errors.is_empty() => date,
            _ => return Err(ValidationErrors(errors)),
        };

        Ok(CaseSubmission {
            submission_id: SubmissionId("pending".to_string()),
            contact: ContactDetails {
                full_name,
                email,
                phone,
            },
            case: CaseAttributes {
                incident_type,
                injury_severity,
                description: form.description,
                medical_treatment: form.medical_treatment,
                hospitalized: form.hospitalized,
                has_insurance: form.has_insurance,
                incident_date,
            },
            incident_location,
            insurance_provider: form
                .insurance_provider
                .map(|provider| provider.trim().to_string())
                .filter(|provider| !provider.is_empty()),
            has_attorney: form.has_attorney,
            submitted_at: now,
            metadata,
        })
    }
}

/// Accepts `YYYY-MM-DD` and full RFC 3339 timestamps (the date part is kept).
pub fn parse_incident_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|timestamp| timestamp.with_timezone(&Utc).date_naive())
        })
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9_'+\-]+(?:\.[A-Za-z0-9_'+\-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$",
        )
        .expect("email pattern compiles")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[\d\s\-\(\)\+]+$").expect("phone pattern compiles"))
}
