use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{PartnerFirm, SubmissionId};
use super::repository::SubmissionRecord;
use crate::config::IntakeConfig;

/// Trait describing outbound message hooks (SMTP relays, CRM webhooks, ...).
pub trait Notifier: Send + Sync {
    fn deliver(&self, message: NotificationMessage) -> Result<(), NotificationError>;
}

/// Which confirmation a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTemplate {
    ClientConfirmation,
    PartnerReferral,
}

/// Rendered plain-text message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub template: NotificationTemplate,
    pub submission_id: SubmissionId,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub details: BTreeMap<String, String>,
}

/// Message dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

pub fn client_confirmation(record: &SubmissionRecord, settings: &IntakeConfig) -> NotificationMessage {
    let submission = &record.submission;
    let submitted_on = submission.submitted_at.format("%Y-%m-%d");

    let body = format!(
        "Dear {name},\n\n\
         Thank you for submitting your case information to Crosley Referral Law Group. \
         We have received your submission and are reviewing the details you provided.\n\n\
         YOUR SUBMISSION DETAILS:\n\
         - Submission ID: {id}\n\
         - Incident Type: {incident}\n\
         - Submission Date: {submitted_on}\n\n\
         WHAT HAPPENS NEXT?\n\
         Our team will review your case and match you with a qualified attorney from our \
         network. You can expect to hear from an attorney within 1-2 business days.\n\n\
         Please keep your submission ID ({id}) for your records.\n\n\
         {url}\n",
        name = submission.contact.full_name,
        id = submission.submission_id,
        incident = submission.case.incident_type,
        url = settings.public_url,
    );

    let mut details = BTreeMap::new();
    details.insert(
        "incident_type".to_string(),
        submission.case.incident_type.to_string(),
    );

    NotificationMessage {
        template: NotificationTemplate::ClientConfirmation,
        submission_id: submission.submission_id.clone(),
        from: settings.notify_from.clone(),
        to: submission.contact.email.clone(),
        subject: "Your Case Submission - Next Steps".to_string(),
        body,
        details,
    }
}

pub fn partner_referral(
    record: &SubmissionRecord,
    firm: &PartnerFirm,
    settings: &IntakeConfig,
) -> NotificationMessage {
    let submission = &record.submission;
    let case = &submission.case;
    let grade = record
        .scoring
        .as_ref()
        .map(|scoring| scoring.keeper_grade.label())
        .unwrap_or("-");
    let score = record
        .scoring
        .as_ref()
        .map(|scoring| scoring.ai_score.to_string())
        .unwrap_or_else(|| "-".to_string());
    let fee = record
        .assignment
        .as_ref()
        .map(|assignment| format!("${:.2}", assignment.referral_fee_amount))
        .unwrap_or_else(|| "To be determined".to_string());
    let yes_no = |flag: bool| if flag { "Yes" } else { "No" };

    let body = format!(
        "Dear {contact},\n\n\
         We have a new case referral that matches your firm's expertise and capacity.\n\n\
         CASE SCORING & GRADE:\n\
         - AI Score: {score}/100\n\
         - Keeper Grade: {grade}\n\
         - Status: {status}\n\
         - Referral Fee: {fee}\n\n\
         CASE DETAILS:\n\
         - Submission ID: {id}\n\
         - Incident Type: {incident}\n\
         - Injury Severity: {severity}\n\
         - Incident Date: {incident_date}\n\
         - Location: {location}\n\
         - Medical Treatment: {treatment}\n\
         - Hospitalized: {hospitalized}\n\
         - Insurance: {insurance}\n\
         - Current Attorney: {attorney}\n\n\
         CLIENT INFORMATION:\n\
         - Name: {client}\n\
         - Email: {email}\n\
         - Phone: {phone}\n\n\
         CASE DESCRIPTION:\n\
         {description}\n\n\
         {url}\n",
        contact = firm.contact_name.as_deref().unwrap_or("Team"),
        status = record.status.label(),
        id = submission.submission_id,
        incident = case.incident_type,
        severity = case.injury_severity,
        incident_date = case.incident_date,
        location = submission.incident_location,
        treatment = yes_no(case.medical_treatment),
        hospitalized = yes_no(case.hospitalized),
        insurance = yes_no(case.has_insurance),
        attorney = yes_no(submission.has_attorney),
        client = submission.contact.full_name,
        email = submission.contact.email,
        phone = submission.contact.phone,
        description = case.description,
        url = settings.public_url,
    );

    let mut details = BTreeMap::new();
    details.insert("firm_id".to_string(), firm.id.to_string());
    details.insert("keeper_grade".to_string(), grade.to_string());
    details.insert("ai_score".to_string(), score);

    NotificationMessage {
        template: NotificationTemplate::PartnerReferral,
        submission_id: submission.submission_id.clone(),
        from: settings.notify_from.clone(),
        to: firm.contact_email.clone(),
        subject: format!(
            "New Case Referral - {} - Grade {}",
            case.incident_type, grade
        ),
        body,
        details,
    }
}
