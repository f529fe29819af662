//! Personal-injury case intake: validation, scoring, partner matching, and notification.
//!
//! `scoring` and `matching` are pure and hold no state. Everything that touches storage or
//! outbound messages sits behind the `SubmissionRepository`, `PartnerDirectory`, and `Notifier`
//! traits so the orchestration in `service` can be exercised in isolation.

pub mod domain;
pub mod matching;
pub mod memory;
pub mod notifications;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    Assignment, CaseAttributes, CaseSubmission, ContactDetails, FirmId, IncidentType,
    InjurySeverity, KeeperGrade, PartnerFirm, ScoreBreakdown, ScoringResult, SubmissionId,
    SubmissionMetadata, SubmissionStatus,
};
pub use matching::{compute_referral_fee, is_eligible, qualifies_for_assignment, select_partner};
pub use memory::{InMemoryPartnerDirectory, InMemorySubmissionRepository};
pub use notifications::{NotificationError, NotificationMessage, NotificationTemplate, Notifier};
pub use repository::{
    DirectoryError, PartnerDirectory, RepositoryError, SubmissionRecord, SubmissionRepository,
    SubmissionStatusView,
};
pub use router::intake_router;
pub use scoring::calculate_score;
pub use service::{IntakeReceipt, IntakeService, IntakeServiceError};
pub use validation::{FieldError, IntakeForm, IntakeGuard, ValidationErrors};
