use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Assignment, CaseSubmission, FirmId, IncidentType, KeeperGrade, PartnerFirm, ScoringResult,
    SubmissionId, SubmissionStatus,
};

/// Repository record containing the submission, its score, and any partner assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub submission: CaseSubmission,
    pub status: SubmissionStatus,
    pub scoring: Option<ScoringResult>,
    pub scored_at: Option<DateTime<Utc>>,
    pub assignment: Option<Assignment>,
}

impl SubmissionRecord {
    pub fn pending(submission: CaseSubmission) -> Self {
        Self {
            submission,
            status: SubmissionStatus::Pending,
            scoring: None,
            scored_at: None,
            assignment: None,
        }
    }

    pub fn submission_id(&self) -> &SubmissionId {
        &self.submission.submission_id
    }

    pub fn status_view(&self) -> SubmissionStatusView {
        SubmissionStatusView {
            submission_id: self.submission.submission_id.clone(),
            status: self.status.label(),
            incident_type: self.submission.case.incident_type.to_string(),
            ai_score: self.scoring.as_ref().map(|scoring| scoring.ai_score),
            keeper_grade: self.scoring.as_ref().map(|scoring| scoring.keeper_grade),
            assigned_firm_id: self
                .assignment
                .as_ref()
                .map(|assignment| assignment.firm_id.clone()),
        }
    }
}

/// Storage abstraction for intake submissions.
pub trait SubmissionRepository: Send + Sync {
    fn insert(&self, record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError>;
    fn record_score(
        &self,
        id: &SubmissionId,
        scoring: ScoringResult,
        scored_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
    /// Attach an assignment. A submission that already has one yields `Conflict`.
    fn record_assignment(&self, assignment: Assignment) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError>;
}

/// Read side of the partner store plus the capacity reservation used when assigning.
pub trait PartnerDirectory: Send + Sync {
    /// Active firms with the specialty, a minimum grade the case meets, and open capacity,
    /// ordered by acceptance rate then capacity, both descending.
    fn available_partners(
        &self,
        incident_type: &IncidentType,
        grade: KeeperGrade,
    ) -> Result<Vec<PartnerFirm>, DirectoryError>;
    /// Take one unit of capacity. Returns `false` when the firm has none left.
    fn reserve_capacity(&self, id: &FirmId) -> Result<bool, DirectoryError>;
    /// Give back a unit taken by `reserve_capacity` when the assignment could not be stored.
    fn release_capacity(&self, id: &FirmId) -> Result<(), DirectoryError>;
}

/// Error enumeration for submission storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Partner lookup failure.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("partner directory unavailable: {0}")]
    Unavailable(String),
}

/// Sanitized representation of a submission's exposed status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionStatusView {
    pub submission_id: SubmissionId,
    pub status: &'static str,
    pub incident_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keeper_grade: Option<KeeperGrade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_firm_id: Option<FirmId>,
}
