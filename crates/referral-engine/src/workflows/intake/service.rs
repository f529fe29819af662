use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    Assignment, FirmId, KeeperGrade, PartnerFirm, SubmissionId, SubmissionMetadata,
    SubmissionStatus,
};
use super::matching::{compute_referral_fee, qualifies_for_assignment, select_partner};
use super::notifications::{client_confirmation, partner_referral, Notifier};
use super::repository::{PartnerDirectory, RepositoryError, SubmissionRecord, SubmissionRepository};
use super::scoring::calculate_score;
use super::validation::{IntakeForm, IntakeGuard, ValidationErrors};
use crate::config::IntakeConfig;

/// Service composing the intake guard, scorer, matcher, stores, and notifier.
pub struct IntakeService<R, P, N> {
    guard: IntakeGuard,
    submissions: Arc<R>,
    partners: Arc<P>,
    notifier: Arc<N>,
    settings: IntakeConfig,
}

static SUBMISSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_submission_id(now: DateTime<Utc>) -> SubmissionId {
    let sequence = SUBMISSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    SubmissionId(format!("SUB-{}-{sequence:06}", to_base36(millis)).to_uppercase())
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// What the caller learns about a processed submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeReceipt {
    pub submission_id: SubmissionId,
    pub ai_score: u8,
    pub keeper_grade: KeeperGrade,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_firm_id: Option<FirmId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_fee_amount: Option<f64>,
}

impl<R, P, N> IntakeService<R, P, N>
where
    R: SubmissionRepository + 'static,
    P: PartnerDirectory + 'static,
    N: Notifier + 'static,
{
    pub fn new(submissions: Arc<R>, partners: Arc<P>, notifier: Arc<N>) -> Self {
        Self::with_settings(submissions, partners, notifier, IntakeConfig::default())
    }

    pub fn with_settings(
        submissions: Arc<R>,
        partners: Arc<P>,
        notifier: Arc<N>,
        settings: IntakeConfig,
    ) -> Self {
        Self {
            guard: IntakeGuard,
            submissions,
            partners,
            notifier,
            settings,
        }
    }

    /// Validate, score, and (for A/B cases) assign a submission.
    pub fn submit(
        &self,
        form: IntakeForm,
        metadata: SubmissionMetadata,
    ) -> Result<IntakeReceipt, IntakeServiceError> {
        self.submit_at(form, metadata, Utc::now())
    }

    /// Same as [`submit`](Self::submit) with an explicit evaluation instant.
    pub fn submit_at(
        &self,
        form: IntakeForm,
        metadata: SubmissionMetadata,
        now: DateTime<Utc>,
    ) -> Result<IntakeReceipt, IntakeServiceError> {
        let mut submission = self.guard.case_from_form(form, metadata, now)?;
        submission.submission_id = next_submission_id(now);

        let mut record = self
            .submissions
            .insert(SubmissionRecord::pending(submission))?;
        let submission_id = record.submission_id().clone();

        let scoring = calculate_score(&record.submission.case, now);
        self.submissions
            .record_score(&submission_id, scoring.clone(), now)?;
        info!(
            submission_id = %submission_id,
            ai_score = scoring.ai_score,
            keeper_grade = %scoring.keeper_grade,
            "case scored"
        );

        record.scoring = Some(scoring.clone());
        record.scored_at = Some(now);
        record.status = SubmissionStatus::Scored;

        let assigned_firm = if qualifies_for_assignment(scoring.keeper_grade) {
            self.assign_partner(&mut record, now)
        } else {
            None
        };

        self.notify(&record, assigned_firm.as_ref());

        Ok(IntakeReceipt {
            submission_id,
            ai_score: scoring.ai_score,
            keeper_grade: scoring.keeper_grade,
            assigned_firm_id: assigned_firm.map(|firm| firm.id),
            referral_fee_amount: record
                .assignment
                .as_ref()
                .map(|assignment| assignment.referral_fee_amount),
        })
    }

    /// Fetch a submission and its current status.
    pub fn get(&self, submission_id: &SubmissionId) -> Result<SubmissionRecord, IntakeServiceError> {
        let record = self
            .submissions
            .fetch(submission_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    // Failures past this point leave the case scored but unassigned.
    fn assign_partner(&self, record: &mut SubmissionRecord, now: DateTime<Utc>) -> Option<PartnerFirm> {
        let submission_id = record.submission_id().clone();
        let incident_type = record.submission.case.incident_type.clone();
        let scoring = record.scoring.clone()?;

        let mut candidates = match self
            .partners
            .available_partners(&incident_type, scoring.keeper_grade)
        {
            Ok(candidates) => candidates,
            Err(error) => {
                warn!(submission_id = %submission_id, %error, "partner lookup failed; leaving case unassigned");
                return None;
            }
        };

        let firm = loop {
            let selected = select_partner(&candidates, &incident_type, scoring.keeper_grade)?.clone();
            match self.partners.reserve_capacity(&selected.id) {
                Ok(true) => break selected,
                Ok(false) => {
                    info!(submission_id = %submission_id, firm_id = %selected.id, "partner capacity taken; trying next candidate");
                    candidates.retain(|candidate| candidate.id != selected.id);
                }
                Err(error) => {
                    warn!(submission_id = %submission_id, %error, "capacity reservation failed; leaving case unassigned");
                    return None;
                }
            }
        };

        let assignment = Assignment {
            submission_id: submission_id.clone(),
            firm_id: firm.id.clone(),
            referral_fee_amount: compute_referral_fee(&firm, scoring.ai_score),
            assigned_at: now,
        };

        if let Err(error) = self.submissions.record_assignment(assignment.clone()) {
            warn!(submission_id = %submission_id, firm_id = %firm.id, %error, "failed to persist assignment");
            if let Err(error) = self.partners.release_capacity(&firm.id) {
                warn!(firm_id = %firm.id, %error, "reserved capacity not released");
            }
            return None;
        }

        info!(
            submission_id = %submission_id,
            firm_id = %firm.id,
            referral_fee = assignment.referral_fee_amount,
            "case assigned to partner"
        );
        record.assignment = Some(assignment);
        record.status = SubmissionStatus::Assigned;
        Some(firm)
    }

    fn notify(&self, record: &SubmissionRecord, firm: Option<&PartnerFirm>) {
        let submission_id = record.submission_id();

        if let Err(error) = self
            .notifier
            .deliver(client_confirmation(record, &self.settings))
        {
            warn!(submission_id = %submission_id, %error, "client confirmation not sent");
        }

        if let Some(firm) = firm {
            if let Err(error) = self
                .notifier
                .deliver(partner_referral(record, firm, &self.settings))
            {
                warn!(submission_id = %submission_id, firm_id = %firm.id, %error, "partner notification not sent");
            }
        }
    }
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum IntakeServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
