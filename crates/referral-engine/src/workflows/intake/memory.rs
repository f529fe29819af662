//! Process-local stores used by the API binary, the CLI demo, and tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::domain::{
    Assignment, FirmId, IncidentType, KeeperGrade, PartnerFirm, ScoringResult, SubmissionId,
    SubmissionStatus,
};
use super::matching::{is_eligible, priority_order};
use super::repository::{
    DirectoryError, PartnerDirectory, RepositoryError, SubmissionRecord, SubmissionRepository,
};

#[derive(Default, Clone)]
pub struct InMemorySubmissionRepository {
    records: Arc<Mutex<HashMap<SubmissionId, SubmissionRecord>>>,
}

impl InMemorySubmissionRepository {
    pub fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SubmissionRepository for InMemorySubmissionRepository {
    fn insert(&self, record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(record.submission_id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.submission_id().clone(), record.clone());
        Ok(record)
    }

    fn record_score(
        &self,
        id: &SubmissionId,
        scoring: ScoringResult,
        scored_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.scoring = Some(scoring);
        record.scored_at = Some(scored_at);
        if record.status == SubmissionStatus::Pending {
            record.status = SubmissionStatus::Scored;
        }
        Ok(())
    }

    fn record_assignment(&self, assignment: Assignment) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard
            .get_mut(&assignment.submission_id)
            .ok_or(RepositoryError::NotFound)?;
        if record.assignment.is_some() {
            return Err(RepositoryError::Conflict);
        }
        record.assignment = Some(assignment);
        record.status = SubmissionStatus::Assigned;
        Ok(())
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

/// Partner store seeded from a roster. Capacity is decremented on reservation.
#[derive(Default, Clone)]
pub struct InMemoryPartnerDirectory {
    firms: Arc<Mutex<Vec<PartnerFirm>>>,
}

impl InMemoryPartnerDirectory {
    pub fn new(firms: Vec<PartnerFirm>) -> Self {
        Self {
            firms: Arc::new(Mutex::new(firms)),
        }
    }

    pub fn snapshot(&self) -> Vec<PartnerFirm> {
        self.firms.lock().expect("directory mutex poisoned").clone()
    }
}

impl PartnerDirectory for InMemoryPartnerDirectory {
    fn available_partners(
        &self,
        incident_type: &IncidentType,
        grade: KeeperGrade,
    ) -> Result<Vec<PartnerFirm>, DirectoryError> {
        let guard = self.firms.lock().expect("directory mutex poisoned");
        let mut available: Vec<PartnerFirm> = guard
            .iter()
            .filter(|firm| is_eligible(firm, incident_type, grade))
            .cloned()
            .collect();
        available.sort_by(priority_order);
        Ok(available)
    }

    fn reserve_capacity(&self, id: &FirmId) -> Result<bool, DirectoryError> {
        let mut guard = self.firms.lock().expect("directory mutex poisoned");
        match guard.iter_mut().find(|firm| &firm.id == id) {
            Some(firm) if firm.active && firm.capacity > 0 => {
                firm.capacity -= 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn release_capacity(&self, id: &FirmId) -> Result<(), DirectoryError> {
        let mut guard = self.firms.lock().expect("directory mutex poisoned");
        if let Some(firm) = guard.iter_mut().find(|firm| &firm.id == id) {
            firm.capacity = firm.capacity.saturating_add(1);
        }
        Ok(())
    }
}
