use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::intake::domain::{
    Assignment, CaseAttributes, FirmId, IncidentType, InjurySeverity, KeeperGrade, PartnerFirm,
    ScoringResult, SubmissionId, SubmissionMetadata,
};
use crate::workflows::intake::memory::{InMemoryPartnerDirectory, InMemorySubmissionRepository};
use crate::workflows::intake::notifications::{NotificationError, NotificationMessage, Notifier};
use crate::workflows::intake::repository::{
    DirectoryError, PartnerDirectory, RepositoryError, SubmissionRecord, SubmissionRepository,
};
use crate::workflows::intake::validation::IntakeForm;
use crate::workflows::intake::{intake_router, IntakeService};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn days_ago(days: i64) -> NaiveDate {
    now().date_naive() - Duration::days(days)
}

pub(super) const DETAILED_DESCRIPTION: &str = "I was rear-ended by a commercial truck on I-35 while stopped at a light. \
An ambulance took me to the hospital where I was treated for a neck injury. The police filed a report \
and a witness gave a statement. I am still in pain and going to medical appointments every week.";

pub(super) fn attributes() -> CaseAttributes {
    CaseAttributes {
        incident_type: IncidentType::Auto,
        injury_severity: InjurySeverity::Moderate,
        description: "Rear-ended at a stop light, sore neck afterwards.".to_string(),
        medical_treatment: true,
        hospitalized: false,
        has_insurance: true,
        incident_date: days_ago(45),
    }
}

pub(super) fn strong_form() -> IntakeForm {
    IntakeForm {
        full_name: "Maria Lopez".to_string(),
        email: "maria.lopez@example.com".to_string(),
        phone: "(512) 555-0134".to_string(),
        incident_type: "trucking".to_string(),
        incident_date: days_ago(10).format("%Y-%m-%d").to_string(),
        incident_location: "Austin, TX".to_string(),
        description: DETAILED_DESCRIPTION.to_string(),
        injury_severity: "severe".to_string(),
        medical_treatment: true,
        hospitalized: true,
        has_insurance: true,
        insurance_provider: Some("State Farm".to_string()),
        has_attorney: false,
        consent_to_contact: true,
        consent_to_referral: true,
        acknowledge_disclaimer: true,
    }
}

pub(super) fn weak_form() -> IntakeForm {
    IntakeForm {
        incident_type: "other".to_string(),
        injury_severity: "minor".to_string(),
        description: "Slipped on a wet floor at a store.".to_string(),
        incident_date: days_ago(700).format("%Y-%m-%d").to_string(),
        medical_treatment: false,
        hospitalized: false,
        has_insurance: false,
        insurance_provider: None,
        ..strong_form()
    }
}

pub(super) fn metadata() -> SubmissionMetadata {
    SubmissionMetadata {
        source: "web_form".to_string(),
        user_agent: "integration-test".to_string(),
        ip_address: "203.0.113.7".to_string(),
    }
}

pub(super) fn firm(
    id: &str,
    specialties: &[IncidentType],
    min_keeper_grade: KeeperGrade,
    capacity: u32,
    acceptance_rate: f64,
) -> PartnerFirm {
    PartnerFirm {
        id: FirmId(id.to_string()),
        name: format!("Firm {id}"),
        contact_name: None,
        contact_email: format!("intake@{}.law", id.to_lowercase()),
        contact_phone: None,
        specialties: specialties.iter().cloned().collect::<BTreeSet<_>>(),
        min_keeper_grade,
        capacity,
        acceptance_rate,
        referral_fee_percentage: 20.0,
        active: true,
    }
}

pub(super) fn partner_network() -> Vec<PartnerFirm> {
    vec![
        firm(
            "trucking-b",
            &[IncidentType::Trucking, IncidentType::Auto],
            KeeperGrade::B,
            5,
            0.80,
        ),
        firm(
            "trucking-a",
            &[IncidentType::Trucking],
            KeeperGrade::A,
            3,
            0.92,
        ),
    ]
}

pub(super) type TestService =
    IntakeService<InMemorySubmissionRepository, InMemoryPartnerDirectory, RecordingNotifier>;

pub(super) fn build_service() -> (
    TestService,
    Arc<InMemorySubmissionRepository>,
    Arc<InMemoryPartnerDirectory>,
    Arc<RecordingNotifier>,
) {
    let repository = Arc::new(InMemorySubmissionRepository::default());
    let directory = Arc::new(InMemoryPartnerDirectory::new(partner_network()));
    let notifier = Arc::new(RecordingNotifier::default());
    let service = IntakeService::new(repository.clone(), directory.clone(), notifier.clone());
    (service, repository, directory, notifier)
}

#[derive(Default, Clone)]
pub(super) struct RecordingNotifier {
    messages: Arc<Mutex<Vec<NotificationMessage>>>,
}

impl RecordingNotifier {
    pub(super) fn messages(&self) -> Vec<NotificationMessage> {
        self.messages.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn deliver(&self, message: NotificationMessage) -> Result<(), NotificationError> {
        self.messages
            .lock()
            .expect("notifier mutex poisoned")
            .push(message);
        Ok(())
    }
}

pub(super) struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn deliver(&self, _message: NotificationMessage) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp relay offline".to_string()))
    }
}

pub(super) struct UnavailableDirectory;

impl PartnerDirectory for UnavailableDirectory {
    fn available_partners(
        &self,
        _incident_type: &IncidentType,
        _grade: KeeperGrade,
    ) -> Result<Vec<PartnerFirm>, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn reserve_capacity(&self, _id: &FirmId) -> Result<bool, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn release_capacity(&self, _id: &FirmId) -> Result<(), DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }
}

/// Serves a stale snapshot: the listed firms look open but one has already been filled.
pub(super) struct StaleDirectory {
    pub(super) snapshot: Vec<PartnerFirm>,
    pub(super) exhausted: FirmId,
}

impl PartnerDirectory for StaleDirectory {
    fn available_partners(
        &self,
        _incident_type: &IncidentType,
        _grade: KeeperGrade,
    ) -> Result<Vec<PartnerFirm>, DirectoryError> {
        Ok(self.snapshot.clone())
    }

    fn reserve_capacity(&self, id: &FirmId) -> Result<bool, DirectoryError> {
        Ok(id != &self.exhausted)
    }

    fn release_capacity(&self, _id: &FirmId) -> Result<(), DirectoryError> {
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl SubmissionRepository for UnavailableRepository {
    fn insert(&self, _record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn record_score(
        &self,
        _id: &SubmissionId,
        _scoring: ScoringResult,
        _scored_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn record_assignment(&self, _assignment: Assignment) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// In-memory store whose assignment writes always fail.
#[derive(Default)]
pub(super) struct AssignmentRejectingRepository {
    pub(super) inner: InMemorySubmissionRepository,
}

impl SubmissionRepository for AssignmentRejectingRepository {
    fn insert(&self, record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn record_score(
        &self,
        id: &SubmissionId,
        scoring: ScoringResult,
        scored_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.inner.record_score(id, scoring, scored_at)
    }

    fn record_assignment(&self, _assignment: Assignment) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("write timeout".to_string()))
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        self.inner.fetch(id)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn intake_router_with_service(service: TestService) -> axum::Router {
    intake_router(Arc::new(service))
}
