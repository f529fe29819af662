use std::collections::BTreeSet;
use std::io::Cursor;
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use referral_engine::workflows::intake::{
    calculate_score, compute_referral_fee, intake_router, select_partner, CaseAttributes, FirmId,
    InMemoryPartnerDirectory, InMemorySubmissionRepository, IncidentType, InjurySeverity,
    IntakeForm, IntakeService, KeeperGrade, NotificationError, NotificationMessage, Notifier,
    PartnerFirm, SubmissionMetadata, SubmissionStatus,
};
use referral_engine::workflows::roster::PartnerRoster;
use serde_json::{json, Value};
use tower::ServiceExt;

fn evaluation_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 9, 30, 0)
        .single()
        .expect("valid evaluation time")
}

fn days_before(days: i64) -> NaiveDate {
    evaluation_time().date_naive() - Duration::days(days)
}

fn partner(
    id: &str,
    specialties: &[IncidentType],
    min_grade: KeeperGrade,
    capacity: u32,
    acceptance: f64,
) -> PartnerFirm {
    PartnerFirm {
        id: FirmId(id.to_string()),
        name: format!("{id} Law"),
        contact_name: None,
        contact_email: format!("{}@example.law", id.to_lowercase()),
        contact_phone: None,
        specialties: specialties.iter().cloned().collect::<BTreeSet<_>>(),
        min_keeper_grade: min_grade,
        capacity,
        acceptance_rate: acceptance,
        referral_fee_percentage: 20.0,
        active: true,
    }
}

struct Silent;

impl Notifier for Silent {
    fn deliver(&self, _message: NotificationMessage) -> Result<(), NotificationError> {
        Ok(())
    }
}

#[test]
fn catastrophic_trucking_case_clamps_to_one_hundred() {
    let mut description = String::from("Taken to the hospital with a spinal injury. ");
    while description.chars().count() < 250 {
        description.push('x');
    }
    let attributes = CaseAttributes {
        incident_type: IncidentType::Trucking,
        injury_severity: InjurySeverity::Catastrophic,
        description,
        medical_treatment: true,
        hospitalized: true,
        has_insurance: true,
        incident_date: days_before(10),
    };

    let result = calculate_score(&attributes, evaluation_time());

    assert_eq!(result.score_breakdown.severity_score, 40);
    assert_eq!(result.score_breakdown.type_score, 30);
    assert_eq!(result.score_breakdown.description_score, 20);
    assert_eq!(result.score_breakdown.medical_score, 15);
    assert_eq!(result.score_breakdown.insurance_score, 5);
    assert_eq!(result.score_breakdown.timeline_score, 10);
    assert_eq!(result.score_breakdown.total(), 120);
    assert_eq!(result.ai_score, 100);
    assert_eq!(result.keeper_grade, KeeperGrade::A);
}

#[test]
fn stale_minor_case_grades_d() {
    let attributes = CaseAttributes {
        incident_type: IncidentType::Other,
        injury_severity: InjurySeverity::Minor,
        description: "Slipped up".to_string(),
        medical_treatment: false,
        hospitalized: false,
        has_insurance: false,
        incident_date: days_before(730),
    };

    let result = calculate_score(&attributes, evaluation_time());

    assert_eq!(result.ai_score, 27);
    assert_eq!(result.keeper_grade, KeeperGrade::D);
}

#[test]
fn strict_firm_is_skipped_for_b_grade_case() {
    let firms = vec![
        partner("X", &[IncidentType::Auto], KeeperGrade::B, 5, 0.80),
        partner("Y", &[IncidentType::Auto], KeeperGrade::A, 10, 0.95),
    ];

    let selected =
        select_partner(&firms, &IncidentType::Auto, KeeperGrade::B).expect("eligible firm");

    assert_eq!(selected.id, FirmId("X".to_string()));
}

#[test]
fn referral_fee_uses_settlement_proxy() {
    let firm = partner("X", &[IncidentType::Auto], KeeperGrade::B, 5, 0.80);
    assert_eq!(compute_referral_fee(&firm, 75), 15_000.0);
}

#[test]
fn roster_feeds_directory_and_service() {
    let csv = "id,name,contact_name,contact_email,contact_phone,specialties,min_keeper_grade,capacity,acceptance_rate,referral_fee_percentage,active\n\
        gulf,Gulf Coast Injury,Lena Park,lena@gulfcoast.law,,trucking;auto,B,1,0.88,25,\n\
        hill,Hill Country Trial,,intake@hillcountry.law,,trucking,A,4,0.70,15,yes\n";
    let firms = PartnerRoster::from_reader(Cursor::new(csv)).expect("roster parses");
    let directory = Arc::new(InMemoryPartnerDirectory::new(firms));
    let repository = Arc::new(InMemorySubmissionRepository::default());
    let service = IntakeService::new(repository, directory.clone(), Arc::new(Silent));

    let form = IntakeForm {
        full_name: "Jordan Ellis".to_string(),
        email: "jordan@example.com".to_string(),
        phone: "(361) 555-0175".to_string(),
        incident_type: "Trucking".to_string(),
        incident_date: days_before(5).format("%Y-%m-%d").to_string(),
        incident_location: "Corpus Christi, TX".to_string(),
        description: "An 18-wheeler merged into my lane and pushed my car off the highway. The police \
            took a report, a witness stopped to help, and an ambulance brought me to the hospital."
            .to_string(),
        injury_severity: "severe".to_string(),
        medical_treatment: true,
        hospitalized: true,
        has_insurance: true,
        insurance_provider: None,
        has_attorney: false,
        consent_to_contact: true,
        consent_to_referral: true,
        acknowledge_disclaimer: true,
    };

    let first = service
        .submit_at(form.clone(), SubmissionMetadata::default(), evaluation_time())
        .expect("first submission");
    let second = service
        .submit_at(form, SubmissionMetadata::default(), evaluation_time())
        .expect("second submission");

    assert_eq!(first.assigned_firm_id, Some(FirmId("gulf".to_string())));
    assert_eq!(second.assigned_firm_id, Some(FirmId("hill".to_string())));
    let record = service.get(&second.submission_id).expect("stored");
    assert_eq!(record.status, SubmissionStatus::Assigned);

    let capacities: Vec<(String, u32)> = directory
        .snapshot()
        .into_iter()
        .map(|firm| (firm.id.0, firm.capacity))
        .collect();
    assert_eq!(
        capacities,
        vec![("gulf".to_string(), 0), ("hill".to_string(), 3)]
    );
}

#[tokio::test]
async fn intake_endpoint_round_trip() {
    let service = Arc::new(IntakeService::new(
        Arc::new(InMemorySubmissionRepository::default()),
        Arc::new(InMemoryPartnerDirectory::new(PartnerRoster::sample())),
        Arc::new(Silent),
    ));
    let router = intake_router(service);
    let incident_date = (Utc::now().date_naive() - Duration::days(3))
        .format("%Y-%m-%d")
        .to_string();

    let response = router
        .clone()
        .oneshot(
            axum::http::Request::post("/api/intake")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .header(axum::http::header::USER_AGENT, "integration-suite")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&json!({
                        "fullName": "Avery Chen",
                        "email": "avery@example.com",
                        "phone": "(512) 555-0101",
                        "incidentType": "catastrophic",
                        "incidentDate": incident_date,
                        "incidentLocation": "Austin, TX",
                        "description": "Crane collapse at a job site; airlifted to the hospital with a head injury and still in treatment.",
                        "injurySeverity": "catastrophic",
                        "medicalTreatment": true,
                        "hospitalized": true,
                        "hasInsurance": true,
                        "consentToContact": true,
                        "consentToReferral": true,
                        "acknowledgeDisclaimer": true
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("submit executes");

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let payload: Value = serde_json::from_slice(&body).expect("json payload");
    assert_eq!(payload["keeperGrade"], json!("A"));
    let submission_id = payload["submissionId"].as_str().expect("id").to_string();

    let response = router
        .oneshot(
            axum::http::Request::get(format!("/api/intake/{submission_id}"))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("status executes");

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let status: Value = serde_json::from_slice(&body).expect("json payload");
    assert_eq!(status["status"], json!("assigned"));
    assert_eq!(status["assignedFirmId"], json!("3"));
}
