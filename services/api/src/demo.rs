use crate::infra::{evaluation_instant, load_partner_roster, InMemoryOutbox};
use chrono::{Duration, NaiveDate};
use clap::Args;
use referral_engine::config::IntakeConfig;
use referral_engine::error::AppError;
use referral_engine::workflows::intake::{
    calculate_score, qualifies_for_assignment, CaseAttributes, IncidentType, InjurySeverity,
    InMemoryPartnerDirectory, InMemorySubmissionRepository, IntakeForm, IntakeService,
    IntakeServiceError, PartnerFirm, ScoringResult, SubmissionMetadata,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Incident type (auto, trucking, catastrophic, workplace, other)
    #[arg(long)]
    pub(crate) incident_type: String,
    /// Injury severity (minor, moderate, severe, catastrophic)
    #[arg(long)]
    pub(crate) severity: String,
    /// Free-text description of what happened
    #[arg(long)]
    pub(crate) description: String,
    /// Incident date (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) incident_date: NaiveDate,
    /// The claimant received medical treatment
    #[arg(long)]
    pub(crate) medical_treatment: bool,
    /// The claimant was hospitalized
    #[arg(long)]
    pub(crate) hospitalized: bool,
    /// The at-fault party carries insurance
    #[arg(long)]
    pub(crate) has_insurance: bool,
    /// Override the scoring date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Partner roster CSV. Defaults to the built-in sample roster.
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Override the evaluation date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the rendered notification bodies.
    #[arg(long)]
    pub(crate) show_messages: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        incident_type,
        severity,
        description,
        incident_date,
        medical_treatment,
        hospitalized,
        has_insurance,
        today,
    } = args;

    let now = evaluation_instant(today);
    let attributes = CaseAttributes {
        incident_type: IncidentType::parse(&incident_type),
        injury_severity: InjurySeverity::parse(&severity),
        description,
        medical_treatment,
        hospitalized,
        has_insurance,
        incident_date,
    };

    let result = calculate_score(&attributes, now);
    println!("Case score as of {}", now.date_naive());
    render_scoring(&result);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        roster,
        today,
        show_messages,
    } = args;

    let settings = IntakeConfig {
        partner_roster: roster,
        ..IntakeConfig::default()
    };
    let partners = load_partner_roster(&settings)?;
    let now = evaluation_instant(today);

    let directory = Arc::new(InMemoryPartnerDirectory::new(partners));
    let outbox = Arc::new(InMemoryOutbox::default());
    let service = IntakeService::with_settings(
        Arc::new(InMemorySubmissionRepository::default()),
        directory.clone(),
        outbox.clone(),
        settings,
    );

    println!("Referral intake demo ({})", now.date_naive());
    render_partners("Partner network", &directory.snapshot());

    for (label, form) in demo_forms(now.date_naive()) {
        println!("\n{label}");
        match service.submit_at(form, demo_metadata(), now) {
            Ok(receipt) => {
                println!(
                    "- Submission {} | score {} | grade {}",
                    receipt.submission_id, receipt.ai_score, receipt.keeper_grade
                );
                match (&receipt.assigned_firm_id, receipt.referral_fee_amount) {
                    (Some(firm_id), Some(fee)) => {
                        println!("- Assigned to firm {firm_id} | referral fee ${fee:.2}")
                    }
                    _ if qualifies_for_assignment(receipt.keeper_grade) => {
                        println!("- Qualifies for referral but no partner has capacity")
                    }
                    _ => println!("- Held for manual review"),
                }
                if let Ok(record) = service.get(&receipt.submission_id) {
                    if let Some(scoring) = &record.scoring {
                        render_scoring(scoring);
                    }
                }
            }
            Err(IntakeServiceError::Validation(errors)) => {
                println!("- Rejected at intake:");
                for error in &errors.0 {
                    println!("  - {}: {}", error.field, error.message);
                }
            }
            Err(error) => return Err(error.into()),
        }
    }

    println!();
    render_partners("Remaining capacity", &directory.snapshot());

    let messages = outbox.messages();
    println!("\nOutbound notifications ({})", messages.len());
    for message in &messages {
        println!("- to {} | {}", message.to, message.subject);
        if show_messages {
            for line in message.body.lines() {
                println!("    {line}");
            }
        }
    }

    Ok(())
}

fn render_scoring(result: &ScoringResult) {
    let breakdown = &result.score_breakdown;
    println!(
        "  AI score {} | keeper grade {}",
        result.ai_score, result.keeper_grade
    );
    println!(
        "  severity {} | type {} | description {} | medical {} | insurance {} | timeline {}",
        breakdown.severity_score,
        breakdown.type_score,
        breakdown.description_score,
        breakdown.medical_score,
        breakdown.insurance_score,
        breakdown.timeline_score
    );
    for recommendation in &result.recommendations {
        println!("  * {recommendation}");
    }
}

fn render_partners(title: &str, firms: &[PartnerFirm]) {
    println!("{title}:");
    for firm in firms {
        let specialties: Vec<&str> = firm.specialties.iter().map(IncidentType::as_str).collect();
        println!(
            "  - {} ({}) | min grade {} | capacity {} | acceptance {:.0}% | fee {:.1}%{}",
            firm.name,
            specialties.join(", "),
            firm.min_keeper_grade,
            firm.capacity,
            firm.acceptance_rate * 100.0,
            firm.referral_fee_percentage,
            if firm.active { "" } else { " | inactive" }
        );
    }
}

fn demo_metadata() -> SubmissionMetadata {
    SubmissionMetadata {
        source: "cli_demo".to_string(),
        ..SubmissionMetadata::default()
    }
}

fn demo_forms(today: NaiveDate) -> Vec<(&'static str, IntakeForm)> {
    let date = |days: i64| (today - Duration::days(days)).format("%Y-%m-%d").to_string();

    let catastrophic = IntakeForm {
        full_name: "Daniel Reyes".to_string(),
        email: "daniel.reyes@example.com".to_string(),
        phone: "(214) 555-0198".to_string(),
        incident_type: "catastrophic".to_string(),
        incident_date: date(12),
        incident_location: "Dallas, TX".to_string(),
        description: "A scaffold collapsed at a downtown construction site and I fell two stories. \
            An ambulance took me to the hospital for emergency surgery on my spine. OSHA and the police \
            both filed a report, two coworkers gave witness statements, and I remain in severe pain."
            .to_string(),
        injury_severity: "catastrophic".to_string(),
        medical_treatment: true,
        hospitalized: true,
        has_insurance: true,
        insurance_provider: Some("Travelers".to_string()),
        has_attorney: false,
        consent_to_contact: true,
        consent_to_referral: true,
        acknowledge_disclaimer: true,
    };

    let auto = IntakeForm {
        full_name: "Priya Natarajan".to_string(),
        email: "priya.n@example.com".to_string(),
        phone: "512-555-0142".to_string(),
        incident_type: "auto".to_string(),
        incident_date: date(60),
        incident_location: "Round Rock, TX".to_string(),
        description: "Another driver ran a red light and hit my passenger side. I went to urgent care \
            for a shoulder injury and have physical therapy twice a week."
            .to_string(),
        injury_severity: "moderate".to_string(),
        hospitalized: false,
        insurance_provider: Some("GEICO".to_string()),
        ..catastrophic.clone()
    };

    let minor = IntakeForm {
        full_name: "Tom Becker".to_string(),
        email: "tbecker@example.com".to_string(),
        phone: "+1 737 555 0110".to_string(),
        incident_type: "other".to_string(),
        incident_date: date(500),
        incident_location: "San Marcos, TX".to_string(),
        description: "Tripped on a loose mat at a grocery store.".to_string(),
        injury_severity: "minor".to_string(),
        medical_treatment: false,
        hospitalized: false,
        has_insurance: false,
        insurance_provider: None,
        ..catastrophic.clone()
    };

    let incomplete = IntakeForm {
        email: "not-an-email".to_string(),
        consent_to_referral: false,
        ..minor.clone()
    };

    vec![
        ("Catastrophic construction fall", catastrophic),
        ("Red-light auto collision", auto),
        ("Slip at a grocery store", minor),
        ("Incomplete submission", incomplete),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use referral_engine::workflows::intake::{IntakeGuard, KeeperGrade};

    fn pinned_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid date")
    }

    #[test]
    fn demo_forms_cover_every_outcome() {
        let now = evaluation_instant(Some(pinned_today()));
        let guard = IntakeGuard;
        let forms = demo_forms(pinned_today());
        assert_eq!(forms.len(), 4);

        let grades: Vec<Option<KeeperGrade>> = forms
            .into_iter()
            .map(|(_, form)| {
                guard
                    .case_from_form(form, demo_metadata(), now)
                    .ok()
                    .map(|submission| calculate_score(&submission.case, now).keeper_grade)
            })
            .collect();

        assert_eq!(grades[0], Some(KeeperGrade::A));
        assert_eq!(grades[1], Some(KeeperGrade::B));
        assert_eq!(grades[2], Some(KeeperGrade::D));
        assert_eq!(grades[3], None);
    }

    #[test]
    fn demo_runs_against_sample_roster() {
        let args = DemoArgs {
            today: Some(pinned_today()),
            ..DemoArgs::default()
        };
        run_demo(args).expect("demo completes");
    }

    #[test]
    fn score_command_prints_without_error() {
        let args = ScoreArgs {
            incident_type: "workplace".to_string(),
            severity: "severe".to_string(),
            description: "Forklift accident at a warehouse".to_string(),
            incident_date: NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date"),
            medical_treatment: true,
            hospitalized: false,
            has_insurance: true,
            today: Some(pinned_today()),
        };
        run_score(args).expect("score completes");
    }
}
