use chrono::{DateTime, NaiveDate, Utc};

use super::super::domain::{IncidentType, InjurySeverity};

/// Words that suggest a well-documented incident description.
pub const QUALITY_KEYWORDS: [&str; 14] = [
    "hospital",
    "ambulance",
    "police",
    "witness",
    "evidence",
    "pain",
    "injury",
    "damage",
    "liability",
    "negligence",
    "settlement",
    "compensation",
    "medical",
    "treatment",
];

const DESCRIPTION_BASE: u8 = 5;
const DESCRIPTION_CAP: u8 = 20;
const KEYWORD_POINTS: usize = 2;
const KEYWORD_CAP: usize = 10;

pub(crate) fn severity_score(severity: &InjurySeverity) -> u8 {
    match severity {
        InjurySeverity::Catastrophic => 40,
        InjurySeverity::Severe => 30,
        InjurySeverity::Moderate => 20,
        InjurySeverity::Minor => 10,
        InjurySeverity::Unrecognized(_) => 5,
    }
}

pub(crate) fn type_score(incident_type: &IncidentType) -> u8 {
    match incident_type {
        IncidentType::Trucking | IncidentType::Catastrophic => 30,
        IncidentType::Auto => 20,
        IncidentType::Workplace => 15,
        IncidentType::Other | IncidentType::Unrecognized(_) => 10,
    }
}

pub(crate) fn description_score(description: &str) -> u8 {
    let length = description.trim().chars().count();

    let length_bonus = if length > 200 {
        15
    } else if length > 100 {
        10
    } else if length > 50 {
        5
    } else {
        0
    };

    let lowered = description.to_lowercase();
    let keyword_hits = QUALITY_KEYWORDS
        .iter()
        .filter(|keyword| lowered.contains(**keyword))
        .count();
    let keyword_bonus = (keyword_hits * KEYWORD_POINTS).min(KEYWORD_CAP) as u8;

    (DESCRIPTION_BASE + length_bonus + keyword_bonus).min(DESCRIPTION_CAP)
}

// Hospitalization supersedes treatment; the two never stack.
pub(crate) fn medical_score(medical_treatment: bool, hospitalized: bool) -> u8 {
    if hospitalized {
        15
    } else if medical_treatment {
        10
    } else {
        0
    }
}

pub(crate) fn insurance_score(has_insurance: bool) -> u8 {
    if has_insurance {
        5
    } else {
        0
    }
}

pub(crate) fn timeline_score(incident_date: NaiveDate, now: DateTime<Utc>) -> u8 {
    let days_since_incident = (now.date_naive() - incident_date).num_days();

    if days_since_incident <= 30 {
        10
    } else if days_since_incident <= 90 {
        7
    } else if days_since_incident <= 365 {
        5
    } else {
        2
    }
}
