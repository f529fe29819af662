use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for intake submissions (`SUB-...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for partner firms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FirmId(pub String);

impl fmt::Display for FirmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Incident categories offered on the intake form.
///
/// Parsing is case-insensitive. Values outside the form's list are kept as `Unrecognized` so
/// scoring can fall back to its default weight; the intake guard rejects them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IncidentType {
    Auto,
    Trucking,
    Catastrophic,
    Workplace,
    Other,
    Unrecognized(String),
}

impl IncidentType {
    pub const fn known() -> [Self; 5] {
        [
            Self::Auto,
            Self::Trucking,
            Self::Catastrophic,
            Self::Workplace,
            Self::Other,
        ]
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "auto" => Self::Auto,
            "trucking" => Self::Trucking,
            "catastrophic" => Self::Catastrophic,
            "workplace" => Self::Workplace,
            "other" => Self::Other,
            _ => Self::Unrecognized(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Auto => "auto",
            Self::Trucking => "trucking",
            Self::Catastrophic => "catastrophic",
            Self::Workplace => "workplace",
            Self::Other => "other",
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<String> for IncidentType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<IncidentType> for String {
    fn from(value: IncidentType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Self-reported injury severity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InjurySeverity {
    Minor,
    Moderate,
    Severe,
    Catastrophic,
    Unrecognized(String),
}

impl InjurySeverity {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "minor" => Self::Minor,
            "moderate" => Self::Moderate,
            "severe" => Self::Severe,
            "catastrophic" => Self::Catastrophic,
            _ => Self::Unrecognized(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
            Self::Catastrophic => "catastrophic",
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<String> for InjurySeverity {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<InjurySeverity> for String {
    fn from(value: InjurySeverity) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for InjurySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Letter grade describing how worth pursuing a case is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeeperGrade {
    A,
    B,
    C,
    D,
}

impl KeeperGrade {
    /// Grade for a summed (unclamped) score.
    pub const fn from_score(score: i32) -> Self {
        if score >= 80 {
            Self::A
        } else if score >= 60 {
            Self::B
        } else if score >= 40 {
            Self::C
        } else {
            Self::D
        }
    }

    /// Numeric rank used for every grade comparison; higher is better.
    pub const fn value(self) -> u8 {
        match self {
            Self::A => 4,
            Self::B => 3,
            Self::C => 2,
            Self::D => 1,
        }
    }

    pub const fn meets_minimum(self, minimum: KeeperGrade) -> bool {
        self.value() >= minimum.value()
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            _ => None,
        }
    }
}

impl fmt::Display for KeeperGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The subset of a submission the scorer looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseAttributes {
    pub incident_type: IncidentType,
    pub injury_severity: InjurySeverity,
    pub description: String,
    pub medical_treatment: bool,
    pub hospitalized: bool,
    pub has_insurance: bool,
    pub incident_date: NaiveDate,
}

/// Per-factor points that add up to the case score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub severity_score: u8,
    pub type_score: u8,
    pub description_score: u8,
    pub medical_score: u8,
    pub insurance_score: u8,
    pub timeline_score: u8,
}

impl ScoreBreakdown {
    pub fn total(&self) -> i32 {
        [
            self.severity_score,
            self.type_score,
            self.description_score,
            self.medical_score,
            self.insurance_score,
            self.timeline_score,
        ]
        .iter()
        .map(|score| i32::from(*score))
        .sum()
    }
}

/// Scorer output persisted alongside the submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringResult {
    pub ai_score: u8,
    pub keeper_grade: KeeperGrade,
    pub score_breakdown: ScoreBreakdown,
    pub recommendations: Vec<String>,
}

/// Partner law firm that can receive referrals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerFirm {
    pub id: FirmId,
    pub name: String,
    pub contact_name: Option<String>,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub specialties: BTreeSet<IncidentType>,
    pub min_keeper_grade: KeeperGrade,
    pub capacity: u32,
    pub acceptance_rate: f64,
    pub referral_fee_percentage: f64,
    pub active: bool,
}

/// A submission handed to a partner firm. Written once per submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub submission_id: SubmissionId,
    pub firm_id: FirmId,
    pub referral_fee_amount: f64,
    pub assigned_at: DateTime<Utc>,
}

/// Claimant contact details collected by the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

/// Request metadata captured alongside the form body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionMetadata {
    pub source: String,
    pub user_agent: String,
    pub ip_address: String,
}

impl Default for SubmissionMetadata {
    fn default() -> Self {
        Self {
            source: "web_form".to_string(),
            user_agent: "unknown".to_string(),
            ip_address: "unknown".to_string(),
        }
    }
}

/// Validated intake submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSubmission {
    pub submission_id: SubmissionId,
    pub contact: ContactDetails,
    pub case: CaseAttributes,
    pub incident_location: String,
    pub insurance_provider: Option<String>,
    pub has_attorney: bool,
    pub submitted_at: DateTime<Utc>,
    pub metadata: SubmissionMetadata,
}

/// Lifecycle of a submission inside the intake pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Scored,
    Assigned,
}

impl SubmissionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Scored => "scored",
            SubmissionStatus::Assigned => "assigned",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incident_type_parsing_is_case_insensitive() {
        assert_eq!(IncidentType::parse(" Trucking "), IncidentType::Trucking);
        assert_eq!(
            IncidentType::parse("boating"),
            IncidentType::Unrecognized("boating".to_string())
        );
        let decoded: IncidentType = serde_json::from_str("\"AUTO\"").expect("decodes");
        assert_eq!(decoded, IncidentType::Auto);
        assert_eq!(
            serde_json::to_string(&IncidentType::Workplace).expect("encodes"),
            "\"workplace\""
        );
    }

    #[test]
    fn grade_comparison_uses_numeric_rank() {
        assert!(KeeperGrade::A.meets_minimum(KeeperGrade::B));
        assert!(KeeperGrade::B.meets_minimum(KeeperGrade::B));
        assert!(!KeeperGrade::B.meets_minimum(KeeperGrade::A));
        assert!(!KeeperGrade::D.meets_minimum(KeeperGrade::C));
        assert_eq!(KeeperGrade::parse("b"), Some(KeeperGrade::B));
        assert_eq!(KeeperGrade::parse("E"), None);
    }

    #[test]
    fn grade_thresholds() {
        assert_eq!(KeeperGrade::from_score(120), KeeperGrade::A);
        assert_eq!(KeeperGrade::from_score(80), KeeperGrade::A);
        assert_eq!(KeeperGrade::from_score(79), KeeperGrade::B);
        assert_eq!(KeeperGrade::from_score(60), KeeperGrade::B);
        assert_eq!(KeeperGrade::from_score(59), KeeperGrade::C);
        assert_eq!(KeeperGrade::from_score(40), KeeperGrade::C);
        assert_eq!(KeeperGrade::from_score(39), KeeperGrade::D);
        assert_eq!(KeeperGrade::from_score(0), KeeperGrade::D);
    }
}
