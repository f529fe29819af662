//! Case quality scoring.
//!
//! Six independent factors are scored and summed. The sum decides the keeper grade and is
//! clamped to `0..=100` for the published score. The only dependency on the outside world is
//! the evaluation instant, which callers pass in so repeated runs stay deterministic.

mod recommendations;
mod rules;

pub use rules::QUALITY_KEYWORDS;

use chrono::{DateTime, Utc};

use super::domain::{CaseAttributes, KeeperGrade, ScoreBreakdown, ScoringResult};

/// Score a case as of `now`.
pub fn calculate_score(attributes: &CaseAttributes, now: DateTime<Utc>) -> ScoringResult {
    let score_breakdown = ScoreBreakdown {
        severity_score: rules::severity_score(&attributes.injury_severity),
        type_score: rules::type_score(&attributes.incident_type),
        description_score: rules::description_score(&attributes.description),
        medical_score: rules::medical_score(attributes.medical_treatment, attributes.hospitalized),
        insurance_score: rules::insurance_score(attributes.has_insurance),
        timeline_score: rules::timeline_score(attributes.incident_date, now),
    };

    let total_score = score_breakdown.total();
    let keeper_grade = KeeperGrade::from_score(total_score);
    let recommendations = recommendations::recommend(total_score, &score_breakdown);

    ScoringResult {
        ai_score: total_score.clamp(0, 100) as u8,
        keeper_grade,
        score_breakdown,
        recommendations,
    }
}
