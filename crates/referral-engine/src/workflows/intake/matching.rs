//! Partner selection and referral-fee math.

use std::cmp::Ordering;

use super::domain::{IncidentType, KeeperGrade, PartnerFirm};

/// Settlement proxy per score point. A placeholder until a calibrated settlement model exists.
pub const SETTLEMENT_PER_SCORE_POINT: f64 = 1000.0;

/// Only A and B cases are routed to partners automatically.
pub fn qualifies_for_assignment(grade: KeeperGrade) -> bool {
    matches!(grade, KeeperGrade::A | KeeperGrade::B)
}

/// Whether a firm may receive a case of this type and grade.
pub fn is_eligible(firm: &PartnerFirm, incident_type: &IncidentType, grade: KeeperGrade) -> bool {
    firm.active
        && firm.specialties.contains(incident_type)
        && grade.meets_minimum(firm.min_keeper_grade)
        && firm.capacity > 0
}

/// Pick the eligible firm with the best acceptance rate, then the most open capacity.
///
/// Remaining ties go to the firm listed first.
pub fn select_partner<'a>(
    candidates: &'a [PartnerFirm],
    incident_type: &IncidentType,
    grade: KeeperGrade,
) -> Option<&'a PartnerFirm> {
    let mut eligible: Vec<&PartnerFirm> = candidates
        .iter()
        .filter(|firm| is_eligible(firm, incident_type, grade))
        .collect();

    eligible.sort_by(|left, right| priority_order(left, right));
    eligible.into_iter().next()
}

pub(crate) fn priority_order(left: &PartnerFirm, right: &PartnerFirm) -> Ordering {
    right
        .acceptance_rate
        .total_cmp(&left.acceptance_rate)
        .then_with(|| right.capacity.cmp(&left.capacity))
}

pub fn estimated_settlement(ai_score: u8) -> f64 {
    f64::from(ai_score) * SETTLEMENT_PER_SCORE_POINT
}

pub fn compute_referral_fee(firm: &PartnerFirm, ai_score: u8) -> f64 {
    estimated_settlement(ai_score) * firm.referral_fee_percentage / 100.0
}
