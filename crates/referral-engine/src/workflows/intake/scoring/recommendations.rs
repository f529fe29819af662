use super::super::domain::ScoreBreakdown;

pub(crate) fn recommend(total_score: i32, breakdown: &ScoreBreakdown) -> Vec<String> {
    let headline: [&str; 2] = if total_score >= 80 {
        [
            "High-priority case - excellent keeper potential",
            "Consider immediate partner assignment",
        ]
    } else if total_score >= 60 {
        [
            "Strong case - good keeper potential",
            "Review for partner assignment",
        ]
    } else if total_score >= 40 {
        [
            "Marginal case - requires careful review",
            "Consider additional information gathering",
        ]
    } else {
        [
            "Low-priority case - likely decline",
            "Standard rejection process",
        ]
    };

    let mut recommendations: Vec<String> = headline.iter().map(|line| line.to_string()).collect();

    if breakdown.severity_score < 20 {
        recommendations.push("Consider severity documentation".to_string());
    }

    if breakdown.description_score < 10 {
        recommendations.push("Request more detailed incident description".to_string());
    }

    if breakdown.medical_score == 0 {
        recommendations.push("Verify medical treatment status".to_string());
    }

    if breakdown.timeline_score < 5 {
        recommendations.push("Note: Incident occurred over a year ago".to_string());
    }

    recommendations
}
