use crate::genetics::types::{HealthRisks, RiskStatus};

pub const NOT_RECOMMENDED_BELOW: f64 = 50.0;
pub const COI_WARNING_THRESHOLD: f64 = 0.20;

/// Breeding advice for one pairing, most severe first. Never empty.
pub fn generate(risks: &HealthRisks, coi: Option<f64>, score: f64) -> Vec<String> {
    let mut recommendations = Vec::new();

    if score < NOT_RECOMMENDED_BELOW {
        recommendations.push(format!(
            "Not recommended: a compatibility score of {:.0} indicates significant genetic risk for the litter.",
            score
        ));
    }

    if let Some(coi) = coi.filter(|c| *c > COI_WARNING_THRESHOLD) {
        recommendations.push(format!(
            "High inbreeding coefficient ({:.1}%): consider a different pairing to preserve genetic diversity.",
            coi * 100.0
        ));
    }

    let mut at_risk: Vec<(&String, f64)> = risks
        .iter()
        .filter(|(_, r)| r.status == RiskStatus::AtRisk)
        .map(|(condition, r)| (condition, r.probability))
        .collect();
    at_risk.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    for (condition, probability) in at_risk {
        recommendations.push(format!(
            "{}: puppies are at risk ({:.0}% expected affected or carrier); be aware of this condition and plan health testing for the litter.",
            condition,
            probability * 100.0
        ));
    }

    if recommendations.is_empty() {
        recommendations.push("This pairing appears genetically compatible.".to_string());
    }

    recommendations
}
