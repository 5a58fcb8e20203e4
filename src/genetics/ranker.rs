use crate::genetics::types::{CandidateDog, Gender, PairingAnalysis, PartnerSuggestion};
use tracing::debug;

pub const DEFAULT_LIMIT: usize = 5;

const HEALTH_WEIGHT: f64 = 0.7;
const COI_WEIGHT: f64 = 0.3;
// Desirability given to a candidate whose pedigree cannot support a coefficient.
const UNKNOWN_COI_SCORE: f64 = 50.0;

/// COI-only desirability on a 0-100 scale. `coi` is a fraction; the knots are at
/// 6.25%, 12.5% and 25% (half-sib / full-sib / parent-offspring levels).
pub fn coi_desirability(coi: Option<f64>) -> f64 {
    let Some(coi) = coi else {
        return UNKNOWN_COI_SCORE;
    };
    let pct = coi * 100.0;

    if pct <= 0.0 {
        100.0
    } else if pct < 6.25 {
        100.0 - (pct / 6.25) * 10.0
    } else if pct < 12.5 {
        90.0 - ((pct - 6.25) / 6.25) * 40.0
    } else if pct < 25.0 {
        50.0 - ((pct - 12.5) / 12.5) * 50.0
    } else {
        0.0
    }
}

pub fn blended_compatibility(health_score: f64, coi: Option<f64>) -> u32 {
    let blended = HEALTH_WEIGHT * health_score + COI_WEIGHT * coi_desirability(coi);
    blended.round().clamp(0.0, 100.0) as u32
}

/// Sire and dam ids for a pairing between the focal dog and a candidate.
pub fn assign_roles<'a>(dog_id: &'a str, gender: Gender, candidate_id: &'a str) -> (&'a str, &'a str) {
    match gender {
        Gender::Male => (dog_id, candidate_id),
        Gender::Female => (candidate_id, dog_id),
    }
}

/// Whether a pool entry can be paired with the focal dog at all.
/// Candidates with no recorded gender are admitted in the opposite role.
pub fn is_eligible(dog_id: &str, gender: Gender, candidate: &CandidateDog) -> bool {
    if candidate.dog_id == dog_id {
        return false;
    }
    match candidate.gender {
        Some(g) => g == gender.opposite(),
        None => {
            debug!(
                candidate = %candidate.dog_id,
                role = gender.opposite().as_str(),
                "Admitting candidate with unrecorded gender"
            );
            true
        }
    }
}

pub fn suggestion(candidate: &CandidateDog, name: String, analysis: &PairingAnalysis) -> PartnerSuggestion {
    PartnerSuggestion {
        dog_id: candidate.dog_id.clone(),
        name,
        compatibility: blended_compatibility(analysis.compatibility_score, analysis.inbreeding_coefficient),
        coi: analysis.inbreeding_coefficient,
        major_health_issues: analysis
            .health_warnings
            .iter()
            .filter(|w| w.risk_level.is_major())
            .count(),
        photo_url: candidate.photo_url.clone(),
    }
}

/// Descending compatibility, dog id ascending on ties, at most `limit` entries.
pub fn rank(mut suggestions: Vec<PartnerSuggestion>, limit: usize) -> Vec<PartnerSuggestion> {
    suggestions.sort_by(|a, b| {
        b.compatibility
            .cmp(&a.compatibility)
            .then_with(|| a.dog_id.cmp(&b.dog_id))
    });
    suggestions.truncate(limit);
    suggestions
}
