pub mod color;
pub mod extractor;
pub mod health;
pub mod inbreeding;
pub mod ranker;
pub mod recommendations;
pub mod scoring;
pub mod types;

pub use extractor::{extract, RawGeneticRecord};
pub use inbreeding::{InbreedingEstimator, Parents, PedigreeGraph};
pub use scoring::ScoringMode;
pub use types::*;

/// Runs the pure part of the pipeline for one pairing.
///
/// Absent genotypes degrade to an "Unknown" color entry and an empty risk map
/// rather than failing the analysis.
pub fn analyze_pairing(
    sire_id: &str,
    dam_id: &str,
    sire: Option<DogGenotype>,
    dam: Option<DogGenotype>,
    inbreeding: CoiEstimate,
    mode: ScoringMode,
) -> PairingAnalysis {
    let color_probabilities = color::predict_colors(sire.as_ref(), dam.as_ref());
    let health_risks = health::compute_health_risks(sire.as_ref(), dam.as_ref());
    let health_warnings = health::health_warnings(sire.as_ref(), dam.as_ref());

    let inbreeding_coefficient = inbreeding.coefficient();
    let compatibility_score = scoring::score(mode, &health_risks, &health_warnings, inbreeding_coefficient);
    let health_summary = scoring::health_summary(&health_risks);
    let recommendations =
        recommendations::generate(&health_risks, inbreeding_coefficient, compatibility_score);

    PairingAnalysis {
        sire_id: sire_id.to_string(),
        dam_id: dam_id.to_string(),
        sire_genotype: sire,
        dam_genotype: dam,
        color_probabilities,
        health_risks,
        health_warnings,
        inbreeding,
        inbreeding_coefficient,
        compatibility_score,
        health_summary,
        recommendations,
    }
}
