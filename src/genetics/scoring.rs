use crate::genetics::types::{HealthRisks, HealthSummary, HealthWarning, RiskLevel, RiskStatus};
use serde::{Deserialize, Serialize};

pub const MAX_SCORE: f64 = 100.0;
const CLEAR_BONUS: f64 = 2.0;
const AT_RISK_WEIGHT: f64 = 15.0;
const CARRIER_WEIGHT: f64 = 5.0;

/// Which health signal the compatibility score deducts from.
#[derive(Serialize, Deserialize, clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringMode {
    /// Probability-weighted deductions from the raw risk map.
    #[default]
    #[value(name = "risk-map")]
    RiskMap,
    /// Fixed deductions per narrative warning severity.
    #[value(name = "warnings")]
    Warnings,
}

fn severity_penalty(level: RiskLevel) -> f64 {
    match level {
        RiskLevel::Critical => 40.0,
        RiskLevel::High => 25.0,
        RiskLevel::Medium => 15.0,
        RiskLevel::Low => 5.0,
    }
}

fn clearance_bonus(risks: &HealthRisks) -> f64 {
    risks
        .values()
        .filter(|r| r.status == RiskStatus::Clear)
        .count() as f64
        * CLEAR_BONUS
}

// Coefficient is a fraction of 1; 0.30 costs 30 points.
fn inbreeding_penalty(coi: Option<f64>) -> f64 {
    coi.map(|c| c.clamp(0.0, 1.0) * MAX_SCORE).unwrap_or(0.0)
}

fn finish(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, MAX_SCORE)
}

/// Compatibility score from the raw risk map, clamped to [0, 100].
pub fn score_risks(risks: &HealthRisks, coi: Option<f64>) -> f64 {
    let health_penalty: f64 = risks
        .values()
        .map(|r| match r.status {
            RiskStatus::AtRisk => AT_RISK_WEIGHT * r.probability,
            RiskStatus::Carrier => CARRIER_WEIGHT * r.probability,
            RiskStatus::Clear | RiskStatus::Unknown => 0.0,
        })
        .sum();

    finish(MAX_SCORE - inbreeding_penalty(coi) - health_penalty + clearance_bonus(risks))
}

/// Compatibility score from narrative warnings; clearances still come from the risk map.
pub fn score_warnings(warnings: &[HealthWarning], risks: &HealthRisks, coi: Option<f64>) -> f64 {
    let health_penalty: f64 = warnings.iter().map(|w| severity_penalty(w.risk_level)).sum();

    finish(MAX_SCORE - inbreeding_penalty(coi) - health_penalty + clearance_bonus(risks))
}

pub fn score(
    mode: ScoringMode,
    risks: &HealthRisks,
    warnings: &[HealthWarning],
    coi: Option<f64>,
) -> f64 {
    match mode {
        ScoringMode::RiskMap => score_risks(risks, coi),
        ScoringMode::Warnings => score_warnings(warnings, risks, coi),
    }
}

pub fn health_summary(risks: &HealthRisks) -> HealthSummary {
    let mut summary = HealthSummary::default();
    for risk in risks.values() {
        match risk.status {
            RiskStatus::AtRisk => summary.at_risk_count += 1,
            RiskStatus::Carrier => summary.carrier_count += 1,
            RiskStatus::Clear => summary.clear_count += 1,
            RiskStatus::Unknown => summary.unknown_count += 1,
        }
    }
    summary.total_tests = summary.at_risk_count
        + summary.carrier_count
        + summary.clear_count
        + summary.unknown_count;
    summary
}
