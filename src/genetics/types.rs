use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Sentinel used for any color locus the source record did not report.
pub const UNKNOWN: &str = "Unknown";

#[derive(clap::ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[value(name = "male")]
    Male,
    #[value(name = "female")]
    Female,
}

impl Gender {
    pub fn opposite(&self) -> Gender {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Result of a single genetic test for one condition.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MarkerStatus {
    Clear,
    Carrier,
    Affected,
    Unknown,
}

impl MarkerStatus {
    /// Lenient parse of lab-reported result strings. Anything unrecognized is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "clear" | "normal" | "n/n" | "negative" | "clear by parentage" => MarkerStatus::Clear,
            "carrier" | "n/m" | "m/n" | "heterozygous" => MarkerStatus::Carrier,
            "affected" | "at risk" | "at_risk" | "m/m" | "homozygous" | "positive" => {
                MarkerStatus::Affected
            }
            _ => MarkerStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerStatus::Clear => "clear",
            MarkerStatus::Carrier => "carrier",
            MarkerStatus::Affected => "affected",
            MarkerStatus::Unknown => "unknown",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthMarker {
    pub status: MarkerStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laboratory: Option<String>,
}

impl HealthMarker {
    pub fn new(status: MarkerStatus) -> Self {
        Self {
            status,
            test_date: None,
            laboratory: None,
        }
    }
}

/// Canonical per-dog genetic profile. Built fresh for every request and never mutated.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DogGenotype {
    pub dog_id: String,
    pub breed: String,
    pub base_color: String,
    pub brown_dilution: String,
    pub dilution: String,
    pub agouti: String,
    pub health_markers: BTreeMap<String, HealthMarker>,
    pub color_genetics: BTreeMap<String, Value>,
    pub traits: BTreeMap<String, Value>,
}

impl DogGenotype {
    /// A genotype with every scalar field at its sentinel and no markers.
    pub fn unknown(dog_id: impl Into<String>) -> Self {
        Self {
            dog_id: dog_id.into(),
            breed: UNKNOWN.to_string(),
            base_color: UNKNOWN.to_string(),
            brown_dilution: UNKNOWN.to_string(),
            dilution: UNKNOWN.to_string(),
            agouti: UNKNOWN.to_string(),
            health_markers: BTreeMap::new(),
            color_genetics: BTreeMap::new(),
            traits: BTreeMap::new(),
        }
    }

    pub fn with_marker(mut self, condition: &str, status: MarkerStatus) -> Self {
        self.health_markers
            .insert(condition.to_string(), HealthMarker::new(status));
        self
    }

    pub fn marker_status(&self, condition: &str) -> Option<MarkerStatus> {
        self.health_markers.get(condition).map(|m| m.status)
    }
}

/// Offspring classification for one condition.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskStatus {
    Clear,
    Carrier,
    AtRisk,
    Unknown,
}

impl RiskStatus {
    pub fn is_incompatible(&self) -> bool {
        matches!(self, RiskStatus::AtRisk)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthRiskEntry {
    pub status: RiskStatus,
    pub probability: f64,
}

impl HealthRiskEntry {
    pub fn new(status: RiskStatus, probability: f64) -> Self {
        Self { status, probability }
    }
}

/// Condition name -> offspring risk. Ordered so every consumer sees the same iteration order.
pub type HealthRisks = BTreeMap<String, HealthRiskEntry>;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn is_incompatible(&self) -> bool {
        *self >= RiskLevel::Medium
    }

    pub fn is_major(&self) -> bool {
        *self >= RiskLevel::High
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthWarning {
    pub condition: String,
    pub risk_level: RiskLevel,
    pub description: String,
    pub affected_percentage: u8,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColorProbability {
    pub color: String,
    pub probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthSummary {
    pub at_risk_count: usize,
    pub carrier_count: usize,
    pub clear_count: usize,
    pub unknown_count: usize,
    pub total_tests: usize,
}

/// Where an inbreeding coefficient came from. Coefficients are fractions in [0, 1].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum CoiEstimate {
    #[serde(rename_all = "camelCase")]
    Precalculated { coefficient: f64 },
    #[serde(rename_all = "camelCase")]
    Pedigree {
        coefficient: f64,
        common_ancestors: Vec<String>,
        generations: u32,
    },
    InsufficientPedigree,
}

impl CoiEstimate {
    pub fn coefficient(&self) -> Option<f64> {
        match self {
            CoiEstimate::Precalculated { coefficient } => Some(*coefficient),
            CoiEstimate::Pedigree { coefficient, .. } => Some(*coefficient),
            CoiEstimate::InsufficientPedigree => None,
        }
    }
}

/// Aggregate result of one sire/dam analysis, handed to the UI as plain data.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PairingAnalysis {
    pub sire_id: String,
    pub dam_id: String,
    pub sire_genotype: Option<DogGenotype>,
    pub dam_genotype: Option<DogGenotype>,
    pub color_probabilities: Vec<ColorProbability>,
    pub health_risks: HealthRisks,
    pub health_warnings: Vec<HealthWarning>,
    pub inbreeding: CoiEstimate,
    pub inbreeding_coefficient: Option<f64>,
    pub compatibility_score: f64,
    pub health_summary: HealthSummary,
    pub recommendations: Vec<String>,
}

/// One entry in a candidate pool handed to the partner ranker.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDog {
    pub dog_id: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl CandidateDog {
    pub fn new(dog_id: impl Into<String>, gender: Gender) -> Self {
        Self {
            dog_id: dog_id.into(),
            gender: Some(gender),
            photo_url: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartnerSuggestion {
    pub dog_id: String,
    pub name: String,
    pub compatibility: u32,
    pub coi: Option<f64>,
    pub major_health_issues: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_status_parse() {
        let cases = vec![
            ("clear", MarkerStatus::Clear),
            ("N/N", MarkerStatus::Clear),
            (" Carrier ", MarkerStatus::Carrier),
            ("n/m", MarkerStatus::Carrier),
            ("AFFECTED", MarkerStatus::Affected),
            ("at risk", MarkerStatus::Affected),
            ("pending", MarkerStatus::Unknown),
            ("", MarkerStatus::Unknown),
        ];

        for (raw, expected) in cases {
            assert_eq!(MarkerStatus::parse(raw), expected, "parsing {:?}", raw);
        }
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium.is_incompatible());
        assert!(!RiskLevel::Low.is_incompatible());
        assert!(RiskLevel::High.is_major());
        assert!(!RiskLevel::Medium.is_major());
    }

    #[test]
    fn test_risk_status_serializes_snake_case() {
        let entry = HealthRiskEntry::new(RiskStatus::AtRisk, 0.25);
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"status":"at_risk","probability":0.25}"#);
    }

    #[test]
    fn test_coi_estimate_coefficient() {
        assert_eq!(
            CoiEstimate::Precalculated { coefficient: 0.1 }.coefficient(),
            Some(0.1)
        );
        assert_eq!(CoiEstimate::InsufficientPedigree.coefficient(), None);

        let json = serde_json::to_value(CoiEstimate::InsufficientPedigree).unwrap();
        assert_eq!(json["source"], "insufficientPedigree");
    }
}
