use crate::genetics::types::{
    DogGenotype, HealthRiskEntry, HealthRisks, HealthWarning, MarkerStatus, RiskLevel, RiskStatus,
};
use std::collections::BTreeSet;

// Ordering used to fold a (sire, dam) pair into one canonical pair, which makes
// every classification below commutative.
fn rank(status: MarkerStatus) -> u8 {
    match status {
        MarkerStatus::Clear => 0,
        MarkerStatus::Carrier => 1,
        MarkerStatus::Affected => 2,
        MarkerStatus::Unknown => 3,
    }
}

fn canonical_pair(a: MarkerStatus, b: MarkerStatus) -> (MarkerStatus, MarkerStatus) {
    if rank(a) <= rank(b) {
        (a, b)
    } else {
        (b, a)
    }
}

/// Mendelian cross for one recessive condition.
///
/// Any `affected` parent makes the litter `at_risk`; clear x carrier yields carriers only.
pub fn cross(sire: MarkerStatus, dam: MarkerStatus) -> HealthRiskEntry {
    use MarkerStatus::*;

    match canonical_pair(sire, dam) {
        (Clear, Clear) => HealthRiskEntry::new(RiskStatus::Clear, 0.0),
        (Clear, Carrier) => HealthRiskEntry::new(RiskStatus::Carrier, 0.5),
        (Clear, Affected) => HealthRiskEntry::new(RiskStatus::AtRisk, 0.5),
        (Carrier, Carrier) => HealthRiskEntry::new(RiskStatus::AtRisk, 0.25),
        (Carrier, Affected) => HealthRiskEntry::new(RiskStatus::AtRisk, 0.5),
        (Affected, Affected) => HealthRiskEntry::new(RiskStatus::AtRisk, 1.0),
        _ => HealthRiskEntry::new(RiskStatus::Unknown, 0.0),
    }
}

fn condition_union<'a>(sire: &'a DogGenotype, dam: &'a DogGenotype) -> BTreeSet<&'a str> {
    sire.health_markers
        .keys()
        .chain(dam.health_markers.keys())
        .map(String::as_str)
        .collect()
}

fn statuses(sire: &DogGenotype, dam: &DogGenotype, condition: &str) -> (MarkerStatus, MarkerStatus) {
    (
        sire.marker_status(condition).unwrap_or(MarkerStatus::Unknown),
        dam.marker_status(condition).unwrap_or(MarkerStatus::Unknown),
    )
}

/// Per-condition offspring risk over every condition either parent was tested for.
///
/// A condition only one parent was tested for is `unknown`. With either genotype absent
/// nothing can be evaluated and the map is empty.
pub fn compute_health_risks(sire: Option<&DogGenotype>, dam: Option<&DogGenotype>) -> HealthRisks {
    let (Some(sire), Some(dam)) = (sire, dam) else {
        return HealthRisks::new();
    };

    condition_union(sire, dam)
        .into_iter()
        .map(|condition| {
            let (s, d) = statuses(sire, dam, condition);
            (condition.to_string(), cross(s, d))
        })
        .collect()
}

/// Narrative classification of one pair, or `None` when there is nothing to warn about.
pub fn warning_for(condition: &str, sire: MarkerStatus, dam: MarkerStatus) -> Option<HealthWarning> {
    use MarkerStatus::*;

    let (risk_level, affected_percentage, description) = match canonical_pair(sire, dam) {
        (Affected, Affected) => (
            RiskLevel::Critical,
            100,
            format!("Both parents are affected by {condition}; every puppy is expected to be affected."),
        ),
        (Carrier, Affected) => (
            RiskLevel::Critical,
            50,
            format!(
                "One parent is affected by {condition} and the other is a carrier; about half of the puppies are expected to be affected and the rest carriers."
            ),
        ),
        (Carrier, Carrier) => (
            RiskLevel::High,
            25,
            format!(
                "Both parents carry {condition}; about 25% of puppies are expected to be affected and 50% to be carriers."
            ),
        ),
        (Clear, Affected) => (
            RiskLevel::Medium,
            0,
            format!("One parent is affected by {condition}; every puppy will be a carrier."),
        ),
        (Clear, Carrier) => (
            RiskLevel::Low,
            0,
            format!(
                "One parent carries {condition}; about half of the puppies may be carriers but none are expected to be affected."
            ),
        ),
        _ => return None,
    };

    Some(HealthWarning {
        condition: condition.to_string(),
        risk_level,
        description,
        affected_percentage,
    })
}

/// Severity-tagged warnings, most severe first, then by condition name.
pub fn health_warnings(sire: Option<&DogGenotype>, dam: Option<&DogGenotype>) -> Vec<HealthWarning> {
    let (Some(sire), Some(dam)) = (sire, dam) else {
        return Vec::new();
    };

    let mut warnings: Vec<HealthWarning> = condition_union(sire, dam)
        .into_iter()
        .filter_map(|condition| {
            let (s, d) = statuses(sire, dam, condition);
            warning_for(condition, s, d)
        })
        .collect();

    warnings.sort_by(|a, b| {
        b.risk_level
            .cmp(&a.risk_level)
            .then_with(|| a.condition.cmp(&b.condition))
    });
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [MarkerStatus; 4] = [
        MarkerStatus::Clear,
        MarkerStatus::Carrier,
        MarkerStatus::Affected,
        MarkerStatus::Unknown,
    ];

    #[test]
    fn test_cross_table() {
        use MarkerStatus::*;

        let cases = vec![
            (Clear, Clear, RiskStatus::Clear, 0.0),
            (Clear, Carrier, RiskStatus::Carrier, 0.5),
            (Clear, Affected, RiskStatus::AtRisk, 0.5),
            (Carrier, Carrier, RiskStatus::AtRisk, 0.25),
            (Carrier, Affected, RiskStatus::AtRisk, 0.5),
            (Affected, Affected, RiskStatus::AtRisk, 1.0),
            (Unknown, Clear, RiskStatus::Unknown, 0.0),
            (Affected, Unknown, RiskStatus::Unknown, 0.0),
        ];

        for (sire, dam, status, probability) in cases {
            let entry = cross(sire, dam);
            assert_eq!(entry.status, status, "{:?} x {:?}", sire, dam);
            assert_eq!(entry.probability, probability, "{:?} x {:?}", sire, dam);
        }
    }

    #[test]
    fn test_cross_is_commutative() {
        for a in ALL {
            for b in ALL {
                assert_eq!(cross(a, b), cross(b, a));
                assert_eq!(warning_for("X", a, b), warning_for("X", b, a));
            }
        }
    }

    #[test]
    fn test_modes_agree_on_incompatibility() {
        for a in ALL {
            for b in ALL {
                let raw = cross(a, b);
                let narrative = warning_for("X", a, b);
                let narrative_incompatible = narrative
                    .as_ref()
                    .map(|w| w.risk_level.is_incompatible())
                    .unwrap_or(false);
                assert_eq!(
                    raw.status.is_incompatible(),
                    narrative_incompatible,
                    "{:?} x {:?}",
                    a,
                    b
                );
                if raw.status == RiskStatus::Carrier {
                    assert_eq!(narrative.map(|w| w.risk_level), Some(RiskLevel::Low));
                }
            }
        }
    }

    #[test]
    fn test_compute_health_risks_union_and_unknown() {
        let sire = DogGenotype::unknown("s")
            .with_marker("DM", MarkerStatus::Clear)
            .with_marker("PRA", MarkerStatus::Carrier);
        let dam = DogGenotype::unknown("d")
            .with_marker("PRA", MarkerStatus::Carrier)
            .with_marker("EIC", MarkerStatus::Clear);

        let risks = compute_health_risks(Some(&sire), Some(&dam));
        assert_eq!(risks.len(), 3);
        assert_eq!(risks["PRA"], HealthRiskEntry::new(RiskStatus::AtRisk, 0.25));
        assert_eq!(risks["DM"], HealthRiskEntry::new(RiskStatus::Unknown, 0.0));
        assert_eq!(risks["EIC"], HealthRiskEntry::new(RiskStatus::Unknown, 0.0));
    }

    #[test]
    fn test_absent_parent_yields_empty() {
        let sire = DogGenotype::unknown("s").with_marker("DM", MarkerStatus::Clear);
        assert!(compute_health_risks(Some(&sire), None).is_empty());
        assert!(compute_health_risks(None, Some(&sire)).is_empty());
        assert!(health_warnings(Some(&sire), None).is_empty());
    }

    #[test]
    fn test_warnings_sorted_by_severity() {
        let sire = DogGenotype::unknown("s")
            .with_marker("A-low", MarkerStatus::Carrier)
            .with_marker("B-crit", MarkerStatus::Affected)
            .with_marker("C-high", MarkerStatus::Carrier)
            .with_marker("D-none", MarkerStatus::Clear);
        let dam = DogGenotype::unknown("d")
            .with_marker("A-low", MarkerStatus::Clear)
            .with_marker("B-crit", MarkerStatus::Affected)
            .with_marker("C-high", MarkerStatus::Carrier)
            .with_marker("D-none", MarkerStatus::Clear);

        let warnings = health_warnings(Some(&sire), Some(&dam));
        let levels: Vec<_> = warnings
            .iter()
            .map(|w| (w.condition.as_str(), w.risk_level, w.affected_percentage))
            .collect();
        assert_eq!(
            levels,
            vec![
                ("B-crit", RiskLevel::Critical, 100),
                ("C-high", RiskLevel::High, 25),
                ("A-low", RiskLevel::Low, 0),
            ]
        );
    }
}
