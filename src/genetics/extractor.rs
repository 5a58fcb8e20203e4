use crate::genetics::types::{DogGenotype, HealthMarker, MarkerStatus, UNKNOWN};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Genetic record as persisted by the kennel data store.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawGeneticRecord {
    #[serde(default)]
    pub dog_id: String,
    #[serde(default)]
    pub breed_composition: Option<BreedComposition>,
    #[serde(default)]
    pub trait_results: Option<TraitResults>,
    #[serde(default)]
    pub health_results: Option<BTreeMap<String, RawHealthMarker>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BreedComposition {
    #[serde(default)]
    pub primary_breed: Option<String>,
    /// Breed label -> percentage of ancestry.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub breeds: BTreeMap<String, f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TraitResults {
    #[serde(default)]
    pub color_genetics: Option<RawColorGenetics>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawColorGenetics {
    #[serde(default)]
    pub base_color: Option<String>,
    #[serde(default)]
    pub brown_dilution: Option<String>,
    #[serde(default)]
    pub dilution: Option<String>,
    #[serde(default)]
    pub agouti: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Labs report either a bare result string or a result object. Anything else
/// (null, numbers, arrays) is kept as-is and read as an unknown status.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum RawHealthMarker {
    Status(String),
    #[serde(rename_all = "camelCase")]
    Detailed {
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        test_date: Option<String>,
        #[serde(default, alias = "lab")]
        laboratory: Option<String>,
    },
    Other(Value),
}

impl RawHealthMarker {
    fn to_marker(&self, dog_id: &str, condition: &str) -> HealthMarker {
        match self {
            RawHealthMarker::Status(status) => HealthMarker::new(MarkerStatus::parse(status)),
            RawHealthMarker::Detailed {
                status,
                test_date,
                laboratory,
            } => HealthMarker {
                status: status
                    .as_deref()
                    .map(MarkerStatus::parse)
                    .unwrap_or(MarkerStatus::Unknown),
                test_date: test_date.clone(),
                laboratory: laboratory.clone(),
            },
            RawHealthMarker::Other(value) => {
                warn!(dog_id, condition, %value, "Unreadable health result, treating as unknown");
                HealthMarker::new(MarkerStatus::Unknown)
            }
        }
    }
}

fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// Normalize a stored record into a `DogGenotype`.
///
/// Returns `None` only when the record itself is absent. Partially populated records
/// never fail: scalar color loci default to `"Unknown"`, nested structures to empty maps.
pub fn extract(record: Option<&RawGeneticRecord>) -> Option<DogGenotype> {
    let record = record?;
    let mut genotype = DogGenotype::unknown(record.dog_id.clone());

    if let Some(composition) = &record.breed_composition {
        genotype.breed = primary_breed(composition);
    }

    if let Some(trait_results) = &record.trait_results {
        if let Some(color) = &trait_results.color_genetics {
            genotype.base_color = locus_or_unknown(color.base_color.as_deref());
            genotype.brown_dilution = locus_or_unknown(color.brown_dilution.as_deref());
            genotype.dilution = locus_or_unknown(color.dilution.as_deref());
            genotype.agouti = locus_or_unknown(color.agouti.as_deref());
            genotype.color_genetics = color.extra.clone();
        }
        genotype.traits = trait_results.other.clone();
    }

    if let Some(results) = &record.health_results {
        for (condition, raw) in results {
            let condition = condition.trim();
            if condition.is_empty() {
                warn!(dog_id = %record.dog_id, "Skipping health result with an empty condition name");
                continue;
            }
            genotype
                .health_markers
                .insert(condition.to_string(), raw.to_marker(&record.dog_id, condition));
        }
    }

    Some(genotype)
}

fn locus_or_unknown(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

fn primary_breed(composition: &BreedComposition) -> String {
    if let Some(primary) = composition.primary_breed.as_deref().map(str::trim) {
        if !primary.is_empty() {
            return primary.to_string();
        }
    }

    // Highest share wins; BTreeMap order breaks ties alphabetically.
    composition
        .breeds
        .iter()
        .fold(None::<(&String, f64)>, |best, (name, share)| match best {
            Some((_, best_share)) if best_share >= *share => best,
            _ => Some((name, *share)),
        })
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
