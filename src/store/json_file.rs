use super::{DogLabel, GeneticDataStore, PedigreeStore};
use crate::api::{ApiError, ApiResult};
use crate::export::{deserialize_datetime, serialize_datetime};
use crate::genetics::{CandidateDog, Gender, Parents, RawGeneticRecord, UNKNOWN};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// On-disk kennel export: dogs with their pedigree links and genetic records,
/// plus the history of stored inbreeding calculations.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct KennelData {
    #[serde(default)]
    pub dogs: Vec<KennelDog>,
    #[serde(default)]
    pub coi_calculations: Vec<CoiCalculation>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct KennelDog {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub sire_id: Option<String>,
    #[serde(default)]
    pub dam_id: Option<String>,
    #[serde(default)]
    pub genetics: Option<RawGeneticRecord>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CoiCalculation {
    pub dog_id: String,
    pub coefficient: f64,
    #[serde(serialize_with = "serialize_datetime", deserialize_with = "deserialize_datetime")]
    pub calculated_at: DateTime<Utc>,
}

pub struct JsonKennelStore {
    dogs: Vec<KennelDog>,
    index: HashMap<String, usize>,
    coi: HashMap<String, Vec<CoiCalculation>>,
}

impl JsonKennelStore {
    pub fn from_data(data: KennelData) -> ApiResult<Self> {
        let mut index = HashMap::with_capacity(data.dogs.len());
        for (idx, dog) in data.dogs.iter().enumerate() {
            if dog.id.trim().is_empty() {
                return Err(ApiError::InvalidInput(format!(
                    "Dog at position {} has an empty id",
                    idx
                )));
            }
            if index.insert(dog.id.clone(), idx).is_some() {
                return Err(ApiError::InvalidInput(format!("Duplicate dog id: {}", dog.id)));
            }
        }

        let mut coi: HashMap<String, Vec<CoiCalculation>> = HashMap::new();
        for calculation in data.coi_calculations {
            coi.entry(calculation.dog_id.clone())
                .or_default()
                .push(calculation);
        }

        Ok(Self {
            dogs: data.dogs,
            index,
            coi,
        })
    }

    pub fn from_json(json: &str) -> ApiResult<Self> {
        let data: KennelData = serde_json::from_str(json)?;
        Self::from_data(data)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ApiResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ApiError::Store(format!("Failed to read kennel data {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    pub fn dog(&self, dog_id: &str) -> Option<&KennelDog> {
        self.index.get(dog_id).map(|&idx| &self.dogs[idx])
    }

    /// Every dog in file order as a ranking candidate.
    pub fn candidates(&self) -> Vec<CandidateDog> {
        self.dogs
            .iter()
            .map(|dog| CandidateDog {
                dog_id: dog.id.clone(),
                gender: dog.gender,
                photo_url: dog.photo_url.clone(),
            })
            .collect()
    }
}

impl GeneticDataStore for JsonKennelStore {
    fn fetch_raw_genetic_record(&self, dog_id: &str) -> ApiResult<Option<RawGeneticRecord>> {
        Ok(self.dog(dog_id).and_then(|dog| {
            dog.genetics.clone().map(|mut record| {
                if record.dog_id.is_empty() {
                    record.dog_id = dog.id.clone();
                }
                record
            })
        }))
    }

    fn fetch_dog_label(&self, dog_id: &str) -> ApiResult<Option<DogLabel>> {
        Ok(self.dog(dog_id).map(|dog| DogLabel {
            name: dog.name.clone(),
            breed: dog.breed.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        }))
    }
}

impl PedigreeStore for JsonKennelStore {
    fn fetch_precalculated_coi(&self, dog_id: &str) -> ApiResult<Option<f64>> {
        Ok(self
            .coi
            .get(dog_id)
            .and_then(|calculations| calculations.iter().max_by_key(|c| c.calculated_at))
            .map(|c| c.coefficient))
    }

    fn fetch_parents(&self, dog_id: &str) -> ApiResult<Option<Parents>> {
        Ok(self.dog(dog_id).map(|dog| Parents {
            sire: dog.sire_id.clone(),
            dam: dog.dam_id.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KENNEL: &str = r#"{
        "dogs": [
            { "id": "rex", "name": "Rex", "breed": "Labrador Retriever", "gender": "male",
              "sireId": "max", "damId": "bella",
              "genetics": { "healthResults": { "PRA": "clear" } } },
            { "id": "luna", "name": "Luna", "gender": "female", "photoUrl": "https://example.com/luna.jpg" }
        ],
        "coiCalculations": [
            { "dogId": "rex", "coefficient": 0.08, "calculatedAt": "2023-05-01T00:00:00Z" },
            { "dogId": "rex", "coefficient": 0.04, "calculatedAt": "2024-05-01T00:00:00Z" }
        ]
    }"#;

    #[test]
    fn test_lookups() {
        let store = JsonKennelStore::from_json(KENNEL).unwrap();

        let record = store.fetch_raw_genetic_record("rex").unwrap().unwrap();
        assert_eq!(record.dog_id, "rex");
        assert!(store.fetch_raw_genetic_record("luna").unwrap().is_none());
        assert!(store.fetch_raw_genetic_record("nobody").unwrap().is_none());

        let label = store.fetch_dog_label("luna").unwrap().unwrap();
        assert_eq!(label.name, "Luna");
        assert_eq!(label.breed, UNKNOWN);

        assert_eq!(
            store.fetch_parents("rex").unwrap(),
            Some(Parents::new(Some("max"), Some("bella")))
        );
        assert_eq!(store.fetch_parents("max").unwrap(), None);
    }

    #[test]
    fn test_most_recent_coi_wins() {
        let store = JsonKennelStore::from_json(KENNEL).unwrap();
        assert_eq!(store.fetch_precalculated_coi("rex").unwrap(), Some(0.04));
        assert_eq!(store.fetch_precalculated_coi("luna").unwrap(), None);
    }

    #[test]
    fn test_candidates_keep_file_order() {
        let store = JsonKennelStore::from_json(KENNEL).unwrap();
        let candidates = store.candidates();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].dog_id, "luna");
        assert_eq!(candidates[1].gender, Some(Gender::Female));
        assert_eq!(
            candidates[1].photo_url.as_deref(),
            Some("https://example.com/luna.jpg")
        );
    }

    #[test]
    fn test_partial_health_results_still_load() {
        let json = r#"{ "dogs": [
            { "id": "a", "name": "A", "genetics": { "healthResults": { "PRA": "carrier", "DM": null } } },
            { "id": "b", "name": "B", "genetics": { "healthResults": { "DM": 3 } } }
        ] }"#;
        let store = JsonKennelStore::from_json(json).unwrap();

        let record = store.fetch_raw_genetic_record("a").unwrap().unwrap();
        let genotype = crate::genetics::extract(Some(&record)).unwrap();
        assert_eq!(genotype.marker_status("DM"), Some(crate::genetics::MarkerStatus::Unknown));
        assert!(store.fetch_raw_genetic_record("b").unwrap().is_some());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{ "dogs": [ { "id": "a", "name": "A" }, { "id": "a", "name": "B" } ] }"#;
        assert!(matches!(
            JsonKennelStore::from_json(json),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(KENNEL.as_bytes()).unwrap();

        let store = JsonKennelStore::from_path(file.path()).unwrap();
        assert!(store.dog("rex").is_some());

        let missing = JsonKennelStore::from_path(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ApiError::Store(_))));
    }
}
