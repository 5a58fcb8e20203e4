use crate::api::ApiResult;
use crate::genetics::{Parents, RawGeneticRecord};
use serde::{Deserialize, Serialize};

pub mod json_file;

pub use json_file::JsonKennelStore;

/// Display label for a dog, owned by the kennel records rather than the genetics data.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DogLabel {
    pub name: String,
    pub breed: String,
}

/// Source of raw genetic test records.
///
/// `Ok(None)` means the dog has no record; `Err` is an upstream failure and is
/// propagated as-is.
pub trait GeneticDataStore: Send + Sync {
    fn fetch_raw_genetic_record(&self, dog_id: &str) -> ApiResult<Option<RawGeneticRecord>>;
    fn fetch_dog_label(&self, dog_id: &str) -> ApiResult<Option<DogLabel>>;
}

/// Source of pedigree links and stored inbreeding coefficients.
pub trait PedigreeStore: Send + Sync {
    /// Most recent stored coefficient for the dog, as a fraction in [0, 1].
    fn fetch_precalculated_coi(&self, dog_id: &str) -> ApiResult<Option<f64>>;
    fn fetch_parents(&self, dog_id: &str) -> ApiResult<Option<Parents>>;
}
