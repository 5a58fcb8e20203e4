use crate::api::ApiResult;
use crate::genetics::{Gender, PairingAnalysis, PartnerSuggestion, ScoringMode};
use chrono::{DateTime, Utc};
use serde::de::{Deserialize as DeserializeTrait, Deserializer, Error};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const RECORD_TYPE: &str = "com.kennel.genetics.analysis";
pub const EXPORT_VERSION: &str = "1.0";

/// Root structure for all exports
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisExport {
    #[serde(rename = "$type")]
    pub record_type: String,

    pub version: String,
    #[serde(serialize_with = "serialize_datetime", deserialize_with = "deserialize_datetime")]
    pub created_at: DateTime<Utc>,
    pub tool_version: String,

    #[serde(flatten)]
    pub data: AnalysisData,

    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AnalysisData {
    Pairing(PairingAnalysis),
    PartnerSuggestions(PartnerSuggestionsExport),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerSuggestionsExport {
    pub dog_id: String,
    pub gender: Gender,
    pub limit: usize,
    pub suggestions: Vec<PartnerSuggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub source_file: Option<String>,
    pub scoring_mode: ScoringMode,
    pub pedigree_generations: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

pub fn serialize_datetime<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.to_rfc3339())
}

pub fn deserialize_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(D::Error::custom)
}

impl AnalysisExport {
    pub fn new(data: AnalysisData, metadata: ExportMetadata) -> Self {
        Self {
            record_type: RECORD_TYPE.to_string(),
            version: EXPORT_VERSION.to_string(),
            created_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            data,
            metadata,
        }
    }

    pub fn pairing(analysis: PairingAnalysis, metadata: ExportMetadata) -> Self {
        Self::new(AnalysisData::Pairing(analysis), metadata)
    }

    pub fn partner_suggestions(
        dog_id: &str,
        gender: Gender,
        limit: usize,
        suggestions: Vec<PartnerSuggestion>,
        metadata: ExportMetadata,
    ) -> Self {
        Self::new(
            AnalysisData::PartnerSuggestions(PartnerSuggestionsExport {
                dog_id: dog_id.to_string(),
                gender,
                limit,
                suggestions,
            }),
            metadata,
        )
    }

    pub fn to_json_pretty(&self) -> ApiResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: &Path) -> ApiResult<()> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}
