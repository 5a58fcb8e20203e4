use crate::api::{AnalysisOptions, PairingAnalyzer};
use crate::config::Config;
use crate::export::{AnalysisExport, ExportMetadata};
use crate::genetics::ScoringMode;
use crate::store::JsonKennelStore;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

pub fn run(
    config: &Config,
    data_file: PathBuf,
    sire: String,
    dam: String,
    output_file: Option<PathBuf>,
    scoring_mode: Option<ScoringMode>,
    generations: Option<u32>,
) -> Result<()> {
    let store = JsonKennelStore::from_path(&data_file)
        .with_context(|| format!("Failed to load kennel data from {}", data_file.display()))?;

    let mut options = AnalysisOptions::from(config);
    if let Some(mode) = scoring_mode {
        options.scoring_mode = mode;
    }
    if let Some(generations) = generations {
        options.pedigree_generations = generations;
    }

    info!(sire = %sire, dam = %dam, "Analyzing pairing");
    let analyzer = PairingAnalyzer::new(&store, &store).with_options(options.clone());
    let analysis = analyzer
        .analyze(&sire, &dam)
        .with_context(|| format!("Failed to analyze pairing {} x {}", sire, dam))?;

    let metadata = ExportMetadata {
        source_file: Some(data_file.display().to_string()),
        scoring_mode: options.scoring_mode,
        pedigree_generations: options.pedigree_generations,
        tags: vec![],
    };
    super::emit(&AnalysisExport::pairing(analysis, metadata), output_file.as_deref())
}
