use crate::api::{AnalysisOptions, PairingAnalyzer};
use crate::config::Config;
use crate::export::{AnalysisExport, ExportMetadata};
use crate::genetics::Gender;
use crate::store::JsonKennelStore;
use crate::utils::progress_bar_builder::{progress_callback, ProgressBarBuilder};
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

pub fn run(
    config: &Config,
    data_file: PathBuf,
    dog: String,
    gender: Option<Gender>,
    limit: Option<usize>,
    output_file: Option<PathBuf>,
) -> Result<()> {
    let store = JsonKennelStore::from_path(&data_file)
        .with_context(|| format!("Failed to load kennel data from {}", data_file.display()))?;

    let gender = match gender {
        Some(gender) => gender,
        None => store
            .dog(&dog)
            .and_then(|d| d.gender)
            .ok_or_else(|| anyhow!("Gender of {} is unknown; pass --gender", dog))?,
    };
    let limit = limit.unwrap_or(config.ranker_limit);
    let options = AnalysisOptions::from(config);

    let progress = ProgressBarBuilder::new("Ranking candidates")
        .with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .with_length(0)
        .with_tick()
        .build()?;

    let analyzer = PairingAnalyzer::new(&store, &store)
        .with_options(options.clone())
        .with_progress(progress_callback(progress.clone()));
    let suggestions = analyzer
        .rank_partners(&dog, gender, &store.candidates(), limit)
        .with_context(|| format!("Failed to rank partners for {}", dog))?;
    progress.finish_and_clear();

    let metadata = ExportMetadata {
        source_file: Some(data_file.display().to_string()),
        scoring_mode: options.scoring_mode,
        pedigree_generations: options.pedigree_generations,
        tags: vec![],
    };
    let export = AnalysisExport::partner_suggestions(&dog, gender, limit, suggestions, metadata);
    super::emit(&export, output_file.as_deref())
}
