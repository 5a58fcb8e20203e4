pub mod analyze;
pub mod suggest;

use crate::export::AnalysisExport;
use anyhow::{Context, Result};
use std::path::Path;

pub(crate) fn emit(export: &AnalysisExport, output_file: Option<&Path>) -> Result<()> {
    match output_file {
        Some(path) => {
            export
                .write_to(path)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
            println!("Results written to {}", path.display());
        }
        None => println!("{}", export.to_json_pretty()?),
    }
    Ok(())
}
