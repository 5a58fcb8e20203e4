use crate::genetics::{Gender, ScoringMode};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze the genetic compatibility of a sire/dam pairing
    Analyze {
        /// Kennel data file (JSON)
        data_file: PathBuf,
        /// Id of the prospective sire
        #[arg(long)]
        sire: String,
        /// Id of the prospective dam
        #[arg(long)]
        dam: String,
        /// Write the JSON export here instead of stdout
        #[arg(short = 'o', long = "output")]
        output_file: Option<PathBuf>,
        /// Override the configured scoring mode
        #[arg(long, value_enum)]
        scoring_mode: Option<ScoringMode>,
        /// Override the configured pedigree depth for COI (default: 6, max: 12)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        generations: Option<u32>,
    },

    /// Suggest the most compatible breeding partners for a dog
    Suggest {
        /// Kennel data file (JSON)
        data_file: PathBuf,
        /// Id of the dog to find partners for
        #[arg(long)]
        dog: String,
        /// Gender of the dog; read from the kennel file when omitted
        #[arg(long, value_enum)]
        gender: Option<Gender>,
        /// Maximum number of suggestions (default: 5)
        #[arg(long)]
        limit: Option<usize>,
        /// Write the JSON export here instead of stdout
        #[arg(short = 'o', long = "output")]
        output_file: Option<PathBuf>,
    },
}
