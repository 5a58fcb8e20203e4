use crate::genetics::inbreeding::DEFAULT_GENERATIONS;
use crate::genetics::ranker::DEFAULT_LIMIT;
use crate::genetics::ScoringMode;
use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_pedigree_generations")]
    pub pedigree_generations: u32,
    #[serde(default = "default_ranker_limit")]
    pub ranker_limit: usize,
    #[serde(default = "default_ranker_workers")]
    pub ranker_workers: usize,
    #[serde(default)]
    pub scoring_mode: ScoringMode,
}

fn default_pedigree_generations() -> u32 {
    DEFAULT_GENERATIONS
}

fn default_ranker_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_ranker_workers() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pedigree_generations: default_pedigree_generations(),
            ranker_limit: default_ranker_limit(),
            ranker_workers: default_ranker_workers(),
            scoring_mode: ScoringMode::default(),
        }
    }
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "kennel", "kennel-genetics")
            .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
    }

    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Config::default(),
        }
    }

    /// Reads a config file, falling back to defaults when it is missing or unparsable.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Config::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring unparsable config");
                    Config::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read config");
                Config::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
