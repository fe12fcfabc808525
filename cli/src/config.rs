use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

use nutrismart_core::recommend::{BuiltinRecommendations, RecommendationSource, RecommendationTable};

pub struct Config {
    pub db_path: PathBuf,
    pub recommendations_path: Option<PathBuf>,
}

impl Config {
    /// Resolve paths. `db_override` and `recommendations` come from the
    /// command line or environment and win over the platform defaults.
    pub fn load(db_override: Option<PathBuf>, recommendations: Option<PathBuf>) -> Result<Self> {
        let proj_dirs = ProjectDirs::from("", "", "nutrismart")
            .context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = db_override.unwrap_or_else(|| data_dir.join("nutrismart.db"));
        log::debug!("Using database {}", db_path.display());

        Ok(Config {
            db_path,
            recommendations_path: recommendations,
        })
    }

    /// The configured recommendation table, or the builtin one.
    pub fn recommendation_source(&self) -> Result<Box<dyn RecommendationSource>> {
        match &self.recommendations_path {
            Some(path) => {
                let table = RecommendationTable::from_path(path).with_context(|| {
                    format!("Failed to load recommendations from {}", path.display())
                })?;
                log::debug!("Recommendation lists loaded for {:?}", table.diets());
                Ok(Box::new(table))
            }
            None => Ok(Box::new(BuiltinRecommendations)),
        }
    }
}
