use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;

/// Settings for one document normalization run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizeConfig {
    /// Name of the query parameter that carries the version stamp.
    #[serde(default = "default_version_param")]
    pub version_param: String,
}

impl NormalizeConfig {
    pub fn validate(&self) -> Result<(), NormalizeError> {
        if self.version_param.is_empty() {
            return Err(NormalizeError::InvalidConfig(
                "version_param must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            version_param: default_version_param(),
        }
    }
}

/// Settings for the batch driver that walks a root of site directories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchConfig {
    /// Root directory whose immediate subdirectories are the sites.
    #[serde(default = "default_sites_dir")]
    pub sites_dir: PathBuf,
    /// Document file expected inside each site directory.
    #[serde(default = "default_index_file")]
    pub index_file: String,
    #[serde(default)]
    pub normalize: NormalizeConfig,
}

impl BatchConfig {
    /// Builds a config from defaults plus environment overrides.
    ///
    /// `VSTAMP_SITES_DIR` and `VSTAMP_INDEX_FILE` override the corresponding
    /// fields when set and non-empty.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(dir) = std::env::var("VSTAMP_SITES_DIR") {
            if !dir.is_empty() {
                cfg.sites_dir = PathBuf::from(dir);
            }
        }
        if let Ok(file) = std::env::var("VSTAMP_INDEX_FILE") {
            if !file.is_empty() {
                cfg.index_file = file;
            }
        }
        cfg
    }

    pub fn validate(&self) -> Result<(), NormalizeError> {
        if self.index_file.is_empty() {
            return Err(NormalizeError::InvalidConfig(
                "index_file must be non-empty".to_string(),
            ));
        }
        self.normalize.validate()
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            sites_dir: default_sites_dir(),
            index_file: default_index_file(),
            normalize: NormalizeConfig::default(),
        }
    }
}

fn default_version_param() -> String {
    "v".to_string()
}

fn default_sites_dir() -> PathBuf {
    PathBuf::from("./servers")
}

fn default_index_file() -> String {
    "index.html".to_string()
}
