use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::network::LayerSizes;
use crate::propagate::Propagation;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Training run settings, loaded from JSON. Missing keys take the defaults.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Fixed seed for a reproducible run; `None` draws one from the OS.
    pub seed: Option<u64>,
    pub population_size: usize,
    pub generations: usize,
    pub retain_top: usize,
    pub mutations_per_child: usize,
    /// Number of synthetic decision cases each network is scored on
    pub case_count: usize,
    pub layer_sizes: LayerSizes,
    pub propagation: Propagation,
    pub log_file: Option<PathBuf>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            population_size: 200,
            generations: 100,
            retain_top: 20,
            mutations_per_child: 1,
            case_count: 64,
            layer_sizes: LayerSizes::default(),
            propagation: Propagation::Vectorized,
            log_file: None,
        }
    }
}

impl EvolutionConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::Invalid("population_size must be positive".into()));
        }
        if self.retain_top == 0 || self.retain_top > self.population_size {
            return Err(ConfigError::Invalid(format!(
                "retain_top {} must be within 1..={}",
                self.retain_top, self.population_size
            )));
        }
        if self.generations == 0 {
            return Err(ConfigError::Invalid("generations must be positive".into()));
        }
        if self.case_count == 0 {
            return Err(ConfigError::Invalid("case_count must be positive".into()));
        }
        self.layer_sizes
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
