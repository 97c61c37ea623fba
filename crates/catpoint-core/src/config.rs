//! Panel configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::image::FakeImageAnalyzer;
use crate::repository::FileSecurityRepository;
use crate::{CatpointError, Result, DEFAULT_STORE_PATH};

/// Main Catpoint configuration, stored as TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatpointConfig {
    /// Location of the JSON security store
    pub store_path: PathBuf,

    /// Default log filter when `RUST_LOG` is not set
    pub log_level: String,

    /// Demo image analyzer settings
    pub analyzer: AnalyzerSettings,
}

impl Default for CatpointConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            log_level: "info".to_string(),
            analyzer: AnalyzerSettings::default(),
        }
    }
}

impl CatpointConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    pub fn with_cat_probability(mut self, probability: f64) -> Self {
        self.analyzer.cat_probability = probability;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.analyzer.seed = Some(seed);
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.analyzer.cat_probability) {
            return Err(CatpointError::InvalidConfig(format!(
                "analyzer.cat_probability must be in [0.0, 1.0], got {}",
                self.analyzer.cat_probability
            )));
        }
        if self.store_path.as_os_str().is_empty() {
            return Err(CatpointError::InvalidConfig(
                "store_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Open the configured security store
    pub fn open_repository(&self) -> Result<FileSecurityRepository> {
        FileSecurityRepository::open(&self.store_path)
    }

    /// Build the configured image analyzer
    pub fn build_analyzer(&self) -> Result<FakeImageAnalyzer> {
        FakeImageAnalyzer::new(self.analyzer.cat_probability, self.analyzer.seed)
    }
}

/// Image analyzer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    /// Chance that a frame is reported as containing a cat
    pub cat_probability: f64,

    /// Seed for reproducible sessions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            cat_probability: 0.5,
            seed: None,
        }
    }
}
