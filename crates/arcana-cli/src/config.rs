//! CLI configuration

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "arcana.yaml";

/// Data root used when neither the flag nor the config names one.
pub const DEFAULT_DATA_DIR: &str = "data";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CliConfig {
    /// Reference data root
    pub data_dir: Option<PathBuf>,

    /// Spread drawn when `--spread` is omitted
    pub default_spread: Option<String>,

    /// Output mode id used when `--mode` is omitted
    pub default_output_mode: Option<String>,

    /// Bias used when `--bias` is omitted
    pub interpretation_bias: Option<String>,

    pub allow_repeats: Option<bool>,

    /// Fixed seed for every draw
    pub seed: Option<u64>,
}

impl CliConfig {
    /// Load configuration from file.
    ///
    /// An explicit path must exist. Without one, `arcana.yaml` in the working
    /// directory is used if present, otherwise defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => {
                let path = Path::new(path);
                if !path.exists() {
                    bail!("Config file not found: {}", path.display());
                }
                Self::read(path)
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::read(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: CliConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// The data root, preferring the command-line value.
    pub fn data_dir(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }
}
