//! Analysis configuration, loadable from TOML.
//!
//! ```toml
//! top_n = 5
//! rank_by = "severity"        # severity | duration | operations
//! exclude_cash_flows = false
//!
//! [run_policy]
//! flat = "close"              # close | pause
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ranking::RankBy;
use crate::runs::RunPolicy;

pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("top_n must be at least 1")]
    ZeroTopN,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Length of the ranked run lists in a report.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub rank_by: RankBy,
    /// Drop deposit/withdrawal rows before the engine sees them.
    #[serde(default)]
    pub exclude_cash_flows: bool,
    #[serde(default)]
    pub run_policy: RunPolicy,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            rank_by: RankBy::default(),
            exclude_cash_flows: false,
            run_policy: RunPolicy::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::ZeroTopN);
        }
        Ok(())
    }
}
