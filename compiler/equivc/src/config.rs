//! `equiv.toml` configuration.
//!
//! ```toml
//! [limits]
//! max-steps = 10000000
//! timeout-ms = 5000
//! max-depth = 1000
//!
//! [compare]
//! tolerance = 1e-9
//! failure-policy = "status-only"
//!
//! [capabilities]
//! extended = false
//! ```
//!
//! Every key is optional. Command-line flags override the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use equiv_eval::{CapabilitySet, Limits};
use equiv_validate::{CompareOptions, FailurePolicy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LimitsConfig {
    pub max_steps: u64,
    pub timeout_ms: u64,
    pub max_depth: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        let limits = Limits::default();
        LimitsConfig {
            max_steps: limits.max_steps,
            timeout_ms: u64::try_from(limits.timeout.as_millis()).unwrap_or(u64::MAX),
            max_depth: limits.max_depth,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapabilitiesConfig {
    /// Also enable `sorted`, `reversed`, `zip` and `round`.
    pub extended: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EquivConfig {
    pub limits: LimitsConfig,
    pub compare: CompareOptions,
    pub capabilities: CapabilitiesConfig,
}

impl EquivConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EquivConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let tolerance = self.compare.tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tolerance must be a finite, non-negative number, got {tolerance}"
            )));
        }
        if self.limits.max_steps == 0 {
            return Err(ConfigError::Invalid("max-steps must be positive".to_owned()));
        }
        if self.limits.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout-ms must be positive".to_owned()));
        }
        if self.limits.max_depth == 0 {
            return Err(ConfigError::Invalid("max-depth must be positive".to_owned()));
        }
        Ok(())
    }

    /// Apply command-line flags on top of the file settings.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(tolerance) = overrides.tolerance {
            self.compare.tolerance = tolerance;
        }
        if let Some(policy) = overrides.failure_policy {
            self.compare.failure_policy = policy;
        }
        if let Some(ms) = overrides.timeout_ms {
            self.limits.timeout_ms = ms;
        }
        if let Some(steps) = overrides.max_steps {
            self.limits.max_steps = steps;
        }
        if overrides.extended_builtins {
            self.capabilities.extended = true;
        }
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_steps: self.limits.max_steps,
            timeout: Duration::from_millis(self.limits.timeout_ms),
            max_depth: self.limits.max_depth,
        }
    }

    pub fn capability_set(&self) -> CapabilitySet {
        if self.capabilities.extended {
            CapabilitySet::extended()
        } else {
            CapabilitySet::standard()
        }
    }
}

/// Settings given on the command line. `None` leaves the file value alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overrides {
    pub tolerance: Option<f64>,
    pub failure_policy: Option<FailurePolicy>,
    pub timeout_ms: Option<u64>,
    pub max_steps: Option<u64>,
    pub extended_builtins: bool,
}

/// Resolved settings shared by every command of one process.
#[derive(Clone, Debug)]
pub struct Settings {
    pub capabilities: CapabilitySet,
    pub limits: Limits,
    pub options: CompareOptions,
}

impl Settings {
    /// Load `path` if given, apply `overrides` and validate the result.
    pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => EquivConfig::load(path)?,
            None => EquivConfig::default(),
        };
        config.apply(overrides);
        config.validate()?;
        Ok(Settings::from(&config))
    }
}

impl From<&EquivConfig> for Settings {
    fn from(config: &EquivConfig) -> Self {
        Settings {
            capabilities: config.capability_set(),
            limits: config.limits(),
            options: config.compare,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from(&EquivConfig::default())
    }
}

#[cfg(test)]
mod tests;
