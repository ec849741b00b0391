//! Configuration loading and typed config structures for the forest transform.
//!
//! A simulation is described by a small YAML document. The transform
//! itself only needs the time-step count, so callers derive an explicit
//! [`ForestConfig`] from the loaded [`SimulationConfig`] and pass it in.
//! There is no global registry of named simulations.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but is not usable.
    #[error("invalid simulation configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Simulation metadata needed to lay out core forest matrices.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Simulation step number of each output snapshot, in snapnum order.
    ///
    /// Its length is the number of matrix columns.
    pub cosmotools_steps: Vec<u32>,

    /// Field selection for the forest transform.
    #[serde(default)]
    pub forest: ForestSection,
}

/// The optional `forest:` section of a [`SimulationConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ForestSection {
    /// Fields to load. Absent means every field in the record stream.
    #[serde(default)]
    pub include_fields: Option<Vec<String>>,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the step list is non-empty and strictly increasing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cosmotools_steps.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "cosmotools_steps must list at least one step".to_owned(),
            });
        }
        if let Some(pair) = self.cosmotools_steps.windows(2).find(|w| w.first() >= w.last()) {
            return Err(ConfigError::Invalid {
                reason: format!("cosmotools_steps must be strictly increasing, found {pair:?}"),
            });
        }
        Ok(())
    }

    /// Number of time-step columns.
    pub fn num_steps(&self) -> usize {
        self.cosmotools_steps.len()
    }

    /// Simulation step number of a snapnum column.
    pub fn step_number(&self, snapnum: usize) -> Option<u32> {
        self.cosmotools_steps.get(snapnum).copied()
    }
}

/// Explicit parameters of one forest transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForestConfig {
    /// Number of time-step columns in every output matrix.
    pub steps: usize,
    /// Fields to carry into the output. `None` selects every field.
    pub include_fields: Option<Vec<String>>,
}

impl ForestConfig {
    /// Transform parameters for `steps` columns, keeping every field.
    pub const fn new(steps: usize) -> Self {
        Self {
            steps,
            include_fields: None,
        }
    }

    /// Restrict the output to `fields` (essential fields are always added).
    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Derive transform parameters from simulation metadata.
    pub fn from_simulation(config: &SimulationConfig) -> Self {
        Self {
            steps: config.num_steps(),
            include_fields: config.forest.include_fields.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_name() -> String {
    "unnamed".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
name: "LastJourney"
cosmotools_steps: [42, 43, 44, 45, 46]
forest:
  include_fields:
    - infall_tree_node_mass
    - radius
"#;
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.name, "LastJourney");
        assert_eq!(config.num_steps(), 5);
        assert_eq!(config.step_number(2), Some(44));
        assert_eq!(config.step_number(5), None);

        let forest = ForestConfig::from_simulation(&config);
        assert_eq!(forest.steps, 5);
        assert_eq!(
            forest.include_fields,
            Some(vec!["infall_tree_node_mass".to_owned(), "radius".to_owned()])
        );
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("cosmotools_steps: [1, 2]\n").unwrap();
        assert_eq!(config.name, "unnamed");
        assert_eq!(config.forest, ForestSection::default());
        assert_eq!(ForestConfig::from_simulation(&config), ForestConfig::new(2));
    }

    #[test]
    fn missing_steps_is_a_yaml_error() {
        let result = SimulationConfig::parse("name: x\n");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn empty_steps_rejected() {
        let result = SimulationConfig::parse("cosmotools_steps: []\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn non_increasing_steps_rejected() {
        let result = SimulationConfig::parse("cosmotools_steps: [1, 3, 3]\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = SimulationConfig::from_file(Path::new("/nonexistent/coretree.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn with_fields_sets_selection() {
        let config = ForestConfig::new(3).with_fields(["mass"]);
        assert_eq!(config.include_fields, Some(vec!["mass".to_owned()]));
    }
}
