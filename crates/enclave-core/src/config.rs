//! Configuration loading and typed config structures for the Enclave simulation.
//!
//! The canonical configuration lives in `enclave-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads the file and applies
//! environment overrides.

use std::path::{Path, PathBuf};

use enclave_world::NeighborRule;
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

    /// An environment override could not be parsed.
    #[error("invalid value for {variable}: {value}")]
    InvalidOverride {
        /// The environment variable name.
        variable: &'static str,
        /// The rejected value.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `enclave-config.yaml`. Every field has a default,
/// so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Parcel layer and seed settings.
    #[serde(default)]
    pub world: WorldConfig,

    /// Model parameters.
    #[serde(default)]
    pub model: ModelConfig,

    /// Run boundaries imposed by the driver.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging and sink configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `ENCLAVE_SEED` overrides `world.seed`
    /// - `ENCLAVE_GEOMETRY` overrides `world.geometry_path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] for an unparsable override.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.world.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// Environment overrides are not applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Parcel layer and seed configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable run name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for the initializer and every activation shuffle.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// GeoJSON parcel layer. When unset, a synthetic lattice is used.
    #[serde(default)]
    pub geometry_path: Option<PathBuf>,

    /// Feature property holding the external parcel id.
    #[serde(default)]
    pub id_property: Option<String>,

    /// Neighbor predicate used to build adjacency.
    #[serde(default)]
    pub neighbor_rule: NeighborRule,

    /// Fallback lattice layout.
    #[serde(default)]
    pub lattice: LatticeConfig,
}

impl WorldConfig {
    /// Override the seed and geometry path with environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if `ENCLAVE_SEED` is not an
    /// unsigned integer.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("ENCLAVE_SEED") {
            self.seed = val
                .trim()
                .parse()
                .map_err(|_err| ConfigError::InvalidOverride {
                    variable: "ENCLAVE_SEED",
                    value: val.clone(),
                })?;
        }
        if let Ok(val) = std::env::var("ENCLAVE_GEOMETRY") {
            self.geometry_path = Some(PathBuf::from(val));
        }
        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            geometry_path: None,
            id_property: None,
            neighbor_rule: NeighborRule::default(),
            lattice: LatticeConfig::default(),
        }
    }
}

/// Synthetic lattice dimensions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LatticeConfig {
    /// Number of rows.
    #[serde(default = "default_lattice_side")]
    pub rows: u32,

    /// Number of columns.
    #[serde(default = "default_lattice_side")]
    pub cols: u32,

    /// Side length of each square parcel.
    #[serde(default = "default_cell_size")]
    pub cell_size: f64,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            rows: default_lattice_side(),
            cols: default_lattice_side(),
            cell_size: default_cell_size(),
        }
    }
}

/// Schelling model parameters.
///
/// Both values are probabilities and are validated when the model is built,
/// not here.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ModelConfig {
    /// Probability that a parcel starts occupied.
    #[serde(default = "default_density")]
    pub density: f64,

    /// Probability that an occupied parcel starts in the minority group.
    #[serde(default = "default_minority_fraction")]
    pub minority_fraction: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            density: default_density(),
            minority_fraction: default_minority_fraction(),
        }
    }
}

/// Simulation boundary configuration.
///
/// The model itself halts only on convergence; `max_steps` is the driver's
/// safety net. A value of 0 means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Maximum number of steps before the driver stops (0 = unlimited).
    #[serde(default)]
    pub max_steps: u64,
}

/// Logging and sink configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Where to append one JSON step snapshot per line.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    /// Where to write the per-parcel views when the run ends.
    #[serde(default)]
    pub final_state_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            snapshot_path: None,
            final_state_path: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Enclave".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_lattice_side() -> u32 {
    20
}

const fn default_cell_size() -> f64 {
    1.0
}

const fn default_density() -> f64 {
    0.6
}

const fn default_minority_fraction() -> f64 {
    0.2
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_slider_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.model.density, 0.6);
        assert_eq!(config.model.minority_fraction, 0.2);
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.simulation.max_steps, 0);
        assert!(config.world.geometry_path.is_none());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Downtown blocks"
  seed: 7
  geometry_path: "data/sample-blocks.geojson"
  id_property: "BLOCK_ID"
  neighbor_rule:
    kind: centroid_distance
    max_distance: 0.002
  lattice:
    rows: 5
    cols: 8
    cell_size: 2.0

model:
  density: 0.8
  minority_fraction: 0.35

simulation:
  max_steps: 500

logging:
  level: "debug"
  snapshot_path: "out/steps.jsonl"
  final_state_path: "out/final.json"
"#;
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.name, "Downtown blocks");
        assert_eq!(config.world.seed, 7);
        assert_eq!(
            config.world.geometry_path,
            Some(PathBuf::from("data/sample-blocks.geojson"))
        );
        assert_eq!(config.world.id_property.as_deref(), Some("BLOCK_ID"));
        assert_eq!(
            config.world.neighbor_rule,
            NeighborRule::CentroidDistance { max_distance: 0.002 }
        );
        assert_eq!(config.world.lattice.rows, 5);
        assert_eq!(config.world.lattice.cols, 8);
        assert_eq!(config.model.density, 0.8);
        assert_eq!(config.model.minority_fraction, 0.35);
        assert_eq!(config.simulation.max_steps, 500);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.snapshot_path,
            Some(PathBuf::from("out/steps.jsonl"))
        );
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("model:\n  density: 0.9\n").unwrap();
        assert_eq!(config.model.density, 0.9);
        // Everything else uses defaults
        assert_eq!(config.model.minority_fraction, 0.2);
        assert_eq!(config.world.lattice.rows, 20);
        assert_eq!(config.world.neighbor_rule, NeighborRule::default());
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SimulationConfig::parse("").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn out_of_range_parameters_still_parse() {
        // Range checks belong to model construction.
        let config = SimulationConfig::parse("model:\n  minority_fraction: 1.5\n").unwrap();
        assert_eq!(config.model.minority_fraction, 1.5);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = SimulationConfig::parse("model: [density");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("enclave-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
