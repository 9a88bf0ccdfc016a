//! Run configuration, read from and written to JSON.
//!
//! A configuration describes the layer stack, the scoring grid and the simulation knobs. It is
//! validated once by [`SimulationConfig::build`], after which the engine trusts it.

use crate::histogram::GridSpec;
use crate::layer::{LayerError, LayerSpec, LayerStack};
use crate::slab::{AbsorptionScoring, CrossingMode, LayeredSlab, SimulationParams, CHANCE, WEIGHT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {}: {}", .path.display(), .error)]
    Io { path: PathBuf, error: std::io::Error },

    #[error("failed to parse {}: {}", .path.display(), .error)]
    Parse { path: PathBuf, error: serde_json::Error },

    #[error("failed to serialize configuration: {0}")]
    Serialize(serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Layers(#[from] LayerError),
}

/// Scoring grid as given in the configuration. The angle separation follows from `na`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// z grid separation [cm]
    pub dz: f64,
    /// r grid separation [cm]
    pub dr: f64,
    pub nz: usize,
    pub nr: usize,
    pub na: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { dz: 0.01, dr: 0.01, nz: 40, nr: 50, na: 30 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub num_photons: u64,

    /// Refractive index of the medium above the stack
    #[serde(default = "default_ambient_index")]
    pub n_above: f64,

    pub layers: Vec<LayerSpec>,

    /// Refractive index of the medium below the stack
    #[serde(default = "default_ambient_index")]
    pub n_below: f64,

    #[serde(default)]
    pub grid: GridConfig,

    #[serde(default = "default_weight_threshold")]
    pub weight_threshold: f64,

    #[serde(default = "default_roulette_chance")]
    pub roulette_chance: f64,

    #[serde(default)]
    pub crossing: CrossingMode,

    #[serde(default)]
    pub absorption: AbsorptionScoring,

    /// Number of parallel jobs the photons are split over
    #[serde(default = "default_jobs")]
    pub jobs: u64,

    /// Base seed; taken from the clock when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn invalid(msg: String) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(msg))
}

fn default_ambient_index() -> f64 {
    1.0
}

fn default_weight_threshold() -> f64 {
    WEIGHT
}

fn default_roulette_chance() -> f64 {
    CHANCE
}

fn default_jobs() -> u64 {
    64
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_photons: 100_000,
            n_above: 1.0,
            layers: vec![LayerSpec { n: 1.37, mua: 1.0, mus: 100.0, g: 0.9, thickness: 0.1 }],
            n_below: 1.0,
            grid: GridConfig::default(),
            weight_threshold: WEIGHT,
            roulette_chance: CHANCE,
            crossing: CrossingMode::Stochastic,
            absorption: AbsorptionScoring::Recorded,
            jobs: default_jobs(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        serde_json::from_str(&contents).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        fs::write(path, contents).map_err(|error| ConfigError::Io {
            path: path.to_path_buf(),
            error,
        })
    }

    pub fn grid_spec(&self) -> GridSpec {
        GridSpec::new(self.grid.dz, self.grid.dr, self.grid.nz, self.grid.nr, self.grid.na)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.num_photons == 0 {
            return invalid("num_photons must be positive".to_string());
        }
        if self.jobs == 0 {
            return invalid("jobs must be positive".to_string());
        }
        let GridConfig { dz, dr, nz, nr, na } = self.grid;
        if !(dz.is_finite() && dz > 0.0 && dr.is_finite() && dr > 0.0) {
            return invalid(format!("grid separations must be positive, got dz = {}, dr = {}", dz, dr));
        }
        if nz == 0 || nr == 0 || na == 0 {
            return invalid(format!("grid sizes must be positive, got nz = {}, nr = {}, na = {}", nz, nr, na));
        }
        // a zero threshold never kills a packet whose weight was split away at the surface
        if !(self.weight_threshold > 0.0 && self.weight_threshold < 1.0) {
            return invalid(format!("weight_threshold must lie in (0, 1), got {}", self.weight_threshold));
        }
        if !(self.roulette_chance > 0.0 && self.roulette_chance <= 1.0) {
            return invalid(format!("roulette_chance must lie in (0, 1], got {}", self.roulette_chance));
        }
        Ok(())
    }

    /// Validate the configuration and build the medium to trace photons through.
    pub fn build(&self) -> Result<LayeredSlab, ConfigError> {
        self.validate()?;
        let layers = LayerStack::new(self.n_above, &self.layers, self.n_below)?;
        let params = SimulationParams {
            weight_threshold: self.weight_threshold,
            roulette_chance: self.roulette_chance,
            grid: self.grid_spec(),
            crossing: self.crossing,
            absorption: self.absorption,
        };
        Ok(LayeredSlab::new(layers, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_takes_defaults() {
        let config: SimulationConfig = serde_json::from_str(
            r#"{
                "num_photons": 1000,
                "layers": [{ "n": 1.4, "mua": 1.0, "mus": 10.0, "g": 0.9, "thickness": 0.2 }]
            }"#,
        ).unwrap();
        assert_eq!(config.n_above, 1.0);
        assert_eq!(config.weight_threshold, 1e-4);
        assert_eq!(config.roulette_chance, 0.1);
        assert_eq!(config.crossing, CrossingMode::Stochastic);
        assert_eq!(config.absorption, AbsorptionScoring::Recorded);
        assert_eq!(config.seed, None);
        assert!(config.build().is_ok());
    }

    #[test]
    fn modes_parse_from_snake_case() {
        let config: SimulationConfig = serde_json::from_str(
            r#"{
                "num_photons": 10,
                "layers": [{ "n": 1.4, "mua": 1.0, "mus": 10.0, "g": 0.9, "thickness": 0.2 }],
                "crossing": "partial_reflection",
                "absorption": "discarded",
                "seed": 42
            }"#,
        ).unwrap();
        assert_eq!(config.crossing, CrossingMode::PartialReflection);
        assert_eq!(config.absorption, AbsorptionScoring::Discarded);
        let slab = config.build().unwrap();
        assert_eq!(slab.params().crossing, CrossingMode::PartialReflection);
    }

    #[test]
    fn angle_bins_span_a_right_angle() {
        let config = SimulationConfig::default();
        let grid = config.grid_spec();
        assert!((grid.da * grid.na as f64 - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_parameters() {
        let mut config = SimulationConfig::default();
        config.roulette_chance = 0.0;
        assert!(matches!(config.build(), Err(ConfigError::Invalid(_))));

        let mut config = SimulationConfig::default();
        config.grid.na = 0;
        assert!(matches!(config.build(), Err(ConfigError::Invalid(_))));

        let mut config = SimulationConfig::default();
        config.layers.clear();
        assert!(matches!(config.build(), Err(ConfigError::Layers(LayerError::Empty))));
    }

    #[test]
    fn rejects_zero_weight_threshold() {
        let config = SimulationConfig {
            weight_threshold: 0.0,
            crossing: CrossingMode::PartialReflection,
            layers: vec![LayerSpec { n: 1.0, mua: 1.0, mus: 10.0, g: 0.0, thickness: 0.1 }],
            ..SimulationConfig::default()
        };
        assert!(matches!(config.build(), Err(ConfigError::Invalid(_))));

        let config = SimulationConfig { weight_threshold: 1.0, ..SimulationConfig::default() };
        assert!(matches!(config.build(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn file_round_trip() {
        let path = std::env::temp_dir().join("layered_mcrt_config_test.json");
        let config = SimulationConfig { seed: Some(9), ..SimulationConfig::default() };
        config.to_file(&path).unwrap();
        let loaded = SimulationConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = SimulationConfig::from_file("/nonexistent/layered_mcrt.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
