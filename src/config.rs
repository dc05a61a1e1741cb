//! Planner configuration, read once at construction.
//!
//! Mirrors the way the wider corpus loads its node/simulator configuration:
//! a plain `serde`-derived struct with a `Default` impl carrying the spec's
//! defaults, loadable from a TOML document via the `toml` crate.

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};

/// Recognised construction-time options (spec §6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Side length of the square grid in metres.
    pub map_size: f64,
    /// Metres per cell.
    pub resolution: f64,
    /// Dilation diameter in metres.
    pub robot_diameter: f64,
    /// MaxDegree: the maximum neighbour count per vertex.
    pub density: usize,
    /// MaxEdgeLen in metres.
    pub max_edge_len: f64,
    /// MaxSamples per build.
    pub max_samples: usize,
    /// Outer build retries when `build` returns an empty path.
    pub max_retries: usize,
    /// DispersionRadius for sample rejection. `None` resolves to
    /// `4 * resolution` at the point of use (see SPEC_FULL.md §9.1).
    pub dispersion_radius: Option<f64>,
    /// Optional fixed seed for the sampler's RNG stream, so tests can
    /// substitute a deterministic sample sequence.
    pub sample_seed: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            map_size: 20.0,
            resolution: 0.1,
            robot_diameter: 0.2,
            density: 5,
            max_edge_len: 2.5,
            max_samples: 1000,
            max_retries: 3,
            dispersion_radius: None,
            sample_seed: None,
        }
    }
}

impl PlannerConfig {
    /// Parse a configuration document; unset fields fall back to the spec's
    /// defaults.
    pub fn from_toml_str(doc: &str) -> PlannerResult<Self> {
        toml::from_str(doc).map_err(|e| PlannerError::Config(e.to_string()))
    }

    /// The dispersion radius actually used by the sampler.
    pub fn dispersion_radius(&self) -> f64 {
        self.dispersion_radius.unwrap_or(4.0 * self.resolution)
    }

    pub fn validate(&self) -> PlannerResult<()> {
        if self.map_size <= 0.0 || self.resolution <= 0.0 {
            return Err(PlannerError::Config(
                "map_size and resolution must be positive".into(),
            ));
        }
        if self.density == 0 {
            return Err(PlannerError::Config("density must be at least 1".into()));
        }
        if self.max_edge_len <= 0.0 {
            return Err(PlannerError::Config("max_edge_len must be positive".into()));
        }
        Ok(())
    }
}
