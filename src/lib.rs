//! Monte Carlo simulation of light transport in multi-layered turbid media.
//!
//! Photon packets are launched into a stack of plane-parallel layers, moved in random steps,
//! partially absorbed at every interaction site, scattered following the Henyey-Greenstein
//! phase function, and reflected or refracted at the layer interfaces. The weight they leave
//! behind is scored into absorption, reflectance and transmittance grids.

pub mod config;
pub mod fresnel;
pub mod histogram;
pub mod layer;
pub mod output;
pub mod photon;
pub mod random;
pub mod slab;
pub mod vector;

// Re-exports
pub use config::{ConfigError, SimulationConfig};
pub use histogram::{GridSpec, Histogram, Results};
pub use layer::{Layer, LayerError, LayerSpec, LayerStack};
pub use photon::Photon;
pub use random::{McRng, ReplaySource, UniformSource};
pub use slab::{AbsorptionScoring, CrossingMode, LayeredSlab, SimulationParams};
