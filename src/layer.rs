//! Geometry and optical properties of the layered medium.
//!
//! A stack of `N` layers is stored as `N + 2` entries: index 0 is the ambient
//! medium above the stack, index `N + 1` the ambient medium below it. Lengths
//! are in cm, coefficients in 1/cm.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LayerError {
    #[error("a layer stack needs at least one layer")]
    Empty,

    #[error("layer {layer}: refractive index must be positive and finite, got {n}")]
    RefractiveIndex { layer: usize, n: f64 },

    #[error("layer {layer}: {name} must be finite and non-negative, got {value}")]
    Coefficient { layer: usize, name: &'static str, value: f64 },

    #[error("layer {layer}: anisotropy must lie in [-1, 1], got {g}")]
    Anisotropy { layer: usize, g: f64 },

    #[error("layer {layer}: thickness must be positive and finite, got {thickness}")]
    Thickness { layer: usize, thickness: f64 },

    #[error("a stack consisting of a single glass layer has no medium to launch into")]
    OnlyGlass,
}

/// One slab as it appears in a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub n: f64,
    pub mua: f64,
    pub mus: f64,
    pub g: f64,
    pub thickness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    pub n: f64,
    pub mua: f64,
    pub mus: f64,
    pub g: f64,
    /// Upper boundary.
    pub z0: f64,
    /// Lower boundary.
    pub z1: f64,
    /// Cosine of the critical angle at the upper boundary, zero when no total internal
    /// reflection can happen there.
    pub cos_crit0: f64,
    /// Same for the lower boundary.
    pub cos_crit1: f64,
}

impl Layer {
    fn ambient(n: f64, z: f64) -> Layer {
        Layer { n, mua: 0.0, mus: 0.0, g: 0.0, z0: z, z1: z, cos_crit0: 0.0, cos_crit1: 0.0 }
    }

    /// Glass neither absorbs nor scatters.
    pub fn is_glass(&self) -> bool {
        self.mua == 0.0 && self.mus == 0.0
    }

    /// Total interaction coefficient.
    pub fn mu_t(&self) -> f64 {
        self.mua + self.mus
    }
}

/// Critical angle cosine going from a medium of index `n` into one of index `n_neighbor`.
fn critical_cosine(n: f64, n_neighbor: f64) -> f64 {
    if n > n_neighbor {
        f64::sqrt(1.0 - n_neighbor * n_neighbor / (n * n))
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new(n_above: f64, specs: &[LayerSpec], n_below: f64) -> Result<LayerStack, LayerError> {
        if specs.is_empty() {
            return Err(LayerError::Empty);
        }
        let num_layers = specs.len();
        check_index(0, n_above)?;
        check_index(num_layers + 1, n_below)?;

        let mut layers = Vec::with_capacity(num_layers + 2);
        layers.push(Layer::ambient(n_above, 0.0));

        let mut z = 0.0;
        for (i, spec) in specs.iter().enumerate() {
            let index = i + 1;
            check_index(index, spec.n)?;
            check_coefficient(index, "mua", spec.mua)?;
            check_coefficient(index, "mus", spec.mus)?;
            if !(-1.0..=1.0).contains(&spec.g) {
                return Err(LayerError::Anisotropy { layer: index, g: spec.g });
            }
            if !(spec.thickness.is_finite() && spec.thickness > 0.0) {
                return Err(LayerError::Thickness { layer: index, thickness: spec.thickness });
            }
            layers.push(Layer {
                n: spec.n,
                mua: spec.mua,
                mus: spec.mus,
                g: spec.g,
                z0: z,
                z1: z + spec.thickness,
                cos_crit0: 0.0,
                cos_crit1: 0.0,
            });
            z += spec.thickness;
        }
        layers.push(Layer::ambient(n_below, z));

        for i in 1..=num_layers {
            let n = layers[i].n;
            layers[i].cos_crit0 = critical_cosine(n, layers[i - 1].n);
            layers[i].cos_crit1 = critical_cosine(n, layers[i + 1].n);
        }

        if num_layers == 1 && layers[1].is_glass() {
            return Err(LayerError::OnlyGlass);
        }

        Ok(LayerStack { layers })
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len() - 2
    }

    /// Layer by index, ambient media included.
    pub fn layer(&self, index: usize) -> &Layer {
        &self.layers[index]
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Bottom of the last layer.
    pub fn depth(&self) -> f64 {
        self.layers[self.num_layers()].z1
    }

    /// Specular reflectance at the top surface. When the first layer is glass, multiple
    /// reflections inside it are accounted for.
    pub fn specular_reflectance(&self) -> f64 {
        let l = &self.layers;
        let temp = (l[0].n - l[1].n) / (l[0].n + l[1].n);
        let mut r1 = temp * temp;

        if l[1].is_glass() {
            let temp = (l[1].n - l[2].n) / (l[1].n + l[2].n);
            let r2 = temp * temp;
            r1 += (1.0 - r1) * (1.0 - r1) * r2 / (1.0 - r1 * r2);
        }
        r1
    }

    /// Index of the layer containing depth `z`, saturating at the first and last layer.
    pub fn layer_of_depth(&self, z: f64) -> usize {
        let num_layers = self.num_layers();
        let mut i = 1;
        while i < num_layers && z >= self.layers[i].z1 {
            i += 1;
        }
        i
    }
}

fn check_index(layer: usize, n: f64) -> Result<(), LayerError> {
    if n.is_finite() && n > 0.0 {
        Ok(())
    } else {
        Err(LayerError::RefractiveIndex { layer, n })
    }
}

fn check_coefficient(layer: usize, name: &'static str, value: f64) -> Result<(), LayerError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayerError::Coefficient { layer, name, value })
    }
}
