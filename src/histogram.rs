//! Scoring grids for absorbed, reflected and transmitted weight.
//!
//! Grids are indexed by radius `r`, depth `z` and the exit angle `a` between the photon
//! direction and the surface normal. Indices saturate at the last bin, so the outermost bin of
//! every grid also collects everything beyond the grid.

use crate::layer::LayerStack;
use crate::vector::Vec3;
use std::f64::consts::PI;
use std::ops::AddAssign;

/// Grid line separations and number of bins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// z grid separation [cm].
    pub dz: f64,
    /// r grid separation [cm].
    pub dr: f64,
    /// Exit angle grid separation [rad].
    pub da: f64,
    pub nz: usize,
    pub nr: usize,
    pub na: usize,
}

impl GridSpec {
    /// A grid whose angle bins span 0 to 90 degrees.
    ///
    /// # Panics
    ///
    /// Panics if any axis has no bins.
    pub fn new(dz: f64, dr: f64, nz: usize, nr: usize, na: usize) -> GridSpec {
        assert!(
            nz > 0 && nr > 0 && na > 0,
            "grid needs at least one bin per axis, got nz = {}, nr = {}, na = {}",
            nz, nr, na
        );
        GridSpec { dz, dr, da: 0.5 * PI / na as f64, nz, nr, na }
    }

    pub fn iz(&self, z: f64) -> usize {
        saturating_index(z / self.dz, self.nz)
    }

    pub fn ir(&self, r: f64) -> usize {
        saturating_index(r / self.dr, self.nr)
    }

    /// Bin of an exit direction with z cosine `uz`.
    pub fn ia(&self, uz: f64) -> usize {
        let cos_a = f64::min(uz.abs(), 1.0);
        saturating_index(f64::acos(cos_a) / self.da, self.na)
    }
}

fn saturating_index(index: f64, n: usize) -> usize {
    let last = n.saturating_sub(1);
    if index > last as f64 {
        last
    } else {
        index as usize
    }
}

/// Raw weight deposited by a number of photon packets.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    grid: GridSpec,
    /// Specular reflectance.
    pub rsp: f64,
    pub num_photons: u64,
    /// Absorption, `[ir * nz + iz]`.
    pub a_rz: Vec<f64>,
    /// Diffuse reflectance, `[ir * na + ia]`.
    pub rd_ra: Vec<f64>,
    /// Transmittance, `[ir * na + ia]`.
    pub tt_ra: Vec<f64>,
}

impl Histogram {
    pub fn new(grid: GridSpec, rsp: f64) -> Histogram {
        Histogram {
            grid,
            rsp,
            num_photons: 0,
            a_rz: vec![0.; grid.nr * grid.nz],
            rd_ra: vec![0.; grid.nr * grid.na],
            tt_ra: vec![0.; grid.nr * grid.na],
        }
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn add_absorption(&mut self, position: Vec3<f64>, dwa: f64) {
        let ir = self.grid.ir(position.radius());
        let iz = self.grid.iz(position.z);
        self.a_rz[ir * self.grid.nz + iz] += dwa;
    }

    /// Weight leaving through the top surface, `uz` being the direction after refraction.
    pub fn record_reflectance(&mut self, position: Vec3<f64>, uz: f64, weight: f64) {
        let i = self.exit_bin(position, uz);
        self.rd_ra[i] += weight;
    }

    /// Weight leaving through the bottom surface.
    pub fn record_transmittance(&mut self, position: Vec3<f64>, uz: f64, weight: f64) {
        let i = self.exit_bin(position, uz);
        self.tt_ra[i] += weight;
    }

    fn exit_bin(&self, position: Vec3<f64>, uz: f64) -> usize {
        self.grid.ir(position.radius()) * self.grid.na + self.grid.ia(uz)
    }

    pub fn absorbed(&self) -> f64 {
        self.a_rz.iter().sum()
    }

    pub fn reflected(&self) -> f64 {
        self.rd_ra.iter().sum()
    }

    pub fn transmitted(&self) -> f64 {
        self.tt_ra.iter().sum()
    }

    /// All weight deposited into the grids.
    pub fn total_weight(&self) -> f64 {
        self.absorbed() + self.reflected() + self.transmitted()
    }

    /// Sum the grids into 1D distributions and totals, and scale everything to physical
    /// quantities per launched photon.
    pub fn scaled(&self, layers: &LayerStack) -> Results {
        let GridSpec { dz, dr, da, nz, nr, na } = self.grid;
        let n = self.num_photons.max(1) as f64;

        let mut rd_r = vec![0.; nr];
        let mut rd_a = vec![0.; na];
        let mut tt_r = vec![0.; nr];
        let mut tt_a = vec![0.; na];
        for ir in 0..nr {
            for ia in 0..na {
                let i = ir * na + ia;
                rd_r[ir] += self.rd_ra[i];
                rd_a[ia] += self.rd_ra[i];
                tt_r[ir] += self.tt_ra[i];
                tt_a[ia] += self.tt_ra[i];
            }
        }
        let rd = rd_r.iter().sum::<f64>() / n;
        let tt = tt_r.iter().sum::<f64>() / n;

        let mut a_z = vec![0.; nz];
        for ir in 0..nr {
            for iz in 0..nz {
                a_z[iz] += self.a_rz[ir * nz + iz];
            }
        }
        let mut a_l = vec![0.; layers.num_layers() + 2];
        for (iz, a) in a_z.iter().enumerate() {
            a_l[layers.layer_of_depth((iz as f64 + 0.5) * dz)] += a;
        }
        let a = a_z.iter().sum::<f64>() / n;

        // area is 2 pi (ir + 0.5) dr^2, solid angle is 4 pi sin(a) sin(da / 2), projected by cos(a)
        let scale_ra = 4.0 * PI * PI * dr * f64::sin(da / 2.0) * dr * n;
        let mut rd_ra = self.rd_ra.clone();
        let mut tt_ra = self.tt_ra.clone();
        for ir in 0..nr {
            for ia in 0..na {
                let scale = 1.0 / ((ir as f64 + 0.5) * f64::sin(2.0 * (ia as f64 + 0.5) * da) * scale_ra);
                rd_ra[ir * na + ia] *= scale;
                tt_ra[ir * na + ia] *= scale;
            }
        }

        let scale_r = 2.0 * PI * dr * dr * n;
        for ir in 0..nr {
            let scale = 1.0 / ((ir as f64 + 0.5) * scale_r);
            rd_r[ir] *= scale;
            tt_r[ir] *= scale;
        }

        let scale_a = 2.0 * PI * da * n;
        for ia in 0..na {
            let scale = 1.0 / (f64::sin((ia as f64 + 0.5) * da) * scale_a);
            rd_a[ia] *= scale;
            tt_a[ia] *= scale;
        }

        let scale_rz = 2.0 * PI * dr * dr * dz * n;
        let mut a_rz = self.a_rz.clone();
        for ir in 0..nr {
            for iz in 0..nz {
                a_rz[ir * nz + iz] /= (ir as f64 + 0.5) * scale_rz;
            }
        }
        for v in a_z.iter_mut() {
            *v /= dz * n;
        }
        for v in a_l.iter_mut() {
            *v /= n;
        }

        Results {
            grid: self.grid,
            num_photons: self.num_photons,
            rsp: self.rsp,
            rd,
            a,
            tt,
            rd_ra,
            rd_r,
            rd_a,
            a_rz,
            a_z,
            a_l,
            tt_ra,
            tt_r,
            tt_a,
        }
    }
}

impl AddAssign for Histogram {
    fn add_assign(&mut self, rhs: Self) {
        debug_assert_eq!(self.grid, rhs.grid);
        self.num_photons += rhs.num_photons;
        for (a, b) in self.a_rz.iter_mut().zip(rhs.a_rz) {
            *a += b;
        }
        for (a, b) in self.rd_ra.iter_mut().zip(rhs.rd_ra) {
            *a += b;
        }
        for (a, b) in self.tt_ra.iter_mut().zip(rhs.tt_ra) {
            *a += b;
        }
    }
}

/// Scaled physical quantities of a finished run.
#[derive(Debug, Clone)]
pub struct Results {
    pub grid: GridSpec,
    pub num_photons: u64,
    /// Specular reflectance [-].
    pub rsp: f64,
    /// Total diffuse reflectance [-].
    pub rd: f64,
    /// Total absorption [-].
    pub a: f64,
    /// Total transmittance [-].
    pub tt: f64,
    /// [1/(cm2 sr)]
    pub rd_ra: Vec<f64>,
    /// [1/cm2]
    pub rd_r: Vec<f64>,
    /// [1/sr]
    pub rd_a: Vec<f64>,
    /// [1/cm3]
    pub a_rz: Vec<f64>,
    /// [1/cm]
    pub a_z: Vec<f64>,
    /// Absorption per layer, indexed like the layer stack [-].
    pub a_l: Vec<f64>,
    /// [1/(cm2 sr)]
    pub tt_ra: Vec<f64>,
    /// [1/cm2]
    pub tt_r: Vec<f64>,
    /// [1/sr]
    pub tt_a: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerSpec;

    fn grid() -> GridSpec {
        GridSpec::new(0.1, 0.1, 10, 5, 9)
    }

    #[test]
    fn indices_saturate_at_the_edge() {
        let g = grid();
        assert_eq!(g.iz(0.05), 0);
        assert_eq!(g.iz(0.95), 9);
        assert_eq!(g.iz(100.0), 9);
        assert_eq!(g.ir(0.25), 2);
        assert_eq!(g.ir(1e6), 4);
        assert_eq!(g.ia(1.0), 0);
        assert_eq!(g.ia(-1.0), 0);
        assert_eq!(g.ia(0.0), 8);
        // drift above one must not produce NaN
        assert_eq!(g.ia(1.0 + 1e-15), 0);
    }

    #[test]
    #[should_panic(expected = "at least one bin")]
    fn empty_angle_axis_is_rejected() {
        GridSpec::new(0.1, 0.1, 10, 5, 0);
    }

    #[test]
    fn index_of_empty_axis_does_not_underflow() {
        assert_eq!(saturating_index(3.7, 0), 0);
        assert_eq!(saturating_index(3.7, 1), 0);
    }

    #[test]
    fn deposits_land_in_their_cells() {
        let mut h = Histogram::new(grid(), 0.0);
        h.add_absorption(Vec3::new(0.3, 0.4, 0.25), 0.5);
        assert_eq!(h.a_rz[4 * 10 + 2], 0.5);

        h.record_reflectance(Vec3::new(0.0, 0.15, 0.0), -1.0, 0.2);
        assert_eq!(h.rd_ra[1 * 9], 0.2);

        h.record_transmittance(Vec3::new(0.0, 0.0, 1.0), 0.0, 0.1);
        assert_eq!(h.tt_ra[8], 0.1);

        assert!((h.total_weight() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn merging_adds_elementwise() {
        let mut a = Histogram::new(grid(), 0.04);
        let mut b = Histogram::new(grid(), 0.04);
        a.num_photons = 10;
        b.num_photons = 5;
        a.add_absorption(Vec3::new(0.0, 0.0, 0.0), 1.0);
        b.add_absorption(Vec3::new(0.0, 0.0, 0.0), 2.0);
        b.record_transmittance(Vec3::new(0.0, 0.0, 0.0), 1.0, 0.5);
        a += b;
        assert_eq!(a.num_photons, 15);
        assert_eq!(a.a_rz[0], 3.0);
        assert_eq!(a.tt_ra[0], 0.5);
        assert_eq!(a.rsp, 0.04);
    }

    #[test]
    fn scaled_totals_are_fractions_of_launched_weight() {
        let layers = LayerStack::new(
            1.0,
            &[
                LayerSpec { n: 1.4, mua: 1.0, mus: 10.0, g: 0.0, thickness: 0.5 },
                LayerSpec { n: 1.4, mua: 1.0, mus: 10.0, g: 0.0, thickness: 0.5 },
            ],
            1.0,
        ).unwrap();
        let mut h = Histogram::new(grid(), 0.0);
        h.num_photons = 4;
        h.add_absorption(Vec3::new(0.0, 0.0, 0.15), 1.0);
        h.add_absorption(Vec3::new(0.0, 0.0, 0.75), 1.0);
        h.record_reflectance(Vec3::new(0.0, 0.0, 0.0), -0.5, 1.0);
        h.record_transmittance(Vec3::new(0.0, 0.0, 1.0), 0.5, 1.0);

        let results = h.scaled(&layers);
        assert!((results.a - 0.5).abs() < 1e-12);
        assert!((results.rd - 0.25).abs() < 1e-12);
        assert!((results.tt - 0.25).abs() < 1e-12);
        assert!((results.a_l[1] - 0.25).abs() < 1e-12);
        assert!((results.a_l[2] - 0.25).abs() < 1e-12);
        assert!((results.a_z[1] - 1.0 / (0.1 * 4.0)).abs() < 1e-12);

        // integrating the radial reflectance over the surface recovers the total
        let dr = results.grid.dr;
        let integral: f64 = results.rd_r.iter().enumerate()
            .map(|(ir, v)| v * 2.0 * PI * (ir as f64 + 0.5) * dr * dr)
            .sum();
        assert!((integral - results.rd).abs() < 1e-12);
    }
}
