use super::{step, CrossingMode, LayeredSlab};
use crate::fresnel::rfresnel;
use crate::histogram::Histogram;
use crate::photon::Photon;
use crate::random::UniformSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Top,
    Bottom,
}

/// Outcome of a photon meeting an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Crossing {
    Reflect,
    Transmit,
    /// Transmit the fraction `1 - r` out of the stack and reflect the rest.
    Split,
}

/// Decide what happens at an interface with reflectance `r`. Splitting only applies to the
/// outer surfaces of the stack and only when some light gets through.
pub(crate) fn decide_crossing<R: UniformSource>(mode: CrossingMode, outermost: bool, r: f64, rng: &mut R) -> Crossing {
    match mode {
        CrossingMode::PartialReflection if outermost && r < 1.0 => Crossing::Split,
        _ => {
            if rng.next_uniform() > r {
                Crossing::Transmit
            } else {
                Crossing::Reflect
            }
        }
    }
}

impl LayeredSlab {
    pub(crate) fn cross_or_not<R: UniformSource>(&self, photon: &mut Photon, histogram: &mut Histogram, rng: &mut R) {
        if photon.direction.z < 0.0 {
            self.cross_up_or_not(photon, histogram, rng);
        } else {
            self.cross_dn_or_not(photon, histogram, rng);
        }
    }

    /// Reflect or transmit a photon at the upper boundary of its layer. Weight leaving through
    /// the top of the first layer is recorded as diffuse reflectance.
    fn cross_up_or_not<R: UniformSource>(&self, photon: &mut Photon, histogram: &mut Histogram, rng: &mut R) {
        self.cross(Side::Top, photon, histogram, rng)
    }

    /// Same at the lower boundary; weight leaving the last layer is recorded as transmittance.
    fn cross_dn_or_not<R: UniformSource>(&self, photon: &mut Photon, histogram: &mut Histogram, rng: &mut R) {
        self.cross(Side::Bottom, photon, histogram, rng)
    }

    fn cross<R: UniformSource>(&self, side: Side, photon: &mut Photon, histogram: &mut Histogram, rng: &mut R) {
        let uz = photon.direction.z;
        let layer = self.layers.layer(photon.layer);
        let (next, cos_crit, ca1) = match side {
            Side::Top => (photon.layer - 1, layer.cos_crit0, -uz),
            Side::Bottom => (photon.layer + 1, layer.cos_crit1, uz),
        };
        let ni = layer.n;
        let nt = self.layers.layer(next).n;
        let outermost = next == 0 || next == self.layers.num_layers() + 1;

        let (r, uz1) = if ca1 <= cos_crit {
            // total internal reflection
            (1.0, 0.0)
        } else {
            rfresnel(ni, nt, ca1)
        };
        let uz_transmitted = match side {
            Side::Top => -uz1,
            Side::Bottom => uz1,
        };

        match decide_crossing(self.params.crossing, outermost, r, rng) {
            Crossing::Reflect => photon.direction.z = -uz,
            Crossing::Transmit if outermost => {
                photon.direction.z = uz_transmitted;
                record(side, 0.0, photon, histogram);
                photon.kill();
            }
            Crossing::Transmit => {
                photon.layer = next;
                photon.direction.x *= ni / nt;
                photon.direction.y *= ni / nt;
                photon.direction.z = uz_transmitted;
            }
            Crossing::Split => {
                photon.direction.z = uz_transmitted;
                record(side, r, photon, histogram);
                photon.direction.z = -uz;
            }
        }
    }

    /// Move the photon through a glass layer straight to its boundary. A horizontal photon
    /// would never reach tissue again and is killed.
    pub(crate) fn hop_in_glass<R: UniformSource>(&self, photon: &mut Photon, histogram: &mut Histogram, rng: &mut R) {
        if photon.direction.z == 0.0 {
            photon.kill();
        } else {
            step::step_size_in_glass(photon, self.layers.layer(photon.layer));
            photon.hop();
            self.cross_or_not(photon, histogram, rng);
        }
    }
}

/// Score the part `1 - refl` of the weight leaving the stack and keep the rest.
fn record(side: Side, refl: f64, photon: &mut Photon, histogram: &mut Histogram) {
    let exiting = photon.weight * (1.0 - refl);
    match side {
        Side::Top => histogram.record_reflectance(photon.position, photon.direction.z, exiting),
        Side::Bottom => histogram.record_transmittance(photon.position, photon.direction.z, exiting),
    }
    photon.weight *= refl;
}
