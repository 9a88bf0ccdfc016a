use super::AbsorptionScoring;
use crate::histogram::Histogram;
use crate::layer::Layer;
use crate::photon::Photon;
use crate::random::UniformSource;

/// Pick a step size in tissue. A fresh step is `-ln(rnd) / (mua + mus)`; a step left over
/// from hitting a boundary is picked up instead when there is one.
pub(crate) fn step_size_in_tissue<R: UniformSource>(photon: &mut Photon, layer: &Layer, rng: &mut R) {
    if photon.sleft == 0.0 {
        let mut rnd = rng.next_uniform();
        // avoid zero
        while rnd <= 0.0 {
            rnd = rng.next_uniform();
        }
        photon.s = -f64::ln(rnd) / layer.mu_t();
    } else {
        photon.s = photon.sleft / layer.mu_t();
        photon.sleft = 0.0;
    }
}

/// Distance to the boundary ahead along the photon direction.
fn distance_to_boundary(photon: &Photon, layer: &Layer) -> Option<f64> {
    let uz = photon.direction.z;
    if uz > 0.0 {
        Some((layer.z1 - photon.position.z) / uz)
    } else if uz < 0.0 {
        Some((layer.z0 - photon.position.z) / uz)
    } else {
        None
    }
}

/// In glass the step always ends on a boundary. Zero for a horizontal photon.
pub(crate) fn step_size_in_glass(photon: &mut Photon, layer: &Layer) {
    photon.s = distance_to_boundary(photon, layer).unwrap_or(0.0);
}

/// Truncate the step at the layer boundary if it would cross it, keeping the rest of the step
/// as a dimensionless optical path in `sleft`. Returns whether the boundary is hit.
pub(crate) fn hit_boundary(photon: &mut Photon, layer: &Layer) -> bool {
    match distance_to_boundary(photon, layer) {
        Some(dl_b) if photon.s > dl_b => {
            photon.sleft = (photon.s - dl_b) * layer.mu_t();
            photon.s = dl_b;
            true
        }
        _ => false,
    }
}

/// Deposit the absorbed fraction `mua / (mua + mus)` of the weight at the interaction site.
pub(crate) fn drop_weight(photon: &mut Photon, layer: &Layer, scoring: AbsorptionScoring, histogram: &mut Histogram) {
    let dwa = photon.weight * layer.mua / layer.mu_t();
    photon.weight -= dwa;

    if scoring == AbsorptionScoring::Recorded {
        histogram.add_absorption(photon.position, dwa);
    }
}

/// A photon with little weight survives with probability `chance`, its weight scaled up by
/// `1 / chance` to keep the estimate unbiased.
pub(crate) fn roulette<R: UniformSource>(photon: &mut Photon, chance: f64, rng: &mut R) {
    if photon.weight == 0.0 {
        photon.kill();
    } else if rng.next_uniform() < chance {
        photon.weight /= chance;
    } else {
        photon.kill();
    }
}
