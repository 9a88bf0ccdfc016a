use crate::fresnel::COSZERO;
use crate::photon::Photon;
use crate::random::UniformSource;
use crate::vector::Vec3;
use std::f64::consts::PI;

/// Sample the cosine of the polar deflection angle. Isotropic for `g == 0`, Henyey-Greenstein
/// otherwise.
pub(crate) fn spin_theta<R: UniformSource>(g: f64, rng: &mut R) -> f64 {
    if g == 0.0 {
        2.0 * rng.next_uniform() - 1.0
    } else {
        let temp = (1.0 - g * g) / (1.0 - g + 2.0 * g * rng.next_uniform());
        let cost = (1.0 + g * g - temp * temp) / (2.0 * g);
        cost.max(-1.0).min(1.0)
    }
}

/// Choose a new propagation direction from the polar deflection angle theta and the azimuthal
/// angle psi.
///
/// theta lies in [0, pi], so its sine is never negative. psi lies in [0, 2 pi): its sine is
/// positive on [0, pi) and negative on [pi, 2 pi).
pub(crate) fn spin<R: UniformSource>(g: f64, photon: &mut Photon, rng: &mut R) {
    let Vec3 { x: ux, y: uy, z: uz } = photon.direction;

    let cost = spin_theta(g, rng);
    let sint = f64::sqrt(1.0 - cost * cost);

    let psi = 2.0 * PI * rng.next_uniform();
    let cosp = f64::cos(psi);
    let sinp = if psi < PI {
        f64::sqrt(1.0 - cosp * cosp)
    } else {
        -f64::sqrt(1.0 - cosp * cosp)
    };

    photon.direction = if f64::abs(uz) > COSZERO {
        // normal incidence
        Vec3::new(sint * cosp, sint * sinp, cost * uz.signum())
    } else {
        let temp = f64::sqrt(1.0 - uz * uz);
        Vec3::new(
            sint * (ux * uz * cosp - uy * sinp) / temp + ux * cost,
            sint * (uy * uz * cosp + ux * sinp) / temp + uy * cost,
            -sint * cosp * temp + uz * cost,
        )
    };
}
