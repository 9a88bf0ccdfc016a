/// Cosine of about 1e-6 rad. Above this the direction counts as normal to the boundary.
pub const COSZERO: f64 = 1.0 - 1.0e-12;

/// Cosine of about 1.57 - 1e-6 rad. Below this the incidence counts as grazing.
pub const COS90D: f64 = 1.0e-6;

/// Fresnel reflectance for unpolarized light going from index `n1` into `n2` at an incidence
/// angle with cosine `ca1` in (0, 1].
///
/// Returns the reflectance and the cosine of the transmission angle. The transmission cosine
/// is zero whenever the reflectance is one.
pub fn rfresnel(n1: f64, n2: f64, ca1: f64) -> (f64, f64) {
    if n1 == n2 {
        // matched boundary
        (0.0, ca1)
    } else if ca1 > COSZERO {
        // normal incidence
        let r = (n2 - n1) / (n2 + n1);
        (r * r, ca1)
    } else if ca1 < COS90D {
        // very slant
        (1.0, 0.0)
    } else {
        let sa1 = f64::sqrt(1.0 - ca1 * ca1);
        let sa2 = n1 * sa1 / n2;
        if sa2 >= 1.0 {
            // total internal reflection
            return (1.0, 0.0);
        }
        let ca2 = f64::sqrt(1.0 - sa2 * sa2);

        // cosines and sines of the sum and difference of the two angles
        let cap = ca1 * ca2 - sa1 * sa2;
        let cam = ca1 * ca2 + sa1 * sa2;
        let sap = sa1 * ca2 + ca1 * sa2;
        let sam = sa1 * ca2 - ca1 * sa2;

        let r = 0.5 * sam * sam * (cam * cam + cap * cap) / (sap * sap * cam * cam);
        (r, ca2)
    }
}
