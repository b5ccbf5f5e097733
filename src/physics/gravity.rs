use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Earth constants
// ---------------------------------------------------------------------------

pub const MU_EARTH: f64 = 3.986e14; // m^3/s^2
pub const R_EARTH: f64 = 6_371_000.0; // mean radius, m
pub const G0: f64 = 9.81; // surface gravity used by the table-top models, m/s^2

/// Inside this distance from the origin the point-mass field is set to zero, m.
pub const SINGULAR_RADIUS: f64 = 1.0;

// ---------------------------------------------------------------------------
// Point-mass gravity
// ---------------------------------------------------------------------------

/// Inverse-square acceleration `-mu * r / |r|^3`.
/// Returns zero inside [`SINGULAR_RADIUS`] of the origin where the field is singular.
pub fn point_mass_accel(mu: f64, pos: &Vector3<f64>) -> Vector3<f64> {
    let r = pos.norm();
    if r < SINGULAR_RADIUS {
        return Vector3::zeros();
    }
    -mu / (r * r * r) * pos
}

/// Speed of a circular orbit of radius `r`.
pub fn circular_speed(mu: f64, r: f64) -> f64 {
    (mu / r).sqrt()
}

/// Period of a circular orbit of radius `r`.
pub fn orbital_period(mu: f64, r: f64) -> f64 {
    2.0 * std::f64::consts::PI * (r.powi(3) / mu).sqrt()
}
