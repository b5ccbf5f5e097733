use nalgebra::Vector3;
use tracing::debug;

use crate::dynamics::{ControlVector, Dynamics, StateVector};
use crate::error::{require_len, require_non_negative, require_positive, Result};
use crate::math::quaternion::{self, Quat};
use crate::physics::gravity::{self, MU_EARTH, R_EARTH};

// ---------------------------------------------------------------------------
// Rigid body in a point-mass gravity field
// ---------------------------------------------------------------------------

/// Satellite under inverse-square gravity with rigid-body attitude.
///
/// State layout (13):
///
/// | index  | name              | frame    |
/// |--------|-------------------|----------|
/// | 0..3   | position `r`      | inertial |
/// | 3..7   | attitude `q`      | body→inertial, `[w, x, y, z]` |
/// | 7..10  | velocity `v`      | inertial |
/// | 10..13 | angular rate `ω`  | body     |
///
/// Control (3) is a body-frame torque. Angular acceleration follows Euler's
/// equation `J ω̇ = τ - ω × (J ω)` with a diagonal principal inertia `J`.
/// The default `J = diag(1, 1, 1)` with zero torque keeps `ω` constant.
///
/// Gravity is `-mu r / |r|^3` except within
/// [`SINGULAR_RADIUS`](gravity::SINGULAR_RADIUS) (1 m) of the origin, where
/// the translational acceleration is zero. A body placed there coasts in a
/// straight line instead of producing non-finite states.
#[derive(Debug, Clone)]
pub struct OrbitalBody {
    mu: f64,               // m^3/s^2
    radius: f64,           // central body radius, m
    inertia: Vector3<f64>, // [Jxx, Jyy, Jzz], kg·m^2
}

impl Default for OrbitalBody {
    fn default() -> Self {
        Self {
            mu: MU_EARTH,
            radius: R_EARTH,
            inertia: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl OrbitalBody {
    pub const STATE_DIM: usize = 13;
    pub const CONTROL_DIM: usize = 3;

    pub const POS: usize = 0;
    pub const QUAT: usize = 3;
    pub const VEL: usize = 7;
    pub const OMEGA: usize = 10;

    pub fn new(mu: f64, radius: f64) -> Result<Self> {
        let model = Self {
            mu: require_positive("mu", mu)?,
            radius: require_positive("radius", radius)?,
            ..Self::default()
        };
        debug!(mu, radius, "orbital body model");
        Ok(model)
    }

    pub fn with_inertia(mut self, inertia: Vector3<f64>) -> Result<Self> {
        require_positive("inertia_x", inertia.x)?;
        require_positive("inertia_y", inertia.y)?;
        require_positive("inertia_z", inertia.z)?;
        self.inertia = inertia;
        Ok(self)
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn inertia(&self) -> Vector3<f64> {
        self.inertia
    }

    /// Concatenate components into a state vector.
    pub fn pack(
        pos: &Vector3<f64>,
        quat: &Quat,
        vel: &Vector3<f64>,
        omega: &Vector3<f64>,
    ) -> StateVector {
        StateVector::from_iterator(
            Self::STATE_DIM,
            pos.iter()
                .chain(quat.iter())
                .chain(vel.iter())
                .chain(omega.iter())
                .copied(),
        )
    }

    /// Split a state vector into `(r, q, v, ω)`.
    pub fn unpack(state: &StateVector) -> Result<(Vector3<f64>, Quat, Vector3<f64>, Vector3<f64>)> {
        require_len("state", Self::STATE_DIM, state.len())?;
        Ok(Self::split(state))
    }

    fn split(s: &StateVector) -> (Vector3<f64>, Quat, Vector3<f64>, Vector3<f64>) {
        let vec3 = |i: usize| Vector3::new(s[i], s[i + 1], s[i + 2]);
        let q = Quat::new(s[Self::QUAT], s[Self::QUAT + 1], s[Self::QUAT + 2], s[Self::QUAT + 3]);
        (vec3(Self::POS), q, vec3(Self::VEL), vec3(Self::OMEGA))
    }

    /// Circular orbit in the x-y plane at `altitude`, starting on +x.
    pub fn circular_orbit_state(
        &self,
        altitude: f64,
        attitude: &Quat,
        omega: &Vector3<f64>,
    ) -> Result<StateVector> {
        require_non_negative("altitude", altitude)?;
        let r = self.radius + altitude;
        let v = gravity::circular_speed(self.mu, r);
        Ok(Self::pack(
            &Vector3::new(r, 0.0, 0.0),
            attitude,
            &Vector3::new(0.0, v, 0.0),
            omega,
        ))
    }

    /// Height above the central body's surface.
    pub fn altitude(&self, state: &StateVector) -> Result<f64> {
        let (r, _, _, _) = Self::unpack(state)?;
        Ok(r.norm() - self.radius)
    }

    /// Circular-orbit period at `altitude`.
    pub fn orbital_period(&self, altitude: f64) -> f64 {
        gravity::orbital_period(self.mu, self.radius + altitude)
    }

    /// Specific orbital energy `v²/2 - mu/|r|`.
    pub fn specific_energy(&self, state: &StateVector) -> Result<f64> {
        let (r, _, v, _) = Self::unpack(state)?;
        Ok(0.5 * v.norm_squared() - self.mu / r.norm())
    }
}

impl Dynamics for OrbitalBody {
    fn state_dim(&self) -> usize {
        Self::STATE_DIM
    }

    fn control_dim(&self) -> usize {
        Self::CONTROL_DIM
    }

    fn derivative(&self, state: &StateVector, control: &ControlVector) -> StateVector {
        let (r, q, v, omega) = Self::split(state);
        let torque = Vector3::new(control[0], control[1], control[2]);

        // --- Translation ---
        let r_dot = v;
        let v_dot = gravity::point_mass_accel(self.mu, &r);

        // --- Attitude kinematics: q̇ = ½ G(q) ω ---
        let q_dot = quaternion::kinematics(&q, &omega);

        // --- Euler's equation: J ω̇ = τ - ω × (J ω) ---
        let j_omega = self.inertia.component_mul(&omega);
        let omega_dot = (torque - omega.cross(&j_omega)).component_div(&self.inertia);

        Self::pack(&r_dot, &q_dot, &v_dot, &omega_dot)
    }

    fn state_labels(&self) -> &'static [&'static str] {
        &[
            "rx", "ry", "rz", "qw", "qx", "qy", "qz", "vx", "vy", "vz", "wx", "wy", "wz",
        ]
    }

    fn quaternion_offsets(&self) -> &'static [usize] {
        &[Self::QUAT]
    }

    fn name(&self) -> &str {
        "orbital-body"
    }
}
