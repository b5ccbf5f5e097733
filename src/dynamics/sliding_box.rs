use tracing::debug;

use crate::dynamics::{ControlVector, Dynamics, StateVector};
use crate::error::{require_non_negative, require_positive, Result};
use crate::physics::friction::coulomb_accel;
use crate::physics::gravity::G0;

// ---------------------------------------------------------------------------
// Box pushed across a table
// ---------------------------------------------------------------------------

/// A box pushed across a table with Coulomb friction.
///
/// State layout `[px, py, vx, vy]`, control `[fx, fy]`. `x` runs along the
/// table and `y` is vertical: the table carries the box, so `ay = 0` and a
/// positive `fy` lifts some weight off the surface, reducing the normal
/// force `N = max(m g - fy, 0)`.
///
/// While friction decelerates the box, the deceleration is capped at
/// `|vx| / stop_horizon` so the box comes to rest instead of reversing.
/// RK4 only honours that cap for `dt <= stop_horizon`, which is reported as
/// the model's [`max_timestep`](Dynamics::max_timestep). Build the model for a
/// given integrator with `with_stop_horizon(rk4.dt())`.
#[derive(Debug, Clone)]
pub struct SlidingBox {
    mass: f64,          // kg
    friction_coef: f64, // kinetic/static, dimensionless
    gravity: f64,       // m/s^2
    stop_horizon: f64,  // s, shortest time friction may take to stop the box
}

impl Default for SlidingBox {
    fn default() -> Self {
        Self {
            mass: 1.0,
            friction_coef: 0.1,
            gravity: G0,
            stop_horizon: 0.01,
        }
    }
}

impl SlidingBox {
    pub const STATE_DIM: usize = 4;
    pub const CONTROL_DIM: usize = 2;

    pub fn new(mass: f64, friction_coef: f64, gravity: f64) -> Result<Self> {
        let model = Self {
            mass: require_positive("mass", mass)?,
            friction_coef: require_non_negative("friction_coef", friction_coef)?,
            gravity: require_non_negative("gravity", gravity)?,
            ..Self::default()
        };
        debug!(mass, friction_coef, gravity, "sliding box model");
        Ok(model)
    }

    /// Set the friction stop horizon; it must be at least the integrator timestep.
    pub fn with_stop_horizon(mut self, horizon: f64) -> Result<Self> {
        self.stop_horizon = require_positive("stop_horizon", horizon)?;
        Ok(self)
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn friction_coef(&self) -> f64 {
        self.friction_coef
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    pub fn stop_horizon(&self) -> f64 {
        self.stop_horizon
    }

    /// Normal force on the table given the vertical control force.
    pub fn normal_force(&self, fy: f64) -> f64 {
        (self.mass * self.gravity - fy).max(0.0)
    }
}

impl Dynamics for SlidingBox {
    fn state_dim(&self) -> usize {
        Self::STATE_DIM
    }

    fn control_dim(&self) -> usize {
        Self::CONTROL_DIM
    }

    fn derivative(&self, state: &StateVector, control: &ControlVector) -> StateVector {
        let (vx, vy) = (state[2], state[3]);
        let (fx, fy) = (control[0], control[1]);

        let limit = self.friction_coef * self.normal_force(fy);
        let ax = coulomb_accel(fx, vx, limit, self.mass, self.stop_horizon);

        StateVector::from_vec(vec![vx, vy, ax, 0.0])
    }

    fn state_labels(&self) -> &'static [&'static str] {
        &["px", "py", "vx", "vy"]
    }

    fn max_timestep(&self) -> Option<f64> {
        (self.friction_coef > 0.0).then_some(self.stop_horizon)
    }

    fn name(&self) -> &str {
        "sliding-box"
    }
}
