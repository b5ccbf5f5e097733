use tracing::{debug, trace};

use crate::dynamics::{ControlVector, Dynamics, StateVector};
use crate::error::{require_len, require_positive, Result, SimError};

// ---------------------------------------------------------------------------
// Fixed-step classical RK4 with the control held over the step
// ---------------------------------------------------------------------------

/// Explicit 4th-order Runge-Kutta integrator with a fixed timestep.
#[derive(Debug, Clone, Copy)]
pub struct Rk4 {
    dt: f64,
}

impl Rk4 {
    pub fn new(dt: f64) -> Result<Self> {
        require_positive("dt", dt)?;
        debug!(dt, "rk4 integrator");
        Ok(Self { dt })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Advance `state` by one timestep under a constant `control`.
    ///
    /// Fails with `IncompatibleDimension` if `state` or `control` do not
    /// match the model, or if the model returns a derivative of the wrong
    /// length. Fails with `InvalidParameter` if `dt` exceeds the model's
    /// [`max_timestep`](Dynamics::max_timestep). Quaternion blocks are not
    /// renormalized.
    pub fn step<M>(&self, model: &M, state: &StateVector, control: &ControlVector) -> Result<StateVector>
    where
        M: Dynamics + ?Sized,
    {
        require_len("state", model.state_dim(), state.len())?;
        require_len("control", model.control_dim(), control.len())?;

        let dt = self.dt;
        if let Some(limit) = model.max_timestep() {
            if dt > limit {
                return Err(SimError::invalid_parameter(
                    "dt",
                    dt,
                    "exceeds the model's maximum timestep",
                ));
            }
        }

        let k1 = stage(model, state, control)?;
        let k2 = stage(model, &(state + &k1 * (dt * 0.5)), control)?;
        let k3 = stage(model, &(state + &k2 * (dt * 0.5)), control)?;
        let k4 = stage(model, &(state + &k3 * dt), control)?;

        trace!(model = model.name(), dt, "rk4 step");
        Ok(state + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0))
    }
}

fn stage<M>(model: &M, state: &StateVector, control: &ControlVector) -> Result<StateVector>
where
    M: Dynamics + ?Sized,
{
    let k = model.derivative(state, control);
    require_len("derivative", state.len(), k.len())?;
    Ok(k)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
