use crate::error::{require_positive, Result};
use super::integrator::Rk4;

// ---------------------------------------------------------------------------
// Quaternion drift handling
// ---------------------------------------------------------------------------

/// What a rollout does when a quaternion block leaves the unit sphere.
///
/// RK4 integrates `q̇ = ½ G(q) ω` as an unconstrained ODE, so the norm
/// drifts slowly. Renormalizing is an explicit choice of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuaternionPolicy {
    /// Do not inspect quaternion blocks.
    Ignore,
    /// Log the first excursion and keep going.
    #[default]
    Warn,
    /// Rescale the block to unit norm after every step.
    Renormalize,
    /// Fail the rollout with `NonUnitQuaternion`.
    Strict,
}

// ---------------------------------------------------------------------------
// Simulation config
// ---------------------------------------------------------------------------

/// Timestep, horizon and quaternion handling for one rollout.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub dt: f64,
    pub steps: usize,
    pub quaternion_tolerance: f64,
    pub quaternion_policy: QuaternionPolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.01,                   // 100 Hz
            steps: 100,
            quaternion_tolerance: 1e-6,
            quaternion_policy: QuaternionPolicy::Warn,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        require_positive("dt", self.dt)?;
        require_positive("quaternion_tolerance", self.quaternion_tolerance)?;
        Ok(())
    }

    /// Integrator with this config's timestep.
    pub fn integrator(&self) -> Result<Rk4> {
        self.validate()?;
        Rk4::new(self.dt)
    }

    /// Simulated time covered by `steps`.
    pub fn duration(&self) -> f64 {
        self.dt * self.steps as f64
    }
}
