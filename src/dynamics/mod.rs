pub mod orbital;
pub mod sliding_box;
pub mod state;

pub use orbital::OrbitalBody;
pub use sliding_box::SlidingBox;
pub use state::{ControlVector, StateVector};

// ---------------------------------------------------------------------------
// Continuous-time dynamics contract
// ---------------------------------------------------------------------------

/// A continuous-time model `ẋ = f(x, u)`.
///
/// Implement this to plug a model into [`Rk4`](crate::sim::Rk4).
/// `derivative` must be a pure function of its inputs: the integrator calls
/// it four times per step on perturbed states.
pub trait Dynamics {
    /// Length of the state vector.
    fn state_dim(&self) -> usize;

    /// Length of the control vector.
    fn control_dim(&self) -> usize;

    /// Time derivative of `state` under `control`, same layout as `state`.
    ///
    /// Callers guarantee `state.len() == state_dim()` and
    /// `control.len() == control_dim()`; `Rk4::step` checks both.
    fn derivative(&self, state: &StateVector, control: &ControlVector) -> StateVector;

    /// Per-index names of the state layout, used for trajectory export.
    fn state_labels(&self) -> &'static [&'static str];

    /// Indices where a scalar-first unit quaternion block starts.
    fn quaternion_offsets(&self) -> &'static [usize] {
        &[]
    }

    /// Largest timestep the model stays well-behaved under, if it has one.
    ///
    /// `Rk4::step` rejects a longer `dt` with `InvalidParameter`.
    fn max_timestep(&self) -> Option<f64> {
        None
    }

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

// ---------------------------------------------------------------------------
// Tagged dispatch over the built-in models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Model {
    SlidingBox(SlidingBox),
    Orbital(OrbitalBody),
}

impl Dynamics for Model {
    fn state_dim(&self) -> usize {
        match self {
            Model::SlidingBox(m) => m.state_dim(),
            Model::Orbital(m) => m.state_dim(),
        }
    }

    fn control_dim(&self) -> usize {
        match self {
            Model::SlidingBox(m) => m.control_dim(),
            Model::Orbital(m) => m.control_dim(),
        }
    }

    fn derivative(&self, state: &StateVector, control: &ControlVector) -> StateVector {
        match self {
            Model::SlidingBox(m) => m.derivative(state, control),
            Model::Orbital(m) => m.derivative(state, control),
        }
    }

    fn state_labels(&self) -> &'static [&'static str] {
        match self {
            Model::SlidingBox(m) => m.state_labels(),
            Model::Orbital(m) => m.state_labels(),
        }
    }

    fn quaternion_offsets(&self) -> &'static [usize] {
        match self {
            Model::SlidingBox(m) => m.quaternion_offsets(),
            Model::Orbital(m) => m.quaternion_offsets(),
        }
    }

    fn max_timestep(&self) -> Option<f64> {
        match self {
            Model::SlidingBox(m) => m.max_timestep(),
            Model::Orbital(m) => m.max_timestep(),
        }
    }

    fn name(&self) -> &str {
        match self {
            Model::SlidingBox(m) => m.name(),
            Model::Orbital(m) => m.name(),
        }
    }
}

impl From<SlidingBox> for Model {
    fn from(m: SlidingBox) -> Self {
        Model::SlidingBox(m)
    }
}

impl From<OrbitalBody> for Model {
    fn from(m: OrbitalBody) -> Self {
        Model::Orbital(m)
    }
}
