pub mod error;
pub mod math;
pub mod physics;
pub mod dynamics;
pub mod sim;
pub mod io;

pub use error::{Result, SimError};
pub use dynamics::{ControlVector, Dynamics, Model, OrbitalBody, SlidingBox, StateVector};
pub use sim::{
    simulate, simulate_batch, simulate_schedule, simulate_with_config, QuaternionPolicy, Rk4,
    SimConfig, Trajectory,
};
