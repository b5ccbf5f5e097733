pub mod config;
pub mod integrator;
pub mod runner;

pub use config::{QuaternionPolicy, SimConfig};
pub use integrator::Rk4;
pub use runner::{
    simulate, simulate_batch, simulate_schedule, simulate_with_config, ControlSchedule, Trajectory,
};
