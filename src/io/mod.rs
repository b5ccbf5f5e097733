pub mod csv;

pub use csv::{write_model_trajectory, write_trajectory, write_trajectory_file};
