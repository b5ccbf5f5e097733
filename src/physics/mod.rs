pub mod friction;
pub mod gravity;

pub use friction::coulomb_accel;
pub use gravity::{point_mass_accel, MU_EARTH, R_EARTH};
