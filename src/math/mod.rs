pub mod quaternion;

pub use quaternion::{
    attitude_jacobian, compose, hat, invert, lmat, rmat, rotation_matrix, skew, unhat, Quat,
};
