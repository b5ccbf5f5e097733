//! Quaternion algebra for attitude representation.
//!
//! Quaternions are plain `Vector4<f64>` values in scalar-first order
//! `[w, x, y, z]`. Composition and the rotation-matrix recovery are written
//! as products of the left/right multiplication matrices, which keeps the
//! attitude Jacobian `G(q)` a one-liner and makes every map a linear-algebra
//! object that a model can reuse inside its derivative.
//!
//! Nothing here normalizes its input. Feeding a non-unit quaternion to
//! [`rotation_matrix`] yields `|q|^2` times the rotation of `q / |q|`.

use nalgebra::{Matrix3, Matrix4, Matrix4x3, Quaternion, UnitQuaternion, Vector3, Vector4};

/// Scalar-first quaternion `[w, x, y, z]`.
pub type Quat = Vector4<f64>;

// ---------------------------------------------------------------------------
// Constant embeddings
// ---------------------------------------------------------------------------

/// Identity rotation `[1, 0, 0, 0]`.
pub fn identity() -> Quat {
    Vector4::new(1.0, 0.0, 0.0, 0.0)
}

/// `H`: embeds R3 into the pure-vector subspace of R4.
pub fn h_matrix() -> Matrix4x3<f64> {
    Matrix4x3::new(
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, //
        0.0, 0.0, 1.0,
    )
}

/// `T`: conjugation, negates the vector part.
pub fn t_matrix() -> Matrix4<f64> {
    Matrix4::from_diagonal(&Vector4::new(1.0, -1.0, -1.0, -1.0))
}

// ---------------------------------------------------------------------------
// Vector maps
// ---------------------------------------------------------------------------

/// Skew-symmetric cross-product matrix: `skew(v) * u == v.cross(&u)`.
pub fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -v.z, v.y, //
        v.z, 0.0, -v.x, //
        -v.y, v.x, 0.0,
    )
}

/// Pure quaternion `[0, v]`.
pub fn hat(v: &Vector3<f64>) -> Quat {
    Vector4::new(0.0, v.x, v.y, v.z)
}

/// Vector part of `q`. Drops the scalar, so it only inverts [`hat`] when `w == 0`.
pub fn unhat(q: &Quat) -> Vector3<f64> {
    Vector3::new(q[1], q[2], q[3])
}

/// Conjugate `[w, -x, -y, -z]`; the inverse for unit quaternions.
pub fn invert(q: &Quat) -> Quat {
    Vector4::new(q[0], -q[1], -q[2], -q[3])
}

// ---------------------------------------------------------------------------
// Multiplication matrices
// ---------------------------------------------------------------------------

/// `L(q)`: left multiplication, `L(q1) * q2 == q1 ⊗ q2`.
pub fn lmat(q: &Quat) -> Matrix4<f64> {
    let (w, x, y, z) = (q[0], q[1], q[2], q[3]);
    Matrix4::new(
        w, -x, -y, -z, //
        x, w, -z, y, //
        y, z, w, -x, //
        z, -y, x, w,
    )
}

/// `R(q)`: right multiplication, `R(q2) * q1 == q1 ⊗ q2`.
pub fn rmat(q: &Quat) -> Matrix4<f64> {
    let (w, x, y, z) = (q[0], q[1], q[2], q[3]);
    Matrix4::new(
        w, -x, -y, -z, //
        x, w, z, -y, //
        y, -z, w, x, //
        z, y, -x, w,
    )
}

/// Hamilton product `q1 ⊗ q2`: rotate by `q2`, then by `q1`.
pub fn compose(q1: &Quat, q2: &Quat) -> Quat {
    lmat(q1) * q2
}

// ---------------------------------------------------------------------------
// Rotation matrix and attitude Jacobian
// ---------------------------------------------------------------------------

/// `Q(q) = Hᵀ R(q)ᵀ L(q) H`, the body→world rotation matrix of `q`.
pub fn rotation_matrix(q: &Quat) -> Matrix3<f64> {
    let h = h_matrix();
    h.transpose() * rmat(q).transpose() * lmat(q) * h
}

/// `G(q) = L(q) H`, maps body angular velocity to quaternion rate.
pub fn attitude_jacobian(q: &Quat) -> Matrix4x3<f64> {
    lmat(q) * h_matrix()
}

/// Quaternion kinematics `q̇ = ½ G(q) ω_body`.
pub fn kinematics(q: &Quat, omega_body: &Vector3<f64>) -> Quat {
    0.5 * attitude_jacobian(q) * omega_body
}

// ---------------------------------------------------------------------------
// Construction and norm handling
// ---------------------------------------------------------------------------

/// Rotation of `angle` radians about `axis`. A zero axis gives the identity.
pub fn from_axis_angle(axis: &Vector3<f64>, angle: f64) -> Quat {
    let n = axis.norm();
    if n < f64::EPSILON {
        return identity();
    }
    let half = 0.5 * angle;
    let v = axis * (half.sin() / n);
    Vector4::new(half.cos(), v.x, v.y, v.z)
}

/// `| |q| - 1 |`.
pub fn norm_error(q: &Quat) -> f64 {
    (q.norm() - 1.0).abs()
}

/// Rescale to unit norm. Returns `None` for a (near-)zero quaternion.
pub fn normalize(q: &Quat) -> Option<Quat> {
    let n = q.norm();
    if n < f64::EPSILON || !n.is_finite() {
        None
    } else {
        Some(q / n)
    }
}

/// Convert to nalgebra's unit quaternion (which stores `[x, y, z, w]`).
pub fn to_unit_quaternion(q: &Quat) -> UnitQuaternion<f64> {
    UnitQuaternion::new_normalize(Quaternion::new(q[0], q[1], q[2], q[3]))
}

/// Convert from nalgebra's unit quaternion.
pub fn from_unit_quaternion(q: &UnitQuaternion<f64>) -> Quat {
    Vector4::new(q.w, q.i, q.j, q.k)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
