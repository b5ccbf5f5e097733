use nalgebra::DVector;

// ---------------------------------------------------------------------------
// State and control vectors
// ---------------------------------------------------------------------------

/// Fixed-length state; layout is documented by each model.
pub type StateVector = DVector<f64>;

/// Fixed-length control input, held constant over one step.
pub type ControlVector = DVector<f64>;
