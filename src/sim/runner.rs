use nalgebra::Vector4;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::dynamics::{ControlVector, Dynamics, StateVector};
use crate::error::{require_len, Result, SimError};
use crate::math::quaternion;
use super::config::{QuaternionPolicy, SimConfig};
use super::integrator::Rk4;

// ---------------------------------------------------------------------------
// Trajectory buffer
// ---------------------------------------------------------------------------

/// Ordered states sampled every `dt`, initial condition at index 0.
#[derive(Debug, Clone)]
pub struct Trajectory {
    dt: f64,
    states: Vec<StateVector>,
}

impl Trajectory {
    pub fn new(dt: f64, initial: StateVector) -> Self {
        Self {
            dt,
            states: vec![initial],
        }
    }

    pub fn with_capacity(dt: f64, initial: StateVector, steps: usize) -> Self {
        let mut states = Vec::with_capacity(steps.min(1_000_000) + 1);
        states.push(initial);
        Self { dt, states }
    }

    pub fn push(&mut self, state: StateVector) {
        self.states.push(state);
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of stored states (steps + 1).
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Never true: the initial condition is always present.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[StateVector] {
        &self.states
    }

    pub fn initial(&self) -> &StateVector {
        &self.states[0]
    }

    pub fn last(&self) -> &StateVector {
        &self.states[self.states.len() - 1]
    }

    /// Sample times `k * dt`.
    pub fn times(&self) -> Vec<f64> {
        (0..self.states.len()).map(|k| k as f64 * self.dt).collect()
    }

    /// One state component across the whole trajectory.
    pub fn column(&self, index: usize) -> Option<Vec<f64>> {
        self.states.iter().map(|s| s.get(index).copied()).collect()
    }

    pub fn into_states(self) -> Vec<StateVector> {
        self.states
    }
}

// ---------------------------------------------------------------------------
// Piecewise-constant control schedule
// ---------------------------------------------------------------------------

/// Segments of `(steps, control)` applied in order.
#[derive(Debug, Clone, Default)]
pub struct ControlSchedule {
    segments: Vec<(usize, ControlVector)>,
}

impl ControlSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment holding `control` for `steps` steps.
    pub fn hold(mut self, steps: usize, control: ControlVector) -> Self {
        self.segments.push((steps, control));
        self
    }

    pub fn segments(&self) -> &[(usize, ControlVector)] {
        &self.segments
    }

    pub fn total_steps(&self) -> usize {
        self.segments.iter().map(|(n, _)| n).sum()
    }

    /// Control in effect at step `k`, `None` past the end.
    pub fn control_at(&self, k: usize) -> Option<&ControlVector> {
        let mut start = 0;
        for (n, u) in &self.segments {
            if k < start + n {
                return Some(u);
            }
            start += n;
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Quaternion drift policy
// ---------------------------------------------------------------------------

/// Checks every quaternion block of `state`; returns true if any drifted.
fn enforce_unit_quaternions<M>(
    model: &M,
    state: &mut StateVector,
    policy: QuaternionPolicy,
    tolerance: f64,
) -> Result<bool>
where
    M: Dynamics + ?Sized,
{
    if policy == QuaternionPolicy::Ignore {
        return Ok(false);
    }

    let mut drifted = false;
    for &offset in model.quaternion_offsets() {
        if offset + 4 > state.len() {
            return Err(SimError::incompatible_dimension("quaternion block", offset + 4, state.len()));
        }
        let q = Vector4::new(state[offset], state[offset + 1], state[offset + 2], state[offset + 3]);
        if quaternion::norm_error(&q) <= tolerance {
            continue;
        }
        drifted = true;
        match policy {
            QuaternionPolicy::Ignore | QuaternionPolicy::Warn => {}
            QuaternionPolicy::Renormalize => {
                let unit = quaternion::normalize(&q)
                    .ok_or_else(|| SimError::non_unit_quaternion(offset, q.norm(), tolerance))?;
                state.fixed_rows_mut::<4>(offset).copy_from(&unit);
            }
            QuaternionPolicy::Strict => {
                return Err(SimError::non_unit_quaternion(offset, q.norm(), tolerance));
            }
        }
    }
    Ok(drifted)
}

// ---------------------------------------------------------------------------
// Rollouts
// ---------------------------------------------------------------------------

fn rollout<M, F>(
    model: &M,
    integrator: &Rk4,
    initial: StateVector,
    steps: usize,
    policy: QuaternionPolicy,
    tolerance: f64,
    mut control: F,
) -> Result<Trajectory>
where
    M: Dynamics + ?Sized,
    F: FnMut(usize, &StateVector) -> ControlVector,
{
    require_len("initial state", model.state_dim(), initial.len())?;
    info!(model = model.name(), steps, dt = integrator.dt(), "starting rollout");

    let mut state = initial;
    let mut reported = enforce_unit_quaternions(model, &mut state, policy, tolerance)?;
    let mut trajectory = Trajectory::with_capacity(integrator.dt(), state.clone(), steps);

    for k in 0..steps {
        let u = control(k, &state);
        state = integrator.step(model, &state, &u)?;

        let drifted = enforce_unit_quaternions(model, &mut state, policy, tolerance)?;
        if drifted && !reported && policy == QuaternionPolicy::Warn {
            warn!(model = model.name(), step = k + 1, tolerance, "quaternion norm drifted");
            reported = true;
        }

        trajectory.push(state.clone());
    }

    info!(model = model.name(), states = trajectory.len(), "rollout finished");
    Ok(trajectory)
}

/// Run `steps` RK4 steps from `initial`.
///
/// `control(k, x_k)` supplies the control held during step `k`. Quaternion
/// blocks are neither checked nor renormalized.
pub fn simulate<M, F>(
    model: &M,
    integrator: &Rk4,
    initial: StateVector,
    steps: usize,
    control: F,
) -> Result<Trajectory>
where
    M: Dynamics + ?Sized,
    F: FnMut(usize, &StateVector) -> ControlVector,
{
    rollout(model, integrator, initial, steps, QuaternionPolicy::Ignore, 0.0, control)
}

/// Like [`simulate`], with timestep, step count and quaternion policy from `config`.
pub fn simulate_with_config<M, F>(
    model: &M,
    config: &SimConfig,
    initial: StateVector,
    control: F,
) -> Result<Trajectory>
where
    M: Dynamics + ?Sized,
    F: FnMut(usize, &StateVector) -> ControlVector,
{
    let integrator = config.integrator()?;
    rollout(
        model,
        &integrator,
        initial,
        config.steps,
        config.quaternion_policy,
        config.quaternion_tolerance,
        control,
    )
}

/// Follow a piecewise-constant control schedule to its end.
pub fn simulate_schedule<M>(
    model: &M,
    integrator: &Rk4,
    initial: StateVector,
    schedule: &ControlSchedule,
) -> Result<Trajectory>
where
    M: Dynamics + ?Sized,
{
    for (_, u) in schedule.segments() {
        require_len("control", model.control_dim(), u.len())?;
    }
    let steps = schedule.total_steps();
    let zero = ControlVector::zeros(model.control_dim());
    simulate(model, integrator, initial, steps, |k, _| {
        schedule.control_at(k).unwrap_or(&zero).clone()
    })
}

/// Independent rollouts in parallel, one per initial condition.
///
/// `control(i, k, x_k)` receives the rollout index `i`.
pub fn simulate_batch<M, F>(
    model: &M,
    integrator: &Rk4,
    initials: &[StateVector],
    steps: usize,
    control: F,
) -> Result<Vec<Trajectory>>
where
    M: Dynamics + Sync + ?Sized,
    F: Fn(usize, usize, &StateVector) -> ControlVector + Sync,
{
    initials
        .par_iter()
        .enumerate()
        .map(|(i, x0)| simulate(model, integrator, x0.clone(), steps, |k, x| control(i, k, x)))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::{Model, OrbitalBody, SlidingBox};
    use approx::assert_abs_diff_eq;
    use nalgebra::{DVector, Vector3};

    fn push(fx: f64) -> ControlVector {
        ControlVector::from_vec(vec![fx, 0.0])
    }

    #[test]
    fn frictionless_box_scenario() {
        let model = SlidingBox::new(1.0, 0.0, 9.81).unwrap();
        let rk4 = Rk4::new(0.01).unwrap();
        let traj = simulate(&model, &rk4, DVector::zeros(4), 50, |_, _| push(1.0)).unwrap();

        assert_eq!(traj.len(), 51);
        assert_eq!(traj.initial(), &DVector::<f64>::zeros(4));
        let last = traj.last();
        assert_abs_diff_eq!(last[2], 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(last[0], 0.125, epsilon = 1e-9);
        assert_abs_diff_eq!(traj.times()[50], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn push_then_coast_with_friction_never_reverses() {
        // Reference driver: push for 50 steps, then let friction stop the box
        let model = SlidingBox::default();
        let rk4 = Rk4::new(0.01).unwrap();
        let schedule = ControlSchedule::new().hold(50, push(1.0)).hold(100, push(0.0));
        assert_eq!(schedule.total_steps(), 150);

        let traj = simulate_schedule(&model, &rk4, DVector::zeros(4), &schedule).unwrap();
        assert_eq!(traj.len(), 151);

        let vx = traj.column(2).unwrap();
        // Net push 1 - 0.981 N for 0.5 s
        assert_abs_diff_eq!(vx[50], 0.019 * 0.5, epsilon = 1e-9);
        assert!(vx.iter().all(|&v| v >= 0.0), "friction must not reverse the box");
        assert!(*vx.last().unwrap() < 1e-6, "box should come to rest");

        let px = traj.column(0).unwrap();
        assert!(px.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn schedule_lookup() {
        let schedule = ControlSchedule::new().hold(2, push(1.0)).hold(1, push(2.0));
        assert_eq!(schedule.control_at(0), Some(&push(1.0)));
        assert_eq!(schedule.control_at(1), Some(&push(1.0)));
        assert_eq!(schedule.control_at(2), Some(&push(2.0)));
        assert_eq!(schedule.control_at(3), None);
    }

    #[test]
    fn schedule_with_wrong_control_length_fails() {
        let model = SlidingBox::default();
        let rk4 = Rk4::new(0.01).unwrap();
        let schedule = ControlSchedule::new().hold(3, DVector::zeros(3));
        assert!(matches!(
            simulate_schedule(&model, &rk4, DVector::zeros(4), &schedule),
            Err(SimError::IncompatibleDimension { what: "control", .. })
        ));
    }

    #[test]
    fn wrong_initial_length_fails() {
        let model = SlidingBox::default();
        let rk4 = Rk4::new(0.01).unwrap();
        assert!(simulate(&model, &rk4, DVector::zeros(5), 10, |_, _| push(0.0)).is_err());
    }

    #[test]
    fn column_out_of_range() {
        let traj = Trajectory::new(0.1, DVector::zeros(2));
        assert!(traj.column(5).is_none());
        assert!(!traj.is_empty());
    }

    fn spinning_orbit() -> (Model, DVector<f64>) {
        let body = OrbitalBody::default();
        let x0 = body
            .circular_orbit_state(400_000.0, &quaternion::identity(), &Vector3::new(0.5, -1.0, 2.0))
            .unwrap();
        (body.into(), x0)
    }

    #[test]
    fn circular_orbit_returns_after_one_period() {
        let body = OrbitalBody::default();
        let x0 = body
            .circular_orbit_state(400_000.0, &quaternion::identity(), &Vector3::zeros())
            .unwrap();
        let period = body.orbital_period(400_000.0);
        let steps = 5000;
        let rk4 = Rk4::new(period / steps as f64).unwrap();
        let traj = simulate(&body, &rk4, x0.clone(), steps, |_, _| DVector::zeros(3)).unwrap();

        let (r0, _, _, _) = OrbitalBody::unpack(&x0).unwrap();
        let (r1, _, _, _) = OrbitalBody::unpack(traj.last()).unwrap();
        let relative = (r1 - r0).norm() / (2.0 * std::f64::consts::PI * r0.norm());
        assert!(relative < 2e-4, "relative position error {relative:.2e}");

        let e0 = body.specific_energy(&x0).unwrap();
        let e1 = body.specific_energy(traj.last()).unwrap();
        assert!(((e1 - e0) / e0).abs() < 1e-6);
    }

    #[test]
    fn constant_spin_tracks_axis_angle() {
        let body = OrbitalBody::default();
        let w = Vector3::new(0.0, 0.0, 0.2);
        let x0 = body
            .circular_orbit_state(400_000.0, &quaternion::identity(), &w)
            .unwrap();
        let rk4 = Rk4::new(0.05).unwrap();
        let traj = simulate(&body, &rk4, x0, 100, |_, _| DVector::zeros(3)).unwrap();

        let (_, q, _, _) = OrbitalBody::unpack(traj.last()).unwrap();
        let expected = quaternion::from_axis_angle(&Vector3::z(), 0.2 * 5.0);
        assert_abs_diff_eq!(q, expected, epsilon = 1e-6);
    }

    #[test]
    fn quaternion_drift_without_renormalization() {
        // Large steps on a fast spin make the unconstrained integration drift
        let (model, x0) = spinning_orbit();
        let rk4 = Rk4::new(0.5).unwrap();
        let traj = simulate(&model, &rk4, x0, 200, |_, _| DVector::zeros(3)).unwrap();
        let (_, q, _, _) = OrbitalBody::unpack(traj.last()).unwrap();
        assert!(quaternion::norm_error(&q) > 1e-6, "expected drift, norm {}", q.norm());
    }

    #[test]
    fn renormalize_policy_keeps_unit_norm() {
        let (model, x0) = spinning_orbit();
        let config = SimConfig {
            dt: 0.5,
            steps: 200,
            quaternion_tolerance: 1e-9,
            quaternion_policy: QuaternionPolicy::Renormalize,
        };
        let traj = simulate_with_config(&model, &config, x0, |_, _| DVector::zeros(3)).unwrap();
        for s in traj.states() {
            let (_, q, _, _) = OrbitalBody::unpack(s).unwrap();
            assert!(quaternion::norm_error(&q) <= 1e-9);
        }
    }

    #[test]
    fn strict_policy_reports_drift() {
        let (model, x0) = spinning_orbit();
        let config = SimConfig {
            dt: 0.5,
            steps: 200,
            quaternion_tolerance: 1e-9,
            quaternion_policy: QuaternionPolicy::Strict,
        };
        let err = simulate_with_config(&model, &config, x0, |_, _| DVector::zeros(3)).unwrap_err();
        assert!(matches!(err, SimError::NonUnitQuaternion { offset: 3, .. }));
    }

    #[test]
    fn warn_policy_continues() {
        let (model, x0) = spinning_orbit();
        let config = SimConfig {
            dt: 0.5,
            steps: 200,
            quaternion_tolerance: 1e-9,
            quaternion_policy: QuaternionPolicy::Warn,
        };
        let traj = simulate_with_config(&model, &config, x0, |_, _| DVector::zeros(3)).unwrap();
        assert_eq!(traj.len(), 201);
    }

    #[test]
    fn strict_policy_rejects_unnormalized_initial_attitude() {
        let body = OrbitalBody::default();
        let x0 = body
            .circular_orbit_state(0.0, &Vector4::new(1.0, 1.0, 1.0, 1.0), &Vector3::zeros())
            .unwrap();
        let config = SimConfig { quaternion_policy: QuaternionPolicy::Strict, ..SimConfig::default() };
        assert!(simulate_with_config(&body, &config, x0, |_, _| DVector::zeros(3)).is_err());
    }

    /// Claims a quaternion block that runs past the end of its state.
    struct MisplacedQuaternion;

    impl Dynamics for MisplacedQuaternion {
        fn state_dim(&self) -> usize {
            4
        }
        fn control_dim(&self) -> usize {
            0
        }
        fn derivative(&self, _state: &StateVector, _control: &ControlVector) -> StateVector {
            StateVector::zeros(4)
        }
        fn state_labels(&self) -> &'static [&'static str] {
            &["a", "b", "c", "d"]
        }
        fn quaternion_offsets(&self) -> &'static [usize] {
            &[2]
        }
    }

    #[test]
    fn quaternion_offset_past_state_end_is_an_error() {
        let x0 = StateVector::from_vec(vec![0.0, 0.0, 1.0, 0.0]);
        let config = SimConfig { steps: 3, ..SimConfig::default() };
        let err = simulate_with_config(&MisplacedQuaternion, &config, x0.clone(), |_, _| {
            ControlVector::zeros(0)
        })
        .unwrap_err();
        assert!(matches!(
            err,
            SimError::IncompatibleDimension { what: "quaternion block", expected: 6, actual: 4 }
        ));

        // Ignore never reads the blocks
        let config = SimConfig { quaternion_policy: QuaternionPolicy::Ignore, ..config };
        let traj =
            simulate_with_config(&MisplacedQuaternion, &config, x0, |_, _| ControlVector::zeros(0))
                .unwrap();
        assert_eq!(traj.len(), 4);
    }

    #[test]
    fn batch_matches_sequential() {
        let model = SlidingBox::default();
        let rk4 = Rk4::new(0.01).unwrap();
        let initials: Vec<DVector<f64>> = (0..8)
            .map(|i| DVector::from_vec(vec![0.0, 0.0, 0.1 * i as f64, 0.0]))
            .collect();
        let control = |i: usize, _k: usize, _x: &DVector<f64>| push(0.5 * i as f64);

        let batch = simulate_batch(&model, &rk4, &initials, 40, control).unwrap();
        assert_eq!(batch.len(), initials.len());
        for (i, traj) in batch.iter().enumerate() {
            let seq = simulate(&model, &rk4, initials[i].clone(), 40, |k, x| control(i, k, x)).unwrap();
            assert_eq!(traj.states(), seq.states());
        }
    }

    #[test]
    fn batch_propagates_errors() {
        let model = SlidingBox::default();
        let rk4 = Rk4::new(0.01).unwrap();
        let initials = vec![DVector::zeros(4), DVector::zeros(2)];
        assert!(simulate_batch(&model, &rk4, &initials, 5, |_, _, _| push(0.0)).is_err());
    }
}
