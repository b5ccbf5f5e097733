/// Acceleration along one axis of a block sliding on a surface.
///
/// `applied` is the driving force, `limit` the Coulomb friction bound `mu * N`.
/// At rest the block sticks until `|applied|` exceeds `limit`. While sliding,
/// kinetic friction opposes `velocity`; if the applied force alone could not
/// keep the block moving, the net deceleration is capped at
/// `|velocity| / stop_horizon` so friction brings the block to rest instead of
/// pushing it back the other way.
pub fn coulomb_accel(applied: f64, velocity: f64, limit: f64, mass: f64, stop_horizon: f64) -> f64 {
    if velocity == 0.0 {
        if applied.abs() <= limit {
            return 0.0;
        }
        return (applied - applied.signum() * limit) / mass;
    }

    let dir = velocity.signum();
    let accel = (applied - dir * limit) / mass;
    let decelerating = accel * dir < 0.0;
    if decelerating && applied.abs() <= limit {
        let max_decel = velocity.abs() / stop_horizon;
        -dir * accel.abs().min(max_decel)
    } else {
        accel
    }
}
