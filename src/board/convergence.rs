//! First-order convergence toward a desired linear or angular velocity.
//!
//! Each request produces `(desired - current) / T` as an acceleration, so under a constant
//! target the gap closes by ~63% every `T` seconds. `T` is a per-action tunable.

use nalgebra::Vector3;

use super::body::{BoardBody, ForceMode};
use super::math::project;

/// Smallest time constant a runtime-evaluated curve may produce.
pub const MIN_TIME_CONSTANT: f32 = 1.0e-3;

/// Strictly positive, finite convergence time in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeConstant(f32);

impl TimeConstant {
    /// Rejects non-positive or non-finite values.
    pub fn new(seconds: f32) -> Option<Self> {
        (seconds.is_finite() && seconds > 0.0).then_some(Self(seconds))
    }

    /// Clamps into the valid range; for values produced by already-validated curves.
    pub fn saturating(seconds: f32) -> Self {
        if seconds.is_finite() {
            Self(seconds.max(MIN_TIME_CONSTANT))
        } else {
            Self(MIN_TIME_CONSTANT)
        }
    }

    pub fn seconds(self) -> f32 {
        self.0
    }
}

/// Acceleration that moves `current` toward `desired` with time constant `t`.
pub fn linear_acceleration(
    current: &Vector3<f32>,
    desired: &Vector3<f32>,
    t: TimeConstant,
) -> Vector3<f32> {
    (desired - current) / t.seconds()
}

/// Angular acceleration about `axis` that moves the axis component of `current` toward
/// `axis * desired_speed`. Components of `current` off the axis are left alone.
pub fn angular_acceleration(
    current: &Vector3<f32>,
    axis: &Vector3<f32>,
    desired_speed: f32,
    t: TimeConstant,
) -> Vector3<f32> {
    let on_axis = project(current, axis);
    (axis * desired_speed - on_axis) / t.seconds()
}

/// Pushes a linear convergence request into `body`. Returns the applied acceleration.
pub fn converge_linear<B: BoardBody + ?Sized>(
    body: &mut B,
    current: &Vector3<f32>,
    desired: &Vector3<f32>,
    t: TimeConstant,
) -> Vector3<f32> {
    let accel = linear_acceleration(current, desired, t);
    body.add_force(accel, ForceMode::Acceleration);
    accel
}

/// Pushes an angular convergence request into `body`, reading the body's own angular
/// velocity. Returns the applied angular acceleration.
pub fn converge_angular<B: BoardBody + ?Sized>(
    body: &mut B,
    axis: &Vector3<f32>,
    desired_speed: f32,
    t: TimeConstant,
) -> Vector3<f32> {
    let current = body.state().angular_velocity;
    let accel = angular_acceleration(&current, axis, desired_speed, t);
    body.add_torque(accel, ForceMode::Acceleration);
    accel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::body::{BodyProxy, BodyState};

    #[test]
    fn test_time_constant_rejects_non_positive() {
        assert!(TimeConstant::new(0.0).is_none());
        assert!(TimeConstant::new(-1.0).is_none());
        assert!(TimeConstant::new(f32::NAN).is_none());
        assert!(TimeConstant::new(f32::INFINITY).is_none());
        assert_eq!(TimeConstant::new(0.5).unwrap().seconds(), 0.5);
        assert_eq!(TimeConstant::saturating(-2.0).seconds(), MIN_TIME_CONSTANT);
    }

    #[test]
    fn test_force_from_rest_points_at_target() {
        let desired = Vector3::new(3.0, 0.0, 4.0);
        let t = TimeConstant::new(0.5).unwrap();
        let accel = linear_acceleration(&Vector3::zeros(), &desired, t);
        assert!((accel.normalize() - desired.normalize()).norm() < 1e-6);
        assert!((accel.norm() - desired.norm() / 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_torque_only_touches_axis_component() {
        let current = Vector3::new(2.0, 1.0, 0.0);
        let t = TimeConstant::new(1.0).unwrap();
        let accel = angular_acceleration(&current, &Vector3::y(), 3.0, t);
        assert_eq!(accel, Vector3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_at_target_is_zero() {
        let v = Vector3::new(1.0, -2.0, 0.5);
        let t = TimeConstant::new(0.2).unwrap();
        assert_eq!(linear_acceleration(&v, &v, t), Vector3::zeros());
    }

    #[test]
    fn test_converge_angular_reads_body() {
        let mut state = BodyState::default();
        state.angular_velocity = Vector3::new(0.0, 1.0, 0.0);
        let mut body = BodyProxy::new(state);
        let t = TimeConstant::new(0.5).unwrap();
        converge_angular(&mut body, &Vector3::y(), 2.0, t);
        assert_eq!(body.total_torque(ForceMode::Acceleration), Vector3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_exponential_approach_over_one_time_constant() {
        // Integrate dv/dt = (target - v) / T with a small step.
        let t = TimeConstant::new(0.5).unwrap();
        let target = Vector3::new(10.0, 0.0, 0.0);
        let mut v = Vector3::zeros();
        let dt = 0.0005;
        for _ in 0..1000 {
            v += linear_acceleration(&v, &target, t) * dt;
        }
        // After T seconds ≈ 1 - e^-1 of the gap is closed.
        assert!((v.x / 10.0 - 0.632).abs() < 0.01, "got {}", v.x);
    }
}
