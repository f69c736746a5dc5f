use nalgebra::{Point3, UnitQuaternion, Vector3};

use super::constants::physics as consts;
use super::math::{wrap_angle, LOCAL_UP};

/// Finite-difference velocity observer.
///
/// Works from poses alone so it reports the same thing whether the body is kinematic or
/// force-driven. Runs every tick regardless of control mode.
#[derive(Debug, Clone)]
pub struct VelocityEstimator {
    previous_position: Option<Point3<f32>>,
    previous_rotation: Option<UnitQuaternion<f32>>,
    velocity: Vector3<f32>,
    angular_velocity: Vector3<f32>,
}

impl VelocityEstimator {
    pub fn new() -> Self {
        Self {
            previous_position: None,
            previous_rotation: None,
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
        }
    }

    /// Forgets history; the next sample only seeds it.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Seeds history with a known pose and zero velocity (teleport/respawn).
    pub fn reset_to(&mut self, position: Point3<f32>, rotation: UnitQuaternion<f32>) {
        self.reset();
        self.previous_position = Some(position);
        self.previous_rotation = Some(rotation);
    }

    /// Feeds the current pose. The first sample after a reset yields zero velocity.
    pub fn update(&mut self, position: Point3<f32>, rotation: UnitQuaternion<f32>, dt: f32) {
        if dt > consts::EPSILON {
            if let Some(prev) = self.previous_position {
                self.velocity = (position - prev) / dt;
            }
            if let Some(prev) = self.previous_rotation {
                self.angular_velocity = yaw_rate(&prev, &rotation, dt);
            }
        }
        self.previous_position = Some(position);
        self.previous_rotation = Some(rotation);
    }

    pub fn velocity(&self) -> Vector3<f32> {
        self.velocity
    }

    /// Rotation rate about the body's own up axis, as a world-space vector.
    pub fn angular_velocity(&self) -> Vector3<f32> {
        self.angular_velocity
    }
}

impl Default for VelocityEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Signed rotation between two orientations projected on the current local up, per second.
fn yaw_rate(previous: &UnitQuaternion<f32>, current: &UnitQuaternion<f32>, dt: f32) -> Vector3<f32> {
    let delta = current * previous.inverse();
    let up = current * LOCAL_UP;
    let Some((axis, angle)) = delta.axis_angle() else {
        return Vector3::zeros();
    };
    let signed = wrap_angle(angle) * axis.dot(&up);
    up * (signed / dt)
}
