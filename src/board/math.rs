use nalgebra::{UnitQuaternion, Vector3};
use std::f32::consts::PI;

use super::constants::physics as consts;

/// Body-local forward axis (-Z, right-handed, Y up).
pub const LOCAL_FORWARD: Vector3<f32> = Vector3::new(0.0, 0.0, -1.0);

/// Body-local up axis.
pub const LOCAL_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

/// Body-local right axis (forward × up).
pub const LOCAL_RIGHT: Vector3<f32> = Vector3::new(1.0, 0.0, 0.0);

/// World up.
pub const WORLD_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

/// Normalizes `v`, returning `fallback` when its magnitude is too small to trust.
pub fn normalize_or(v: &Vector3<f32>, fallback: Vector3<f32>) -> Vector3<f32> {
    let mag = v.magnitude();
    if mag > consts::EPSILON {
        v / mag
    } else {
        fallback
    }
}

/// Component of `v` along `axis` (axis need not be unit length).
pub fn project(v: &Vector3<f32>, axis: &Vector3<f32>) -> Vector3<f32> {
    let len_sq = axis.norm_squared();
    if len_sq < consts::EPSILON * consts::EPSILON {
        return Vector3::zeros();
    }
    axis * (v.dot(axis) / len_sq)
}

/// `v` with its component along `normal` removed.
pub fn project_on_plane(v: &Vector3<f32>, normal: &Vector3<f32>) -> Vector3<f32> {
    v - project(v, normal)
}

/// Sign with zero mapped to +1, matching the usual game-engine convention.
pub fn sign(x: f32) -> f32 {
    if x >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Wraps an angle in radians into (-π, π].
pub fn wrap_angle(angle: f32) -> f32 {
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

/// Rotates a body-local axis into world space.
pub fn world_axis(rotation: &UnitQuaternion<f32>, local: Vector3<f32>) -> Vector3<f32> {
    rotation * local
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub fn to_array(v: &Vector3<f32>) -> [f32; 3] {
    [v.x, v.y, v.z]
}

pub fn from_array(a: [f32; 3]) -> Vector3<f32> {
    Vector3::new(a[0], a[1], a[2])
}
