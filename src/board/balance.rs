use nalgebra::{UnitQuaternion, Vector3};

use super::body::{BoardBody, BodyState, ForceMode};
use super::pid::Vector3Pid;
use crate::config::{BalanceConfig, ConfigError};

/// Keeps a rider body upright on its board with two summed PID loops: one aligns
/// rider-up with board-up, the other damps the rider's angular velocity.
#[derive(Debug, Clone)]
pub struct BodyBalance {
    up_vector: Vector3Pid,
    angular_velocity: Vector3Pid,
}

impl BodyBalance {
    pub fn new(config: &BalanceConfig) -> Result<Self, ConfigError> {
        config
            .up_vector
            .check()
            .map_err(|r| ConfigError::invalid("balance.up_vector", r))?;
        config
            .angular_velocity
            .check()
            .map_err(|r| ConfigError::invalid("balance.angular_velocity", r))?;
        Ok(Self {
            up_vector: Vector3Pid::new(config.up_vector),
            angular_velocity: Vector3Pid::new(config.angular_velocity),
        })
    }

    /// Must be called whenever balancing (re)starts.
    pub fn reset(&mut self) {
        self.up_vector.reset();
        self.angular_velocity.reset();
    }

    /// Computes this tick's stabilising torque and pushes it into `rider`.
    pub fn tick<B: BoardBody + ?Sized>(&mut self, rider: &mut B, board: &BodyState, dt: f32) -> Vector3<f32> {
        let state = *rider.state();
        let damping = self.angular_velocity.update(-state.angular_velocity, dt);
        let alignment = self.up_vector.update(alignment_error(&state, board), dt);
        let torque = damping + alignment;
        rider.add_torque(torque, ForceMode::Force);
        torque
    }
}

/// Axis-angle rotation taking rider-up onto board-up.
fn alignment_error(rider: &BodyState, board: &BodyState) -> Vector3<f32> {
    let from = rider.up();
    let to = board.up();
    match UnitQuaternion::rotation_between(&from, &to) {
        Some(rotation) => rotation.scaled_axis(),
        // Exactly opposite: any perpendicular axis works.
        None => rider.right() * std::f32::consts::PI,
    }
}
