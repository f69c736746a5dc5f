use serde::Serialize;

use super::body::BodyState;
use super::constants::physics as consts;
use super::control::BoardMode;
use super::controller::BoardController;
use super::math::to_array;

/// Per-tick snapshot of one board, as read by HUD/camera style consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    pub board: usize,
    pub tick: u64,
    pub time: f32,
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub speed: f32,
    pub speed_mph: f32,
    /// Signed rotation rate about body-up, rad/s.
    pub yaw_rate: f32,
    pub grounded: bool,
    pub surface_normal: [f32; 3],
    pub mode: BoardMode,
    pub hover_height_scalar: f32,
}

impl Telemetry {
    pub fn capture(board: usize, tick: u64, time: f32, controller: &BoardController, body: &BodyState) -> Self {
        let state = controller.state();
        let speed = state.velocity.norm();
        Self {
            board,
            tick,
            time,
            position: to_array(&body.position.coords),
            velocity: to_array(&state.velocity),
            speed,
            speed_mph: speed * consts::MPS_TO_MPH,
            yaw_rate: state.angular_velocity.dot(&body.up()),
            grounded: controller.is_grounded(),
            surface_normal: to_array(&controller.surface_normal()),
            mode: state.mode,
            hover_height_scalar: state.hover_height_scalar,
        }
    }

    /// One-line human readable rendering.
    pub fn summary(&self) -> String {
        format!(
            "[{:>5}] t={:>6.2}s board={} pos=({:.2}, {:.2}, {:.2}) speed={:.2} m/s ({:.1} mph) yaw={:+.2} rad/s {} {}",
            self.tick,
            self.time,
            self.board,
            self.position[0],
            self.position[1],
            self.position[2],
            self.speed,
            self.speed_mph,
            self.yaw_rate,
            if self.grounded { "grounded" } else { "airborne" },
            self.mode,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;

    #[test]
    fn test_capture_fresh_controller() {
        let controller = BoardController::new(&BoardConfig::default()).unwrap();
        let body = BodyState::default();
        let t = Telemetry::capture(2, 7, 0.14, &controller, &body);
        assert_eq!(t.board, 2);
        assert_eq!(t.speed, 0.0);
        assert_eq!(t.mode, BoardMode::Grounded);
        assert!(!t.grounded);
        assert_eq!(t.surface_normal, [0.0, 1.0, 0.0]);

        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"mode\":\"grounded\""));
        assert!(t.summary().contains("airborne"));
    }
}
