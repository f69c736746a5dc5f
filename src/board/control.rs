//! Board control state machine and steering primitives.
//!
//! Jump and wipeout are multi-tick sequences. Each carries its own elapsed time and is
//! advanced once per tick by [`BoardControl::advance`]; a new request while one is running
//! is ignored.

use nalgebra::Vector3;
use serde::Serialize;
use tracing::debug;

use super::body::{BoardBody, BodyState, ForceMode};
use super::constants::physics as consts;
use super::convergence::{converge_angular, converge_linear, TimeConstant};
use super::hover::HoverController;
use super::input::ButtonState;
use super::math::{normalize_or, sign, WORLD_UP};
use crate::config::{BoardConfig, ConfigError, FlipConfig, JumpConfig, RealignPolicy, SteeringConfig, WipeoutConfig};

/// Persistent control mode. Flip-over is a one-shot impulse and has no mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardMode {
    #[default]
    Grounded,
    Jumping,
    WipingOut,
}

impl std::fmt::Display for BoardMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BoardMode::Grounded => "grounded",
            BoardMode::Jumping => "jumping",
            BoardMode::WipingOut => "wiping_out",
        };
        f.write_str(name)
    }
}

/// Observable board state for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardState {
    pub mode: BoardMode,
    pub velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
    pub hover_height_scalar: f32,
    pub jump_charge_time: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    /// Jump button held; suspension retracts along the height curve.
    Charging { elapsed: f32, charge: f32, held: bool },
    /// Impulse applied; suspension off until the board clears the ground.
    Takeoff { elapsed: f32 },
    /// `started` is false on the trigger tick, which does not count toward the duration.
    WipingOut { elapsed: f32, started: bool },
}

/// What the state machine acts on during a tick.
pub struct ControlFrame<'a, B: BoardBody + ?Sized> {
    pub body: &'a mut B,
    pub hover: &'a mut HoverController,
    /// Estimated linear velocity for this tick.
    pub velocity: Vector3<f32>,
}

impl<'a, B: BoardBody + ?Sized> ControlFrame<'a, B> {
    pub fn new(body: &'a mut B, hover: &'a mut HoverController, velocity: Vector3<f32>) -> Self {
        Self { body, hover, velocity }
    }

    /// Body forward, flipped to point along the direction of travel.
    pub fn board_forward(&self) -> Vector3<f32> {
        board_forward(self.body.state(), &self.velocity)
    }

    pub fn board_right(&self) -> Vector3<f32> {
        board_right(self.body.state(), &self.velocity)
    }
}

pub fn travel_sign(body: &BodyState, velocity: &Vector3<f32>) -> f32 {
    let forward = body.forward();
    sign(forward.dot(&normalize_or(velocity, forward)))
}

pub fn board_forward(body: &BodyState, velocity: &Vector3<f32>) -> Vector3<f32> {
    body.forward() * travel_sign(body, velocity)
}

pub fn board_right(body: &BodyState, velocity: &Vector3<f32>) -> Vector3<f32> {
    body.right() * travel_sign(body, velocity)
}

/// Body-down: positive rotation about it yaws forward toward right.
fn turn_axis(body: &BodyState) -> Vector3<f32> {
    -body.up()
}

#[derive(Debug, Clone)]
pub struct BoardControl {
    steering: SteeringConfig,
    jump: JumpConfig,
    wipeout: WipeoutConfig,
    flip: FlipConfig,
    skid_turn_speed: f32,
    time_to_skid: TimeConstant,
    time_to_lean: TimeConstant,
    time_to_drive: TimeConstant,
    phase: Phase,
}

impl BoardControl {
    pub fn new(config: &BoardConfig) -> Result<Self, ConfigError> {
        config.steering.validate()?;
        config.jump.validate()?;
        config.wipeout.validate()?;

        let steering = config.steering.clone();
        let time = |field: &str, seconds: f32| {
            TimeConstant::new(seconds).ok_or_else(|| ConfigError::invalid(field, "must be > 0"))
        };
        Ok(Self {
            skid_turn_speed: steering.skid_turn_speed_degrees.to_radians(),
            time_to_skid: time("steering.time_to_skid", steering.time_to_skid)?,
            time_to_lean: time("steering.time_to_lean", steering.time_to_lean)?,
            time_to_drive: time("steering.time_to_drive_speed", steering.time_to_drive_speed)?,
            steering,
            jump: config.jump.clone(),
            wipeout: config.wipeout.clone(),
            flip: config.flip.clone(),
            phase: Phase::Idle,
        })
    }

    pub fn mode(&self) -> BoardMode {
        match self.phase {
            Phase::Idle => BoardMode::Grounded,
            Phase::Charging { .. } | Phase::Takeoff { .. } => BoardMode::Jumping,
            Phase::WipingOut { .. } => BoardMode::WipingOut,
        }
    }

    pub fn is_jumping(&self) -> bool {
        self.mode() == BoardMode::Jumping
    }

    pub fn is_wiping_out(&self) -> bool {
        self.mode() == BoardMode::WipingOut
    }

    /// Seconds the jump button has been held in the current charge, zero otherwise.
    pub fn jump_charge_time(&self) -> f32 {
        match self.phase {
            Phase::Charging { elapsed, .. } => elapsed,
            _ => 0.0,
        }
    }

    pub fn realign_policy(&self) -> RealignPolicy {
        self.steering.realign
    }

    /// Abandons any running sequence and returns to Grounded.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
    }

    // ========================================================================
    // Steering
    // ========================================================================

    /// Rotates heading and, on the ground, scrubs lateral velocity. Positive turns toward
    /// board-right.
    pub fn skidded_turn<B: BoardBody + ?Sized>(&self, frame: &mut ControlFrame<'_, B>, turn: f32) {
        if turn == 0.0 || self.is_wiping_out() {
            return;
        }
        let yaw_axis = turn_axis(frame.body.state());
        converge_angular(&mut *frame.body, &yaw_axis, turn * self.skid_turn_speed, self.time_to_skid);

        if frame.hover.is_grounded() && self.steering.realign != RealignPolicy::Never {
            self.realign(frame, self.time_to_skid);
        }
    }

    /// Arcs the board at `speed / radius`, radius and convergence time from the carve curves.
    pub fn carved_turn<B: BoardBody + ?Sized>(&self, frame: &mut ControlFrame<'_, B>, turn: f32) {
        let amount = turn.abs();
        if amount == 0.0 || self.is_wiping_out() || !frame.hover.is_grounded() {
            return;
        }
        let radius = self.steering.carve_radius.evaluate(amount).max(consts::EPSILON);
        let time = TimeConstant::saturating(self.steering.carve_time.evaluate(amount));

        let angular_speed = frame.velocity.norm() / radius * sign(turn);
        let yaw_axis = turn_axis(frame.body.state());
        converge_angular(&mut *frame.body, &yaw_axis, angular_speed, time);

        if self.steering.realign != RealignPolicy::Never {
            self.realign(frame, time);
        }
    }

    /// Independent roll (about board-forward) and pitch (about board-right) requests.
    pub fn lean<B: BoardBody + ?Sized>(&self, frame: &mut ControlFrame<'_, B>, roll: f32, pitch: f32) {
        if self.is_wiping_out() {
            return;
        }
        if roll != 0.0 {
            let axis = frame.board_forward();
            converge_angular(&mut *frame.body, &axis, roll * self.steering.roll_speed, self.time_to_lean);
        }
        if pitch != 0.0 {
            let axis = frame.board_right();
            converge_angular(&mut *frame.body, &axis, pitch * self.steering.pitch_speed, self.time_to_lean);
        }
    }

    /// Constant-speed drive along board-forward while grounded.
    pub fn drive<B: BoardBody + ?Sized>(&self, frame: &mut ControlFrame<'_, B>) {
        if self.is_wiping_out() || !frame.hover.is_grounded() {
            return;
        }
        let desired = frame.board_forward() * self.steering.drive_speed;
        converge_linear(&mut *frame.body, &frame.velocity, &desired, self.time_to_drive);
    }

    /// Pulls the velocity direction onto board-forward, keeping speed.
    pub fn realign<B: BoardBody + ?Sized>(&self, frame: &mut ControlFrame<'_, B>, time: TimeConstant) {
        let desired = frame.board_forward() * frame.velocity.norm();
        converge_linear(&mut *frame.body, &frame.velocity, &desired, time);
    }

    /// Drift correction for [`RealignPolicy::Always`] on ticks with no turn input.
    pub fn drift_correction<B: BoardBody + ?Sized>(&self, frame: &mut ControlFrame<'_, B>) {
        if self.steering.realign == RealignPolicy::Always
            && !self.is_wiping_out()
            && frame.hover.is_grounded()
        {
            self.realign(frame, self.time_to_skid);
        }
    }

    // ========================================================================
    // Moves
    // ========================================================================

    /// Feeds the jump button. A press from Grounded starts charging; the charge continues
    /// while the button stays down and releases on the first tick it is up.
    pub fn jump(&mut self, button: ButtonState) {
        match self.phase {
            Phase::Idle if button.pressed() => {
                debug!("Jump charge started");
                self.phase = Phase::Charging {
                    elapsed: 0.0,
                    charge: 0.0,
                    held: true,
                };
            }
            Phase::Charging { ref mut held, .. } => *held = button.is_down(),
            _ => {}
        }
    }

    /// Starts the wipeout sequence. Ignored unless Grounded.
    pub fn trigger_wipeout<B: BoardBody + ?Sized>(&mut self, frame: &mut ControlFrame<'_, B>) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        frame.hover.set_enabled(false);

        let up = frame.body.state().up();
        let torque = frame.board_forward().cross(&up) * self.wipeout.torque;
        frame.body.add_torque(torque, ForceMode::Impulse);
        frame.body.add_force(up * self.wipeout.force, ForceMode::Impulse);

        debug!(duration = self.wipeout.duration, "Wipeout started");
        self.phase = Phase::WipingOut {
            elapsed: 0.0,
            started: false,
        };
        true
    }

    /// One-shot righting impulse; only when airborne, upside down and not in a sequence.
    pub fn flip_over<B: BoardBody + ?Sized>(&self, frame: &mut ControlFrame<'_, B>) -> bool {
        let state = *frame.body.state();
        if frame.hover.is_grounded() || self.phase != Phase::Idle || WORLD_UP.dot(&state.up()) >= 0.0 {
            return false;
        }
        frame.body.add_force(WORLD_UP * self.flip.force, ForceMode::Impulse);
        frame.body.add_torque(state.forward() * self.flip.torque, ForceMode::Impulse);
        debug!("Flip over");
        true
    }

    /// Whether body-up has strayed past the configured tilt limit from the surface normal.
    pub fn exceeds_tilt(&self, body: &BodyState, surface_normal: &Vector3<f32>) -> bool {
        let Some(max_degrees) = self.wipeout.max_tilt_degrees else {
            return false;
        };
        let cos = body.up().dot(surface_normal).clamp(-1.0, 1.0);
        cos.acos().to_degrees() > max_degrees
    }

    /// Advances the running sequence by one tick.
    pub fn advance<B: BoardBody + ?Sized>(&mut self, frame: &mut ControlFrame<'_, B>, dt: f32) {
        self.phase = match self.phase {
            Phase::Idle => Phase::Idle,
            Phase::Charging { elapsed, held: true, .. } => {
                let elapsed = elapsed + dt;
                let charge = (elapsed / self.jump.max_duration).clamp(0.0, 1.0);
                frame.hover.set_height_scalar(self.jump.height.evaluate(charge));
                Phase::Charging {
                    elapsed,
                    charge,
                    // Stays held only if the next tick's input says so.
                    held: false,
                }
            }
            Phase::Charging { charge, held: false, .. } => {
                frame.hover.set_height_scalar(1.0);
                frame.hover.set_enabled(false);
                let impulse = frame.hover.surface_normal() * self.jump.force.evaluate(charge);
                frame.body.add_force(impulse, ForceMode::Impulse);
                debug!(charge, impulse = impulse.norm(), "Jump released");
                Phase::Takeoff { elapsed: 0.0 }
            }
            Phase::Takeoff { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed + consts::TIMER_EPSILON >= self.jump.takeoff_duration {
                    frame.hover.set_enabled(true);
                    debug!("Jump takeoff complete");
                    Phase::Idle
                } else {
                    Phase::Takeoff { elapsed }
                }
            }
            Phase::WipingOut { elapsed, started: false } => Phase::WipingOut { elapsed, started: true },
            Phase::WipingOut { elapsed, started: true } => {
                let elapsed = elapsed + dt;
                if elapsed + consts::TIMER_EPSILON >= self.wipeout.duration {
                    frame.hover.set_enabled(true);
                    debug!(grounded = frame.hover.is_grounded(), "Wipeout recovered");
                    Phase::Idle
                } else {
                    Phase::WipingOut { elapsed, started: true }
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::body::{BodyProxy, HalfSpace};
    use nalgebra::{Point3, UnitQuaternion};

    const DT: f32 = 0.02;

    struct Rig {
        control: BoardControl,
        hover: HoverController,
        body: BodyProxy,
    }

    impl Rig {
        fn new(config: BoardConfig) -> Self {
            Self {
                control: BoardControl::new(&config).unwrap(),
                hover: HoverController::new(&config.hover).unwrap(),
                body: BodyProxy::new(BodyState::at(Point3::new(0.0, 0.35, 0.0), UnitQuaternion::identity())),
            }
        }

        fn ground(&mut self, query: &HalfSpace) {
            self.hover.tick(&mut self.body, query, DT);
            self.body.take_commands();
        }

        fn frame(&mut self, velocity: Vector3<f32>) -> ControlFrame<'_, BodyProxy> {
            ControlFrame::new(&mut self.body, &mut self.hover, velocity)
        }
    }

    fn grounded_rig() -> Rig {
        let mut rig = Rig::new(BoardConfig::default());
        rig.ground(&HalfSpace::ground(0.0));
        assert!(rig.hover.is_grounded());
        rig
    }

    #[test]
    fn test_board_forward_flips_when_travelling_backward() {
        let body = BodyState::default();
        assert_eq!(board_forward(&body, &Vector3::new(0.0, 0.0, -3.0)), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(board_forward(&body, &Vector3::new(0.0, 0.0, 3.0)), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(board_right(&body, &Vector3::new(0.0, 0.0, 3.0)), Vector3::new(-1.0, 0.0, 0.0));
        // At rest the body's own axes are used.
        assert_eq!(board_forward(&body, &Vector3::zeros()), body.forward());
    }

    #[test]
    fn test_zero_turn_is_a_no_op() {
        let mut rig = grounded_rig();
        for speed in [0.5, 5.0, 20.0] {
            let control = rig.control.clone();
            let mut frame = rig.frame(Vector3::new(speed, 0.0, -speed));
            control.carved_turn(&mut frame, 0.0);
            control.skidded_turn(&mut frame, 0.0);
            assert!(rig.body.commands().is_empty());
        }
    }

    #[test]
    fn test_carve_turns_at_speed_over_radius() {
        let mut rig = grounded_rig();
        let control = rig.control.clone();
        let mut frame = rig.frame(Vector3::new(0.0, 0.0, -10.0));
        control.carved_turn(&mut frame, 1.0);

        // Full input: radius 6, time 0.3; from rest about body-down -> (10/6)/0.3.
        let torque = rig.body.total_torque(ForceMode::Acceleration);
        assert!((torque.y + (10.0 / 6.0) / 0.3).abs() < 1e-3, "torque {}", torque);
        // Already travelling along board-forward: realignment adds nothing.
        assert!(rig.body.total_force(ForceMode::Acceleration).norm() < 1e-4);
    }

    #[test]
    fn test_carve_requires_ground() {
        let mut rig = Rig::new(BoardConfig::default());
        rig.ground(&HalfSpace::ground(-50.0));
        let control = rig.control.clone();
        let mut frame = rig.frame(Vector3::new(0.0, 0.0, -10.0));
        control.carved_turn(&mut frame, 1.0);
        assert!(rig.body.commands().is_empty());
    }

    #[test]
    fn test_skid_scrubs_lateral_velocity() {
        let mut rig = grounded_rig();
        let control = rig.control.clone();
        let mut frame = rig.frame(Vector3::new(4.0, 0.0, -3.0));
        control.skidded_turn(&mut frame, -0.5);

        // A left turn spins counter-clockwise seen from above, i.e. +Y.
        let torque = rig.body.total_torque(ForceMode::Acceleration);
        let expected = 0.5 * 90.0f32.to_radians() / 0.25;
        assert!((torque.y - expected).abs() < 1e-3);

        // Desired is board-forward * 5 = (0, 0, -5).
        let force = rig.body.total_force(ForceMode::Acceleration);
        assert!((force - Vector3::new(-4.0, 0.0, -2.0) / 0.25).norm() < 1e-3, "force {}", force);
    }

    #[test]
    fn test_never_policy_skips_realignment() {
        let mut config = BoardConfig::default();
        config.steering.realign = RealignPolicy::Never;
        let mut rig = Rig::new(config);
        rig.ground(&HalfSpace::ground(0.0));
        let control = rig.control.clone();
        let mut frame = rig.frame(Vector3::new(4.0, 0.0, -3.0));
        control.skidded_turn(&mut frame, 1.0);
        control.drift_correction(&mut frame);
        assert_eq!(rig.body.total_force(ForceMode::Acceleration), Vector3::zeros());
    }

    #[test]
    fn test_always_policy_corrects_drift_without_turn() {
        let mut config = BoardConfig::default();
        config.steering.realign = RealignPolicy::Always;
        let mut rig = Rig::new(config);
        rig.ground(&HalfSpace::ground(0.0));
        let control = rig.control.clone();
        let mut frame = rig.frame(Vector3::new(4.0, 0.0, -3.0));
        control.drift_correction(&mut frame);
        assert!(rig.body.total_force(ForceMode::Acceleration).x < 0.0);
    }

    #[test]
    fn test_lean_requests_roll_and_pitch() {
        let mut rig = grounded_rig();
        let control = rig.control.clone();
        let mut frame = rig.frame(Vector3::zeros());
        control.lean(&mut frame, 1.0, 0.5);
        // roll: forward (0,0,-1) * 2 / 0.5; pitch: right (1,0,0) * -1 / 0.5
        let torque = rig.body.total_torque(ForceMode::Acceleration);
        assert!((torque - Vector3::new(-2.0, 0.0, -4.0)).norm() < 1e-4, "torque {}", torque);
    }

    #[test]
    fn test_hold_past_max_clamps_height_scalar() {
        let mut rig = grounded_rig();
        let mut control = rig.control.clone();
        control.jump(ButtonState::Pressed);
        assert_eq!(control.mode(), BoardMode::Jumping);

        let ticks = (4.0 / DT) as usize;
        for _ in 0..ticks {
            control.jump(ButtonState::Held);
            let mut frame = rig.frame(Vector3::zeros());
            control.advance(&mut frame, DT);
        }
        let at_end = BoardConfig::default().jump.height.evaluate(1.0);
        assert!((rig.hover.height_scalar() - at_end).abs() < 1e-6);
        assert!(rig.hover.is_enabled());
        assert!(rig.body.commands().is_empty());
    }

    #[test]
    fn test_jump_release_and_takeoff() {
        let mut rig = grounded_rig();
        let mut control = rig.control.clone();
        let config = BoardConfig::default();

        control.jump(ButtonState::Pressed);
        for _ in 0..75 {
            let mut frame = rig.frame(Vector3::zeros());
            control.advance(&mut frame, DT);
            control.jump(ButtonState::Held);
        }
        assert!((control.jump_charge_time() - 1.5).abs() < 1e-3);

        // Re-press while charging is ignored.
        control.jump(ButtonState::Pressed);
        control.jump(ButtonState::Released);
        let mut frame = rig.frame(Vector3::zeros());
        control.advance(&mut frame, DT);

        assert!(!rig.hover.is_enabled());
        assert_eq!(rig.hover.height_scalar(), 1.0);
        let impulse = rig.body.total_force(ForceMode::Impulse);
        let expected = config.jump.force.evaluate(0.5);
        assert!((impulse - Vector3::y() * expected).norm() < 1e-3, "impulse {}", impulse);

        let takeoff_ticks = (config.jump.takeoff_duration / DT).round() as usize;
        for i in 0..takeoff_ticks {
            assert_eq!(control.mode(), BoardMode::Jumping, "tick {}", i);
            control.jump(ButtonState::Pressed);
            let mut frame = rig.frame(Vector3::zeros());
            control.advance(&mut frame, DT);
        }
        assert_eq!(control.mode(), BoardMode::Grounded);
        assert!(rig.hover.is_enabled());
    }

    #[test]
    fn test_wipeout_lasts_its_duration() {
        let mut rig = grounded_rig();
        let mut control = rig.control.clone();
        let mut frame = rig.frame(Vector3::new(0.0, 0.0, -5.0));
        assert!(control.trigger_wipeout(&mut frame));
        assert!(!control.trigger_wipeout(&mut frame));
        assert!(!rig.hover.is_enabled());

        // Impulses along up and about cross(forward, up) = +X.
        assert!((rig.body.total_force(ForceMode::Impulse) - Vector3::new(0.0, 10.0, 0.0)).norm() < 1e-4);
        assert!((rig.body.total_torque(ForceMode::Impulse) - Vector3::new(10.0, 0.0, 0.0)).norm() < 1e-4);

        // The trigger tick's own advance does not count.
        let mut frame = rig.frame(Vector3::zeros());
        control.advance(&mut frame, DT);
        assert!(control.is_wiping_out());

        let mut ticks = 0;
        while control.is_wiping_out() {
            let mut frame = rig.frame(Vector3::zeros());
            control.advance(&mut frame, DT);
            ticks += 1;
            assert!(ticks <= 1000);
        }
        assert_eq!(ticks, (2.0 / DT).round() as usize);
        assert!(rig.hover.is_enabled());
        assert_eq!(control.mode(), BoardMode::Grounded);
    }

    #[test]
    fn test_steering_ignored_while_wiping_out() {
        let mut rig = grounded_rig();
        let mut control = rig.control.clone();
        let mut frame = rig.frame(Vector3::new(0.0, 0.0, -5.0));
        control.trigger_wipeout(&mut frame);
        rig.body.take_commands();

        let mut frame = rig.frame(Vector3::new(0.0, 0.0, -5.0));
        control.skidded_turn(&mut frame, 1.0);
        control.lean(&mut frame, 1.0, 1.0);
        control.jump(ButtonState::Pressed);
        assert!(rig.body.commands().is_empty());
        assert_eq!(control.mode(), BoardMode::WipingOut);
    }

    #[test]
    fn test_flip_only_when_airborne_and_upside_down() {
        let mut rig = Rig::new(BoardConfig::default());
        rig.ground(&HalfSpace::ground(-50.0));
        let control = rig.control.clone();

        let mut frame = rig.frame(Vector3::zeros());
        assert!(!control.flip_over(&mut frame), "upright boards never flip");

        rig.body.state_mut().rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 3.0);
        let mut frame = rig.frame(Vector3::zeros());
        assert!(control.flip_over(&mut frame));
        assert!((rig.body.total_force(ForceMode::Impulse) - Vector3::new(0.0, 30.0, 0.0)).norm() < 1e-4);

        // Upside down under a ceiling: the probes now cast upward and hit it.
        rig.body.take_commands();
        rig.ground(&HalfSpace::new(Point3::new(0.0, 0.6, 0.0), -Vector3::y()));
        assert!(rig.hover.is_grounded());
        let mut frame = rig.frame(Vector3::zeros());
        assert!(!control.flip_over(&mut frame), "grounded boards never flip");
    }

    #[test]
    fn test_tilt_limit() {
        let mut config = BoardConfig::default();
        config.wipeout.max_tilt_degrees = Some(60.0);
        let control = BoardControl::new(&config).unwrap();
        let mut body = BodyState::default();
        assert!(!control.exceeds_tilt(&body, &Vector3::y()));
        body.rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 70.0f32.to_radians());
        assert!(control.exceeds_tilt(&body, &Vector3::y()));
    }

    #[test]
    fn test_reset_returns_to_grounded() {
        let mut rig = grounded_rig();
        let mut control = rig.control.clone();
        let mut frame = rig.frame(Vector3::zeros());
        control.trigger_wipeout(&mut frame);
        control.reset();
        assert_eq!(control.mode(), BoardMode::Grounded);
        assert_eq!(control.jump_charge_time(), 0.0);
    }
}
