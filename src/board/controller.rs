//! Per-board tick driver: surface sampling, velocity estimation, input dispatch and
//! sequence advancement, in that order.

use nalgebra::Vector3;
use tracing::{debug, warn};

use super::balance::BodyBalance;
use super::body::{BoardBody, BodyState, CollisionQuery};
use super::control::{BoardControl, BoardMode, BoardState, ControlFrame};
use super::hover::HoverController;
use super::input::BoardInput;
use super::surface::SurfaceState;
use super::velocity::VelocityEstimator;
use crate::config::{BoardConfig, ConfigError};

#[derive(Debug, Clone)]
pub struct BoardController {
    hover: HoverController,
    velocity: VelocityEstimator,
    control: BoardControl,
    balance: Option<BodyBalance>,
}

impl BoardController {
    pub fn new(config: &BoardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            hover: HoverController::new(&config.hover)?,
            velocity: VelocityEstimator::new(),
            control: BoardControl::new(config)?,
            balance: config.balance.as_ref().map(BodyBalance::new).transpose()?,
        })
    }

    /// Runs one control tick against `body`. Forces are buffered in `body`; the caller
    /// applies them before stepping physics.
    pub fn tick<B, Q>(&mut self, body: &mut B, query: &Q, input: &BoardInput, dt: f32) -> SurfaceState
    where
        B: BoardBody + ?Sized,
        Q: CollisionQuery + ?Sized,
    {
        let was_grounded = self.hover.is_grounded();
        let surface = self.hover.tick(body, query, dt);
        if surface.is_supported != was_grounded {
            debug!(grounded = surface.is_supported, "Surface contact changed");
        }

        let state = *body.state();
        self.velocity.update(state.position, state.rotation, dt);

        let input = input.sanitized();
        let mut frame = ControlFrame::new(body, &mut self.hover, self.velocity.velocity());

        if self.control.mode() == BoardMode::Grounded {
            let tilted = surface.is_supported && self.control.exceeds_tilt(&state, &surface.normal);
            if tilted {
                warn!("Tilt limit exceeded, wiping out");
            }
            if tilted || input.wipeout {
                self.control.trigger_wipeout(&mut frame);
            }
        }

        if !self.control.is_wiping_out() {
            let board_up = state.up();
            let (roll, pitch) = input.board_lean(&board_up, &frame.board_forward(), &frame.board_right());

            self.control.lean(&mut frame, roll, pitch);
            self.control.carved_turn(&mut frame, roll);
            self.control.skidded_turn(&mut frame, input.turn);
            if roll == 0.0 && input.turn == 0.0 {
                self.control.drift_correction(&mut frame);
            }
            if input.accelerate {
                self.control.drive(&mut frame);
            }
            self.control.jump(input.jump);
            if input.flip_over.pressed() {
                self.control.flip_over(&mut frame);
            }
        }

        self.control.advance(&mut frame, dt);
        surface
    }

    /// Runs the rider balance loop, if this board carries a rider.
    pub fn tick_rider<B: BoardBody + ?Sized>(&mut self, rider: &mut B, board: &BodyState, dt: f32) -> Option<Vector3<f32>> {
        self.balance.as_mut().map(|b| b.tick(rider, board, dt))
    }

    pub fn has_rider(&self) -> bool {
        self.balance.is_some()
    }

    pub fn state(&self) -> BoardState {
        BoardState {
            mode: self.control.mode(),
            velocity: self.velocity.velocity(),
            angular_velocity: self.velocity.angular_velocity(),
            hover_height_scalar: self.hover.height_scalar(),
            jump_charge_time: self.control.jump_charge_time(),
        }
    }

    pub fn mode(&self) -> BoardMode {
        self.control.mode()
    }

    pub fn is_grounded(&self) -> bool {
        self.hover.is_grounded()
    }

    pub fn surface_normal(&self) -> Vector3<f32> {
        self.hover.surface_normal()
    }

    pub fn velocity(&self) -> Vector3<f32> {
        self.velocity.velocity()
    }

    pub fn angular_velocity(&self) -> Vector3<f32> {
        self.velocity.angular_velocity()
    }

    pub fn hover(&self) -> &HoverController {
        &self.hover
    }

    pub fn control(&self) -> &BoardControl {
        &self.control
    }

    /// Returns every component to its freshly constructed state, with velocity history
    /// seeded at `pose`.
    pub fn reset(&mut self, pose: &BodyState) {
        self.hover.reset();
        self.velocity.reset_to(pose.position, pose.rotation);
        self.control.reset();
        if let Some(balance) = &mut self.balance {
            balance.reset();
        }
    }
}
