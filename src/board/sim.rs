//! Headless world: static environment plus any number of boards, each with its own input.

use tracing::{debug, info};

use super::body::{BodyProxy, BodyState};
use super::constants::physics as consts;
use super::controller::BoardController;
use super::input::BoardInput;
use super::physics::{BoardHandles, EnvironmentPart, PhysicsWorld};
use super::telemetry::Telemetry;
use crate::config::{BoardConfig, ConfigError};

/// Index of a board within its [`Simulation`].
pub type BoardId = usize;

struct BoardSlot {
    handles: BoardHandles,
    controller: BoardController,
    spawn: BodyState,
    body: BodyProxy,
    rider: BodyProxy,
}

pub struct Simulation {
    world: PhysicsWorld,
    boards: Vec<BoardSlot>,
    dt: f32,
    tick: u64,
    time: f32,
}

impl Simulation {
    pub fn new(gravity: f32, dt: f32) -> Self {
        Self {
            world: PhysicsWorld::with_gravity(gravity),
            boards: Vec::new(),
            dt: if dt > consts::EPSILON { dt } else { consts::TIMESTEP },
            tick: 0,
            time: 0.0,
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn board_count(&self) -> usize {
        self.boards.len()
    }

    pub fn add_part(&mut self, part: &EnvironmentPart) {
        self.world.add_part(part);
    }

    /// Adds a board at `spawn`. A rider is attached when the config has a balance section.
    pub fn spawn_board(&mut self, config: &BoardConfig, spawn: BodyState) -> Result<BoardId, ConfigError> {
        let mut controller = BoardController::new(config)?;
        let handles = self.world.add_board(&spawn, controller.has_rider());
        controller.reset(&spawn);

        let id = self.boards.len();
        info!(board = id, rider = handles.rider.is_some(), "Spawned board at {:?}", spawn.position);
        self.boards.push(BoardSlot {
            handles,
            controller,
            spawn,
            body: BodyProxy::new(spawn),
            rider: BodyProxy::default(),
        });
        Ok(id)
    }

    /// Teleports a board back to its spawn pose and resets its controller.
    pub fn respawn(&mut self, id: BoardId) -> bool {
        let Some(spawn) = self.boards.get(id).map(|slot| slot.spawn) else {
            return false;
        };
        self.respawn_at(id, spawn)
    }

    /// Teleports a board to `pose` with zero velocity and resets its controller.
    pub fn respawn_at(&mut self, id: BoardId, pose: BodyState) -> bool {
        let Some(slot) = self.boards.get_mut(id) else {
            return false;
        };
        self.world.teleport_board(&slot.handles, &pose);
        slot.controller.reset(&pose);
        slot.body.refresh(pose);
        debug!(board = id, "Respawned");
        true
    }

    pub fn controller(&self, id: BoardId) -> Option<&BoardController> {
        self.boards.get(id).map(|slot| &slot.controller)
    }

    pub fn body_state(&self, id: BoardId) -> Option<BodyState> {
        self.boards.get(id).and_then(|slot| self.world.state(slot.handles.body))
    }

    pub fn rider_state(&self, id: BoardId) -> Option<BodyState> {
        let rider = self.boards.get(id)?.handles.rider?;
        self.world.state(rider)
    }

    pub fn telemetry(&self, id: BoardId) -> Option<Telemetry> {
        let slot = self.boards.get(id)?;
        let body = self.world.state(slot.handles.body)?;
        Some(Telemetry::capture(id, self.tick, self.time, &slot.controller, &body))
    }

    /// Advances one fixed tick. `inputs[i]` drives board `i`; missing entries are idle.
    ///
    /// Order: refresh queries, run every controller against its snapshot, apply the
    /// buffered forces, then step physics.
    pub fn step(&mut self, inputs: &[BoardInput]) -> Vec<Telemetry> {
        let dt = self.dt;
        self.world.update_queries();

        for (id, slot) in self.boards.iter_mut().enumerate() {
            let Some(state) = self.world.state(slot.handles.body) else {
                continue;
            };
            slot.body.refresh(state);
            let input = inputs.get(id).copied().unwrap_or_default();
            let query = self.world.query(slot.handles.body);
            slot.controller.tick(&mut slot.body, &query, &input, dt);

            if let Some(rider_state) = slot.handles.rider.and_then(|h| self.world.state(h)) {
                slot.rider.refresh(rider_state);
                slot.controller.tick_rider(&mut slot.rider, &state, dt);
            }
        }

        for slot in &mut self.boards {
            let commands = slot.body.take_commands();
            self.world.apply_commands(slot.handles.body, &commands, dt);
            if let Some(rider) = slot.handles.rider {
                let commands = slot.rider.take_commands();
                self.world.apply_commands(rider, &commands, dt);
            }
        }

        self.world.step(dt);
        self.tick += 1;
        self.time += dt;

        (0..self.boards.len()).filter_map(|id| self.telemetry(id)).collect()
    }

    /// Runs `ticks` steps with the same input set, returning the last telemetry.
    pub fn run(&mut self, inputs: &[BoardInput], ticks: usize) -> Vec<Telemetry> {
        let mut last = Vec::new();
        for _ in 0..ticks {
            last = self.step(inputs);
        }
        last
    }
}
