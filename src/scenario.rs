//! Scenario files: terrain plus scripted per-board input, for headless runs.

use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::board::body::BodyState;
use crate::board::constants::physics as consts;
use crate::board::input::{BoardInput, ButtonTracker, StickFrame};
use crate::board::math::{LOCAL_FORWARD, LOCAL_RIGHT};
use crate::board::physics::EnvironmentPart;
use crate::board::sim::Simulation;
use crate::board::telemetry::Telemetry;
use crate::config::{BoardConfig, ConfigError};

/// Input held over `[start, end)` seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSegment {
    pub start: f32,
    pub end: f32,
    #[serde(default)]
    pub lean: [f32; 2],
    #[serde(default)]
    pub turn: f32,
    #[serde(default)]
    pub accelerate: bool,
    #[serde(default)]
    pub jump: bool,
    #[serde(default)]
    pub flip_over: bool,
    #[serde(default)]
    pub wipeout: bool,
}

impl InputSegment {
    fn contains(&self, time: f32) -> bool {
        time >= self.start && time < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardScenario {
    pub spawn: [f32; 3],
    #[serde(default)]
    pub yaw_degrees: f32,
    /// Lean stick follows a fixed camera at this yaw instead of the board.
    #[serde(default)]
    pub camera_yaw_degrees: Option<f32>,
    #[serde(default)]
    pub inputs: Vec<InputSegment>,
}

impl BoardScenario {
    pub fn spawn_pose(&self) -> BodyState {
        let [x, y, z] = self.spawn;
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw_degrees.to_radians());
        BodyState::at(Point3::new(x, y, z), rotation)
    }

    pub fn stick_frame(&self) -> StickFrame {
        match self.camera_yaw_degrees {
            Some(yaw) => {
                let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw.to_radians());
                StickFrame::Camera {
                    forward: rotation * LOCAL_FORWARD,
                    right: rotation * LOCAL_RIGHT,
                }
            }
            None => StickFrame::Board,
        }
    }

    /// Axis values and raw button levels at `time`. Overlapping segments combine: axes
    /// come from the last matching segment, buttons are held if any segment holds them.
    fn levels_at(&self, time: f32) -> InputSegment {
        let mut levels = InputSegment {
            start: time,
            end: time,
            lean: [0.0; 2],
            turn: 0.0,
            accelerate: false,
            jump: false,
            flip_over: false,
            wipeout: false,
        };
        for segment in self.inputs.iter().filter(|s| s.contains(time)) {
            levels.lean = segment.lean;
            levels.turn = segment.turn;
            levels.accelerate |= segment.accelerate;
            levels.jump |= segment.jump;
            levels.flip_over |= segment.flip_over;
            levels.wipeout |= segment.wipeout;
        }
        levels
    }
}

fn default_gravity() -> f32 {
    consts::DEFAULT_GRAVITY
}

fn default_dt() -> f32 {
    consts::TIMESTEP
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    #[serde(default = "default_dt")]
    pub dt: f32,
    /// Seconds to simulate
    pub duration: f32,
    /// Boards whose centre drops below this height are respawned
    #[serde(default)]
    pub respawn_below: Option<f32>,
    #[serde(default)]
    pub parts: Vec<EnvironmentPart>,
    pub boards: Vec<BoardScenario>,
}

impl Scenario {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let scenario: Self =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let scenario: Self = toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(Path::new("<inline>").to_path_buf(), e))?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::invalid("scenario.dt", "must be > 0"));
        }
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return Err(ConfigError::invalid("scenario.duration", "must be >= 0"));
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::invalid("scenario.gravity", "must be finite"));
        }
        if self.boards.is_empty() {
            return Err(ConfigError::invalid("scenario.boards", "at least one board is required"));
        }
        for (i, board) in self.boards.iter().enumerate() {
            for segment in &board.inputs {
                if segment.end < segment.start {
                    return Err(ConfigError::invalid(
                        "scenario.boards.inputs",
                        format!("board {} has a segment ending at {} before it starts at {}", i, segment.end, segment.start),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Flat floor, one board: drive, carve right, skid left, then a charged jump.
    pub fn demo() -> Self {
        let segment = |start: f32, end: f32| InputSegment {
            start,
            end,
            lean: [0.0; 2],
            turn: 0.0,
            accelerate: false,
            jump: false,
            flip_over: false,
            wipeout: false,
        };
        Self {
            name: "demo".to_string(),
            gravity: consts::DEFAULT_GRAVITY,
            dt: consts::TIMESTEP,
            duration: 12.0,
            respawn_below: Some(-20.0),
            parts: vec![EnvironmentPart::floor(400.0, 0.0)],
            boards: vec![BoardScenario {
                spawn: [0.0, 0.5, 0.0],
                yaw_degrees: 0.0,
                camera_yaw_degrees: None,
                inputs: vec![
                    InputSegment { accelerate: true, ..segment(1.0, 9.0) },
                    InputSegment { lean: [0.8, 0.0], ..segment(4.0, 6.0) },
                    InputSegment { turn: -0.6, ..segment(6.5, 7.5) },
                    InputSegment { jump: true, ..segment(9.0, 10.0) },
                ],
            }],
        }
    }

    pub fn tick_count(&self) -> usize {
        (self.duration / self.dt).round() as usize
    }
}

/// Drives a [`Simulation`] from a [`Scenario`], turning button levels into edges.
pub struct ScenarioRunner {
    scenario: Scenario,
    simulation: Simulation,
    jump: Vec<ButtonTracker>,
    flip: Vec<ButtonTracker>,
}

impl ScenarioRunner {
    pub fn new(scenario: Scenario, config: &BoardConfig) -> Result<Self, ConfigError> {
        scenario.validate()?;
        let mut simulation = Simulation::new(scenario.gravity, scenario.dt);
        for part in &scenario.parts {
            simulation.add_part(part);
        }
        for board in &scenario.boards {
            simulation.spawn_board(config, board.spawn_pose())?;
        }
        let boards = scenario.boards.len();
        info!(name = %scenario.name, boards, parts = scenario.parts.len(), "Scenario loaded");
        Ok(Self {
            scenario,
            simulation,
            jump: vec![ButtonTracker::default(); boards],
            flip: vec![ButtonTracker::default(); boards],
        })
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn is_finished(&self) -> bool {
        self.simulation.tick() as usize >= self.scenario.tick_count()
    }

    /// Inputs for the upcoming tick.
    fn inputs(&mut self) -> Vec<BoardInput> {
        let time = self.simulation.time();
        self.scenario
            .boards
            .iter()
            .enumerate()
            .map(|(i, board)| {
                let levels = board.levels_at(time);
                BoardInput {
                    lean: levels.lean,
                    turn: levels.turn,
                    accelerate: levels.accelerate,
                    jump: self.jump[i].update(levels.jump),
                    flip_over: self.flip[i].update(levels.flip_over),
                    wipeout: levels.wipeout,
                    frame: board.stick_frame(),
                }
            })
            .collect()
    }

    /// Advances one tick, respawning boards that fell out of the world.
    pub fn step(&mut self) -> Vec<Telemetry> {
        let inputs = self.inputs();
        let telemetry = self.simulation.step(&inputs);

        if let Some(floor) = self.scenario.respawn_below {
            for t in &telemetry {
                if t.position[1] < floor {
                    info!(board = t.board, "Fell below {}, respawning", floor);
                    self.simulation.respawn(t.board);
                    self.jump[t.board].reset();
                    self.flip[t.board].reset();
                }
            }
        }
        telemetry
    }

    /// Runs to completion, handing every tick's telemetry to `sink`.
    pub fn run<F: FnMut(&[Telemetry])>(&mut self, mut sink: F) {
        while !self.is_finished() {
            let telemetry = self.step();
            sink(&telemetry);
        }
    }
}
