//! Board configuration parsing from board.toml files

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::board::constants::{hover as hover_consts, moves as move_consts, steering as steer_consts};
use crate::board::curve::ResponseCurve;
use crate::board::math::LOCAL_UP;
use crate::board::pid::PidConfig;
use crate::board::surface::ProbeShape;

/// One hover probe attachment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub name: String,
    /// Body-local attachment point
    pub offset: [f32; 3],
    /// Body-local probe up; the probe casts along its negation
    #[serde(default = "default_probe_up")]
    pub up: [f32; 3],
}

fn default_probe_up() -> [f32; 3] {
    [LOCAL_UP.x, LOCAL_UP.y, LOCAL_UP.z]
}

impl ProbeConfig {
    pub fn at(name: &str, offset: [f32; 3]) -> Self {
        Self {
            name: name.to_string(),
            offset,
            up: default_probe_up(),
        }
    }
}

/// Hover suspension section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    pub target_height: f32,
    pub damping_distance: f32,
    pub hover_speed: f32,
    /// Optional cap on `hover_speed`
    pub max_speed: Option<f32>,
    pub probe_distance: f32,
    pub probe_start_offset: f32,
    pub probe_shape: ProbeShape,
    pub probes: Vec<ProbeConfig>,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            target_height: hover_consts::DEFAULT_TARGET_HEIGHT,
            damping_distance: hover_consts::DEFAULT_DAMPING_DISTANCE,
            hover_speed: hover_consts::DEFAULT_HOVER_SPEED,
            max_speed: None,
            probe_distance: hover_consts::DEFAULT_PROBE_DISTANCE,
            probe_start_offset: hover_consts::DEFAULT_PROBE_START_OFFSET,
            probe_shape: ProbeShape::Ray,
            probes: vec![
                ProbeConfig::at("front_left", [-0.12, -0.03, -0.5]),
                ProbeConfig::at("front_right", [0.12, -0.03, -0.5]),
                ProbeConfig::at("back_left", [-0.12, -0.03, 0.5]),
                ProbeConfig::at("back_right", [0.12, -0.03, 0.5]),
            ],
        }
    }
}

impl HoverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("hover.target_height", self.target_height)?;
        positive("hover.damping_distance", self.damping_distance)?;
        positive("hover.hover_speed", self.hover_speed)?;
        if let Some(max) = self.max_speed {
            positive("hover.max_speed", max)?;
        }
        positive("hover.probe_distance", self.probe_distance)?;
        non_negative("hover.probe_start_offset", self.probe_start_offset)?;
        if let ProbeShape::Sphere { radius } = self.probe_shape {
            positive("hover.probe_shape.radius", radius)?;
        }
        if self.probes.is_empty() {
            return Err(ConfigError::invalid("hover.probes", "at least one probe is required"));
        }
        for probe in &self.probes {
            let up = probe.up;
            if (up[0] * up[0] + up[1] * up[1] + up[2] * up[2]).sqrt() < 1.0e-3 {
                return Err(ConfigError::invalid(
                    "hover.probes.up",
                    format!("probe '{}' has a zero up axis", probe.name),
                ));
            }
        }
        Ok(())
    }
}

/// When carve/skid calls also pull the linear velocity onto board-forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RealignPolicy {
    /// Only while the turn input is non-zero
    #[default]
    WhileTurning,
    /// Every grounded steering tick, as drift correction
    Always,
    /// Never; the turn only rotates the board
    Never,
}

/// Steering section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Skid yaw rate at full input, degrees/second
    pub skid_turn_speed_degrees: f32,
    pub time_to_skid: f32,
    /// Carve radius (m) as a function of |turn|
    pub carve_radius: ResponseCurve,
    /// Carve convergence time (s) as a function of |turn|
    pub carve_time: ResponseCurve,
    pub roll_speed: f32,
    pub pitch_speed: f32,
    pub time_to_lean: f32,
    pub drive_speed: f32,
    pub time_to_drive_speed: f32,
    pub realign: RealignPolicy,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            skid_turn_speed_degrees: steer_consts::DEFAULT_SKID_TURN_SPEED_DEGREES,
            time_to_skid: steer_consts::DEFAULT_TIME_TO_SKID,
            carve_radius: ResponseCurve::linear(
                steer_consts::DEFAULT_CARVE_RADIUS_MIN,
                steer_consts::DEFAULT_CARVE_RADIUS_MAX,
            ),
            carve_time: ResponseCurve::linear(
                steer_consts::DEFAULT_CARVE_TIME_MIN,
                steer_consts::DEFAULT_CARVE_TIME_MAX,
            ),
            roll_speed: steer_consts::DEFAULT_ROLL_SPEED,
            pitch_speed: steer_consts::DEFAULT_PITCH_SPEED,
            time_to_lean: steer_consts::DEFAULT_TIME_TO_LEAN,
            drive_speed: steer_consts::DEFAULT_DRIVE_SPEED,
            time_to_drive_speed: steer_consts::DEFAULT_TIME_TO_DRIVE_SPEED,
            realign: RealignPolicy::default(),
        }
    }
}

impl SteeringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("steering.skid_turn_speed_degrees", self.skid_turn_speed_degrees)?;
        positive("steering.time_to_skid", self.time_to_skid)?;
        positive("steering.time_to_lean", self.time_to_lean)?;
        positive("steering.time_to_drive_speed", self.time_to_drive_speed)?;
        finite("steering.roll_speed", self.roll_speed)?;
        finite("steering.pitch_speed", self.pitch_speed)?;
        non_negative("steering.drive_speed", self.drive_speed)?;
        positive_curve("steering.carve_radius", &self.carve_radius)?;
        positive_curve("steering.carve_time", &self.carve_time)
    }
}

/// Jump section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    /// Hover height scalar as a function of normalized charge time
    pub height: ResponseCurve,
    /// Takeoff impulse as a function of normalized charge time
    pub force: ResponseCurve,
    pub max_duration: f32,
    pub takeoff_duration: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            height: ResponseCurve::linear(move_consts::DEFAULT_JUMP_HEIGHT_MIN, move_consts::DEFAULT_JUMP_HEIGHT_MAX),
            force: ResponseCurve::linear(move_consts::DEFAULT_JUMP_FORCE_MIN, move_consts::DEFAULT_JUMP_FORCE_MAX),
            max_duration: move_consts::DEFAULT_MAX_JUMP_DURATION,
            takeoff_duration: move_consts::DEFAULT_JUMP_TAKEOFF_DURATION,
        }
    }
}

impl JumpConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.height.check().map_err(|r| ConfigError::invalid("jump.height", r))?;
        self.force.check().map_err(|r| ConfigError::invalid("jump.force", r))?;
        let (lo, hi) = self.height.output_range();
        if lo < 0.0 || hi > 1.0 {
            return Err(ConfigError::invalid("jump.height", "hover height scalar must stay within [0, 1]"));
        }
        positive("jump.max_duration", self.max_duration)?;
        non_negative("jump.takeoff_duration", self.takeoff_duration)
    }
}

/// Wipeout section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WipeoutConfig {
    pub force: f32,
    pub torque: f32,
    pub duration: f32,
    /// Trigger a wipeout when body-up strays this far from the supporting surface normal
    pub max_tilt_degrees: Option<f32>,
}

impl Default for WipeoutConfig {
    fn default() -> Self {
        Self {
            force: move_consts::DEFAULT_WIPEOUT_FORCE,
            torque: move_consts::DEFAULT_WIPEOUT_TORQUE,
            duration: move_consts::DEFAULT_WIPEOUT_DURATION,
            max_tilt_degrees: None,
        }
    }
}

impl WipeoutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("wipeout.force", self.force)?;
        finite("wipeout.torque", self.torque)?;
        non_negative("wipeout.duration", self.duration)?;
        if let Some(tilt) = self.max_tilt_degrees {
            if !(tilt > 0.0 && tilt <= 180.0) {
                return Err(ConfigError::invalid("wipeout.max_tilt_degrees", "must be in (0, 180]"));
            }
        }
        Ok(())
    }
}

/// Flip-over section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipConfig {
    pub force: f32,
    pub torque: f32,
}

impl Default for FlipConfig {
    fn default() -> Self {
        Self {
            force: move_consts::DEFAULT_FLIP_FORCE,
            torque: move_consts::DEFAULT_FLIP_TORQUE,
        }
    }
}

/// Rider balance section; present only when a rider body rides the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceConfig {
    /// Aligns rider-up with board-up
    pub up_vector: PidConfig,
    /// Damps rider angular velocity
    pub angular_velocity: PidConfig,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            up_vector: PidConfig::new(40.0, 0.0, 4.0),
            angular_velocity: PidConfig::new(5.0, 0.0, 0.0),
        }
    }
}

/// Board configuration from board.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BoardConfig {
    #[serde(default)]
    pub hover: HoverConfig,
    #[serde(default)]
    pub steering: SteeringConfig,
    #[serde(default)]
    pub jump: JumpConfig,
    #[serde(default)]
    pub wipeout: WipeoutConfig,
    #[serde(default)]
    pub flip: FlipConfig,
    #[serde(default)]
    pub balance: Option<BalanceConfig>,
}

impl BoardConfig {
    /// Load and validate board configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate from an in-memory TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(Path::new("<inline>").to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::SerializeError)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hover.validate()?;
        self.steering.validate()?;
        self.jump.validate()?;
        self.wipeout.validate()?;
        finite("flip.force", self.flip.force)?;
        finite("flip.torque", self.flip.torque)?;
        if let Some(balance) = &self.balance {
            balance
                .up_vector
                .check()
                .map_err(|r| ConfigError::invalid("balance.up_vector", r))?;
            balance
                .angular_velocity
                .check()
                .map_err(|r| ConfigError::invalid("balance.angular_velocity", r))?;
        }
        Ok(())
    }
}

fn finite(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be finite, got {}", value)))
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be > 0, got {}", value)))
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be >= 0, got {}", value)))
    }
}

fn positive_curve(field: &str, curve: &ResponseCurve) -> Result<(), ConfigError> {
    curve.check().map_err(|r| ConfigError::invalid(field, r))?;
    let (lo, _) = curve.output_range();
    if lo > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("every value must be > 0, curve reaches {}", lo)))
    }
}

/// Errors that can occur when loading board configuration
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::path::PathBuf, std::io::Error),
    ParseError(std::path::PathBuf, toml::de::Error),
    SerializeError(toml::ser::Error),
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "Failed to read {}: {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse {}: {}", path.display(), e)
            }
            ConfigError::SerializeError(e) => write!(f, "Failed to serialize config: {}", e),
            ConfigError::Invalid { field, reason } => write!(f, "Invalid {}: {}", field, reason),
        }
    }
}

impl std::error::Error for ConfigError {}
