//! Discrete PID controller, generic over scalar and vector error types.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

use super::constants::physics as consts;

/// Error/output types a [`PidController`] can work with.
pub trait PidValue:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self>
{
    fn zero() -> Self;

    fn magnitude(&self) -> f32;

    /// Clamps into `bounds`: by value for scalars, by magnitude for vectors.
    fn clamp_to(self, bounds: &ClampBounds) -> Self;
}

impl PidValue for f32 {
    fn zero() -> Self {
        0.0
    }

    fn magnitude(&self) -> f32 {
        self.abs()
    }

    fn clamp_to(self, bounds: &ClampBounds) -> Self {
        self.clamp(bounds.min, bounds.max)
    }
}

impl PidValue for Vector3<f32> {
    fn zero() -> Self {
        Vector3::zeros()
    }

    fn magnitude(&self) -> f32 {
        self.norm()
    }

    fn clamp_to(self, bounds: &ClampBounds) -> Self {
        let mag = self.norm();
        if mag <= consts::EPSILON {
            return self;
        }
        let clamped = mag.clamp(bounds.min.max(0.0), bounds.max.max(0.0));
        self * (clamped / mag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClampBounds {
    pub min: f32,
    pub max: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidConfig {
    #[serde(flatten)]
    pub gains: PidGains,
    #[serde(default)]
    pub integral_clamp: Option<ClampBounds>,
    #[serde(default)]
    pub output_clamp: Option<ClampBounds>,
}

impl PidConfig {
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            gains: PidGains { kp, ki, kd },
            integral_clamp: None,
            output_clamp: None,
        }
    }

    pub fn check(&self) -> Result<(), String> {
        let PidGains { kp, ki, kd } = self.gains;
        if !(kp.is_finite() && ki.is_finite() && kd.is_finite()) {
            return Err("gains must be finite".to_string());
        }
        for (name, bounds) in [("integral_clamp", self.integral_clamp), ("output_clamp", self.output_clamp)] {
            if let Some(b) = bounds {
                if b.min > b.max {
                    return Err(format!("{} min {} exceeds max {}", name, b.min, b.max));
                }
            }
        }
        Ok(())
    }
}

/// `output = Kp*e + Ki*∫e + Kd*de/dt`, with optional integral and output clamps.
#[derive(Debug, Clone)]
pub struct PidController<T: PidValue> {
    config: PidConfig,
    integral: T,
    previous_error: T,
}

impl<T: PidValue> PidController<T> {
    pub fn new(config: PidConfig) -> Self {
        Self {
            config,
            integral: T::zero(),
            previous_error: T::zero(),
        }
    }

    pub fn config(&self) -> &PidConfig {
        &self.config
    }

    pub fn integral(&self) -> T {
        self.integral
    }

    pub fn previous_error(&self) -> T {
        self.previous_error
    }

    /// Clears integral and derivative memory. Call on (re)activation, otherwise the first
    /// derivative sample is taken against a stale error.
    pub fn reset(&mut self) {
        self.integral = T::zero();
        self.previous_error = T::zero();
    }

    pub fn update(&mut self, error: T, dt: f32) -> T {
        let PidGains { kp, ki, kd } = self.config.gains;

        // A non-positive step contributes no integral or derivative.
        let derivative = if dt > consts::EPSILON {
            self.integral = self.integral + error * dt;
            if let Some(bounds) = &self.config.integral_clamp {
                self.integral = self.integral.clamp_to(bounds);
            }
            (error - self.previous_error) * (1.0 / dt)
        } else {
            T::zero()
        };
        self.previous_error = error;

        let output = error * kp + self.integral * ki + derivative * kd;
        match &self.config.output_clamp {
            Some(bounds) => output.clamp_to(bounds),
            None => output,
        }
    }
}

pub type FloatPid = PidController<f32>;
pub type Vector3Pid = PidController<Vector3<f32>>;
