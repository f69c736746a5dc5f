//! Board physics and tuning constants.
//! Defaults for `BoardConfig` live here so the config layer and tests agree.

/// Physics world constants
pub mod physics {
    /// Default gravity in m/s²
    pub const DEFAULT_GRAVITY: f32 = 9.81;

    /// Fixed timestep for the control loop (50 Hz)
    pub const TIMESTEP: f32 = 1.0 / 50.0;

    /// Board collider half extents (width, thickness, length)
    pub const BOARD_HALF_EXTENTS: [f32; 3] = [0.15, 0.03, 0.6];

    /// Board collider density (kg/m³); yields roughly 8.6 kg for the default extents
    pub const BOARD_DENSITY: f32 = 400.0;

    /// Linear damping on the board body
    pub const BOARD_LINEAR_DAMPING: f32 = 0.05;

    /// Angular damping on the board body
    pub const BOARD_ANGULAR_DAMPING: f32 = 0.5;

    /// Rider capsule radius
    pub const RIDER_RADIUS: f32 = 0.2;

    /// Rider capsule total height
    pub const RIDER_HEIGHT: f32 = 1.6;

    /// Rider capsule density (kg/m³)
    pub const RIDER_DENSITY: f32 = 50.0;

    /// Extra reach for the ray that resolves a sphere-cast contact
    pub const PROBE_CONTACT_SLACK: f32 = 0.05;

    /// Small epsilon for float comparisons and normalisation guards
    pub const EPSILON: f32 = 1.0e-4;

    /// Slack when comparing accumulated sequence time against a duration
    pub const TIMER_EPSILON: f32 = 1.0e-4;

    /// Meters per second to miles per hour
    pub const MPS_TO_MPH: f32 = 2.23694;
}

/// Hover suspension defaults
pub mod hover {
    /// Target clearance above the surface at each probe
    pub const DEFAULT_TARGET_HEIGHT: f32 = 0.33;

    /// Distance over which the desired probe speed ramps down to zero
    pub const DEFAULT_DAMPING_DISTANCE: f32 = 0.2;

    /// Probe speed toward its target when farther than the damping distance
    pub const DEFAULT_HOVER_SPEED: f32 = 10.0;

    /// Maximum probe ray length, measured from the probe
    pub const DEFAULT_PROBE_DISTANCE: f32 = 1.0;

    /// Rays start this far up the probe axis so probes resting in a collider still hit
    pub const DEFAULT_PROBE_START_OFFSET: f32 = 0.05;
}

/// Steering defaults
pub mod steering {
    pub const DEFAULT_SKID_TURN_SPEED_DEGREES: f32 = 90.0;
    pub const DEFAULT_TIME_TO_SKID: f32 = 0.25;
    pub const DEFAULT_CARVE_RADIUS_MIN: f32 = 25.0;
    pub const DEFAULT_CARVE_RADIUS_MAX: f32 = 6.0;
    pub const DEFAULT_CARVE_TIME_MIN: f32 = 0.6;
    pub const DEFAULT_CARVE_TIME_MAX: f32 = 0.3;
    /// Positive rolls the right rail down on a right stick
    pub const DEFAULT_ROLL_SPEED: f32 = 2.0;
    /// Negative so a forward stick dips the nose
    pub const DEFAULT_PITCH_SPEED: f32 = -2.0;
    pub const DEFAULT_TIME_TO_LEAN: f32 = 0.5;
    pub const DEFAULT_DRIVE_SPEED: f32 = 12.0;
    pub const DEFAULT_TIME_TO_DRIVE_SPEED: f32 = 1.0;
}

/// Jump, wipeout and flip defaults
pub mod moves {
    pub const DEFAULT_MAX_JUMP_DURATION: f32 = 3.0;
    pub const DEFAULT_JUMP_TAKEOFF_DURATION: f32 = 0.5;
    pub const DEFAULT_JUMP_HEIGHT_MIN: f32 = 1.0;
    pub const DEFAULT_JUMP_HEIGHT_MAX: f32 = 0.3;
    pub const DEFAULT_JUMP_FORCE_MIN: f32 = 20.0;
    pub const DEFAULT_JUMP_FORCE_MAX: f32 = 60.0;
    pub const DEFAULT_WIPEOUT_FORCE: f32 = 10.0;
    pub const DEFAULT_WIPEOUT_TORQUE: f32 = 10.0;
    pub const DEFAULT_WIPEOUT_DURATION: f32 = 2.0;
    pub const DEFAULT_FLIP_FORCE: f32 = 30.0;
    pub const DEFAULT_FLIP_TORQUE: f32 = 0.5;
}
