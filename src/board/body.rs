//! The rigid-body and collision-query surface the controllers talk to.
//!
//! Controllers never own a physics body. They read a [`BodyState`] snapshot and push
//! [`ForceCommand`]s through [`BoardBody`]; the physics backend applies the buffered
//! commands after the control pass. Sensing goes through [`CollisionQuery`].

use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};

use super::math::{self, LOCAL_FORWARD, LOCAL_RIGHT, LOCAL_UP};

/// How a force or torque is applied, mirroring the common engine force modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceMode {
    /// Continuous force, mass-dependent.
    Force,
    /// Continuous acceleration, mass-independent.
    Acceleration,
    /// Instantaneous impulse, mass-dependent.
    Impulse,
    /// Instantaneous velocity change, mass-independent.
    VelocityChange,
}

/// One buffered actuation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForceCommand {
    Force { force: Vector3<f32>, mode: ForceMode },
    Torque { torque: Vector3<f32>, mode: ForceMode },
    ForceAtPoint { force: Vector3<f32>, point: Point3<f32>, mode: ForceMode },
}

/// Read-only pose and velocity of a body at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub linear_velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
    pub mass: f32,
}

impl BodyState {
    pub fn at(position: Point3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self {
            position,
            rotation,
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            mass: 1.0,
        }
    }

    pub fn forward(&self) -> Vector3<f32> {
        math::world_axis(&self.rotation, LOCAL_FORWARD)
    }

    pub fn up(&self) -> Vector3<f32> {
        math::world_axis(&self.rotation, LOCAL_UP)
    }

    pub fn right(&self) -> Vector3<f32> {
        math::world_axis(&self.rotation, LOCAL_RIGHT)
    }

    /// Transforms a body-local point into world space.
    pub fn transform_point(&self, local: &Point3<f32>) -> Point3<f32> {
        self.position + self.rotation * local.coords
    }
}

impl Default for BodyState {
    fn default() -> Self {
        Self::at(Point3::origin(), UnitQuaternion::identity())
    }
}

/// Body access used by every controller in the board stack.
pub trait BoardBody {
    fn state(&self) -> &BodyState;
    fn add_force(&mut self, force: Vector3<f32>, mode: ForceMode);
    fn add_torque(&mut self, torque: Vector3<f32>, mode: ForceMode);
    fn add_force_at_point(&mut self, force: Vector3<f32>, point: Point3<f32>, mode: ForceMode);
}

/// Snapshot of a body plus the commands issued against it this tick.
///
/// Decouples sensing (which borrows the world immutably) from actuation (which needs the
/// world's body set mutably). Also serves as an in-memory body for driving controllers
/// without a physics world.
#[derive(Debug, Clone, Default)]
pub struct BodyProxy {
    state: BodyState,
    commands: Vec<ForceCommand>,
}

impl BodyProxy {
    pub fn new(state: BodyState) -> Self {
        Self {
            state,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[ForceCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<ForceCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Replaces the snapshot and drops any pending commands.
    pub fn refresh(&mut self, state: BodyState) {
        self.state = state;
        self.commands.clear();
    }

    pub fn state_mut(&mut self) -> &mut BodyState {
        &mut self.state
    }

    /// Sum of all linear forces, at-point forces included, for the given mode.
    pub fn total_force(&self, mode: ForceMode) -> Vector3<f32> {
        self.commands
            .iter()
            .filter_map(|c| match *c {
                ForceCommand::Force { force, mode: m } if m == mode => Some(force),
                ForceCommand::ForceAtPoint { force, mode: m, .. } if m == mode => Some(force),
                _ => None,
            })
            .sum()
    }

    /// Sum of all pure torques for the given mode.
    pub fn total_torque(&self, mode: ForceMode) -> Vector3<f32> {
        self.commands
            .iter()
            .filter_map(|c| match *c {
                ForceCommand::Torque { torque, mode: m } if m == mode => Some(torque),
                _ => None,
            })
            .sum()
    }
}

impl BoardBody for BodyProxy {
    fn state(&self) -> &BodyState {
        &self.state
    }

    fn add_force(&mut self, force: Vector3<f32>, mode: ForceMode) {
        self.commands.push(ForceCommand::Force { force, mode });
    }

    fn add_torque(&mut self, torque: Vector3<f32>, mode: ForceMode) {
        self.commands.push(ForceCommand::Torque { torque, mode });
    }

    fn add_force_at_point(&mut self, force: Vector3<f32>, point: Point3<f32>, mode: ForceMode) {
        self.commands.push(ForceCommand::ForceAtPoint { force, point, mode });
    }
}

/// A single ray or sphere-cast hit against the environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub point: Point3<f32>,
    pub normal: Unit<Vector3<f32>>,
    /// Distance travelled along the cast direction from the cast origin.
    pub distance: f32,
}

/// Read-only environment queries.
pub trait CollisionQuery {
    fn cast_ray(
        &self,
        origin: Point3<f32>,
        direction: Unit<Vector3<f32>>,
        max_distance: f32,
    ) -> Option<SurfaceHit>;

    fn cast_sphere(
        &self,
        origin: Point3<f32>,
        radius: f32,
        direction: Unit<Vector3<f32>>,
        max_distance: f32,
    ) -> Option<SurfaceHit>;
}

/// Solid half-space bounded by an infinite plane; everything below the plane is ground.
#[derive(Debug, Clone, Copy)]
pub struct HalfSpace {
    pub point: Point3<f32>,
    pub normal: Unit<Vector3<f32>>,
}

impl HalfSpace {
    pub fn new(point: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self {
            point,
            normal: Unit::new_normalize(normal),
        }
    }

    /// Horizontal ground plane at height `y`.
    pub fn ground(y: f32) -> Self {
        Self::new(Point3::new(0.0, y, 0.0), math::WORLD_UP)
    }

    /// Signed distance from the plane, positive above it.
    pub fn signed_distance(&self, p: &Point3<f32>) -> f32 {
        (p - self.point).dot(&self.normal)
    }
}

impl CollisionQuery for HalfSpace {
    fn cast_ray(
        &self,
        origin: Point3<f32>,
        direction: Unit<Vector3<f32>>,
        max_distance: f32,
    ) -> Option<SurfaceHit> {
        let height = self.signed_distance(&origin);
        if height <= 0.0 {
            // Solid query: a ray starting inside the half-space hits at its origin.
            return Some(SurfaceHit {
                point: origin,
                normal: self.normal,
                distance: 0.0,
            });
        }
        let closing = -direction.dot(&self.normal);
        if closing <= 0.0 {
            return None;
        }
        let distance = height / closing;
        if distance > max_distance {
            return None;
        }
        Some(SurfaceHit {
            point: origin + direction.into_inner() * distance,
            normal: self.normal,
            distance,
        })
    }

    fn cast_sphere(
        &self,
        origin: Point3<f32>,
        radius: f32,
        direction: Unit<Vector3<f32>>,
        max_distance: f32,
    ) -> Option<SurfaceHit> {
        // Sweep the sphere's lowest point toward the plane.
        let lowest = origin - self.normal.into_inner() * radius;
        self.cast_ray(lowest, direction, max_distance)
    }
}
