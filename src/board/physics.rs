use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::body::{BodyState, CollisionQuery, ForceCommand, ForceMode, SurfaceHit};
use super::constants::physics as consts;

// Collision groups: boards and riders collide with the environment; probes only see
// the environment.
const GROUP_ENVIRONMENT: Group = Group::GROUP_1;
const GROUP_BOARD: Group = Group::GROUP_2;
const GROUP_RIDER: Group = Group::GROUP_3;

/// Primitive shape of a static environment part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Block,
    Ball,
    Cylinder,
    Wedge,
}

/// Static environment geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentPart {
    #[serde(default)]
    pub shape: ShapeKind,
    /// Full extents (x, y, z); balls use x as diameter, cylinders x as diameter and y as height.
    pub size: [f32; 3],
    pub position: [f32; 3],
    /// Euler angles in degrees about X, Y, Z.
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_friction")]
    pub friction: f32,
}

fn default_friction() -> f32 {
    0.5
}

impl EnvironmentPart {
    /// Flat block whose top face sits at `top`.
    pub fn floor(size: f32, top: f32) -> Self {
        Self {
            shape: ShapeKind::Block,
            size: [size, 1.0, size],
            position: [0.0, top - 0.5, 0.0],
            rotation: [0.0; 3],
            friction: default_friction(),
        }
    }

    pub fn rotation(&self) -> UnitQuaternion<f32> {
        let [x, y, z] = self.rotation;
        UnitQuaternion::from_euler_angles(x.to_radians(), y.to_radians(), z.to_radians())
    }
}

/// Rapier handles belonging to one board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardHandles {
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
    pub rider: Option<RigidBodyHandle>,
}

/// Builds a collider with the correct shape for a given ShapeKind and size.
fn build_collider(size: [f32; 3], shape: ShapeKind) -> Collider {
    let [sx, sy, sz] = size;
    let shared_shape = match shape {
        ShapeKind::Block => SharedShape::cuboid(sx / 2.0, sy / 2.0, sz / 2.0),
        ShapeKind::Ball => SharedShape::ball(sx / 2.0),
        ShapeKind::Cylinder => SharedShape::cylinder(sy / 2.0, sx / 2.0),
        ShapeKind::Wedge => {
            // Triangular prism: flat bottom, slope rises from +X to -X
            let hx = sx / 2.0;
            let hy = sy / 2.0;
            let hz = sz / 2.0;
            let points = [
                point![-hx, -hy, -hz],
                point![hx, -hy, -hz],
                point![-hx, -hy, hz],
                point![hx, -hy, hz],
                point![-hx, hy, -hz],
                point![-hx, hy, hz],
            ];
            SharedShape::convex_hull(&points).unwrap_or_else(|| {
                warn!(?size, "Degenerate wedge, using a block collider");
                SharedShape::cuboid(hx, hy, hz)
            })
        }
    };
    ColliderBuilder::new(shared_shape)
        .collision_groups(InteractionGroups::new(GROUP_ENVIRONMENT, Group::ALL))
        .build()
}

/// Wrapper around the Rapier3D world the boards ride in.
pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Creates a new physics world with default gravity
    pub fn new() -> Self {
        Self::with_gravity(consts::DEFAULT_GRAVITY)
    }

    /// Creates a world pulling down the Y axis with `gravity_y` m/s²
    pub fn with_gravity(gravity_y: f32) -> Self {
        Self {
            gravity: vector![0.0, -gravity_y, 0.0],
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Steps the physics simulation forward by dt seconds
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Refreshes the query pipeline after bodies were added or moved outside a step
    pub fn update_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Adds a fixed environment part
    pub fn add_part(&mut self, part: &EnvironmentPart) -> RigidBodyHandle {
        let [x, y, z] = part.position;
        let body = RigidBodyBuilder::fixed()
            .translation(vector![x, y, z])
            .rotation(part.rotation().scaled_axis())
            .build();
        let handle = self.rigid_body_set.insert(body);

        let mut collider = build_collider(part.size, part.shape);
        collider.set_friction(part.friction);
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        handle
    }

    /// Adds a dynamic board at `pose`, optionally with a rider jointed on top
    pub fn add_board(&mut self, pose: &BodyState, with_rider: bool) -> BoardHandles {
        let [hx, hy, hz] = consts::BOARD_HALF_EXTENTS;
        let body = RigidBodyBuilder::dynamic()
            .translation(pose.position.coords)
            .rotation(pose.rotation.scaled_axis())
            .linear_damping(consts::BOARD_LINEAR_DAMPING)
            .angular_damping(consts::BOARD_ANGULAR_DAMPING)
            .ccd_enabled(true)
            .build();
        let handle = self.rigid_body_set.insert(body);

        let collider = ColliderBuilder::cuboid(hx, hy, hz)
            .density(consts::BOARD_DENSITY)
            .friction(0.2)
            .collision_groups(InteractionGroups::new(GROUP_BOARD, GROUP_ENVIRONMENT | GROUP_BOARD))
            .build();
        let collider = self
            .collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        let rider = with_rider.then(|| self.add_rider(handle, pose));
        BoardHandles {
            body: handle,
            collider,
            rider,
        }
    }

    fn add_rider(&mut self, board: RigidBodyHandle, pose: &BodyState) -> RigidBodyHandle {
        let half_board = consts::BOARD_HALF_EXTENTS[1];
        let half_rider = consts::RIDER_HEIGHT / 2.0;
        let half_segment = (half_rider - consts::RIDER_RADIUS).max(0.0);

        let center = pose.transform_point(&point![0.0, half_board + half_rider, 0.0]);
        let body = RigidBodyBuilder::dynamic()
            .translation(center.coords)
            .rotation(pose.rotation.scaled_axis())
            .angular_damping(consts::BOARD_ANGULAR_DAMPING)
            .build();
        let rider = self.rigid_body_set.insert(body);

        let collider = ColliderBuilder::capsule_y(half_segment, consts::RIDER_RADIUS)
            .density(consts::RIDER_DENSITY)
            .collision_groups(InteractionGroups::new(GROUP_RIDER, GROUP_ENVIRONMENT))
            .build();
        self.collider_set
            .insert_with_parent(collider, rider, &mut self.rigid_body_set);

        let joint = SphericalJointBuilder::new()
            .local_anchor1(point![0.0, half_board, 0.0])
            .local_anchor2(point![0.0, -half_rider, 0.0]);
        self.impulse_joint_set.insert(board, rider, joint, true);
        rider
    }

    /// Snapshot of a body's pose and velocities
    pub fn state(&self, handle: RigidBodyHandle) -> Option<BodyState> {
        self.rigid_body_set.get(handle).map(|body| BodyState {
            position: Point3::from(*body.translation()),
            rotation: *body.rotation(),
            linear_velocity: *body.linvel(),
            angular_velocity: *body.angvel(),
            mass: body.mass(),
        })
    }

    /// Replaces last tick's forces with `commands`. Continuous forces persist in rapier
    /// until reset, so every tick starts from zero.
    pub fn apply_commands(&mut self, handle: RigidBodyHandle, commands: &[ForceCommand], dt: f32) {
        let Some(body) = self.rigid_body_set.get_mut(handle) else {
            return;
        };
        body.reset_forces(true);
        body.reset_torques(true);
        let mass = body.mass();

        for command in commands {
            match *command {
                ForceCommand::Force { force, mode } => match mode {
                    ForceMode::Force => body.add_force(force, true),
                    ForceMode::Acceleration => body.add_force(force * mass, true),
                    ForceMode::Impulse => body.apply_impulse(force, true),
                    ForceMode::VelocityChange => {
                        let v = body.linvel() + force;
                        body.set_linvel(v, true);
                    }
                },
                ForceCommand::Torque { torque, mode } => match mode {
                    ForceMode::Force => body.add_torque(torque, true),
                    ForceMode::Impulse => body.apply_torque_impulse(torque, true),
                    // Mass-independent: integrate straight into angular velocity.
                    ForceMode::Acceleration => {
                        let w = body.angvel() + torque * dt;
                        body.set_angvel(w, true);
                    }
                    ForceMode::VelocityChange => {
                        let w = body.angvel() + torque;
                        body.set_angvel(w, true);
                    }
                },
                ForceCommand::ForceAtPoint { force, point, mode } => match mode {
                    ForceMode::Force => body.add_force_at_point(force, point, true),
                    ForceMode::Acceleration => body.add_force_at_point(force * mass, point, true),
                    ForceMode::Impulse => body.apply_impulse_at_point(force, point, true),
                    ForceMode::VelocityChange => body.apply_impulse_at_point(force * mass, point, true),
                },
            }
        }
    }

    /// Moves a body to `pose` with zero velocity and no pending forces
    pub fn teleport(&mut self, handle: RigidBodyHandle, pose: &BodyState) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_translation(pose.position.coords, true);
            body.set_rotation(pose.rotation, true);
            body.set_linvel(Vector3::zeros(), true);
            body.set_angvel(Vector3::zeros(), true);
            body.reset_forces(true);
            body.reset_torques(true);
        }
    }

    /// Moves a board and its rider (if any) to `pose`
    pub fn teleport_board(&mut self, handles: &BoardHandles, pose: &BodyState) {
        self.teleport(handles.body, pose);
        if let Some(rider) = handles.rider {
            let half_board = consts::BOARD_HALF_EXTENTS[1];
            let center = pose.transform_point(&point![0.0, half_board + consts::RIDER_HEIGHT / 2.0, 0.0]);
            self.teleport(rider, &BodyState::at(center, pose.rotation));
        }
    }

    /// Environment queries for one board, which never sees itself
    pub fn query(&self, exclude: RigidBodyHandle) -> WorldQuery<'_> {
        WorldQuery { world: self, exclude }
    }
}

/// [`CollisionQuery`] over the environment collision group of a [`PhysicsWorld`].
pub struct WorldQuery<'a> {
    world: &'a PhysicsWorld,
    exclude: RigidBodyHandle,
}

impl<'a> WorldQuery<'a> {
    fn filter(&self) -> QueryFilter<'a> {
        QueryFilter::default()
            .exclude_rigid_body(self.exclude)
            .exclude_sensors()
            .groups(InteractionGroups::new(GROUP_BOARD, GROUP_ENVIRONMENT))
    }
}

impl CollisionQuery for WorldQuery<'_> {
    fn cast_ray(
        &self,
        origin: Point3<f32>,
        direction: Unit<Vector3<f32>>,
        max_distance: f32,
    ) -> Option<SurfaceHit> {
        let ray = Ray::new(origin, direction.into_inner());
        let (_, hit) = self.world.query_pipeline.cast_ray_and_get_normal(
            &self.world.rigid_body_set,
            &self.world.collider_set,
            &ray,
            max_distance,
            true, // solid
            self.filter(),
        )?;

        // Solid hits from inside a collider report a zero normal.
        let normal = Unit::try_new(hit.normal, consts::EPSILON).unwrap_or(-direction);
        Some(SurfaceHit {
            point: ray.point_at(hit.time_of_impact),
            normal,
            distance: hit.time_of_impact,
        })
    }

    fn cast_sphere(
        &self,
        origin: Point3<f32>,
        radius: f32,
        direction: Unit<Vector3<f32>>,
        max_distance: f32,
    ) -> Option<SurfaceHit> {
        let ball = Ball::new(radius);
        let pose = Isometry::translation(origin.x, origin.y, origin.z);
        let (_, hit) = self.world.query_pipeline.cast_shape(
            &self.world.rigid_body_set,
            &self.world.collider_set,
            &pose,
            &direction.into_inner(),
            &ball,
            ShapeCastOptions::with_max_time_of_impact(max_distance),
            self.filter(),
        )?;

        // Resolve contact point and normal with a short ray from the sphere's center at impact.
        let distance = hit.time_of_impact;
        let center = origin + direction.into_inner() * distance;
        let hit = match self.cast_ray(center, direction, radius + consts::PROBE_CONTACT_SLACK) {
            // Shape casts stop slightly short; measure travel to the resolved contact instead.
            Some(h) => SurfaceHit {
                point: h.point,
                normal: h.normal,
                distance: distance + h.distance - radius,
            },
            None => SurfaceHit {
                point: center + direction.into_inner() * radius,
                normal: -direction,
                distance,
            },
        };
        Some(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::math::WORLD_UP;

    const DT: f32 = 1.0 / 50.0;

    fn world_with_floor() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        world.add_part(&EnvironmentPart::floor(100.0, 0.0));
        world
    }

    fn pose(y: f32) -> BodyState {
        BodyState::at(Point3::new(0.0, y, 0.0), UnitQuaternion::identity())
    }

    #[test]
    fn test_board_falls_under_gravity() {
        let mut world = world_with_floor();
        let board = world.add_board(&pose(5.0), false);
        for _ in 0..10 {
            world.step(DT);
        }
        let state = world.state(board.body).unwrap();
        assert!(state.position.y < 5.0);
        assert!(state.linear_velocity.y < 0.0);
    }

    #[test]
    fn test_board_mass_from_density() {
        let mut world = PhysicsWorld::new();
        let board = world.add_board(&pose(1.0), false);
        let [hx, hy, hz] = consts::BOARD_HALF_EXTENTS;
        let expected = 8.0 * hx * hy * hz * consts::BOARD_DENSITY;
        let mass = world.state(board.body).unwrap().mass;
        assert!((mass - expected).abs() < 1e-2, "mass {}", mass);
    }

    #[test]
    fn test_ray_hits_floor_and_ignores_board() {
        let mut world = world_with_floor();
        let board = world.add_board(&pose(2.0), false);
        world.update_queries();

        let query = world.query(board.body);
        let hit = query
            .cast_ray(Point3::new(0.0, 2.0, 0.0), -Vector3::y_axis(), 10.0)
            .expect("should hit the floor");
        assert!((hit.distance - 2.0).abs() < 1e-3, "distance {}", hit.distance);
        assert!((hit.normal.into_inner() - WORLD_UP).norm() < 1e-4);
        assert!(hit.point.y.abs() < 1e-3);
    }

    #[test]
    fn test_ray_misses_beyond_range() {
        let mut world = world_with_floor();
        let board = world.add_board(&pose(5.0), false);
        world.update_queries();
        let query = world.query(board.body);
        assert!(query.cast_ray(Point3::new(0.0, 5.0, 0.0), -Vector3::y_axis(), 1.0).is_none());
    }

    #[test]
    fn test_sphere_cast_hits_floor() {
        let mut world = world_with_floor();
        let board = world.add_board(&pose(5.0), false);
        world.update_queries();
        let query = world.query(board.body);
        let hit = query
            .cast_sphere(Point3::new(3.0, 1.0, 0.0), 0.1, -Vector3::y_axis(), 5.0)
            .expect("should hit the floor");
        assert!((hit.distance - 0.9).abs() < 1e-3, "distance {}", hit.distance);
        assert!((hit.normal.into_inner() - WORLD_UP).norm() < 1e-3);
        assert!(hit.point.y.abs() < 1e-3);
    }

    #[test]
    fn test_sphere_and_ray_agree_on_floor_distance() {
        let mut world = world_with_floor();
        let board = world.add_board(&pose(5.0), false);
        world.update_queries();
        let query = world.query(board.body);
        let origin = Point3::new(-2.0, 0.7, 1.0);
        let ray = query.cast_ray(origin, -Vector3::y_axis(), 2.0).expect("ray should hit");
        for radius in [0.05, 0.2] {
            let sphere = query
                .cast_sphere(origin, radius, -Vector3::y_axis(), 2.0)
                .expect("sphere should hit");
            assert!(
                (sphere.distance - (ray.distance - radius)).abs() < 1e-4,
                "radius {} sphere {} ray {}",
                radius,
                sphere.distance,
                ray.distance
            );
        }
    }

    #[test]
    fn test_wedge_slope_normal() {
        let mut world = PhysicsWorld::new();
        world.add_part(&EnvironmentPart {
            shape: ShapeKind::Wedge,
            size: [4.0, 2.0, 4.0],
            position: [0.0, 0.0, 0.0],
            rotation: [0.0; 3],
            friction: 0.5,
        });
        let board = world.add_board(&pose(10.0), false);
        world.update_queries();
        let hit = world
            .query(board.body)
            .cast_ray(Point3::new(0.0, 5.0, 0.0), -Vector3::y_axis(), 10.0)
            .expect("should hit the slope");
        // The slope faces +X and up.
        let n = hit.normal.into_inner();
        assert!(n.x > 0.1 && n.y > 0.1, "normal {}", n);
    }

    #[test]
    fn test_acceleration_command_is_mass_independent() {
        let mut world = PhysicsWorld::with_gravity(0.0);
        let board = world.add_board(&pose(0.0), false);
        let commands = [ForceCommand::Force {
            force: Vector3::new(1.0, 0.0, 0.0),
            mode: ForceMode::Acceleration,
        }];
        world.apply_commands(board.body, &commands, DT);
        world.step(DT);
        let v = world.state(board.body).unwrap().linear_velocity;
        assert!((v.x - DT).abs() < 1e-3, "velocity {}", v);
    }

    #[test]
    fn test_forces_do_not_persist_across_ticks() {
        let mut world = PhysicsWorld::with_gravity(0.0);
        let board = world.add_board(&pose(0.0), false);
        let push = [ForceCommand::Force {
            force: Vector3::new(0.0, 0.0, 5.0),
            mode: ForceMode::Force,
        }];
        world.apply_commands(board.body, &push, DT);
        world.step(DT);
        let after_push = world.state(board.body).unwrap().linear_velocity.z;
        world.apply_commands(board.body, &[], DT);
        world.step(DT);
        let after_idle = world.state(board.body).unwrap().linear_velocity.z;
        assert!(after_push > 0.0);
        assert!(after_idle <= after_push + 1e-6);
    }

    #[test]
    fn test_impulse_and_velocity_change() {
        let mut world = PhysicsWorld::with_gravity(0.0);
        let board = world.add_board(&pose(0.0), false);
        let mass = world.state(board.body).unwrap().mass;
        let commands = [
            ForceCommand::Force {
                force: Vector3::new(mass, 0.0, 0.0),
                mode: ForceMode::Impulse,
            },
            ForceCommand::Force {
                force: Vector3::new(0.0, 2.0, 0.0),
                mode: ForceMode::VelocityChange,
            },
            ForceCommand::Torque {
                torque: Vector3::new(0.0, 1.5, 0.0),
                mode: ForceMode::VelocityChange,
            },
        ];
        world.apply_commands(board.body, &commands, DT);
        let state = world.state(board.body).unwrap();
        assert!((state.linear_velocity - Vector3::new(1.0, 2.0, 0.0)).norm() < 1e-3);
        assert!((state.angular_velocity.y - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_teleport_zeroes_velocity() {
        let mut world = world_with_floor();
        let board = world.add_board(&pose(5.0), true);
        for _ in 0..20 {
            world.step(DT);
        }
        world.teleport_board(&board, &pose(3.0));
        let state = world.state(board.body).unwrap();
        assert!((state.position.y - 3.0).abs() < 1e-6);
        assert_eq!(state.linear_velocity, Vector3::zeros());
        let rider = world.state(board.rider.unwrap()).unwrap();
        assert!(rider.position.y > state.position.y);
        assert_eq!(rider.linear_velocity, Vector3::zeros());
    }

    #[test]
    fn test_rider_stays_attached() {
        let mut world = world_with_floor();
        let board = world.add_board(&pose(1.0), true);
        for _ in 0..100 {
            world.step(DT);
        }
        let b = world.state(board.body).unwrap();
        let r = world.state(board.rider.unwrap()).unwrap();
        let reach = consts::BOARD_HALF_EXTENTS[1] + consts::RIDER_HEIGHT;
        assert!((r.position - b.position).norm() < reach, "rider drifted off the board");
    }
}
