//! End-to-end hover suspension tests: a board body in a full rapier world, supported only
//! by its probe forces.
//!
//! Run with: cargo test --test hover_physics_test -- --nocapture

use carveboard::board::constants::physics::{DEFAULT_GRAVITY, TIMESTEP};
use carveboard::board::physics::{EnvironmentPart, ShapeKind};
use carveboard::board::surface::ProbeShape;
use carveboard::board::{BodyState, BoardMode, Simulation, Telemetry};
use carveboard::config::BoardConfig;
use nalgebra::{Point3, UnitQuaternion, Vector3};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn spawn_at(x: f32, y: f32, z: f32) -> BodyState {
    BodyState::at(Point3::new(x, y, z), UnitQuaternion::identity())
}

fn flat_world() -> Simulation {
    let mut sim = Simulation::new(DEFAULT_GRAVITY, TIMESTEP);
    sim.add_part(&EnvironmentPart::floor(400.0, 0.0));
    sim
}

fn normal_of(t: &Telemetry) -> Vector3<f32> {
    Vector3::new(t.surface_normal[0], t.surface_normal[1], t.surface_normal[2])
}

// ---------------------------------------------------------------------------
// Flat ground
// ---------------------------------------------------------------------------

#[test]
fn test_board_settles_at_hover_height() {
    let mut sim = flat_world();
    let id = sim.spawn_board(&BoardConfig::default(), spawn_at(0.0, 0.5, 0.0)).unwrap();

    let mut lowest = f32::MAX;
    let mut last = Vec::new();
    for _ in 0..200 {
        last = sim.step(&[]);
        lowest = lowest.min(last[id].position[1]);
    }
    let t = &last[id];
    println!("settled: {}", t.summary());

    assert!(t.grounded);
    assert_eq!(t.mode, BoardMode::Grounded);
    // The collider half height is 0.03, so never resting on the floor means hovering.
    assert!(lowest > 0.05, "board touched down, lowest {}", lowest);
    assert!(t.position[1] > 0.15 && t.position[1] < 0.55, "height {}", t.position[1]);
    assert!(t.velocity[1].abs() < 0.5, "still bouncing at {}", t.velocity[1]);
    assert!((normal_of(t) - Vector3::y()).norm() < 1e-3);
}

#[test]
fn test_sphere_probes_also_support_the_board() {
    let mut config = BoardConfig::default();
    config.hover.probe_shape = ProbeShape::Sphere { radius: 0.05 };
    let mut sim = flat_world();
    let id = sim.spawn_board(&config, spawn_at(0.0, 0.5, 0.0)).unwrap();

    let last = sim.run(&[], 200);
    let t = &last[id];
    assert!(t.grounded);
    assert!(t.position[1] > 0.1 && t.position[1] < 0.6, "height {}", t.position[1]);
}

#[test]
fn test_board_stays_level_while_hovering() {
    let mut sim = flat_world();
    let id = sim.spawn_board(&BoardConfig::default(), spawn_at(0.0, 0.5, 0.0)).unwrap();
    sim.run(&[], 150);

    let state = sim.body_state(id).unwrap();
    assert!(state.up().dot(&Vector3::y()) > 0.95, "up {}", state.up());
    // Hover forces are vertical on flat ground; the board must not wander.
    assert!(state.position.x.abs() < 0.2 && state.position.z.abs() < 0.2, "drifted to {}", state.position);
}

// ---------------------------------------------------------------------------
// Slopes and the void
// ---------------------------------------------------------------------------

#[test]
fn test_surface_normal_follows_slope() {
    let mut sim = Simulation::new(DEFAULT_GRAVITY, TIMESTEP);
    sim.add_part(&EnvironmentPart {
        shape: ShapeKind::Block,
        size: [200.0, 1.0, 200.0],
        position: [0.0, -0.5, 0.0],
        rotation: [0.0, 0.0, 10.0],
        friction: 0.5,
    });
    let id = sim.spawn_board(&BoardConfig::default(), spawn_at(0.0, 0.6, 0.0)).unwrap();

    let last = sim.run(&[], 10);
    let t = &last[id];
    let expected = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 10.0f32.to_radians()) * Vector3::y();
    assert!(t.grounded);
    assert!((normal_of(t) - expected).norm() < 0.05, "normal {:?}, expected {}", t.surface_normal, expected);
}

#[test]
fn test_board_over_the_void_falls_unsupported() {
    let mut sim = Simulation::new(DEFAULT_GRAVITY, TIMESTEP);
    let id = sim.spawn_board(&BoardConfig::default(), spawn_at(0.0, 5.0, 0.0)).unwrap();

    let last = sim.run(&[], 25);
    let t = &last[id];
    assert!(!t.grounded);
    assert!(t.position[1] < 5.0);
    assert!(t.velocity[1] < -1.0, "vertical velocity {}", t.velocity[1]);
    // The last known normal is retained while airborne.
    assert_eq!(t.surface_normal, [0.0, 1.0, 0.0]);
}

#[test]
fn test_board_catches_itself_after_a_drop() {
    let mut sim = flat_world();
    let id = sim.spawn_board(&BoardConfig::default(), spawn_at(0.0, 3.0, 0.0)).unwrap();

    let mut was_airborne = false;
    let mut last = Vec::new();
    for _ in 0..250 {
        last = sim.step(&[]);
        was_airborne |= !last[id].grounded;
    }
    assert!(was_airborne);
    assert!(last[id].grounded);
    assert!(last[id].position[1] > 0.1 && last[id].position[1] < 0.6);
}
