//! Hover-board locomotion: probe suspension, velocity estimation, the control state
//! machine and the rapier-backed world it runs in.

pub mod balance;
pub mod body;
pub mod constants;
pub mod control;
pub mod controller;
pub mod convergence;
pub mod curve;
pub mod hover;
pub mod input;
pub mod math;
pub mod physics;
pub mod pid;
pub mod sim;
pub mod surface;
pub mod telemetry;
pub mod velocity;

pub use body::{BoardBody, BodyProxy, BodyState, CollisionQuery, ForceCommand, ForceMode, HalfSpace};
pub use control::{BoardMode, BoardState};
pub use controller::BoardController;
pub use input::{BoardInput, ButtonState, StickFrame};
pub use sim::{BoardId, Simulation};
pub use telemetry::Telemetry;
