pub mod physics;
pub mod spawn;

pub use physics::Simulation;
