//! Node/line/structure simulation. Knows nothing about the browser.

pub mod config;
pub mod connections;
pub mod geometry;
pub mod lines;
pub mod math;
pub mod nodes;
pub mod pool;
pub mod rng;
pub mod state;
pub mod structures;
pub mod types;

pub use config::SurfaceConfig;
pub use state::Simulation;
pub use types::SimulationState;
