// Library exports for the snake movement engine
// The server binary, the simulator and the integration tests all build on these

pub mod bot;
pub mod config;
pub mod cycle;
pub mod engine;
pub mod error;
pub mod grid;
pub mod pathfinder;
pub mod policy;
pub mod profiler;
pub mod snake;
pub mod types;
