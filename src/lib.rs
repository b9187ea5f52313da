//! Decision engine for a residential peer-to-peer energy marketplace:
//! per-household forecasting, supplier/demander matching, dynamic pricing,
//! battery strategy, grid and equity analysis, and a tick-driven simulation.

pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod optimizer;
pub mod repo;
pub mod simulation;
pub mod telemetry;

pub use controller::{EngineStatus, SimulationOrchestrator};
pub use error::{EngineError, EngineResult};
