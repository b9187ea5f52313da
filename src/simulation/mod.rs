//! # Simulation namespace
//!
//! Seeded household fixtures and the outage simulator. Households created
//! here live in the engine's own registry and never touch live marketplace
//! storage.

pub mod households;
pub mod outage;

pub use households::seed_households;
pub use outage::{
    default_outage_targets, resilience_score, simulate_outage, EmergencyRouting,
    OutageResponse, RecoveryApproach, RecoveryPlan,
};
