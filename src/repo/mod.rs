pub mod households;
pub mod ledger;

pub use households::{HouseholdRegistry, InMemoryHouseholdRegistry};
pub use ledger::Ledger;

use crate::config::SimulationConfig;
use crate::domain::{Reading, Trade};

/// Isolated storage for the simulation namespace.
pub struct Repositories {
    pub households: Box<dyn HouseholdRegistry>,
    pub readings: Ledger<Reading>,
    pub trades: Ledger<Trade>,
}

impl Repositories {
    pub fn new(cfg: &SimulationConfig, households: Box<dyn HouseholdRegistry>) -> Self {
        Self {
            households,
            readings: Ledger::new(cfg.readings_cap),
            trades: Ledger::new(cfg.trades_cap),
        }
    }
}
