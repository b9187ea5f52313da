use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{EquitableAccess, GridBalancing, LoadManagement};
use crate::domain::{BatteryAction, HouseholdId, TradingPair};

/// Everything the engine decided for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub generated_at: NaiveDateTime,
    pub trading_pairs: Vec<TradingPair>,
    /// Price per kWh keyed by supplier.
    pub prices: BTreeMap<HouseholdId, f64>,
    pub battery_strategy: BTreeMap<HouseholdId, BatteryAction>,
    pub grid_stability_score: f64,
    pub recommendations: Vec<String>,
    pub grid_balancing: GridBalancing,
    pub load_management: LoadManagement,
    pub equitable_access: EquitableAccess,
}

impl OptimizationResult {
    pub fn total_traded_kwh(&self) -> f64 {
        self.trading_pairs.iter().map(|p| p.energy_amount_kwh).sum()
    }

    pub fn price_for(&self, supplier: HouseholdId) -> Option<f64> {
        self.prices.get(&supplier).copied()
    }
}
