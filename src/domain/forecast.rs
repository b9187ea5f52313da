use serde::{Deserialize, Serialize};

use super::{Household, HouseholdId};

/// Per-household prediction for a single tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdForecast {
    pub household_id: HouseholdId,
    pub predicted_generation_kwh: f64,
    pub predicted_demand_kwh: f64,
    /// generation - demand
    pub net_balance_kwh: f64,
    pub stored_energy_kwh: f64,
    pub battery_capacity_kwh: f64,
    pub battery_level_pct: f64,
    pub is_online: bool,
    pub can_support: bool,
    pub needs_support: bool,
}

impl HouseholdForecast {
    pub fn new(household: &Household, generation_kwh: f64, demand_kwh: f64) -> Self {
        let generation = generation_kwh.max(0.0);
        let demand = demand_kwh.max(0.0);
        let stored = household.stored_energy_kwh();
        let capacity = household.battery_capacity_kwh;

        let can_support = generation > demand * 1.1 || stored > capacity * 0.8;
        let needs_support = generation < demand * 0.9 || stored < capacity * 0.3;

        Self {
            household_id: household.id,
            predicted_generation_kwh: generation,
            predicted_demand_kwh: demand,
            net_balance_kwh: generation - demand,
            stored_energy_kwh: stored,
            battery_capacity_kwh: capacity,
            battery_level_pct: household.current_battery_level_pct,
            is_online: household.is_online,
            can_support,
            needs_support,
        }
    }

    /// Battery fill as a share of capacity; zero-capacity households read as empty.
    pub fn battery_fill(&self) -> f64 {
        if self.battery_capacity_kwh > 0.0 {
            self.stored_energy_kwh / self.battery_capacity_kwh
        } else {
            0.0
        }
    }
}
