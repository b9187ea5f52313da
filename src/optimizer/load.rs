use serde::{Deserialize, Serialize};

use crate::domain::HouseholdId;

use super::NetworkState;

const MIN_DEFICIT_KWH: f64 = 1.0;
const SHIFTABLE_SHARE: f64 = 0.3;
const MAX_SHIFTABLE_KWH: f64 = 2.0;
const SAVINGS_SHARE: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadCategory {
    Refrigeration,
    Medical,
    Lighting,
    WaterHeating,
    AirConditioning,
    EvCharging,
}

pub const PRIORITY_LOADS: [LoadCategory; 3] = [
    LoadCategory::Refrigeration,
    LoadCategory::Medical,
    LoadCategory::Lighting,
];

pub const DEFERRABLE_LOADS: [LoadCategory; 3] = [
    LoadCategory::WaterHeating,
    LoadCategory::AirConditioning,
    LoadCategory::EvCharging,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadShiftPlan {
    pub household_id: HouseholdId,
    pub deficit_kwh: f64,
    pub priority_loads: Vec<LoadCategory>,
    pub deferrable_loads: Vec<LoadCategory>,
    pub shiftable_load_kwh: f64,
    pub optimal_shift_hour: u32,
    pub potential_savings_kwh: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadManagement {
    pub plans: Vec<LoadShiftPlan>,
    pub peak_demand_reduction_kwh: f64,
}

pub fn is_peak_hour(hour: u32) -> bool {
    (17..=21).contains(&hour)
}

/// Hour to move deferrable load to: four hours out of the evening peak, else the next hour.
pub fn optimal_shift_hour(hour: u32) -> u32 {
    if is_peak_hour(hour) {
        (hour + 4) % 24
    } else {
        (hour + 1) % 24
    }
}

pub fn manage_load(network: &NetworkState) -> LoadManagement {
    let plans: Vec<LoadShiftPlan> = network
        .households
        .iter()
        .filter(|f| f.is_online)
        .filter_map(|f| {
            let deficit =
                f.predicted_demand_kwh - f.predicted_generation_kwh - f.stored_energy_kwh;
            (deficit > MIN_DEFICIT_KWH).then(|| LoadShiftPlan {
                household_id: f.household_id,
                deficit_kwh: deficit,
                priority_loads: PRIORITY_LOADS.to_vec(),
                deferrable_loads: DEFERRABLE_LOADS.to_vec(),
                shiftable_load_kwh: (SHIFTABLE_SHARE * deficit).min(MAX_SHIFTABLE_KWH),
                optimal_shift_hour: optimal_shift_hour(network.hour),
                potential_savings_kwh: SAVINGS_SHARE * deficit,
            })
        })
        .collect();

    let peak_demand_reduction_kwh: f64 = plans.iter().map(|p| p.potential_savings_kwh).sum();
    LoadManagement {
        plans,
        peak_demand_reduction_kwh,
    }
}
