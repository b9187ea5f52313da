use serde::{Deserialize, Serialize};

use crate::domain::HouseholdId;

use super::NetworkState;

/// Ratio reported when there is generation but no demand.
pub const MAX_SUPPLY_DEMAND_RATIO: f64 = 10.0;
const SHEDDING_THRESHOLD: f64 = 0.9;
const SHEDDING_TARGET: f64 = 0.85;
/// Net balance (kWh) beyond which a household sheds load or supports the grid.
const IMBALANCE_KWH: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridBalancing {
    pub supply_demand_ratio: f64,
    pub grid_load_factor: f64,
    pub load_shedding_required: bool,
    pub load_shedding_candidates: Vec<HouseholdId>,
    pub grid_support_providers: Vec<HouseholdId>,
    pub recommended_load_reduction_kwh: f64,
}

pub fn supply_demand_ratio(total_generation: f64, total_demand: f64) -> f64 {
    if total_demand > 0.0 {
        (total_generation / total_demand).min(MAX_SUPPLY_DEMAND_RATIO)
    } else if total_generation > 0.0 {
        MAX_SUPPLY_DEMAND_RATIO
    } else {
        1.0
    }
}

/// How close demand is to available supply (generation + storage), in [0, 1].
pub fn grid_load_factor(total_generation: f64, total_stored: f64, total_demand: f64) -> f64 {
    let available = total_generation + total_stored;
    if available > 0.0 {
        (total_demand / available).clamp(0.0, 1.0)
    } else if total_demand > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// 1.0 when there is generation and no demand, 0.5 for an idle network.
pub fn grid_stability_score(total_generation: f64, total_demand: f64) -> f64 {
    if total_demand > 0.0 {
        (total_generation / total_demand).clamp(0.0, 1.0)
    } else if total_generation > 0.0 {
        1.0
    } else {
        0.5
    }
}

pub fn balance_grid(network: &NetworkState) -> GridBalancing {
    let total_generation = network.total_generation_kwh;
    let total_demand = network.total_demand_kwh;

    let grid_load_factor = grid_load_factor(total_generation, network.total_stored_kwh, total_demand);
    let load_shedding_required = grid_load_factor > SHEDDING_THRESHOLD;

    let mut load_shedding_candidates = Vec::new();
    let mut grid_support_providers = Vec::new();
    for f in network.households.iter().filter(|f| f.is_online) {
        let net = f.predicted_generation_kwh - f.predicted_demand_kwh;
        if net < -IMBALANCE_KWH {
            load_shedding_candidates.push(f.household_id);
        } else if net > IMBALANCE_KWH {
            grid_support_providers.push(f.household_id);
        }
    }

    let recommended_load_reduction_kwh = if load_shedding_required {
        ((grid_load_factor - SHEDDING_TARGET) * total_demand).max(0.0)
    } else {
        0.0
    };

    GridBalancing {
        supply_demand_ratio: supply_demand_ratio(total_generation, total_demand),
        grid_load_factor,
        load_shedding_required,
        load_shedding_candidates,
        grid_support_providers,
        recommended_load_reduction_kwh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Household, HouseholdForecast};
    use chrono::NaiveDate;

    fn net(entries: &[(f64, f64, f64)]) -> NetworkState {
        let forecasts = entries
            .iter()
            .enumerate()
            .map(|(i, (g, d, lvl))| {
                let h = Household {
                    id: 9001 + i as u32,
                    name: "Home".into(),
                    address: format!("{i} Rd"),
                    solar_capacity_kw: 5.0,
                    battery_capacity_kwh: 10.0,
                    current_battery_level_pct: *lvl,
                    is_online: true,
                };
                HouseholdForecast::new(&h, *g, *d)
            })
            .collect();
        let at = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap();
        NetworkState::from_forecasts(at, None, forecasts)
    }

    #[test]
    fn stability_edge_cases() {
        assert_eq!(grid_stability_score(5.0, 0.0), 1.0);
        assert_eq!(grid_stability_score(0.0, 0.0), 0.5);
        assert_eq!(grid_stability_score(1.0, 4.0), 0.25);
        assert_eq!(grid_stability_score(8.0, 4.0), 1.0);
    }

    #[test]
    fn ratios_never_divide_by_zero() {
        assert_eq!(supply_demand_ratio(0.0, 0.0), 1.0);
        assert_eq!(supply_demand_ratio(3.0, 0.0), MAX_SUPPLY_DEMAND_RATIO);
        assert_eq!(grid_load_factor(0.0, 0.0, 0.0), 0.0);
        assert_eq!(grid_load_factor(0.0, 0.0, 2.0), 1.0);
    }

    #[test]
    fn shedding_when_load_factor_high() {
        // demand 10 against 0.5 generation and 0 storage
        let state = net(&[(0.5, 6.0, 0.0), (0.0, 4.0, 0.0)]);
        let b = balance_grid(&state);
        assert!(b.load_shedding_required);
        assert_eq!(b.grid_load_factor, 1.0);
        assert!((b.recommended_load_reduction_kwh - 0.15 * 10.0).abs() < 1e-9);
        assert_eq!(b.load_shedding_candidates, vec![9001, 9002]);
        assert!(b.grid_support_providers.is_empty());
    }

    #[test]
    fn providers_and_no_shedding_in_surplus() {
        let state = net(&[(6.0, 1.0, 50.0), (1.0, 1.5, 50.0)]);
        let b = balance_grid(&state);
        assert!(!b.load_shedding_required);
        assert_eq!(b.recommended_load_reduction_kwh, 0.0);
        assert_eq!(b.grid_support_providers, vec![9001]);
    }
}
