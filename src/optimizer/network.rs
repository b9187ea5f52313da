use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::domain::{Household, HouseholdForecast, HouseholdId, WeatherObservation};
use crate::forecast::Forecaster;

/// Snapshot of the whole network for one tick, in registry order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkState {
    pub timestamp: NaiveDateTime,
    pub hour: u32,
    pub weather: Option<WeatherObservation>,
    pub households: Vec<HouseholdForecast>,
    pub total_generation_kwh: f64,
    pub total_demand_kwh: f64,
    pub total_stored_kwh: f64,
}

impl NetworkState {
    pub fn from_forecasts(
        timestamp: NaiveDateTime,
        weather: Option<WeatherObservation>,
        households: Vec<HouseholdForecast>,
    ) -> Self {
        let total_generation_kwh: f64 = households.iter().map(|f| f.predicted_generation_kwh).sum();
        let total_demand_kwh: f64 = households.iter().map(|f| f.predicted_demand_kwh).sum();
        let total_stored_kwh: f64 = households.iter().map(|f| f.stored_energy_kwh).sum();
        Self {
            timestamp,
            hour: timestamp.hour(),
            weather,
            households,
            total_generation_kwh,
            total_demand_kwh,
            total_stored_kwh,
        }
    }

    pub fn forecast_for(&self, id: HouseholdId) -> Option<&HouseholdForecast> {
        self.households.iter().find(|f| f.household_id == id)
    }

    pub fn in_need(&self) -> impl Iterator<Item = &HouseholdForecast> {
        self.households.iter().filter(|f| f.needs_support)
    }
}

/// Forecast every household and aggregate network totals.
pub fn analyze_network(
    households: &[Household],
    weather: Option<&WeatherObservation>,
    at: NaiveDateTime,
    forecaster: &mut Forecaster,
) -> NetworkState {
    let forecasts = households
        .iter()
        .map(|h| forecaster.forecast(h, weather, at))
        .collect();
    NetworkState::from_forecasts(at, weather.cloned(), forecasts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WeatherCondition;
    use chrono::NaiveDate;

    fn home(id: HouseholdId, level: f64, online: bool) -> Household {
        Household {
            id,
            name: format!("Home {id}"),
            address: format!("{id} Elm St"),
            solar_capacity_kw: 6.0,
            battery_capacity_kwh: 10.0,
            current_battery_level_pct: level,
            is_online: online,
        }
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 12)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn totals_match_per_household_sums() {
        let households = vec![home(9001, 50.0, true), home(9002, 85.0, true)];
        let weather = WeatherObservation::for_condition(WeatherCondition::Sunny);
        let state = analyze_network(
            &households,
            Some(&weather),
            noon(),
            &mut Forecaster::deterministic(),
        );
        let generation: f64 = state.households.iter().map(|f| f.predicted_generation_kwh).sum();
        assert_eq!(state.total_generation_kwh, generation);
        assert!((state.total_stored_kwh - 13.5).abs() < 1e-9);
        assert_eq!(state.hour, 12);
    }

    #[test]
    fn flags_follow_thresholds() {
        let h = home(9001, 90.0, true);
        // full battery can support even with a deficit
        let f = HouseholdForecast::new(&h, 0.5, 2.0);
        assert!(f.can_support);
        assert!(f.needs_support);

        let h = home(9002, 50.0, true);
        let f = HouseholdForecast::new(&h, 2.0, 2.0);
        assert!(!f.can_support);
        assert!(!f.needs_support);
    }

    #[test]
    fn offline_households_are_idle() {
        let households = vec![home(9001, 50.0, false)];
        let weather = WeatherObservation::for_condition(WeatherCondition::Sunny);
        let state = analyze_network(
            &households,
            Some(&weather),
            noon(),
            &mut Forecaster::deterministic(),
        );
        assert_eq!(state.total_generation_kwh, 0.0);
        assert_eq!(state.total_demand_kwh, 0.0);
    }
}
