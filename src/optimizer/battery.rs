use std::collections::BTreeMap;

use crate::domain::{BatteryAction, HouseholdForecast, HouseholdId};

use super::NetworkState;

/// Energy added to a battery by one `Charge` tick (kWh).
pub const CHARGE_STEP_KWH: f64 = 2.0;
/// Energy drawn from a battery by one `Discharge` tick (kWh).
pub const DISCHARGE_STEP_KWH: f64 = 1.5;

pub fn battery_action(forecast: &HouseholdForecast) -> BatteryAction {
    if forecast.net_balance_kwh > 0.0 {
        if forecast.battery_level_pct < 80.0 {
            BatteryAction::Charge
        } else {
            BatteryAction::Sell
        }
    } else if forecast.battery_level_pct > 30.0 {
        BatteryAction::Discharge
    } else {
        BatteryAction::Buy
    }
}

/// One action per online household.
pub fn battery_strategy(network: &NetworkState) -> BTreeMap<HouseholdId, BatteryAction> {
    network
        .households
        .iter()
        .filter(|f| f.is_online)
        .map(|f| (f.household_id, battery_action(f)))
        .collect()
}

impl BatteryAction {
    /// Battery energy delta applied at the end of a tick.
    pub fn energy_delta_kwh(&self) -> f64 {
        match self {
            BatteryAction::Charge => CHARGE_STEP_KWH,
            BatteryAction::Discharge => -DISCHARGE_STEP_KWH,
            BatteryAction::Sell | BatteryAction::Buy => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Household;
    use rstest::rstest;

    #[rstest]
    #[case(3.0, 1.0, 50.0, BatteryAction::Charge)]
    #[case(3.0, 1.0, 85.0, BatteryAction::Sell)]
    #[case(1.0, 3.0, 50.0, BatteryAction::Discharge)]
    #[case(1.0, 3.0, 20.0, BatteryAction::Buy)]
    #[case(2.0, 2.0, 30.0, BatteryAction::Buy)]
    fn action_table(
        #[case] generation: f64,
        #[case] demand: f64,
        #[case] level: f64,
        #[case] expected: BatteryAction,
    ) {
        let h = Household {
            id: 9001,
            name: "Home".into(),
            address: "1 A St".into(),
            solar_capacity_kw: 4.0,
            battery_capacity_kwh: 10.0,
            current_battery_level_pct: level,
            is_online: true,
        };
        let f = HouseholdForecast::new(&h, generation, demand);
        assert_eq!(battery_action(&f), expected);
    }
}
