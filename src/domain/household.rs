use serde::{Deserialize, Serialize};
use validator::Validate;

pub type HouseholdId = u32;

/// First id of the simulation namespace. Live marketplace ids stay below it.
pub const SIM_ID_BASE: HouseholdId = 9001;

/// A participating household as seen by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Household {
    pub id: HouseholdId,
    #[validate(length(min = 1))]
    pub name: String,
    pub address: String,
    #[validate(range(min = 0.0))]
    pub solar_capacity_kw: f64,
    #[validate(range(min = 0.0))]
    pub battery_capacity_kwh: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub current_battery_level_pct: f64,
    pub is_online: bool,
}

impl Household {
    /// Energy currently held in the battery.
    pub fn stored_energy_kwh(&self) -> f64 {
        self.current_battery_level_pct / 100.0 * self.battery_capacity_kwh
    }

    pub fn has_generation(&self) -> bool {
        self.solar_capacity_kw > 0.0
    }

    pub fn has_battery(&self) -> bool {
        self.battery_capacity_kwh > 0.0
    }

    /// Apply a battery energy delta in kWh, keeping the level inside [0, capacity].
    pub fn apply_battery_delta(&mut self, delta_kwh: f64) {
        if self.battery_capacity_kwh <= 0.0 {
            return;
        }
        let stored = (self.stored_energy_kwh() + delta_kwh).clamp(0.0, self.battery_capacity_kwh);
        self.current_battery_level_pct = (stored / self.battery_capacity_kwh * 100.0).clamp(0.0, 100.0);
    }

    pub fn apply(&mut self, update: &HouseholdUpdate) {
        if let Some(level) = update.current_battery_level_pct {
            self.current_battery_level_pct = level;
        }
        if let Some(online) = update.is_online {
            self.is_online = online;
        }
    }
}

/// Partial update accepted by the registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HouseholdUpdate {
    pub current_battery_level_pct: Option<f64>,
    pub is_online: Option<bool>,
}

impl HouseholdUpdate {
    pub fn online(is_online: bool) -> Self {
        Self {
            is_online: Some(is_online),
            ..Default::default()
        }
    }

    pub fn battery_level(pct: f64) -> Self {
        Self {
            current_battery_level_pct: Some(pct),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn household(level: f64) -> Household {
        Household {
            id: SIM_ID_BASE,
            name: "Test Home".into(),
            address: "1 Main St".into(),
            solar_capacity_kw: 5.0,
            battery_capacity_kwh: 10.0,
            current_battery_level_pct: level,
            is_online: true,
        }
    }

    #[test]
    fn stored_energy_follows_level() {
        assert!((household(50.0).stored_energy_kwh() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn battery_delta_is_clamped() {
        let mut h = household(90.0);
        h.apply_battery_delta(2.0);
        assert_eq!(h.current_battery_level_pct, 100.0);

        let mut h = household(10.0);
        h.apply_battery_delta(-1.5);
        assert_eq!(h.current_battery_level_pct, 0.0);
    }

    #[test]
    fn validation_rejects_out_of_range_level() {
        assert!(household(50.0).validate().is_ok());
        assert!(household(120.0).validate().is_err());
        assert!(household(-1.0).validate().is_err());
    }
}
