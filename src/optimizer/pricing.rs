use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{HouseholdId, TradingPair};

/// Time-of-use band for the base rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfUse {
    Peak,
    Morning,
    Daytime,
    OffPeak,
}

impl TimeOfUse {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            18..=22 => Self::Peak,
            6..=9 => Self::Morning,
            10..=17 => Self::Daytime,
            _ => Self::OffPeak,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub peak_rate: f64,
    pub morning_rate: f64,
    pub daytime_rate: f64,
    pub off_peak_rate: f64,
    /// Surcharge per 100 distance units.
    pub transmission_loss_factor: f64,
    pub transmission_loss_cap: f64,
    pub carbon_discount: f64,
    pub min_price: f64,
    pub max_price: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            peak_rate: 8.50,
            morning_rate: 6.50,
            daytime_rate: 5.00,
            off_peak_rate: 3.50,
            transmission_loss_factor: 2.0,
            transmission_loss_cap: 0.75,
            carbon_discount: 0.25,
            min_price: 2.50,
            max_price: 12.00,
        }
    }
}

/// Multiplier from network utilization (demand / generation).
pub fn congestion_multiplier(total_generation: f64, total_demand: f64) -> f64 {
    let utilization = if total_generation > 0.0 {
        total_demand / total_generation
    } else if total_demand > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };
    match utilization {
        u if u >= 1.5 => 1.30,
        u if u >= 1.2 => 1.15,
        u if u >= 0.9 => 1.05,
        _ => 1.00,
    }
}

/// Multiplier from supply/demand ratio: shortage raises price, surplus lowers it.
pub fn elasticity_multiplier(total_generation: f64, total_demand: f64) -> f64 {
    let ratio = if total_demand > 0.0 {
        total_generation / total_demand
    } else if total_generation > 0.0 {
        f64::INFINITY
    } else {
        1.0
    };
    match ratio {
        r if r < 0.5 => 1.25,
        r if r < 0.8 => 1.10,
        r if r < 1.2 => 1.00,
        r if r < 2.0 => 0.90,
        _ => 0.80,
    }
}

#[derive(Debug, Clone, Default)]
pub struct PricingModel {
    pub config: PricingConfig,
}

impl PricingModel {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn base_rate(&self, hour: u32) -> f64 {
        match TimeOfUse::from_hour(hour) {
            TimeOfUse::Peak => self.config.peak_rate,
            TimeOfUse::Morning => self.config.morning_rate,
            TimeOfUse::Daytime => self.config.daytime_rate,
            TimeOfUse::OffPeak => self.config.off_peak_rate,
        }
    }

    pub fn transmission_surcharge(&self, distance: f64) -> f64 {
        (distance.max(0.0) / 100.0 * self.config.transmission_loss_factor)
            .min(self.config.transmission_loss_cap)
    }

    /// Price per kWh for one pair, clamped and rounded to cents.
    pub fn price_for_pair(
        &self,
        pair: &TradingPair,
        hour: u32,
        total_generation: f64,
        total_demand: f64,
    ) -> f64 {
        let raw = (self.base_rate(hour) + self.transmission_surcharge(pair.distance_km))
            * congestion_multiplier(total_generation, total_demand)
            * pair.priority.premium()
            * elasticity_multiplier(total_generation, total_demand)
            - self.config.carbon_discount;
        let clamped = if raw.is_finite() {
            raw.clamp(self.config.min_price, self.config.max_price)
        } else {
            self.config.max_price
        };
        (clamped * 100.0).round() / 100.0
    }

    /// One price per supplier; a later pair for the same supplier overwrites.
    pub fn price_pairs(
        &self,
        pairs: &[TradingPair],
        hour: u32,
        total_generation: f64,
        total_demand: f64,
    ) -> BTreeMap<HouseholdId, f64> {
        pairs
            .iter()
            .map(|p| {
                (
                    p.supplier_id,
                    self.price_for_pair(p, hour, total_generation, total_demand),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;
    use proptest::prelude::*;
    use rstest::rstest;

    fn pair(priority: Priority, distance_km: f64) -> TradingPair {
        TradingPair {
            supplier_id: 9001,
            demander_id: 9002,
            energy_amount_kwh: 1.0,
            distance_km,
            priority,
        }
    }

    #[rstest]
    #[case(19, TimeOfUse::Peak)]
    #[case(22, TimeOfUse::Peak)]
    #[case(7, TimeOfUse::Morning)]
    #[case(12, TimeOfUse::Daytime)]
    #[case(23, TimeOfUse::OffPeak)]
    #[case(3, TimeOfUse::OffPeak)]
    fn time_of_use_bands(#[case] hour: u32, #[case] expected: TimeOfUse) {
        assert_eq!(TimeOfUse::from_hour(hour), expected);
    }

    #[test]
    fn scenario_price_beats_off_peak_base() {
        let model = PricingModel::default();
        let price = model.price_for_pair(&pair(Priority::High, 7.5), 12, 5.5, 5.0);
        // (5.00 + 0.15) * 1.05 * 1.25 * 1.0 - 0.25
        assert!((price - 6.51).abs() < 1e-9);
        assert!(price > model.config.off_peak_rate);
    }

    #[test]
    fn priority_premium_raises_price() {
        let model = PricingModel::default();
        let normal = model.price_for_pair(&pair(Priority::Normal, 5.0), 12, 10.0, 10.0);
        let emergency = model.price_for_pair(&pair(Priority::Emergency, 5.0), 12, 10.0, 10.0);
        assert!(emergency > normal);
    }

    #[test]
    fn transmission_surcharge_is_capped() {
        let model = PricingModel::default();
        assert_eq!(model.transmission_surcharge(1000.0), 0.75);
        assert!((model.transmission_surcharge(10.0) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn zero_totals_stay_in_bounds() {
        let model = PricingModel::default();
        let p = model.price_for_pair(&pair(Priority::Normal, 3.0), 2, 0.0, 0.0);
        assert!((2.5..=12.0).contains(&p));
    }

    #[test]
    fn later_pair_overwrites_supplier_price() {
        let model = PricingModel::default();
        let pairs = vec![pair(Priority::Normal, 2.0), pair(Priority::Emergency, 2.0)];
        let prices = model.price_pairs(&pairs, 12, 10.0, 10.0);
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[&9001], model.price_for_pair(&pairs[1], 12, 10.0, 10.0));
    }

    proptest! {
        #[test]
        fn prices_always_within_bounds(
            hour in 0u32..24,
            distance in 0.0f64..50.0,
            generation in 0.0f64..100.0,
            demand in 0.0f64..100.0,
            p in 0usize..3,
        ) {
            let priority = [Priority::Normal, Priority::High, Priority::Emergency][p];
            let model = PricingModel::default();
            let price = model.price_for_pair(&pair(priority, distance), hour, generation, demand);
            prop_assert!((2.50..=12.00).contains(&price));
            prop_assert_eq!(price, model.price_for_pair(&pair(priority, distance), hour, generation, demand));
        }
    }
}
