use chrono::{Datelike, NaiveDateTime, Timelike};

use super::{predict_demand, predict_generation, DemandVariance, FixedVariance, SeededVariance};
use crate::domain::{Household, HouseholdForecast, WeatherObservation};

/// Bundles the generation and demand models with the variance source.
pub struct Forecaster {
    variance: Box<dyn DemandVariance>,
}

impl Forecaster {
    pub fn new(variance: Box<dyn DemandVariance>) -> Self {
        Self { variance }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Box::new(SeededVariance::new(seed)))
    }

    /// Forecaster with no random component.
    pub fn deterministic() -> Self {
        Self::new(Box::new(FixedVariance(1.0)))
    }

    /// Forecast one household at `at`. Offline households neither generate
    /// nor draw from the network.
    pub fn forecast(
        &mut self,
        household: &Household,
        weather: Option<&WeatherObservation>,
        at: NaiveDateTime,
    ) -> HouseholdForecast {
        if !household.is_online {
            return HouseholdForecast::new(household, 0.0, 0.0);
        }
        let generation = predict_generation(household, weather, at.hour(), at.month());
        let demand = predict_demand(
            household,
            at.hour(),
            at.weekday(),
            at.month(),
            self.variance.as_mut(),
        );
        HouseholdForecast::new(household, generation, demand)
    }
}

impl Default for Forecaster {
    fn default() -> Self {
        Self::deterministic()
    }
}
