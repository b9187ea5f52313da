use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Sky condition reported by a weather source.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum WeatherCondition {
    Sunny,
    PartlyCloudy,
    Cloudy,
    Overcast,
    Rainy,
    Stormy,
}

impl WeatherCondition {
    /// Share of nameplate solar output available under this condition.
    pub fn solar_multiplier(&self) -> f64 {
        match self {
            Self::Sunny => 1.00,
            Self::PartlyCloudy => 0.75,
            Self::Cloudy => 0.45,
            Self::Overcast => 0.25,
            Self::Rainy => 0.15,
            Self::Stormy => 0.08,
        }
    }

    /// Typical cloud cover used when an observation is synthesized from a condition.
    pub fn typical_cloud_cover_pct(&self) -> f64 {
        match self {
            Self::Sunny => 5.0,
            Self::PartlyCloudy => 35.0,
            Self::Cloudy => 65.0,
            Self::Overcast => 90.0,
            Self::Rainy => 85.0,
            Self::Stormy => 95.0,
        }
    }

    /// Classify a cloud cover percentage (and precipitation) into a condition.
    pub fn from_cloud_cover(cloud_cover_pct: f64, precipitation_mm: f64, wind_speed_ms: f64) -> Self {
        if precipitation_mm > 0.0 && wind_speed_ms >= 15.0 {
            Self::Stormy
        } else if precipitation_mm > 0.0 {
            Self::Rainy
        } else if cloud_cover_pct < 20.0 {
            Self::Sunny
        } else if cloud_cover_pct < 50.0 {
            Self::PartlyCloudy
        } else if cloud_cover_pct < 80.0 {
            Self::Cloudy
        } else {
            Self::Overcast
        }
    }
}

/// One weather reading, immutable for the duration of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub condition: WeatherCondition,
    pub temperature_c: f64,
    pub cloud_cover_pct: f64,
    pub wind_speed_ms: f64,
}

impl WeatherObservation {
    /// Observation with mild defaults for the given condition.
    pub fn for_condition(condition: WeatherCondition) -> Self {
        let temperature_c = match condition {
            WeatherCondition::Sunny => 24.0,
            WeatherCondition::PartlyCloudy => 21.0,
            WeatherCondition::Cloudy => 18.0,
            WeatherCondition::Overcast => 16.0,
            WeatherCondition::Rainy => 14.0,
            WeatherCondition::Stormy => 12.0,
        };
        let wind_speed_ms = match condition {
            WeatherCondition::Stormy => 18.0,
            WeatherCondition::Rainy => 8.0,
            _ => 4.0,
        };
        Self {
            condition,
            temperature_c,
            cloud_cover_pct: condition.typical_cloud_cover_pct(),
            wind_speed_ms,
        }
    }

    pub fn clamped(mut self) -> Self {
        self.cloud_cover_pct = self.cloud_cover_pct.clamp(0.0, 100.0);
        self.wind_speed_ms = self.wind_speed_ms.max(0.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn condition_round_trips_through_strings() {
        for c in WeatherCondition::iter() {
            assert_eq!(WeatherCondition::from_str(&c.to_string()).unwrap(), c);
        }
        assert_eq!(
            WeatherCondition::from_str("Partly-Cloudy").unwrap(),
            WeatherCondition::PartlyCloudy
        );
        assert!(WeatherCondition::from_str("foggy").is_err());
    }

    #[test]
    fn multipliers_decrease_with_worse_weather() {
        let m: Vec<f64> = WeatherCondition::iter().map(|c| c.solar_multiplier()).collect();
        assert!(m.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(m[0], 1.0);
        assert_eq!(m[5], 0.08);
    }

    #[test]
    fn serializes_kebab_case() {
        let json = serde_json::to_string(&WeatherCondition::PartlyCloudy).unwrap();
        assert_eq!(json, "\"partly-cloudy\"");
    }
}
