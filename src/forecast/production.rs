use crate::domain::{Household, WeatherObservation};

/// Relative solar output per hour of day. Zero outside 05:00-20:00, flat peak 11-13.
const SOLAR_CURVE: [f64; 24] = [
    0.0, 0.0, 0.0, 0.0, 0.0, // 00-04
    0.05, 0.15, 0.30, 0.50, 0.70, 0.88, // 05-10
    1.0, 1.0, 1.0, // 11-13
    0.90, 0.75, 0.58, 0.40, 0.22, 0.10, 0.03, // 14-20
    0.0, 0.0, 0.0, // 21-23
];

/// Seasonal generation multiplier, January first.
const SEASONAL_GENERATION: [f64; 12] = [
    0.55, 0.65, 0.80, 0.95, 1.05, 1.10, 1.10, 1.05, 0.95, 0.80, 0.65, 0.55,
];

pub fn solar_curve(hour: u32) -> f64 {
    SOLAR_CURVE.get(hour as usize).copied().unwrap_or(0.0)
}

pub fn seasonal_generation(month: u32) -> f64 {
    month
        .checked_sub(1)
        .and_then(|m| SEASONAL_GENERATION.get(m as usize))
        .copied()
        .unwrap_or(1.0)
}

pub fn cloud_impact(cloud_cover_pct: f64) -> f64 {
    (1.0 - cloud_cover_pct.clamp(0.0, 100.0) / 100.0 * 0.7).max(0.1)
}

/// Panel efficiency loss above 25°C, floored at 70%.
pub fn temperature_impact(temperature_c: f64) -> f64 {
    if temperature_c <= 25.0 {
        1.0
    } else {
        (1.0 - (temperature_c - 25.0) * 0.004).max(0.7)
    }
}

/// Predicted solar generation (kWh) for one hour.
///
/// `month` is 1-based. Without a weather observation the condition impact is
/// zero, so the prediction is zero.
pub fn predict_generation(
    household: &Household,
    weather: Option<&WeatherObservation>,
    hour: u32,
    month: u32,
) -> f64 {
    let Some(weather) = weather else {
        return 0.0;
    };
    let generation = household.solar_capacity_kw.max(0.0)
        * weather.condition.solar_multiplier()
        * cloud_impact(weather.cloud_cover_pct)
        * temperature_impact(weather.temperature_c)
        * solar_curve(hour)
        * seasonal_generation(month);
    generation.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WeatherCondition;
    use rstest::rstest;

    fn home(capacity: f64) -> Household {
        Household {
            id: 9001,
            name: "Home".into(),
            address: "1 Solar Way".into(),
            solar_capacity_kw: capacity,
            battery_capacity_kwh: 10.0,
            current_battery_level_pct: 50.0,
            is_online: true,
        }
    }

    #[rstest]
    #[case(0)]
    #[case(4)]
    #[case(21)]
    #[case(23)]
    fn zero_outside_daylight(#[case] hour: u32) {
        let w = WeatherObservation::for_condition(WeatherCondition::Sunny);
        assert_eq!(predict_generation(&home(8.0), Some(&w), hour, 6), 0.0);
    }

    #[test]
    fn zero_without_weather() {
        assert_eq!(predict_generation(&home(8.0), None, 12, 6), 0.0);
    }

    #[test]
    fn noon_sunny_summer_uses_all_factors() {
        let w = WeatherObservation {
            condition: WeatherCondition::Sunny,
            temperature_c: 20.0,
            cloud_cover_pct: 0.0,
            wind_speed_ms: 2.0,
        };
        let g = predict_generation(&home(5.0), Some(&w), 12, 6);
        assert!((g - 5.0 * 1.10).abs() < 1e-9);
    }

    #[test]
    fn stormy_is_far_below_sunny() {
        let sunny = WeatherObservation::for_condition(WeatherCondition::Sunny);
        let stormy = WeatherObservation::for_condition(WeatherCondition::Stormy);
        let a = predict_generation(&home(5.0), Some(&sunny), 12, 6);
        let b = predict_generation(&home(5.0), Some(&stormy), 12, 6);
        assert!(b < a * 0.1);
    }

    #[test]
    fn impact_bounds() {
        assert!((cloud_impact(100.0) - 0.3).abs() < 1e-9);
        assert_eq!(temperature_impact(10.0), 1.0);
        assert_eq!(temperature_impact(200.0), 0.7);
        assert!((temperature_impact(35.0) - 0.96).abs() < 1e-9);
    }
}
