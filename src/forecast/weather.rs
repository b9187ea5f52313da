//! Weather sources for the generation forecast.
//!
//! The tick never waits on a failed feed: [`ResilientWeather`] falls back to a
//! seeded generator keyed by a ten-minute time bucket, so the same bucket
//! always yields the same observation.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDateTime, Timelike};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{WeatherCondition, WeatherObservation};

/// Length of one fallback bucket in seconds.
pub const FALLBACK_BUCKET_SECS: i64 = 600;

/// Geographic location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, location: &GeoLocation) -> Result<WeatherObservation>;
}

/// Always reports the same observation.
#[derive(Debug, Clone)]
pub struct StaticWeather(pub WeatherObservation);

#[async_trait]
impl WeatherSource for StaticWeather {
    async fn current(&self, _location: &GeoLocation) -> Result<WeatherObservation> {
        Ok(self.0.clone())
    }
}

/// Deterministic synthetic weather.
#[derive(Debug, Clone, Copy)]
pub struct FallbackWeather {
    pub seed: u64,
}

impl FallbackWeather {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn bucket(at: NaiveDateTime) -> i64 {
        at.and_utc().timestamp().div_euclid(FALLBACK_BUCKET_SECS)
    }

    pub fn observation_at(&self, at: NaiveDateTime) -> WeatherObservation {
        let bucket = Self::bucket(at) as u64;
        let mut rng = StdRng::seed_from_u64(self.seed ^ bucket.wrapping_mul(0x9E37_79B9_7F4A_7C15));

        // Fair-weather days dominate.
        let roll: f64 = rng.gen();
        let condition = match roll {
            r if r < 0.35 => WeatherCondition::Sunny,
            r if r < 0.60 => WeatherCondition::PartlyCloudy,
            r if r < 0.78 => WeatherCondition::Cloudy,
            r if r < 0.88 => WeatherCondition::Overcast,
            r if r < 0.97 => WeatherCondition::Rainy,
            _ => WeatherCondition::Stormy,
        };

        let seasonal = match at.month() {
            12 | 1 | 2 => 4.0,
            3..=5 => 13.0,
            6..=8 => 24.0,
            _ => 14.0,
        };
        let diurnal = if (10..=17).contains(&at.hour()) { 4.0 } else { -2.0 };

        WeatherObservation {
            condition,
            temperature_c: seasonal + diurnal + rng.gen_range(-3.0..=3.0),
            cloud_cover_pct: condition.typical_cloud_cover_pct() + rng.gen_range(-5.0..=5.0),
            wind_speed_ms: WeatherObservation::for_condition(condition).wind_speed_ms
                + rng.gen_range(0.0..=3.0),
        }
        .clamped()
    }
}

/// A live source with deterministic fallback.
pub struct ResilientWeather {
    primary: Option<Box<dyn WeatherSource>>,
    fallback: FallbackWeather,
}

impl ResilientWeather {
    pub fn new(primary: Option<Box<dyn WeatherSource>>, fallback: FallbackWeather) -> Self {
        Self { primary, fallback }
    }

    pub fn fallback_only(seed: u64) -> Self {
        Self::new(None, FallbackWeather::new(seed))
    }

    pub fn fallback(&self) -> &FallbackWeather {
        &self.fallback
    }

    pub async fn observe(&self, location: &GeoLocation, at: NaiveDateTime) -> WeatherObservation {
        if let Some(primary) = &self.primary {
            match primary.current(location).await {
                Ok(obs) => return obs.clamped(),
                Err(e) => warn!(error = %e, "weather source failed, using fallback"),
            }
        }
        self.fallback.observation_at(at)
    }
}

#[cfg(feature = "live-weather")]
pub use smhi::SmhiWeatherSource;

#[cfg(feature = "live-weather")]
mod smhi {
    use super::*;
    use anyhow::Context;
    use chrono::{DateTime, FixedOffset};
    use reqwest::Client;
    use std::time::Duration;
    use tracing::debug;

    /// SMHI point-forecast client; the first time step is used as "current".
    pub struct SmhiWeatherSource {
        client: Client,
        base_url: String,
    }

    impl SmhiWeatherSource {
        pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
            Self {
                client: Client::builder()
                    .timeout(timeout)
                    .build()
                    .unwrap_or_default(),
                base_url: base_url.into(),
            }
        }

        fn parse(response: SmhiResponse) -> Result<WeatherObservation> {
            let first = response
                .time_series
                .into_iter()
                .next()
                .context("SMHI response has no time series")?;

            let mut temperature_c = 15.0;
            let mut cloud_oktas = 4.0;
            let mut wind_speed_ms = 3.0;
            let mut precipitation_mm = 0.0;

            for param in first.parameters {
                let value = param.values.first().copied().unwrap_or(0.0);
                match param.name.as_str() {
                    "t" => temperature_c = value,
                    "tcc_mean" => cloud_oktas = value,
                    "ws" => wind_speed_ms = value,
                    "pmean" => precipitation_mm = value,
                    _ => {}
                }
            }

            // oktas (0-8) to percent
            let cloud_cover_pct = (cloud_oktas * 12.5).clamp(0.0, 100.0);
            Ok(WeatherObservation {
                condition: WeatherCondition::from_cloud_cover(
                    cloud_cover_pct,
                    precipitation_mm,
                    wind_speed_ms,
                ),
                temperature_c,
                cloud_cover_pct,
                wind_speed_ms,
            })
        }
    }

    #[async_trait]
    impl WeatherSource for SmhiWeatherSource {
        async fn current(&self, location: &GeoLocation) -> Result<WeatherObservation> {
            let url = format!(
                "{}/category/pmp3g/version/2/geotype/point/lon/{:.6}/lat/{:.6}/data.json",
                self.base_url.trim_end_matches('/'),
                location.longitude,
                location.latitude
            );
            debug!(%url, "fetching weather from SMHI");

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .context("Failed to send request to SMHI API")?;

            if !response.status().is_success() {
                anyhow::bail!("SMHI API error: {}", response.status());
            }

            let body: SmhiResponse = response
                .json()
                .await
                .context("Failed to parse SMHI response")?;
            Self::parse(body)
        }
    }

    #[derive(Debug, Deserialize)]
    struct SmhiResponse {
        #[serde(rename = "timeSeries")]
        time_series: Vec<SmhiTimeSeries>,
    }

    #[derive(Debug, Deserialize)]
    struct SmhiTimeSeries {
        #[serde(rename = "validTime")]
        #[allow(dead_code)]
        valid_time: DateTime<FixedOffset>,
        parameters: Vec<SmhiParameter>,
    }

    #[derive(Debug, Deserialize)]
    struct SmhiParameter {
        name: String,
        values: Vec<f64>,
    }
}
