use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::forecast::GeoLocation;
use crate::optimizer::PricingConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub weather: WeatherConfig,
    pub pricing: PricingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_seconds: u64,
    /// Seeds demand variance, fallback weather and household fixtures.
    pub seed: u64,
    pub household_count: usize,
    pub readings_cap: usize,
    pub trades_cap: usize,
    pub autostart: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 10,
            seed: 42,
            household_count: 12,
            readings_cap: 1000,
            trades_cap: 500,
            autostart: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherProvider {
    Smhi,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub provider: WeatherProvider,
    pub base_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: Option<String>,
    pub http_timeout_seconds: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            provider: WeatherProvider::Fallback,
            base_url: "https://opendata-download-metfcst.smhi.se/api".to_string(),
            latitude: 59.3293,
            longitude: 18.0686,
            location_name: Some("Stockholm".to_string()),
            http_timeout_seconds: 10,
        }
    }
}

impl WeatherConfig {
    pub fn location(&self) -> GeoLocation {
        GeoLocation {
            latitude: self.latitude,
            longitude: self.longitude,
            name: self.location_name.clone(),
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("PEE__").split("__"))
    }

    pub fn load() -> Result<Self> {
        Ok(Self::figment().extract()?)
    }
}
