use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::HouseholdId;

/// Hard cap on a single trading pair, in kWh.
pub const MAX_TRADE_KWH: f64 = 2.0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    Normal,
    High,
    Emergency,
}

impl Priority {
    pub fn premium(&self) -> f64 {
        match self {
            Self::Normal => 1.0,
            Self::High => 1.25,
            Self::Emergency => 1.5,
        }
    }
}

/// Per-household battery decision for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BatteryAction {
    Charge,
    Discharge,
    Sell,
    Buy,
}

/// A proposed transfer from one supplier to one demander for a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingPair {
    pub supplier_id: HouseholdId,
    pub demander_id: HouseholdId,
    pub energy_amount_kwh: f64,
    pub distance_km: f64,
    pub priority: Priority,
}

/// Synthetic meter reading recorded by the simulation tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: Uuid,
    pub household_id: HouseholdId,
    pub timestamp: DateTime<Utc>,
    pub generation_kwh: f64,
    pub consumption_kwh: f64,
    pub battery_level_pct: f64,
}

/// A priced trade appended to the simulation ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub supplier_id: HouseholdId,
    pub demander_id: HouseholdId,
    pub energy_kwh: f64,
    pub price_per_kwh: f64,
    pub priority: Priority,
    pub timestamp: DateTime<Utc>,
}

impl Trade {
    pub fn from_pair(pair: &TradingPair, price_per_kwh: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            supplier_id: pair.supplier_id,
            demander_id: pair.demander_id,
            energy_kwh: pair.energy_amount_kwh,
            price_per_kwh,
            priority: pair.priority,
            timestamp,
        }
    }
}
