//! Outage impact and recovery planning.

use std::collections::HashSet;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::domain::{Household, HouseholdId};

/// Share of the network picked when an outage names no households.
pub const DEFAULT_OUTAGE_SHARE: f64 = 0.25;
const RECOVERY_HOURS_PER_HOUSEHOLD: f64 = 0.5;
const PRIORITY_BATTERY_BELOW_PCT: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyRouting {
    pub critical_loads_first: bool,
    pub max_distance_km: f64,
    pub emergency_reserve_ratio: f64,
    pub available_capacity_kw: f64,
}

impl EmergencyRouting {
    pub fn for_capacity(surviving_capacity_kw: f64) -> Self {
        Self {
            critical_loads_first: true,
            max_distance_km: 10.0,
            emergency_reserve_ratio: 0.2,
            available_capacity_kw: surviving_capacity_kw * 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecoveryApproach {
    CriticalFirst,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryPlan {
    pub estimated_recovery_time_hrs: f64,
    pub priority_household_ids: Vec<HouseholdId>,
    pub approach: RecoveryApproach,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutageResponse {
    pub affected_household_ids: Vec<HouseholdId>,
    pub surviving_capacity_kw: f64,
    pub emergency_routing: EmergencyRouting,
    pub recovery_plan: RecoveryPlan,
    pub community_resilience: f64,
}

/// Ids of the lowest-battery `ceil(n * 0.25)` households; ties keep registry order.
pub fn default_outage_targets(households: &[Household]) -> Vec<HouseholdId> {
    let count = (households.len() as f64 * DEFAULT_OUTAGE_SHARE).ceil() as usize;
    let mut ranked: Vec<&Household> = households.iter().collect();
    ranked.sort_by_key(|h| OrderedFloat(h.current_battery_level_pct));
    ranked.into_iter().take(count).map(|h| h.id).collect()
}

/// Composite resilience in [0, 1]; 0.5 for an empty network.
pub fn resilience_score(households: &[Household], affected: &HashSet<HouseholdId>) -> f64 {
    if households.is_empty() {
        return 0.5;
    }
    let total = households.len() as f64;
    let with_generation = households.iter().filter(|h| h.has_generation()).count() as f64;
    let with_battery = households.iter().filter(|h| h.has_battery()).count() as f64;
    let affected_count = households.iter().filter(|h| affected.contains(&h.id)).count() as f64;

    (0.4 * (with_generation / total) + 0.3 * (with_battery / total)
        + 0.3 * (1.0 - affected_count / total))
        .clamp(0.0, 1.0)
}

/// Simulate an outage over `affected`. Ids not in `households` are ignored.
pub fn simulate_outage(households: &[Household], affected: &[HouseholdId]) -> OutageResponse {
    let known: HashSet<HouseholdId> = households.iter().map(|h| h.id).collect();
    let affected: HashSet<HouseholdId> = affected
        .iter()
        .copied()
        .filter(|id| known.contains(id))
        .collect();

    let surviving_capacity_kw: f64 = households
        .iter()
        .filter(|h| !affected.contains(&h.id))
        .map(|h| h.solar_capacity_kw)
        .sum();

    let affected_in_order: Vec<&Household> = households
        .iter()
        .filter(|h| affected.contains(&h.id))
        .collect();

    let recovery_plan = RecoveryPlan {
        estimated_recovery_time_hrs: RECOVERY_HOURS_PER_HOUSEHOLD * affected_in_order.len() as f64,
        priority_household_ids: affected_in_order
            .iter()
            .filter(|h| h.current_battery_level_pct < PRIORITY_BATTERY_BELOW_PCT)
            .map(|h| h.id)
            .collect(),
        approach: RecoveryApproach::CriticalFirst,
    };

    OutageResponse {
        affected_household_ids: affected_in_order.iter().map(|h| h.id).collect(),
        surviving_capacity_kw,
        emergency_routing: EmergencyRouting::for_capacity(surviving_capacity_kw),
        recovery_plan,
        community_resilience: resilience_score(households, &affected),
    }
}
