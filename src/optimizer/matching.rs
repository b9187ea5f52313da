//! Greedy nearest-supplier matching.
//!
//! Demanders are visited in registry order and each takes energy from the
//! closest supplier that still has surplus. This is first-fit, not a global
//! assignment: the visiting order decides who gets scarce surplus.

use std::collections::HashMap;

use crate::domain::{Household, HouseholdForecast, HouseholdId, Priority, TradingPair, MAX_TRADE_KWH};

use super::NetworkState;

const MIN_DISTANCE: f64 = 1.0;
const MAX_DISTANCE: f64 = 15.0;

/// Stand-in for geocoded distance: a symmetric hash of the two addresses
/// mapped into [1, 15].
pub fn address_distance(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a == b {
        return MIN_DISTANCE;
    }
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

    // FNV-1a
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in lo.bytes().chain(std::iter::once(b'|')).chain(hi.bytes()) {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }

    let span = ((MAX_DISTANCE - MIN_DISTANCE) * 100.0) as u64;
    MIN_DISTANCE + (hash % (span + 1)) as f64 / 100.0
}

pub fn assign_priority(forecast: &HouseholdForecast) -> Priority {
    if forecast.battery_level_pct < 10.0 && forecast.net_balance_kwh < -2.0 {
        Priority::Emergency
    } else if forecast.battery_level_pct < 20.0 || forecast.net_balance_kwh < -1.5 {
        Priority::High
    } else {
        Priority::Normal
    }
}

pub fn is_supplier(f: &HouseholdForecast) -> bool {
    f.is_online
        && f.net_balance_kwh > 0.0
        && (f.predicted_generation_kwh > f.predicted_demand_kwh * 0.8
            || f.stored_energy_kwh > f.battery_capacity_kwh * 0.6)
}

pub fn is_demander(f: &HouseholdForecast) -> bool {
    f.is_online
        && f.net_balance_kwh < 0.0
        && (f.predicted_generation_kwh < f.predicted_demand_kwh * 1.2
            || f.stored_energy_kwh < f.battery_capacity_kwh * 0.4)
}

/// Pair each demander with its nearest supplier that still has surplus.
///
/// `households` supplies addresses; forecasts without a matching household
/// are skipped.
pub fn match_households(households: &[Household], network: &NetworkState) -> Vec<TradingPair> {
    let addresses: HashMap<HouseholdId, &str> = households
        .iter()
        .map(|h| (h.id, h.address.as_str()))
        .collect();

    // (id, address, remaining surplus)
    let mut suppliers: Vec<(HouseholdId, &str, f64)> = network
        .households
        .iter()
        .filter(|f| is_supplier(f))
        .filter_map(|f| {
            addresses
                .get(&f.household_id)
                .map(|addr| (f.household_id, *addr, f.net_balance_kwh))
        })
        .collect();

    let mut balances: HashMap<HouseholdId, f64> = network
        .households
        .iter()
        .map(|f| (f.household_id, f.net_balance_kwh))
        .collect();

    let mut pairs = Vec::new();
    for demander in network.households.iter().filter(|f| is_demander(f)) {
        let Some(demander_addr) = addresses.get(&demander.household_id) else {
            continue;
        };
        let deficit = -balances
            .get(&demander.household_id)
            .copied()
            .unwrap_or(demander.net_balance_kwh);
        if deficit <= 0.0 {
            continue;
        }

        let mut best: Option<(usize, f64)> = None;
        for (idx, (id, addr, remaining)) in suppliers.iter().enumerate() {
            if *remaining <= 0.0 || *id == demander.household_id {
                continue;
            }
            let d = address_distance(addr, demander_addr);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((idx, d));
            }
        }
        let Some((idx, distance_km)) = best else {
            continue;
        };

        let supplier = &mut suppliers[idx];
        let amount = deficit.min(supplier.2).min(MAX_TRADE_KWH);
        if amount <= 0.0 {
            continue;
        }
        supplier.2 -= amount;
        if let Some(b) = balances.get_mut(&demander.household_id) {
            *b += amount;
        }

        pairs.push(TradingPair {
            supplier_id: supplier.0,
            demander_id: demander.household_id,
            energy_amount_kwh: amount,
            distance_km,
            priority: assign_priority(demander),
        });
    }
    pairs
}
