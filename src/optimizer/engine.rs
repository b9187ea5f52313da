use tracing::debug;

use super::{
    assess_equity, balance_grid, battery_strategy, grid_stability_score, manage_load,
    match_households, EquitableAccess, GridBalancing, LoadManagement, NetworkState,
    OptimizationResult, PricingModel,
};
use crate::domain::{BatteryAction, Household};
use crate::error::{ensure_finite, EngineResult};

/// Run every optimizer stage over one network snapshot.
///
/// Pure: the caller owns applying battery deltas and recording trades.
pub fn optimize_network(
    households: &[Household],
    network: &NetworkState,
    pricing: &PricingModel,
) -> EngineResult<OptimizationResult> {
    ensure_finite(network.total_generation_kwh, "total generation")?;
    ensure_finite(network.total_demand_kwh, "total demand")?;
    ensure_finite(network.total_stored_kwh, "total stored energy")?;

    let trading_pairs = match_households(households, network);
    let prices = pricing.price_pairs(
        &trading_pairs,
        network.hour,
        network.total_generation_kwh,
        network.total_demand_kwh,
    );
    let battery_strategy = battery_strategy(network);
    let grid_balancing = balance_grid(network);
    let load_management = manage_load(network);
    let equitable_access = assess_equity(network);
    let grid_stability_score =
        grid_stability_score(network.total_generation_kwh, network.total_demand_kwh);

    let recommendations = recommendations(
        network,
        &grid_balancing,
        &load_management,
        &equitable_access,
        trading_pairs.len(),
        battery_strategy
            .values()
            .filter(|a| **a == BatteryAction::Sell)
            .count(),
    );

    debug!(
        pairs = trading_pairs.len(),
        stability = grid_stability_score,
        load_factor = grid_balancing.grid_load_factor,
        equity = equitable_access.equity_score,
        "network optimized"
    );

    Ok(OptimizationResult {
        generated_at: network.timestamp,
        trading_pairs,
        prices,
        battery_strategy,
        grid_stability_score,
        recommendations,
        grid_balancing,
        load_management,
        equitable_access,
    })
}

fn recommendations(
    network: &NetworkState,
    grid: &GridBalancing,
    load: &LoadManagement,
    equity: &EquitableAccess,
    pair_count: usize,
    sellers: usize,
) -> Vec<String> {
    let mut out = Vec::new();

    if grid.load_shedding_required {
        out.push(format!(
            "Grid load at {:.0}% of available supply: shed {:.2} kWh across {} household(s)",
            grid.grid_load_factor * 100.0,
            grid.recommended_load_reduction_kwh,
            grid.load_shedding_candidates.len()
        ));
    }
    if !load.plans.is_empty() {
        out.push(format!(
            "Shift deferrable loads for {} household(s) to save {:.2} kWh at peak",
            load.plans.len(),
            load.peak_demand_reduction_kwh
        ));
    }
    if equity.emergency_support_required {
        out.push(format!(
            "Emergency support: {} vulnerable household(s), redistribute {:.2} kWh",
            equity.vulnerable_count, equity.redistribution.total_redistributed_kwh
        ));
    }
    if pair_count == 0 && network.in_need().any(|f| f.is_online) {
        out.push("No local surplus available for households in need; draw from grid".to_string());
    }
    if sellers > 0 {
        out.push(format!(
            "{sellers} household(s) with full batteries can sell surplus to neighbours"
        ));
    }
    if !grid.grid_support_providers.is_empty() {
        out.push(format!(
            "{} household(s) can provide grid support",
            grid.grid_support_providers.len()
        ));
    }
    out
}
