//! Simulation orchestrator.
//!
//! A single engine instance owns the simulation namespace. Every mutation
//! (scheduled tick, forced tick, outage, restore, start and stop) runs under
//! one async mutex, so ticks never interleave. Readers see an immutable
//! snapshot published after each mutation and never wait on a running tick.
//! Weather is fetched before the lock is taken, so a slow feed never holds up
//! control calls.

pub mod clock;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use scheduler::TickScheduler;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::{Config, SimulationConfig, WeatherProvider};
use crate::domain::{
    Household, HouseholdId, HouseholdUpdate, Reading, Trade, WeatherCondition, WeatherObservation,
};
use crate::error::EngineResult;
use crate::forecast::{FallbackWeather, Forecaster, GeoLocation, ResilientWeather};
use crate::optimizer::{analyze_network, optimize_network, OptimizationResult, PricingModel};
use crate::repo::{HouseholdRegistry, InMemoryHouseholdRegistry, Repositories};
use crate::simulation::{default_outage_targets, seed_households, simulate_outage, OutageResponse};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub total_households: usize,
    pub online_households: usize,
    pub total_generation_kwh: f64,
    pub total_demand_kwh: f64,
    pub average_battery_pct: f64,
    pub total_trades: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub is_running: bool,
    pub current_weather: Option<WeatherObservation>,
    pub active_outage_ids: Vec<HouseholdId>,
    pub network_stats: NetworkStats,
    pub tick_count: u64,
    pub failed_ticks: u64,
    pub last_tick_at: Option<DateTime<FixedOffset>>,
}

struct EngineSnapshot {
    status: EngineStatus,
    households: Vec<Household>,
    last_result: Option<OptimizationResult>,
}

struct EngineState {
    running: bool,
    scheduler: Option<TickScheduler>,
    repos: Repositories,
    forecaster: Forecaster,
    weather_override: Option<WeatherObservation>,
    current_weather: Option<WeatherObservation>,
    active_outages: BTreeSet<HouseholdId>,
    last_result: Option<OptimizationResult>,
    last_generation_kwh: f64,
    last_demand_kwh: f64,
    tick_count: u64,
    failed_ticks: u64,
    last_tick_at: Option<DateTime<FixedOffset>>,
}

impl EngineState {
    fn snapshot(&self) -> EngineSnapshot {
        let households = self.repos.households.list();
        let average_battery_pct = if households.is_empty() {
            0.0
        } else {
            households
                .iter()
                .map(|h| h.current_battery_level_pct)
                .sum::<f64>()
                / households.len() as f64
        };
        let network_stats = NetworkStats {
            total_households: households.len(),
            online_households: households.iter().filter(|h| h.is_online).count(),
            total_generation_kwh: self.last_generation_kwh,
            total_demand_kwh: self.last_demand_kwh,
            average_battery_pct,
            total_trades: self.repos.trades.len(),
        };
        EngineSnapshot {
            status: EngineStatus {
                is_running: self.running,
                current_weather: self.current_weather.clone(),
                active_outage_ids: self.active_outages.iter().copied().collect(),
                network_stats,
                tick_count: self.tick_count,
                failed_ticks: self.failed_ticks,
                last_tick_at: self.last_tick_at,
            },
            households,
            last_result: self.last_result.clone(),
        }
    }
}

struct Inner {
    state: Mutex<EngineState>,
    snapshot: RwLock<Arc<EngineSnapshot>>,
    weather: ResilientWeather,
    location: GeoLocation,
    pricing: PricingModel,
    clock: Arc<dyn Clock>,
    tick_period: Duration,
    seed: u64,
}

impl Inner {
    fn publish(&self, state: &EngineState) {
        *self.snapshot.write() = Arc::new(state.snapshot());
    }

    fn snapshot(&self) -> Arc<EngineSnapshot> {
        self.snapshot.read().clone()
    }

    /// Override if one is set, otherwise a fresh observation. The execution
    /// lock is only held to read the override, never across the fetch.
    async fn next_weather(&self) -> WeatherObservation {
        let forced = self.state.lock().await.weather_override.clone();
        match forced {
            Some(w) => w,
            None => {
                let at = self.clock.now().naive_local();
                self.weather.observe(&self.location, at).await
            }
        }
    }

    /// Compute a full tick and commit it only if every step succeeded.
    fn run_tick(&self, state: &mut EngineState, observed: WeatherObservation) -> EngineResult<()> {
        let now = self.clock.now();
        let at = now.naive_local();
        // an override set while the fetch was in flight wins
        let weather = state.weather_override.clone().unwrap_or(observed);

        let households = state.repos.households.list();
        let network = analyze_network(&households, Some(&weather), at, &mut state.forecaster);
        let result = optimize_network(&households, &network, &self.pricing)?;

        let updates: Vec<(HouseholdId, HouseholdUpdate)> = households
            .iter()
            .filter(|h| h.is_online)
            .filter_map(|h| {
                let action = result.battery_strategy.get(&h.id)?;
                let mut next = h.clone();
                next.apply_battery_delta(action.energy_delta_kwh());
                Some((h.id, HouseholdUpdate::battery_level(next.current_battery_level_pct)))
            })
            .collect();
        state.repos.households.update_many(&updates)?;

        // readings carry the level the forecast saw, before this tick's delta
        let stamp = now.with_timezone(&Utc);
        state.repos.readings.extend(
            network
                .households
                .iter()
                .filter(|f| f.is_online)
                .map(|f| Reading {
                    id: Uuid::new_v4(),
                    household_id: f.household_id,
                    timestamp: stamp,
                    generation_kwh: f.predicted_generation_kwh,
                    consumption_kwh: f.predicted_demand_kwh,
                    battery_level_pct: f.battery_level_pct,
                }),
        );
        state.repos.trades.extend(result.trading_pairs.iter().map(|p| {
            let price = self.pricing.price_for_pair(
                p,
                network.hour,
                network.total_generation_kwh,
                network.total_demand_kwh,
            );
            Trade::from_pair(p, price, stamp)
        }));

        info!(
            tick = state.tick_count + 1,
            weather = %weather.condition,
            pairs = result.trading_pairs.len(),
            traded_kwh = result.total_traded_kwh(),
            stability = result.grid_stability_score,
            "simulation tick complete"
        );

        state.last_generation_kwh = network.total_generation_kwh;
        state.last_demand_kwh = network.total_demand_kwh;
        state.current_weather = Some(weather);
        state.last_result = Some(result);
        state.tick_count += 1;
        state.last_tick_at = Some(now);
        Ok(())
    }

    fn tick_locked(&self, state: &mut EngineState, weather: WeatherObservation) -> EngineResult<()> {
        let outcome = self.run_tick(state, weather);
        if let Err(e) = &outcome {
            state.failed_ticks += 1;
            error!(error = %e, failed_ticks = state.failed_ticks, "simulation tick failed");
        }
        self.publish(state);
        outcome
    }

    async fn scheduled_tick(&self) {
        if !self.state.lock().await.running {
            debug!("engine stopped, skipping scheduled tick");
            return;
        }
        let weather = self.next_weather().await;
        let mut state = self.state.lock().await;
        if !state.running {
            debug!("engine stopped during weather fetch, dropping tick");
            return;
        }
        // failures are counted and logged in tick_locked
        let _ = self.tick_locked(&mut state, weather);
    }
}

/// Weather source per configuration, always backed by the seeded fallback.
pub fn weather_from_config(cfg: &Config) -> ResilientWeather {
    let fallback = FallbackWeather::new(cfg.simulation.seed);
    match cfg.weather.provider {
        #[cfg(feature = "live-weather")]
        WeatherProvider::Smhi => ResilientWeather::new(
            Some(Box::new(crate::forecast::SmhiWeatherSource::new(
                cfg.weather.base_url.clone(),
                Duration::from_secs(cfg.weather.http_timeout_seconds),
            ))),
            fallback,
        ),
        #[cfg(not(feature = "live-weather"))]
        WeatherProvider::Smhi => {
            warn!("built without live-weather, using fallback weather");
            ResilientWeather::new(None, fallback)
        }
        WeatherProvider::Fallback => ResilientWeather::new(None, fallback),
    }
}

pub struct OrchestratorBuilder {
    simulation: SimulationConfig,
    location: GeoLocation,
    pricing: PricingModel,
    weather: ResilientWeather,
    registry: Option<Box<dyn HouseholdRegistry>>,
    forecaster: Option<Forecaster>,
    clock: Arc<dyn Clock>,
}

impl OrchestratorBuilder {
    pub fn registry(mut self, registry: Box<dyn HouseholdRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn households(self, households: Vec<Household>) -> EngineResult<Self> {
        let registry = InMemoryHouseholdRegistry::with_households(households)?;
        Ok(self.registry(Box::new(registry)))
    }

    pub fn weather(mut self, weather: ResilientWeather) -> Self {
        self.weather = weather;
        self
    }

    pub fn forecaster(mut self, forecaster: Forecaster) -> Self {
        self.forecaster = Some(forecaster);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> EngineResult<SimulationOrchestrator> {
        let registry: Box<dyn HouseholdRegistry> = match self.registry {
            Some(r) => r,
            None => Box::new(InMemoryHouseholdRegistry::with_households(seed_households(
                self.simulation.household_count,
                self.simulation.seed,
            ))?),
        };
        let state = EngineState {
            running: false,
            scheduler: None,
            repos: Repositories::new(&self.simulation, registry),
            forecaster: self
                .forecaster
                .unwrap_or_else(|| Forecaster::seeded(self.simulation.seed)),
            weather_override: None,
            current_weather: None,
            active_outages: BTreeSet::new(),
            last_result: None,
            last_generation_kwh: 0.0,
            last_demand_kwh: 0.0,
            tick_count: 0,
            failed_ticks: 0,
            last_tick_at: None,
        };
        let snapshot = Arc::new(state.snapshot());
        Ok(SimulationOrchestrator {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                snapshot: RwLock::new(snapshot),
                weather: self.weather,
                location: self.location,
                pricing: self.pricing,
                clock: self.clock,
                tick_period: Duration::from_secs(self.simulation.tick_seconds.max(1)),
                seed: self.simulation.seed,
            }),
        })
    }
}

/// Handle to the simulation engine; cheap to clone.
#[derive(Clone)]
pub struct SimulationOrchestrator {
    inner: Arc<Inner>,
}

impl SimulationOrchestrator {
    pub fn builder(cfg: &Config) -> OrchestratorBuilder {
        OrchestratorBuilder {
            simulation: cfg.simulation.clone(),
            location: cfg.weather.location(),
            pricing: PricingModel::new(cfg.pricing.clone()),
            weather: weather_from_config(cfg),
            registry: None,
            forecaster: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn from_config(cfg: &Config) -> EngineResult<Self> {
        Self::builder(cfg).build()
    }

    /// Begin periodic ticking. Returns false if already running.
    pub async fn start(&self) -> bool {
        let mut state = self.inner.state.lock().await;
        if state.running {
            debug!("start requested while running");
            return false;
        }
        state.running = true;
        let weak = Arc::downgrade(&self.inner);
        state.scheduler = Some(TickScheduler::spawn(self.inner.tick_period, move || {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    inner.scheduled_tick().await;
                }
            }
        }));
        self.inner.publish(&state);
        info!(tick_seconds = self.inner.tick_period.as_secs(), "simulation started");
        true
    }

    /// Halt ticking. Once this returns no further scheduled tick mutates
    /// state. Returns false if already stopped.
    pub async fn stop(&self) -> bool {
        let mut state = self.inner.state.lock().await;
        if !state.running {
            debug!("stop requested while stopped");
            return false;
        }
        state.running = false;
        if let Some(mut scheduler) = state.scheduler.take() {
            scheduler.stop();
        }
        self.inner.publish(&state);
        info!(ticks = state.tick_count, "simulation stopped");
        true
    }

    pub fn is_running(&self) -> bool {
        self.inner.snapshot().status.is_running
    }

    pub fn status(&self) -> EngineStatus {
        self.inner.snapshot().status.clone()
    }

    pub fn households(&self) -> Vec<Household> {
        self.inner.snapshot().households.clone()
    }

    /// Run one tick now, regardless of the running flag.
    pub async fn tick(&self) -> EngineResult<()> {
        let weather = self.inner.next_weather().await;
        let mut state = self.inner.state.lock().await;
        self.inner.tick_locked(&mut state, weather)
    }

    /// Force the weather and run one tick with it.
    pub async fn set_weather(&self, condition: WeatherCondition) -> WeatherObservation {
        let observation = WeatherObservation::for_condition(condition);
        let mut state = self.inner.state.lock().await;
        state.weather_override = Some(observation.clone());
        info!(%condition, "weather override set");
        let _ = self.inner.tick_locked(&mut state, observation.clone());
        observation
    }

    pub async fn clear_weather_override(&self) {
        let mut state = self.inner.state.lock().await;
        if state.weather_override.take().is_some() {
            info!("weather override cleared");
        }
    }

    /// Take households offline. With no ids, the lowest-battery quarter of
    /// the network is chosen. Unknown ids are ignored.
    pub async fn trigger_outage(
        &self,
        ids: Option<Vec<HouseholdId>>,
    ) -> EngineResult<OutageResponse> {
        let mut state = self.inner.state.lock().await;
        let households = state.repos.households.list();
        let targets = match ids {
            Some(ids) if !ids.is_empty() => ids,
            _ => default_outage_targets(&households),
        };
        let response = simulate_outage(&households, &targets);
        if response.affected_household_ids.len() < targets.len() {
            debug!(requested = ?targets, "skipping unknown household ids");
        }

        let updates: Vec<_> = response
            .affected_household_ids
            .iter()
            .map(|id| (*id, HouseholdUpdate::online(false)))
            .collect();
        state.repos.households.update_many(&updates)?;
        state
            .active_outages
            .extend(response.affected_household_ids.iter().copied());
        self.inner.publish(&state);

        warn!(
            affected = ?response.affected_household_ids,
            resilience = response.community_resilience,
            "outage triggered"
        );
        Ok(response)
    }

    /// Bring households back online. Returns the ids actually restored.
    pub async fn restore(&self, ids: &[HouseholdId]) -> EngineResult<Vec<HouseholdId>> {
        let mut state = self.inner.state.lock().await;
        let restored: Vec<HouseholdId> = ids
            .iter()
            .copied()
            .filter(|id| state.repos.households.get(*id).is_some())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if restored.len() < ids.len() {
            debug!(requested = ?ids, "skipping unknown household ids");
        }
        let updates: Vec<_> = restored
            .iter()
            .map(|id| (*id, HouseholdUpdate::online(true)))
            .collect();
        state.repos.households.update_many(&updates)?;
        for id in &restored {
            state.active_outages.remove(id);
        }
        self.inner.publish(&state);

        info!(restored = ?restored, "households restored");
        Ok(restored)
    }

    /// Latest tick result, or a fresh read-only computation before the first
    /// tick.
    pub fn optimization(&self) -> EngineResult<OptimizationResult> {
        let snap = self.inner.snapshot();
        if let Some(result) = &snap.last_result {
            return Ok(result.clone());
        }
        let at = self.inner.clock.now().naive_local();
        let weather = snap
            .status
            .current_weather
            .clone()
            .unwrap_or_else(|| self.inner.weather.fallback().observation_at(at));
        let mut forecaster = Forecaster::seeded(self.inner.seed);
        let network = analyze_network(&snap.households, Some(&weather), at, &mut forecaster);
        optimize_network(&snap.households, &network, &self.inner.pricing)
    }

    pub async fn recent_trades(&self, n: usize) -> Vec<Trade> {
        self.inner.state.lock().await.repos.trades.recent(n)
    }

    pub async fn recent_readings(&self, n: usize) -> Vec<Reading> {
        self.inner.state.lock().await.repos.readings.recent(n)
    }
}
