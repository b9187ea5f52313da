use validator::Validate;

use crate::domain::{Household, HouseholdId, HouseholdUpdate, SIM_ID_BASE};
use crate::error::{EngineError, EngineResult};

/// Household storage for the simulation namespace.
pub trait HouseholdRegistry: Send + Sync {
    /// All households in insertion order.
    fn list(&self) -> Vec<Household>;
    fn get(&self, id: HouseholdId) -> Option<Household>;
    fn insert(&mut self, household: Household) -> EngineResult<()>;
    fn update(&mut self, id: HouseholdId, update: &HouseholdUpdate) -> EngineResult<Household>;

    /// Apply several updates all-or-nothing.
    fn update_many(&mut self, updates: &[(HouseholdId, HouseholdUpdate)]) -> EngineResult<()> {
        for (id, update) in updates {
            let mut probe = self.get(*id).ok_or(EngineError::UnknownHousehold(*id))?;
            probe.apply(update);
            probe.validate()?;
        }
        for (id, update) in updates {
            self.update(*id, update)?;
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.list().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemoryHouseholdRegistry {
    households: Vec<Household>,
}

impl InMemoryHouseholdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_households(households: impl IntoIterator<Item = Household>) -> EngineResult<Self> {
        let mut registry = Self::new();
        for h in households {
            registry.insert(h)?;
        }
        Ok(registry)
    }

    fn position(&self, id: HouseholdId) -> Option<usize> {
        self.households.iter().position(|h| h.id == id)
    }
}

impl HouseholdRegistry for InMemoryHouseholdRegistry {
    fn list(&self) -> Vec<Household> {
        self.households.clone()
    }

    fn get(&self, id: HouseholdId) -> Option<Household> {
        self.position(id).map(|i| self.households[i].clone())
    }

    fn insert(&mut self, household: Household) -> EngineResult<()> {
        if household.id < SIM_ID_BASE {
            return Err(EngineError::ReservedId(household.id));
        }
        if self.position(household.id).is_some() {
            return Err(EngineError::DuplicateHousehold(household.id));
        }
        household.validate()?;
        self.households.push(household);
        Ok(())
    }

    fn update(&mut self, id: HouseholdId, update: &HouseholdUpdate) -> EngineResult<Household> {
        let idx = self.position(id).ok_or(EngineError::UnknownHousehold(id))?;
        let mut next = self.households[idx].clone();
        next.apply(update);
        next.validate()?;
        self.households[idx] = next.clone();
        Ok(next)
    }

    fn len(&self) -> usize {
        self.households.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home(id: HouseholdId) -> Household {
        Household {
            id,
            name: "Home".into(),
            address: "1 Main St".into(),
            solar_capacity_kw: 4.0,
            battery_capacity_kwh: 10.0,
            current_battery_level_pct: 50.0,
            is_online: true,
        }
    }

    #[test]
    fn rejects_live_namespace_ids() {
        let mut reg = InMemoryHouseholdRegistry::new();
        assert!(matches!(reg.insert(home(12)), Err(EngineError::ReservedId(12))));
        assert!(reg.insert(home(SIM_ID_BASE)).is_ok());
        assert!(matches!(
            reg.insert(home(SIM_ID_BASE)),
            Err(EngineError::DuplicateHousehold(_))
        ));
    }

    #[test]
    fn keeps_insertion_order() {
        let reg = InMemoryHouseholdRegistry::with_households([home(9003), home(9001), home(9002)])
            .unwrap();
        let ids: Vec<_> = reg.list().iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![9003, 9001, 9002]);
    }

    #[test]
    fn update_many_is_all_or_nothing() {
        let mut reg =
            InMemoryHouseholdRegistry::with_households([home(9001), home(9002)]).unwrap();
        let bad = vec![
            (9001, HouseholdUpdate::battery_level(70.0)),
            (9002, HouseholdUpdate::battery_level(150.0)),
        ];
        assert!(reg.update_many(&bad).is_err());
        assert_eq!(reg.get(9001).unwrap().current_battery_level_pct, 50.0);

        let unknown = vec![(9999, HouseholdUpdate::online(false))];
        assert!(matches!(
            reg.update_many(&unknown),
            Err(EngineError::UnknownHousehold(9999))
        ));
    }
}
