//! Per-parcel occupancy state.
//!
//! The [`OccupancyModel`] maps every parcel to exactly one
//! [`OccupancyState`]. Alongside the map it keeps an indexed pool of vacant
//! parcels so the relocation rule can draw a uniformly random vacancy in
//! constant time instead of scanning the whole layer.

use std::collections::BTreeMap;

use enclave_types::{OccupancyState, ParcelId};
use rand::Rng;

use crate::error::SimulationError;

/// Occupancy of every parcel in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyModel {
    /// Current state per parcel.
    states: BTreeMap<ParcelId, OccupancyState>,
    /// Parcels whose state is [`OccupancyState::Unoccupied`].
    vacancies: VacancyPool,
}

impl OccupancyModel {
    /// Create a model in which every given parcel is unoccupied.
    pub fn new(parcels: impl IntoIterator<Item = ParcelId>) -> Self {
        let mut states = BTreeMap::new();
        let mut vacancies = VacancyPool::default();
        for id in parcels {
            if states.insert(id, OccupancyState::Unoccupied).is_none() {
                vacancies.insert(id);
            }
        }
        Self { states, vacancies }
    }

    /// Current state of a parcel. Ids outside the model read as unoccupied.
    pub fn get(&self, id: ParcelId) -> OccupancyState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    /// Set the state of a parcel.
    ///
    /// Setting a parcel to the state it already has changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownParcel`] if the parcel is not part of
    /// the model.
    pub fn set(&mut self, id: ParcelId, state: OccupancyState) -> Result<(), SimulationError> {
        let slot = self
            .states
            .get_mut(&id)
            .ok_or(SimulationError::UnknownParcel(id))?;
        *slot = state;
        if state.is_occupied() {
            self.vacancies.remove(id);
        } else {
            self.vacancies.insert(id);
        }
        Ok(())
    }

    /// Whether the parcel is part of the model.
    pub fn contains(&self, id: ParcelId) -> bool {
        self.states.contains_key(&id)
    }

    /// Pick a vacant parcel uniformly at random, or `None` if every parcel is
    /// occupied.
    pub fn random_vacancy(&self, rng: &mut impl Rng) -> Option<ParcelId> {
        self.vacancies.choose(rng)
    }

    /// Number of parcels tracked.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the model tracks no parcels.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of vacant parcels.
    pub fn vacant_count(&self) -> usize {
        self.vacancies.len()
    }

    /// Number of occupied parcels.
    pub fn occupied_count(&self) -> usize {
        self.len().saturating_sub(self.vacant_count())
    }

    /// Every parcel with its state, in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (ParcelId, OccupancyState)> + '_ {
        self.states.iter().map(|(id, state)| (*id, *state))
    }

    /// Occupied parcels in ascending id order.
    pub fn occupied_ids(&self) -> impl Iterator<Item = ParcelId> + '_ {
        self.iter()
            .filter(|(_, state)| state.is_occupied())
            .map(|(id, _)| id)
    }
}

/// Vacant parcel ids with O(1) insert, remove, and uniform choice.
///
/// `slots` holds the ids densely; `positions` maps each id to its slot.
/// Removal swaps the last slot into the gap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct VacancyPool {
    slots: Vec<ParcelId>,
    positions: BTreeMap<ParcelId, usize>,
}

impl VacancyPool {
    fn insert(&mut self, id: ParcelId) {
        if self.positions.contains_key(&id) {
            return;
        }
        self.positions.insert(id, self.slots.len());
        self.slots.push(id);
    }

    fn remove(&mut self, id: ParcelId) {
        let Some(index) = self.positions.remove(&id) else {
            return;
        };
        self.slots.swap_remove(index);
        if let Some(moved) = self.slots.get(index).copied() {
            self.positions.insert(moved, index);
        }
    }

    fn choose(&self, rng: &mut impl Rng) -> Option<ParcelId> {
        if self.slots.is_empty() {
            return None;
        }
        self.slots.get(rng.random_range(0..self.slots.len())).copied()
    }

    fn len(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn ids(raw: &[u32]) -> Vec<ParcelId> {
        raw.iter().copied().map(ParcelId::new).collect()
    }

    #[test]
    fn new_model_is_all_vacant() {
        let model = OccupancyModel::new(ids(&[0, 1, 2]));
        assert_eq!(model.len(), 3);
        assert_eq!(model.vacant_count(), 3);
        assert_eq!(model.occupied_count(), 0);
        assert!(model.iter().all(|(_, state)| state == OccupancyState::Unoccupied));
    }

    #[test]
    fn set_updates_state_and_pool() {
        let mut model = OccupancyModel::new(ids(&[0, 1, 2]));
        model.set(ParcelId::new(1), OccupancyState::GroupA).unwrap();
        assert_eq!(model.get(ParcelId::new(1)), OccupancyState::GroupA);
        assert_eq!(model.vacant_count(), 2);
        assert_eq!(model.occupied_ids().collect::<Vec<_>>(), ids(&[1]));

        model.set(ParcelId::new(1), OccupancyState::Unoccupied).unwrap();
        assert_eq!(model.vacant_count(), 3);
    }

    #[test]
    fn set_is_idempotent() {
        let mut model = OccupancyModel::new(ids(&[0, 1]));
        model.set(ParcelId::new(0), OccupancyState::GroupB).unwrap();
        let once = model.clone();
        model.set(ParcelId::new(0), OccupancyState::GroupB).unwrap();
        assert_eq!(model, once);

        model.set(ParcelId::new(1), OccupancyState::Unoccupied).unwrap();
        assert_eq!(model, once);
    }

    #[test]
    fn switching_group_keeps_parcel_out_of_pool() {
        let mut model = OccupancyModel::new(ids(&[0, 1]));
        model.set(ParcelId::new(0), OccupancyState::GroupA).unwrap();
        model.set(ParcelId::new(0), OccupancyState::GroupB).unwrap();
        assert_eq!(model.vacant_count(), 1);
        assert_eq!(model.occupied_count(), 1);
    }

    #[test]
    fn unknown_parcel_rejected() {
        let mut model = OccupancyModel::new(ids(&[0]));
        let result = model.set(ParcelId::new(5), OccupancyState::GroupA);
        assert!(matches!(result, Err(SimulationError::UnknownParcel(id)) if id == ParcelId::new(5)));
        assert_eq!(model.get(ParcelId::new(5)), OccupancyState::Unoccupied);
        assert!(!model.contains(ParcelId::new(5)));
    }

    #[test]
    fn random_vacancy_only_returns_vacant_parcels() {
        let mut model = OccupancyModel::new(ids(&[0, 1, 2, 3, 4, 5]));
        for raw in [0, 2, 3] {
            model.set(ParcelId::new(raw), OccupancyState::GroupA).unwrap();
        }
        let mut rng = SmallRng::seed_from_u64(42);
        let mut seen = BTreeSet::new();
        for _ in 0..200 {
            let pick = model.random_vacancy(&mut rng).unwrap();
            assert_eq!(model.get(pick), OccupancyState::Unoccupied);
            seen.insert(pick);
        }
        // Every vacancy is reachable.
        assert_eq!(seen, ids(&[1, 4, 5]).into_iter().collect());
    }

    #[test]
    fn random_vacancy_none_when_full() {
        let mut model = OccupancyModel::new(ids(&[0, 1]));
        model.set(ParcelId::new(0), OccupancyState::GroupA).unwrap();
        model.set(ParcelId::new(1), OccupancyState::GroupB).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(model.random_vacancy(&mut rng), None);
    }

    #[test]
    fn pool_survives_many_swaps() {
        let mut model = OccupancyModel::new((0..50).map(ParcelId::new));
        for raw in (0..50).step_by(3) {
            model.set(ParcelId::new(raw), OccupancyState::GroupB).unwrap();
        }
        for raw in (0..50).step_by(6) {
            model.set(ParcelId::new(raw), OccupancyState::Unoccupied).unwrap();
        }
        let vacant: usize = model.iter().filter(|(_, s)| !s.is_occupied()).count();
        assert_eq!(model.vacant_count(), vacant);
        assert_eq!(model.occupied_count(), model.occupied_ids().count());
    }
}
