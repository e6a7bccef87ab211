//! The active agent set.
//!
//! Membership only: the registry records which parcels currently host an
//! agent and participate in stepping. The agent's group lives in the
//! [`OccupancyModel`](crate::occupancy::OccupancyModel).

use std::collections::BTreeSet;

use enclave_types::ParcelId;

use crate::error::SimulationError;

/// Parcels whose occupants take part in the next step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentRegistry {
    active: BTreeSet<ParcelId>,
}

impl AgentRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            active: BTreeSet::new(),
        }
    }

    /// Register a parcel as active. Returns `false` if it already was.
    pub fn add(&mut self, id: ParcelId) -> bool {
        self.active.insert(id)
    }

    /// Deregister a parcel that must currently be active.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::AgentNotActive`] if the parcel is not in
    /// the active set.
    pub fn remove(&mut self, id: ParcelId) -> Result<(), SimulationError> {
        if self.active.remove(&id) {
            Ok(())
        } else {
            Err(SimulationError::AgentNotActive(id))
        }
    }

    /// Deregister a parcel if present. Returns whether it was.
    pub fn discard(&mut self, id: ParcelId) -> bool {
        self.active.remove(&id)
    }

    /// Whether the parcel is active.
    pub fn contains(&self, id: ParcelId) -> bool {
        self.active.contains(&id)
    }

    /// Number of active agents.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no agent is active.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Active ids in ascending order.
    pub fn active_ids(&self) -> impl Iterator<Item = ParcelId> + '_ {
        self.active.iter().copied()
    }

    /// Frozen copy of the active ids, in ascending order, for building an
    /// activation order.
    pub fn snapshot(&self) -> Vec<ParcelId> {
        self.active_ids().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_contains() {
        let mut registry = AgentRegistry::new();
        assert!(registry.add(ParcelId::new(3)));
        assert!(!registry.add(ParcelId::new(3)));
        assert!(registry.contains(ParcelId::new(3)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn strict_remove_of_absent_id_is_an_error() {
        let mut registry = AgentRegistry::new();
        let result = registry.remove(ParcelId::new(9));
        assert!(matches!(result, Err(SimulationError::AgentNotActive(id)) if id == ParcelId::new(9)));
    }

    #[test]
    fn discard_tolerates_absent_id() {
        let mut registry = AgentRegistry::new();
        assert!(!registry.discard(ParcelId::new(1)));
        registry.add(ParcelId::new(1));
        assert!(registry.discard(ParcelId::new(1)));
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshot_is_sorted_and_detached() {
        let mut registry = AgentRegistry::new();
        for raw in [5, 1, 3] {
            registry.add(ParcelId::new(raw));
        }
        let snapshot = registry.snapshot();
        assert!(registry.remove(ParcelId::new(1)).is_ok());
        assert_eq!(
            snapshot,
            vec![ParcelId::new(1), ParcelId::new(3), ParcelId::new(5)]
        );
        assert_eq!(registry.len(), 2);
    }
}
