//! The parcel store: immutable parcels plus their cached adjacency index.
//!
//! A [`ParcelStore`] is built once per run, either from a GeoJSON source or
//! from an in-memory parcel list. The neighbor relation is computed at
//! construction and never changes afterwards, so neighbor queries during
//! stepping are plain map lookups.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;

use enclave_types::{Parcel, ParcelId};
use tracing::info;

use crate::error::GeometryLoadError;
use crate::geojson::{self, LoadOptions};
use crate::neighbor::{self, NeighborRule};

/// Shared empty set returned for ids the store does not know.
static NO_NEIGHBORS: BTreeSet<ParcelId> = BTreeSet::new();

/// All parcels of a run, indexed by id, with their neighbor sets.
#[derive(Debug, Clone)]
pub struct ParcelStore {
    /// Parcels indexed by their identifier.
    parcels: BTreeMap<ParcelId, Parcel>,
    /// Symmetric adjacency: parcel -> parcels it borders.
    adjacency: BTreeMap<ParcelId, BTreeSet<ParcelId>>,
    /// The predicate the adjacency was built with.
    rule: NeighborRule,
}

impl ParcelStore {
    /// Build a store from parcels, computing adjacency under `rule`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryLoadError::NoUsableParcels`] for an empty list,
    /// [`GeometryLoadError::DuplicateParcel`] if two parcels share an id, and
    /// [`GeometryLoadError::InvalidNeighborRule`] for a bad threshold.
    pub fn from_parcels(parcels: Vec<Parcel>, rule: NeighborRule) -> Result<Self, GeometryLoadError> {
        if parcels.is_empty() {
            return Err(GeometryLoadError::NoUsableParcels);
        }
        let adjacency = neighbor::build_adjacency(&parcels, rule)?;

        let mut by_id = BTreeMap::new();
        for parcel in parcels {
            let id = parcel.id;
            if by_id.insert(id, parcel).is_some() {
                return Err(GeometryLoadError::DuplicateParcel(id));
            }
        }

        let store = Self {
            parcels: by_id,
            adjacency,
            rule,
        };
        info!(
            parcel_count = store.len(),
            neighbor_pairs = store.neighbor_pair_count(),
            isolated = store.isolated_count(),
            "Parcel store ready"
        );
        Ok(store)
    }

    /// Load parcels from a GeoJSON file and index them.
    ///
    /// # Errors
    ///
    /// Returns any [`GeometryLoadError`] from reading, parsing, or indexing.
    pub fn load(path: &Path, options: &LoadOptions, rule: NeighborRule) -> Result<Self, GeometryLoadError> {
        let parcels = geojson::load_parcels(path, options)?;
        Self::from_parcels(parcels, rule)
    }

    /// Parse parcels from GeoJSON text and index them.
    ///
    /// # Errors
    ///
    /// Returns any [`GeometryLoadError`] from parsing or indexing.
    pub fn parse(text: &str, options: &LoadOptions, rule: NeighborRule) -> Result<Self, GeometryLoadError> {
        let parcels = geojson::parse_parcels(text, options)?;
        Self::from_parcels(parcels, rule)
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// The neighbors of `id`. Unknown ids have no neighbors.
    pub fn neighbors(&self, id: ParcelId) -> &BTreeSet<ParcelId> {
        self.adjacency.get(&id).unwrap_or(&NO_NEIGHBORS)
    }

    /// Get a parcel by id.
    pub fn get(&self, id: ParcelId) -> Option<&Parcel> {
        self.parcels.get(&id)
    }

    /// Whether the store holds a parcel with this id.
    pub fn contains(&self, id: ParcelId) -> bool {
        self.parcels.contains_key(&id)
    }

    /// Number of parcels.
    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    /// Whether the store holds no parcels (never true for a constructed store).
    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    /// All parcel ids in ascending order.
    pub fn parcel_ids(&self) -> impl Iterator<Item = ParcelId> + '_ {
        self.parcels.keys().copied()
    }

    /// All parcels in ascending id order.
    pub fn parcels(&self) -> impl Iterator<Item = &Parcel> {
        self.parcels.values()
    }

    /// The predicate the adjacency was built with.
    pub const fn rule(&self) -> NeighborRule {
        self.rule
    }

    /// Number of unordered neighbor pairs.
    pub fn neighbor_pair_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Number of parcels with no neighbors at all.
    pub fn isolated_count(&self) -> usize {
        self.adjacency.values().filter(|set| set.is_empty()).count()
    }

    /// Whether every parcel can reach every other through neighbor links.
    pub fn is_connected(&self) -> bool {
        let Some(start) = self.parcels.keys().next().copied() else {
            return true;
        };

        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for &next in self.neighbors(current) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        visited.len() == self.parcels.len()
    }
}
