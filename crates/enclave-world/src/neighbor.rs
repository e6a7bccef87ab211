//! Neighbor predicates and adjacency construction.
//!
//! Adjacency is computed once, when the [`ParcelStore`] is built, using a
//! sort-and-sweep broad phase over bounding boxes followed by the exact
//! predicate. Every accepted pair is recorded in both directions, so the
//! resulting relation is symmetric by construction.
//!
//! [`ParcelStore`]: crate::parcel_store::ParcelStore

use std::collections::{BTreeMap, BTreeSet};

use enclave_types::{Parcel, ParcelId};
use serde::Deserialize;
use tracing::debug;

use crate::error::GeometryLoadError;
use crate::geometry::{self, BoundingBox};

/// Default boundary tolerance: shared vertices written with a few ulps of
/// noise still count as touching.
pub const DEFAULT_TOUCH_TOLERANCE: f64 = 1e-9;

/// The rule that decides whether two parcels are neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NeighborRule {
    /// Parcels whose boundaries touch (shared edge or shared corner),
    /// within `tolerance`.
    SharedBoundary {
        /// Maximum boundary gap still treated as touching.
        #[serde(default = "default_touch_tolerance")]
        tolerance: f64,
    },
    /// Parcels whose centroids lie within `max_distance` of each other.
    CentroidDistance {
        /// Maximum centroid separation.
        max_distance: f64,
    },
}

impl Default for NeighborRule {
    fn default() -> Self {
        Self::SharedBoundary {
            tolerance: DEFAULT_TOUCH_TOLERANCE,
        }
    }
}

const fn default_touch_tolerance() -> f64 {
    DEFAULT_TOUCH_TOLERANCE
}

impl NeighborRule {
    /// Reject negative or non-finite thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryLoadError::InvalidNeighborRule`] for a bad threshold.
    pub fn validate(&self) -> Result<(), GeometryLoadError> {
        let (name, value) = match *self {
            Self::SharedBoundary { tolerance } => ("tolerance", tolerance),
            Self::CentroidDistance { max_distance } => ("max_distance", max_distance),
        };
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(GeometryLoadError::InvalidNeighborRule {
                reason: format!("{name} must be a finite non-negative number, got {value}"),
            })
        }
    }
}

/// A parcel prepared for the sweep together with its broad-phase box.
struct SweepEntry<'a> {
    parcel: &'a Parcel,
    bbox: BoundingBox,
}

/// Build the symmetric adjacency index for `parcels` under `rule`.
///
/// Every parcel gets an entry, isolated parcels an empty one.
///
/// # Errors
///
/// Returns [`GeometryLoadError::InvalidNeighborRule`] if the rule's threshold
/// is invalid.
pub fn build_adjacency(
    parcels: &[Parcel],
    rule: NeighborRule,
) -> Result<BTreeMap<ParcelId, BTreeSet<ParcelId>>, GeometryLoadError> {
    rule.validate()?;

    let mut adjacency: BTreeMap<ParcelId, BTreeSet<ParcelId>> = parcels
        .iter()
        .map(|parcel| (parcel.id, BTreeSet::new()))
        .collect();

    let mut entries: Vec<SweepEntry<'_>> = parcels
        .iter()
        .filter_map(|parcel| sweep_entry(parcel, rule))
        .collect();
    entries.sort_by(|a, b| a.bbox.min_x.total_cmp(&b.bbox.min_x));

    let mut pair_count: usize = 0;
    for (index, current) in entries.iter().enumerate() {
        for candidate in entries.iter().skip(index.saturating_add(1)) {
            // Sorted by min_x: nothing further right can overlap.
            if candidate.bbox.min_x > current.bbox.max_x {
                break;
            }
            if !current.bbox.intersects(&candidate.bbox) {
                continue;
            }
            if !is_neighbor(current.parcel, candidate.parcel, rule) {
                continue;
            }
            adjacency
                .entry(current.parcel.id)
                .or_default()
                .insert(candidate.parcel.id);
            adjacency
                .entry(candidate.parcel.id)
                .or_default()
                .insert(current.parcel.id);
            pair_count = pair_count.saturating_add(1);
        }
    }

    debug!(
        parcel_count = parcels.len(),
        neighbor_pairs = pair_count,
        ?rule,
        "Adjacency index built"
    );
    Ok(adjacency)
}

/// Broad-phase box grown so that any pair satisfying `rule` overlaps.
fn sweep_entry(parcel: &Parcel, rule: NeighborRule) -> Option<SweepEntry<'_>> {
    let bbox = match rule {
        // Each box grows by half the gap so touching pairs still overlap.
        NeighborRule::SharedBoundary { tolerance } => {
            geometry::bounding_box(parcel)?.expanded(tolerance / 2.0)
        }
        NeighborRule::CentroidDistance { max_distance } => {
            BoundingBox::around(geometry::centroid(parcel)?).expanded(max_distance / 2.0)
        }
    };
    Some(SweepEntry { parcel, bbox })
}

/// Exact neighbor predicate for one pair.
fn is_neighbor(a: &Parcel, b: &Parcel, rule: NeighborRule) -> bool {
    match rule {
        NeighborRule::SharedBoundary { tolerance } => geometry::boundaries_within(a, b, tolerance),
        NeighborRule::CentroidDistance { max_distance } => {
            match (geometry::centroid(a), geometry::centroid(b)) {
                (Some(ca), Some(cb)) => geometry::distance(ca, cb) <= max_distance,
                _ => false,
            }
        }
    }
}
