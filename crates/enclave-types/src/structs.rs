//! Core entity structs for the Enclave simulation.
//!
//! Covers parcel geometry (`Point`, `Polygon`, `Parcel`) and the read-only
//! views handed to external renderers and charts each step.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::OccupancyState;
use crate::ids::ParcelId;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A planar position in the layer's coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Point {
    /// Easting or longitude.
    pub x: f64,
    /// Northing or latitude.
    pub y: f64,
}

impl Point {
    /// Create a point from its coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single polygon with an outer ring and optional holes.
///
/// Rings are stored open: the closing vertex that repeats the first one in
/// GeoJSON is dropped at load time, so every ring has at least three
/// vertices and the last vertex implicitly connects back to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Polygon {
    /// Outer boundary.
    pub exterior: Vec<Point>,
    /// Inner boundaries (courtyards, enclaves of other parcels).
    #[serde(default)]
    pub holes: Vec<Vec<Point>>,
}

impl Polygon {
    /// Create a polygon without holes.
    pub const fn simple(exterior: Vec<Point>) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }

    /// Iterate over every ring, exterior first.
    pub fn rings(&self) -> impl Iterator<Item = &[Point]> {
        core::iter::once(self.exterior.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }
}

/// An immutable spatial unit that can hold at most one agent.
///
/// A parcel is made of one or more polygons (a `MultiPolygon` feature keeps
/// all of its parts). Parcels are created once at load time and never change
/// during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Parcel {
    /// Dense load-order identifier.
    pub id: ParcelId,
    /// External identifier taken from the source feature, if any.
    pub label: Option<String>,
    /// Polygon parts making up the parcel footprint.
    pub polygons: Vec<Polygon>,
}

// ---------------------------------------------------------------------------
// Sink views
// ---------------------------------------------------------------------------

/// Aggregate counters published after every step.
///
/// This is the whole per-step history the core exposes; charts accumulate
/// it on their side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StepSnapshot {
    /// Number of steps executed so far (0 before the first step).
    pub step: u64,
    /// Agents that stayed put during the last step.
    pub happy: usize,
    /// Agents currently registered as active.
    pub active_agents: usize,
    /// Whether the model still has unhappy agents.
    pub running: bool,
}

/// Per-parcel state and footprint for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ParcelView {
    /// The parcel.
    pub id: ParcelId,
    /// External identifier, if the source carried one.
    pub label: Option<String>,
    /// Current occupancy.
    pub state: OccupancyState,
    /// Fill colour derived from the occupancy.
    pub color: String,
    /// Footprint to draw, as loaded.
    pub polygons: Vec<Polygon>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rings_yield_exterior_then_holes() {
        let square = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        let hole = vec![
            Point::new(1.0, 1.0),
            Point::new(2.0, 1.0),
            Point::new(2.0, 2.0),
        ];
        let polygon = Polygon {
            exterior: square,
            holes: vec![hole],
        };
        let lengths: Vec<usize> = polygon.rings().map(<[Point]>::len).collect();
        assert_eq!(lengths, vec![4, 3]);
    }

    #[test]
    fn snapshot_serializes_field_names() {
        let snapshot = StepSnapshot {
            step: 3,
            happy: 10,
            active_agents: 12,
            running: true,
        };
        let value = serde_json::to_value(snapshot).ok();
        let expected = serde_json::json!({
            "step": 3,
            "happy": 10,
            "active_agents": 12,
            "running": true,
        });
        assert_eq!(value, Some(expected));
    }
}
