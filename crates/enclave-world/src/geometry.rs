//! Planar geometry helpers for parcel footprints.
//!
//! Only what the neighbor predicates need: bounding boxes for the sweep broad
//! phase, boundary-to-boundary distance for contiguity, and area-weighted
//! centroids for the distance rule. Coordinates are treated as planar; a
//! layer in geographic degrees should use tolerances expressed in degrees.

use enclave_types::{Parcel, Point};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Smallest x coordinate.
    pub min_x: f64,
    /// Smallest y coordinate.
    pub min_y: f64,
    /// Largest x coordinate.
    pub max_x: f64,
    /// Largest y coordinate.
    pub max_y: f64,
}

impl BoundingBox {
    /// A degenerate box around a single point.
    pub const fn around(point: Point) -> Self {
        Self {
            min_x: point.x,
            min_y: point.y,
            max_x: point.x,
            max_y: point.y,
        }
    }

    /// Grow the box so it also covers `point`.
    pub fn include(&mut self, point: Point) {
        self.min_x = self.min_x.min(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
    }

    /// Return a copy grown by `margin` on every side.
    pub fn expanded(self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// Whether the two boxes overlap or touch.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Centre of the box.
    pub fn center(&self) -> Point {
        Point::new(
            self.min_x + (self.max_x - self.min_x) / 2.0,
            self.min_y + (self.max_y - self.min_y) / 2.0,
        )
    }
}

/// Bounding box of every vertex of the parcel, or `None` for an empty parcel.
pub fn bounding_box(parcel: &Parcel) -> Option<BoundingBox> {
    let mut points = parcel
        .polygons
        .iter()
        .flat_map(|polygon| polygon.rings())
        .flat_map(<[Point]>::iter)
        .copied();
    let first = points.next()?;
    let mut bbox = BoundingBox::around(first);
    for point in points {
        bbox.include(point);
    }
    Some(bbox)
}

/// Iterate over every boundary segment of a ring, including the closing one.
pub fn ring_segments(ring: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    ring.iter()
        .copied()
        .zip(ring.iter().copied().cycle().skip(1))
}

/// Iterate over every boundary segment of every ring of every part.
pub fn boundary_segments(parcel: &Parcel) -> impl Iterator<Item = (Point, Point)> + '_ {
    parcel
        .polygons
        .iter()
        .flat_map(|polygon| polygon.rings())
        .flat_map(ring_segments)
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Shortest distance from `p` to the segment `a`-`b`.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx.mul_add(dx, dy * dy);
    if len_sq <= 0.0 {
        return distance(p, a);
    }
    let t = ((p.x - a.x).mul_add(dx, (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    distance(p, Point::new(t.mul_add(dx, a.x), t.mul_add(dy, a.y)))
}

/// Twice the signed area of the triangle `a`, `b`, `c`.
fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x).mul_add(c.y - a.y, -((b.y - a.y) * (c.x - a.x)))
}

/// Whether two segments cross at a single interior point.
///
/// Touching and collinear overlap are not reported here; they show up as a
/// zero endpoint distance in [`segment_distance`].
fn segments_cross(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let o1 = orientation(a1, a2, b1);
    let o2 = orientation(a1, a2, b2);
    let o3 = orientation(b1, b2, a1);
    let o4 = orientation(b1, b2, a2);
    o1 * o2 < 0.0 && o3 * o4 < 0.0
}

/// Shortest distance between two segments (zero when they meet).
pub fn segment_distance(a1: Point, a2: Point, b1: Point, b2: Point) -> f64 {
    if segments_cross(a1, a2, b1, b2) {
        return 0.0;
    }
    point_segment_distance(a1, b1, b2)
        .min(point_segment_distance(a2, b1, b2))
        .min(point_segment_distance(b1, a1, a2))
        .min(point_segment_distance(b2, a1, a2))
}

/// Whether the boundaries of two parcels come within `tolerance` of each other.
///
/// Returns as soon as one close pair of segments is found.
pub fn boundaries_within(a: &Parcel, b: &Parcel, tolerance: f64) -> bool {
    boundary_segments(a).any(|(a1, a2)| {
        boundary_segments(b).any(|(b1, b2)| segment_distance(a1, a2, b1, b2) <= tolerance)
    })
}

/// Signed area of a ring (positive for counter-clockwise winding).
pub fn signed_area(ring: &[Point]) -> f64 {
    ring_segments(ring)
        .map(|(p, q)| p.x.mul_add(q.y, -(q.x * p.y)))
        .sum::<f64>()
        / 2.0
}

/// Area-weighted centroid of the parcel footprint.
///
/// Holes subtract from the area. Degenerate footprints with no area fall back
/// to the centre of their bounding box.
pub fn centroid(parcel: &Parcel) -> Option<Point> {
    let mut area_sum = 0.0_f64;
    let mut cx = 0.0_f64;
    let mut cy = 0.0_f64;

    for polygon in &parcel.polygons {
        for (index, ring) in polygon.rings().enumerate() {
            // Exterior counts positive and holes negative whatever the winding.
            let sign = if index == 0 { 1.0 } else { -1.0 };
            let raw = signed_area(ring);
            let orient = if raw < 0.0 { -1.0 } else { 1.0 };
            for (p, q) in ring_segments(ring) {
                let cross = p.x.mul_add(q.y, -(q.x * p.y)) * orient * sign;
                cx = (p.x + q.x).mul_add(cross, cx);
                cy = (p.y + q.y).mul_add(cross, cy);
            }
            area_sum = raw.abs().mul_add(sign, area_sum);
        }
    }

    if area_sum.abs() <= f64::EPSILON {
        return bounding_box(parcel).map(|bbox| bbox.center());
    }
    let factor = 6.0 * area_sum;
    Some(Point::new(cx / factor, cy / factor))
}
