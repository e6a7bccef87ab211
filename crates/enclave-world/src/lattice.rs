//! Synthetic square-lattice parcel layouts.
//!
//! Used when no geometry file is configured and throughout the tests: a
//! `rows x cols` grid of square parcels whose shared-boundary adjacency is the
//! classic eight-cell Moore neighborhood.

use enclave_types::{Parcel, ParcelId, Point, Polygon};

use crate::error::GeometryLoadError;

/// Build a `rows x cols` grid of square parcels with side `cell_size`.
///
/// Parcels are numbered row-major from the origin corner, so the parcel in
/// row `r`, column `c` has id `r * cols + c`.
///
/// # Errors
///
/// Returns [`GeometryLoadError::InvalidLattice`] for a zero dimension or a
/// non-positive cell size, and [`GeometryLoadError::TooManyParcels`] if the
/// grid does not fit in a [`ParcelId`].
pub fn square_lattice(rows: u32, cols: u32, cell_size: f64) -> Result<Vec<Parcel>, GeometryLoadError> {
    if rows == 0 || cols == 0 {
        return Err(GeometryLoadError::InvalidLattice {
            reason: format!("dimensions must be non-zero, got {rows}x{cols}"),
        });
    }
    if !(cell_size.is_finite() && cell_size > 0.0) {
        return Err(GeometryLoadError::InvalidLattice {
            reason: format!("cell size must be positive, got {cell_size}"),
        });
    }
    let total = rows
        .checked_mul(cols)
        .ok_or_else(|| GeometryLoadError::TooManyParcels {
            count: usize::try_from(u64::from(rows).saturating_mul(u64::from(cols)))
                .unwrap_or(usize::MAX),
        })?;

    let mut parcels = Vec::with_capacity(usize::try_from(total).unwrap_or(0));
    let mut next_id: u32 = 0;
    for row in 0..rows {
        for col in 0..cols {
            let x = f64::from(col) * cell_size;
            let y = f64::from(row) * cell_size;
            parcels.push(Parcel {
                id: ParcelId::new(next_id),
                label: Some(format!("r{row}c{col}")),
                polygons: vec![Polygon::simple(vec![
                    Point::new(x, y),
                    Point::new(x + cell_size, y),
                    Point::new(x + cell_size, y + cell_size),
                    Point::new(x, y + cell_size),
                ])],
            });
            next_id = next_id.saturating_add(1);
        }
    }
    Ok(parcels)
}
