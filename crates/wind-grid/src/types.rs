//! Grid geometry and decoded component storage.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Marker used by the source grids for "no data".
pub const SENTINEL: f32 = 9999.0;

/// Returns true for the ±9999 no-data markers.
#[inline]
pub fn is_sentinel(value: f32) -> bool {
    value == SENTINEL || value == -SENTINEL
}

/// Geometry of a regular lat/lon sampling grid.
///
/// Rows start at `la1` and run southward, columns start at `lo1` and run
/// eastward. Samples are stored row-major.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridHeader {
    /// Number of points in X (longitude) direction
    pub nx: usize,
    /// Number of points in Y (latitude) direction
    pub ny: usize,
    /// Longitude step in degrees
    pub dx: f64,
    /// Latitude step in degrees
    pub dy: f64,
    /// Longitude of the first sample
    pub lo1: f64,
    /// Latitude of the first sample
    pub la1: f64,
}

impl GridHeader {
    pub fn new(nx: usize, ny: usize, dx: f64, dy: f64, lo1: f64, la1: f64) -> Self {
        Self {
            nx,
            ny,
            dx,
            dy,
            lo1,
            la1,
        }
    }

    /// Check the geometry can back a bilinear interpolator.
    pub fn validate(&self) -> Result<()> {
        if self.nx < 2 || self.ny < 2 {
            return Err(GridError::invalid_header(format!(
                "grid must be at least 2x2, got {}x{}",
                self.nx, self.ny
            )));
        }
        if self.dx == 0.0 || !self.dx.is_finite() {
            return Err(GridError::invalid_header(format!("dx must be non-zero, got {}", self.dx)));
        }
        if self.dy == 0.0 || !self.dy.is_finite() {
            return Err(GridError::invalid_header(format!("dy must be non-zero, got {}", self.dy)));
        }
        if !self.lo1.is_finite() || !self.la1.is_finite() {
            return Err(GridError::invalid_header("grid origin is not finite"));
        }
        Ok(())
    }

    /// Total number of grid points per component.
    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    /// Check if grid is empty.
    pub fn is_empty(&self) -> bool {
        self.nx == 0 || self.ny == 0
    }

    /// Flat index of sample (i, j).
    #[inline]
    pub fn flat_index(&self, i: usize, j: usize) -> usize {
        i + j * self.nx
    }

    /// Whether the columns wrap all the way around the globe.
    pub fn is_global(&self) -> bool {
        self.nx as f64 * self.dx.abs() >= 360.0
    }

    /// Extent covered by the samples as [min_lon, min_lat, max_lon, max_lat].
    ///
    /// Longitudes are not normalized, so `max_lon` may exceed 180.
    pub fn bounds(&self) -> [f64; 4] {
        let last_lon = self.lo1 + (self.nx - 1) as f64 * self.dx.abs();
        let last_lat = self.la1 - (self.ny - 1) as f64 * self.dy.abs();
        [self.lo1, last_lat, last_lon, self.la1]
    }
}

/// A decoded U/V wind grid.
///
/// Immutable once built; the interpolator takes ownership of it for the
/// lifetime of one overlay epoch.
#[derive(Debug, Clone)]
pub struct DecodedGrid {
    header: GridHeader,
    u_components: Vec<f32>,
    v_components: Vec<f32>,
}

impl DecodedGrid {
    /// Build a grid from already dequantized components.
    pub fn new(header: GridHeader, u_components: Vec<f32>, v_components: Vec<f32>) -> Result<Self> {
        header.validate()?;
        let expected = header.len();
        if u_components.len() != expected || v_components.len() != expected {
            return Err(GridError::ComponentLength {
                expected,
                u: u_components.len(),
                v: v_components.len(),
            });
        }
        Ok(Self {
            header,
            u_components,
            v_components,
        })
    }

    pub fn header(&self) -> &GridHeader {
        &self.header
    }

    pub fn u_components(&self) -> &[f32] {
        &self.u_components
    }

    pub fn v_components(&self) -> &[f32] {
        &self.v_components
    }

    /// (u, v) at a flat index.
    #[inline]
    pub fn components_at(&self, idx: usize) -> (f32, f32) {
        (self.u_components[idx], self.v_components[idx])
    }

    /// Take the grid apart again, e.g. to patch in masked samples.
    pub fn into_parts(self) -> (GridHeader, Vec<f32>, Vec<f32>) {
        (self.header, self.u_components, self.v_components)
    }
}
