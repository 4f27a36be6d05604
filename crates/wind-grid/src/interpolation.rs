//! Bilinear wind field interpolation.

use crate::types::{is_sentinel, DecodedGrid, GridHeader};

/// A wind vector in m/s (u eastward, v northward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindVector {
    pub u: f64,
    pub v: f64,
}

impl WindVector {
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    /// Wind speed in m/s.
    pub fn speed(&self) -> f64 {
        (self.u * self.u + self.v * self.v).sqrt()
    }
}

/// Wrap a longitude difference into [0, 360).
#[inline]
pub fn normalize_longitude(delta: f64) -> f64 {
    delta - 360.0 * (delta / 360.0).floor()
}

/// Answers "what is the wind at this coordinate" for one decoded grid.
#[derive(Debug, Clone)]
pub struct Interpolator {
    grid: DecodedGrid,
}

impl Interpolator {
    pub fn new(grid: DecodedGrid) -> Self {
        Self { grid }
    }

    pub fn header(&self) -> &GridHeader {
        self.grid.header()
    }

    pub fn grid(&self) -> &DecodedGrid {
        &self.grid
    }

    /// Fractional grid coordinates (i, j) of a geographic point.
    ///
    /// Longitudes wrap around the antimeridian. Columns count eastward from
    /// `lo1` and rows southward from `la1`, whatever the sign of `dx` and `dy`.
    pub fn grid_position(&self, lat: f64, lon: f64) -> (f64, f64) {
        let h = self.grid.header();
        let i = normalize_longitude(lon - h.lo1) / h.dx.abs();
        let j = (h.la1 - lat) / h.dy.abs();
        (i, j)
    }

    /// Interpolate (u, v) at lat/lon.
    ///
    /// Returns None outside the grid, when any corner of the enclosing cell is
    /// a ±9999 marker, or if the blend is NaN.
    pub fn interpolate(&self, lat: f64, lon: f64) -> Option<WindVector> {
        let h = self.grid.header();
        let (i, j) = self.grid_position(lat, lon);
        if !i.is_finite() || !j.is_finite() {
            return None;
        }

        let fi = i.floor();
        let fj = j.floor();

        // The last row/column cannot be the top-left corner of a cell
        if fi < 0.0 || fi >= (h.nx - 1) as f64 || fj < 0.0 || fj >= (h.ny - 1) as f64 {
            return None;
        }

        let ix = i - fi;
        let iy = j - fj;
        let lx = 1.0 - ix;
        let ly = 1.0 - iy;

        let (fi, fj) = (fi as usize, fj as usize);
        let idx11 = h.flat_index(fi, fj);
        let idx12 = h.flat_index(fi, fj + 1);
        let idx21 = h.flat_index(fi + 1, fj);
        let idx22 = h.flat_index(fi + 1, fj + 1);

        let c11 = self.grid.components_at(idx11);
        let c12 = self.grid.components_at(idx12);
        let c21 = self.grid.components_at(idx21);
        let c22 = self.grid.components_at(idx22);

        for (u, v) in [c11, c12, c21, c22] {
            if is_sentinel(u) || is_sentinel(v) {
                return None;
            }
        }

        let w11 = lx * ly;
        let w21 = ix * ly;
        let w12 = lx * iy;
        let w22 = ix * iy;

        let u = c11.0 as f64 * w11 + c21.0 as f64 * w21 + c12.0 as f64 * w12 + c22.0 as f64 * w22;
        let v = c11.1 as f64 * w11 + c21.1 as f64 * w21 + c12.1 as f64 * w12 + c22.1 as f64 * w22;

        if u.is_nan() || v.is_nan() {
            return None;
        }
        Some(WindVector { u, v })
    }
}
