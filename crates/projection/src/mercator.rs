//! Spherical (Web) Mercator viewport.
//!
//! Matches the slippy-map convention: at zoom `z` the world is
//! `256 * 2^z` pixels square, x grows eastward from -180°, y grows
//! southward from the top of the projected world.

use std::f64::consts::PI;

use crate::error::ProjectionError;
use crate::map::{LatLon, MapProjection, ScreenPoint};

/// Maximum latitude representable by spherical Mercator.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// Tile edge length in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// A camera over a Web Mercator world: center, zoom and container size.
#[derive(Debug, Clone, PartialEq)]
pub struct WebMercatorViewport {
    /// Geographic center of the container
    pub center: LatLon,
    /// Zoom level (fractional zooms allowed)
    pub zoom: f64,
    /// Container width in pixels
    pub width: u32,
    /// Container height in pixels
    pub height: u32,
}

impl WebMercatorViewport {
    pub fn new(center: LatLon, zoom: f64, width: u32, height: u32) -> Self {
        Self {
            center,
            zoom,
            width,
            height,
        }
    }

    /// World size in pixels at the current zoom.
    pub fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    /// Project a coordinate to absolute world pixels.
    pub fn to_world(&self, point: LatLon) -> (f64, f64) {
        let scale = self.world_size();
        let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = scale * (point.lon + 180.0) / 360.0;
        let y = scale * (0.5 - (PI / 4.0 + lat / 2.0).tan().ln() / (2.0 * PI));
        (x, y)
    }

    /// Inverse of [`to_world`](Self::to_world).
    pub fn from_world(&self, x: f64, y: f64) -> LatLon {
        let scale = self.world_size();
        let lon = x / scale * 360.0 - 180.0;
        let n = PI * (1.0 - 2.0 * y / scale);
        let lat = n.sinh().atan().to_degrees();
        LatLon { lat, lon }
    }

    /// World pixel at the container's top-left corner.
    fn origin(&self) -> (f64, f64) {
        let (cx, cy) = self.to_world(self.center);
        (cx - self.width as f64 / 2.0, cy - self.height as f64 / 2.0)
    }

    /// Shift the camera by a pixel delta (positive dx drags the map content
    /// right, moving the center west).
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let (cx, cy) = self.to_world(self.center);
        self.center = self.from_world(cx - dx, cy - dy);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn check_ready(&self) -> Result<(), ProjectionError> {
        if self.width == 0 || self.height == 0 {
            return Err(ProjectionError::unavailable("viewport has no size"));
        }
        if !self.zoom.is_finite() {
            return Err(ProjectionError::unavailable("zoom is not set"));
        }
        Ok(())
    }
}

impl MapProjection for WebMercatorViewport {
    fn project_to_screen(&self, point: LatLon) -> Result<ScreenPoint, ProjectionError> {
        self.check_ready()?;
        if !point.lat.is_finite() || !point.lon.is_finite() {
            return Err(ProjectionError::InvalidCoordinate(format!("{:?}", point)));
        }
        let (ox, oy) = self.origin();
        let (x, y) = self.to_world(point);
        Ok(ScreenPoint::new(x - ox, y - oy))
    }

    fn project_to_geo(&self, point: ScreenPoint) -> Result<LatLon, ProjectionError> {
        self.check_ready()?;
        if !point.x.is_finite() || !point.y.is_finite() {
            return Err(ProjectionError::InvalidCoordinate(format!("{:?}", point)));
        }
        let (ox, oy) = self.origin();
        Ok(self.from_world(point.x + ox, point.y + oy))
    }
}
