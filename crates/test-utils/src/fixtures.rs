//! Common test fixtures for wind overlay tests.
//!
//! - [`FakeMap`]: a host map with a linear projection and event bookkeeping
//! - [`RecordingSurface`]: a canvas that records draw calls
//! - Payload geometries for common scenarios

use projection::{
    LatLon, ListenerId, ListenerRegistry, MapEvent, MapEventSource, MapPane, MapProjection,
    PaneOffset, ProjectionError, ScreenPoint,
};
use renderer::{Color, Surface};

use crate::generators::PayloadGeometry;

/// Common payload geometries for testing.
pub mod geometry {
    use super::PayloadGeometry;

    /// The smallest interpolatable grid: 2x2, 1° steps, rows from lat 1 to 0.
    pub const UNIT_2X2: PayloadGeometry = PayloadGeometry::new(2, 2, 1.0, 1.0, 0.0, 1.0);

    /// Germany at 0.25°: lon 5..15, lat 55..47, rows running south.
    pub const GERMANY: PayloadGeometry = PayloadGeometry::new(41, 33, 0.25, -0.25, 5.0, 55.0);

    /// Global 1° grid starting at the prime meridian.
    pub const GLOBAL_1DEG: PayloadGeometry = PayloadGeometry::new(360, 181, 1.0, 1.0, 0.0, 90.0);
}

/// A host map whose projection is a plain linear mapping.
///
/// Container pixel (0, 0) sits at `top_left`; every pixel is
/// `degrees_per_pixel` degrees in both directions, latitude decreasing
/// downward.
#[derive(Debug, Clone)]
pub struct FakeMap {
    pub top_left: LatLon,
    pub degrees_per_pixel: f64,
    pub viewport: (u32, u32),
    pub pane_offset: Option<PaneOffset>,
    /// When false every projection call fails with `Unavailable`.
    pub ready: bool,
    /// Overlay ids currently inserted in the pane, front first.
    pub overlays: Vec<String>,
    listeners: ListenerRegistry,
}

impl FakeMap {
    pub fn new(top_left: LatLon, degrees_per_pixel: f64, width: u32, height: u32) -> Self {
        Self {
            top_left,
            degrees_per_pixel,
            viewport: (width, height),
            pane_offset: Some(PaneOffset::default()),
            ready: true,
            overlays: Vec::new(),
            listeners: ListenerRegistry::new(),
        }
    }

    /// A viewport over Germany that fits inside [`geometry::GERMANY`].
    pub fn germany(width: u32, height: u32) -> Self {
        // 9° of longitude across the canvas width
        Self::new(LatLon::new(54.5, 5.5), 9.0 / width.max(1) as f64, width, height)
    }

    /// Number of active event listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether an event would reach a subscriber.
    pub fn is_listening(&self, event: MapEvent) -> bool {
        self.listeners.wants(event)
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    /// Shift the projection as if the map had been dragged by (dx, dy) pixels.
    pub fn drag(&mut self, dx: f64, dy: f64) {
        self.top_left.lon -= dx * self.degrees_per_pixel;
        self.top_left.lat += dy * self.degrees_per_pixel;
        let offset = self.pane_offset.unwrap_or_default();
        self.pane_offset = Some(PaneOffset::new(offset.x + dx as i32, offset.y + dy as i32));
    }
}

impl MapProjection for FakeMap {
    fn project_to_screen(&self, point: LatLon) -> Result<ScreenPoint, ProjectionError> {
        if !self.ready {
            return Err(ProjectionError::unavailable("fake map not ready"));
        }
        Ok(ScreenPoint::new(
            (point.lon - self.top_left.lon) / self.degrees_per_pixel,
            (self.top_left.lat - point.lat) / self.degrees_per_pixel,
        ))
    }

    fn project_to_geo(&self, point: ScreenPoint) -> Result<LatLon, ProjectionError> {
        if !self.ready {
            return Err(ProjectionError::unavailable("fake map not ready"));
        }
        Ok(LatLon::new(
            self.top_left.lat - point.y * self.degrees_per_pixel,
            self.top_left.lon + point.x * self.degrees_per_pixel,
        ))
    }
}

impl MapEventSource for FakeMap {
    fn subscribe(&mut self, event: MapEvent) -> ListenerId {
        self.listeners.add(event)
    }

    fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

impl MapPane for FakeMap {
    fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }

    fn pane_offset(&self) -> Option<PaneOffset> {
        self.pane_offset
    }

    fn insert_overlay(&mut self, id: &str) {
        self.overlays.insert(0, id.to_string());
    }

    fn remove_overlay(&mut self, id: &str) {
        self.overlays.retain(|existing| existing != id);
    }
}

/// A stroked segment captured by [`RecordingSurface`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub color: Color,
    pub line_width: f32,
}

/// A surface that records every draw call instead of rasterizing.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub width: u32,
    pub height: u32,
    pub translation: (i32, i32),
    pub segments: Vec<Segment>,
    pub fades: Vec<f32>,
    pub clears: usize,
    pub resizes: usize,
}

impl Surface for RecordingSurface {
    fn create(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.resizes += 1;
    }

    fn clear(&mut self) {
        self.clears += 1;
    }

    fn fade(&mut self, alpha: f32) {
        self.fades.push(alpha);
    }

    fn stroke_segment(&mut self, from: (f64, f64), to: (f64, f64), color: Color, line_width: f32) {
        self.segments.push(Segment {
            from,
            to,
            color,
            line_width,
        });
    }

    fn set_translation(&mut self, x: i32, y: i32) {
        self.translation = (x, y);
    }

    fn translation(&self) -> (i32, i32) {
        self.translation
    }
}
