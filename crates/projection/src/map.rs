//! Interfaces an overlay uses to collaborate with its host map.
//!
//! A host map provides three things:
//! - coordinate projection between geographic and container pixel space
//! - camera events (move, zoom, resize) an overlay can subscribe to
//! - a pane the overlay canvas is inserted into, with its current translation

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A point in container (canvas) pixel space, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Geographic <-> container pixel projection.
///
/// Implementations must be side-effect free; they are called many times per
/// animation frame.
pub trait MapProjection {
    /// Project a geographic coordinate onto the container.
    fn project_to_screen(&self, point: LatLon) -> Result<ScreenPoint, ProjectionError>;

    /// Inverse projection from a container pixel to a geographic coordinate.
    fn project_to_geo(&self, point: ScreenPoint) -> Result<LatLon, ProjectionError>;
}

impl<T: MapProjection + ?Sized> MapProjection for &T {
    fn project_to_screen(&self, point: LatLon) -> Result<ScreenPoint, ProjectionError> {
        (**self).project_to_screen(point)
    }

    fn project_to_geo(&self, point: ScreenPoint) -> Result<LatLon, ProjectionError> {
        (**self).project_to_geo(point)
    }
}

/// Camera events emitted by the host map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapEvent {
    MoveStart,
    Move,
    MoveEnd,
    ZoomStart,
    ZoomEnd,
    Resize,
}

impl MapEvent {
    /// Every event kind, in the order overlays subscribe to them.
    pub const ALL: [MapEvent; 6] = [
        MapEvent::MoveStart,
        MapEvent::Move,
        MapEvent::MoveEnd,
        MapEvent::ZoomStart,
        MapEvent::ZoomEnd,
        MapEvent::Resize,
    ];

    /// Event name as used by slippy-map libraries.
    pub fn as_str(&self) -> &'static str {
        match self {
            MapEvent::MoveStart => "movestart",
            MapEvent::Move => "move",
            MapEvent::MoveEnd => "moveend",
            MapEvent::ZoomStart => "zoomstart",
            MapEvent::ZoomEnd => "zoomend",
            MapEvent::Resize => "resize",
        }
    }
}

impl std::fmt::Display for MapEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Subscription side of the host map's event system.
pub trait MapEventSource {
    fn subscribe(&mut self, event: MapEvent) -> ListenerId;

    /// Returns false if the listener was not registered.
    fn unsubscribe(&mut self, id: ListenerId) -> bool;
}

/// Bookkeeping for event listeners, shared by map implementations.
#[derive(Debug, Default, Clone)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(ListenerId, MapEvent)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, event: MapEvent) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, event));
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Whether anyone listens for `event`.
    pub fn wants(&self, event: MapEvent) -> bool {
        self.listeners.iter().any(|(_, e)| *e == event)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// Translation of the host's map pane in whole pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneOffset {
    pub x: i32,
    pub y: i32,
}

impl PaneOffset {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The opposite translation, which keeps a child element pinned in place.
    pub fn inverse(&self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }

    /// Parse the translation out of a CSS transform such as
    /// `translate3d(12px, -4px, 0px)`.
    ///
    /// Fractional pixel values are truncated toward zero.
    pub fn from_css_transform(transform: &str) -> Option<Self> {
        let open = transform.find('(')?;
        let close = transform[open..].find(')')? + open;
        let mut parts = transform[open + 1..close].split(',').map(parse_css_px);
        let x = parts.next()??;
        let y = parts.next()??;
        Some(Self { x, y })
    }
}

fn parse_css_px(raw: &str) -> Option<i32> {
    let value = raw.trim().trim_end_matches("px").trim();
    let parsed: f64 = value.parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    Some(parsed.trunc() as i32)
}

/// The host map's rendering pane.
pub trait MapPane {
    /// Size of the visible viewport in pixels.
    fn viewport_size(&self) -> (u32, u32);

    /// Current translation of the pane, if the host has laid it out.
    fn pane_offset(&self) -> Option<PaneOffset>;

    /// Insert an overlay element in front of the pane's children.
    fn insert_overlay(&mut self, id: &str);

    fn remove_overlay(&mut self, id: &str);
}

/// Everything an overlay needs from its host map.
pub trait MapHost: MapProjection + MapEventSource + MapPane {}

impl<T: MapProjection + MapEventSource + MapPane> MapHost for T {}
