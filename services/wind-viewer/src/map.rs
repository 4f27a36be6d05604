//! A simulated slippy map.

use projection::{
    LatLon, ListenerId, ListenerRegistry, MapEvent, MapEventSource, MapPane, MapProjection,
    PaneOffset, ProjectionError, ScreenPoint, WebMercatorViewport,
};

/// Web Mercator camera plus the pane and event plumbing of a map widget.
///
/// Like a DOM map, the pane translation is kept as a CSS transform string
/// and parsed back on demand.
#[derive(Debug, Clone)]
pub struct SimulatedMap {
    view: WebMercatorViewport,
    pane_transform: String,
    listeners: ListenerRegistry,
    overlays: Vec<String>,
}

impl SimulatedMap {
    pub fn new(center: LatLon, zoom: f64, width: u32, height: u32) -> Self {
        Self {
            view: WebMercatorViewport::new(center, zoom, width, height),
            pane_transform: css_translate(PaneOffset::default()),
            listeners: ListenerRegistry::new(),
            overlays: Vec::new(),
        }
    }

    pub fn view(&self) -> &WebMercatorViewport {
        &self.view
    }

    /// Current pane style, e.g. `translate3d(12px, -4px, 0px)`.
    pub fn pane_transform(&self) -> &str {
        &self.pane_transform
    }

    pub fn overlays(&self) -> &[String] {
        &self.overlays
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Drag the map content by whole pixels.
    pub fn pan_by(&mut self, dx: i32, dy: i32) {
        self.view.pan_by(dx as f64, dy as f64);
        let offset = self.pane_offset().unwrap_or_default();
        self.pane_transform = css_translate(PaneOffset::new(offset.x + dx, offset.y + dy));
    }

    /// Change zoom. The pane is reset to the origin, as after a view reset.
    pub fn zoom_to(&mut self, zoom: f64) {
        self.view.set_zoom(zoom);
        self.pane_transform = css_translate(PaneOffset::default());
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.view.resize(width, height);
    }

    /// Whether an emitted event reaches at least one subscriber.
    pub fn emit(&self, event: MapEvent) -> bool {
        self.listeners.wants(event)
    }
}

fn css_translate(offset: PaneOffset) -> String {
    format!("translate3d({}px, {}px, 0px)", offset.x, offset.y)
}

impl MapProjection for SimulatedMap {
    fn project_to_screen(&self, point: LatLon) -> Result<ScreenPoint, ProjectionError> {
        self.view.project_to_screen(point)
    }

    fn project_to_geo(&self, point: ScreenPoint) -> Result<LatLon, ProjectionError> {
        self.view.project_to_geo(point)
    }
}

impl MapEventSource for SimulatedMap {
    fn subscribe(&mut self, event: MapEvent) -> ListenerId {
        self.listeners.add(event)
    }

    fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

impl MapPane for SimulatedMap {
    fn viewport_size(&self) -> (u32, u32) {
        (self.view.width, self.view.height)
    }

    fn pane_offset(&self) -> Option<PaneOffset> {
        PaneOffset::from_css_transform(&self.pane_transform)
    }

    fn insert_overlay(&mut self, id: &str) {
        self.overlays.insert(0, id.to_string());
    }

    fn remove_overlay(&mut self, id: &str) {
        self.overlays.retain(|existing| existing != id);
    }
}
