//! Map collaboration and coordinate projection.
//!
//! Overlays never talk to a concrete map widget. They see the host through
//! the traits in [`map`], and [`mercator`] provides the Web Mercator camera
//! used by headless hosts.

pub mod error;
pub mod map;
pub mod mercator;

pub use error::ProjectionError;
pub use map::{
    LatLon, ListenerId, ListenerRegistry, MapEvent, MapEventSource, MapHost, MapPane,
    MapProjection, PaneOffset, ScreenPoint,
};
pub use mercator::WebMercatorViewport;
