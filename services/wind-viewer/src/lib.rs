//! Headless host for the wind overlay.
//!
//! [`SimulatedMap`] stands in for a browser map widget: a Web Mercator
//! camera with a translated pane and an event registry. [`session`] drives
//! an overlay against it at a fixed frame rate through a scripted pan, zoom
//! and resize.

pub mod map;
pub mod session;

pub use map::SimulatedMap;
pub use session::{run_session, write_snapshot, CameraAction, SessionPlan, SessionReport};
