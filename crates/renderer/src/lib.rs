//! Trail rendering for the wind overlay.
//!
//! - Speed color ramp
//! - Trail canvas (fade + segment strokes)
//! - PNG snapshots

pub mod color;
pub mod png;
pub mod surface;

pub use color::{speed_color, Color};
pub use surface::{Surface, TrailCanvas};
