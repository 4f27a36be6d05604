//! Animated wind particle overlay for slippy maps.
//!
//! The overlay downloads a compressed wind grid, turns it into a continuous
//! field and advects a pool of particles through it, drawing fading trails
//! onto a canvas that follows the host map's camera.
//!
//! ```text
//! PayloadSource ──load_grid()──▶ DecodedGrid
//!                                     │ complete_load()
//!                                     ▼
//!  MapHost events ──▶ WindOverlay ──▶ ParticleSystem ──▶ Surface
//!                         ▲
//!                   FrameTicker (animate_frame)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use renderer::TrailCanvas;
//! use wind_overlay::{load_grid, HttpPayloadSource, OverlayOptions, WindOverlay};
//!
//! let mut overlay = WindOverlay::<TrailCanvas>::new(OverlayOptions::from_env())?;
//! let ticket = overlay.on_add(&mut map)?;
//! let result = load_grid(&HttpPayloadSource::new()?, ticket.url()).await;
//! overlay.complete_load(&map, &ticket, result);
//! while overlay.animate_frame(&map) {
//!     ticker.tick().await;
//! }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod fetch;
pub mod forecast;
pub mod particles;
pub mod scheduler;

pub use config::OverlayOptions;
pub use controller::{
    FrameHandle, LoadOutcome, LoadTicket, Motion, OverlayState, WindOverlay, CANVAS_ID_PREFIX,
};
pub use error::{OverlayError, OverlayResult};
pub use fetch::{load_grid, FilePayloadSource, HttpPayloadSource, PayloadSource, StaticPayloadSource};
pub use forecast::{forecast_timestamp, payload_url, DEFAULT_PAYLOAD_TEMPLATE};
pub use particles::{
    particle_count, FieldSampler, Particle, ParticleSystem, StepStats, Velocity, VelocitySampler,
    FADE_ALPHA, LINE_WIDTH, MAX_AGE, MAX_PARTICLES, SPAWN_RETRIES,
};
pub use scheduler::FrameTicker;
