//! Overlay lifecycle and render loop.
//!
//! ```text
//! Uninitialized ──on_add──▶ Loading ──complete_load(Ok)──▶ Active(Settled)
//!                              │                            ▲        │
//!                     complete_load(Err)        move/zoom end│        │move/zoom start
//!                              ▼                            │        ▼
//!                          Disposed ◀────on_remove──── Active(Moving)
//! ```
//!
//! The controller never blocks. [`WindOverlay::on_add`] hands out a
//! [`LoadTicket`]; the caller runs the fetch however it likes and feeds the
//! result back through [`WindOverlay::complete_load`]. Each detach starts a
//! new generation, so a result that arrives after the overlay was removed or
//! reloaded is dropped.

use std::fmt;

use metrics::counter;
use projection::{ListenerId, MapEvent, MapHost, MapProjection, PaneOffset, ScreenPoint};
use rand::Rng;
use renderer::Surface;
use tracing::{debug, error, info, trace};
use wind_grid::{DecodedGrid, Interpolator};

use crate::config::OverlayOptions;
use crate::error::{OverlayError, OverlayResult};
use crate::particles::{FieldSampler, Particle, ParticleSystem, FADE_ALPHA};

/// Prefix of generated canvas element ids.
pub const CANVAS_ID_PREFIX: &str = "wind-overlay-";

/// Whether the camera is currently changing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Moving,
    Settled,
}

/// Lifecycle state of an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Uninitialized,
    Loading,
    Active(Motion),
    Disposed,
}

impl OverlayState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}

impl fmt::Display for OverlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Uninitialized"),
            Self::Loading => write!(f, "Loading"),
            Self::Active(Motion::Moving) => write!(f, "Active(Moving)"),
            Self::Active(Motion::Settled) => write!(f, "Active(Settled)"),
            Self::Disposed => write!(f, "Disposed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Loading,
    Active,
    Disposed,
}

/// Identifies one requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Proof that a load was started, bound to the generation that started it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    url: String,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Payload URL to fetch.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// What happened to a finished load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The grid was installed and particles are running.
    Activated,
    /// The overlay moved on (removed or reloaded) before the result arrived.
    Stale,
    /// The load failed and the overlay is now disposed.
    Failed(OverlayError),
}

/// An animated wind particle layer attached to a host map.
///
/// `S` is the canvas implementation; the host map is passed into every call
/// that needs it rather than stored.
pub struct WindOverlay<S: Surface> {
    options: OverlayOptions,
    phase: Phase,
    moving: bool,
    generation: u64,
    canvas: Option<S>,
    canvas_id: Option<String>,
    listeners: Vec<ListenerId>,
    field: Option<Interpolator>,
    particles: ParticleSystem,
    pending_frame: Option<FrameHandle>,
    next_frame_id: u64,
    frames_rendered: u64,
    last_error: Option<OverlayError>,
}

impl<S: Surface> WindOverlay<S> {
    pub fn new(options: OverlayOptions) -> OverlayResult<Self> {
        options.validate()?;
        let particles = ParticleSystem::new(options.velocity_scale, options.particle_multiplier);
        Ok(Self::with_particles(options, particles))
    }

    /// Overlay with a seeded particle rng, for reproducible frames.
    pub fn with_seed(options: OverlayOptions, seed: u64) -> OverlayResult<Self> {
        options.validate()?;
        let particles =
            ParticleSystem::with_seed(options.velocity_scale, options.particle_multiplier, seed);
        Ok(Self::with_particles(options, particles))
    }

    fn with_particles(options: OverlayOptions, particles: ParticleSystem) -> Self {
        Self {
            options,
            phase: Phase::Uninitialized,
            moving: false,
            generation: 0,
            canvas: None,
            canvas_id: None,
            listeners: Vec::new(),
            field: None,
            particles,
            pending_frame: None,
            next_frame_id: 0,
            frames_rendered: 0,
            last_error: None,
        }
    }

    pub fn state(&self) -> OverlayState {
        match self.phase {
            Phase::Uninitialized => OverlayState::Uninitialized,
            Phase::Loading => OverlayState::Loading,
            Phase::Active if self.moving => OverlayState::Active(Motion::Moving),
            Phase::Active => OverlayState::Active(Motion::Settled),
            Phase::Disposed => OverlayState::Disposed,
        }
    }

    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    /// Incremented on every detach.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn canvas(&self) -> Option<&S> {
        self.canvas.as_ref()
    }

    pub fn canvas_id(&self) -> Option<&str> {
        self.canvas_id.as_deref()
    }

    pub fn particles(&self) -> &[Particle] {
        self.particles.particles()
    }

    pub fn field(&self) -> Option<&Interpolator> {
        self.field.as_ref()
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// The error that ended the most recent load, if any.
    pub fn last_error(&self) -> Option<&OverlayError> {
        self.last_error.as_ref()
    }

    /// Attach to a map: create and insert the canvas, subscribe to camera
    /// events and start loading.
    ///
    /// Allowed from `Uninitialized` and `Disposed`.
    pub fn on_add<M: MapHost + ?Sized>(&mut self, map: &mut M) -> OverlayResult<LoadTicket> {
        match self.phase {
            Phase::Uninitialized | Phase::Disposed => {}
            Phase::Loading | Phase::Active => {
                return Err(OverlayError::InvalidState(self.state().to_string()));
            }
        }
        // A failed load leaves its canvas and listeners behind until detach
        if self.canvas.is_some() || !self.listeners.is_empty() {
            self.on_remove(map);
        }

        let (width, height) = map.viewport_size();
        let canvas_id = self.new_canvas_id();
        map.insert_overlay(&canvas_id);
        self.canvas = Some(S::create(width, height));
        self.canvas_id = Some(canvas_id);
        self.reposition(map.pane_offset());

        self.listeners = MapEvent::ALL.iter().map(|event| map.subscribe(*event)).collect();

        self.phase = Phase::Loading;
        self.moving = false;
        self.last_error = None;

        info!(
            generation = self.generation,
            width,
            height,
            canvas_id = self.canvas_id.as_deref().unwrap_or_default(),
            url = %self.options.base_url,
            "Wind overlay attached, loading payload"
        );

        Ok(LoadTicket {
            generation: self.generation,
            url: self.options.base_url.clone(),
        })
    }

    /// Install the result of the load started by `ticket`.
    pub fn complete_load<M: MapProjection + ?Sized>(
        &mut self,
        map: &M,
        ticket: &LoadTicket,
        result: OverlayResult<DecodedGrid>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation || self.phase != Phase::Loading {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                state = %self.state(),
                "Discarding stale wind payload"
            );
            return LoadOutcome::Stale;
        }

        match result.and_then(|grid| self.activate(map, grid)) {
            Ok(()) => LoadOutcome::Activated,
            Err(err) => {
                error!(error = %err, kind = err.kind(), url = %ticket.url, "Wind overlay failed to load");
                counter!("wind_overlay_load_failures_total", "kind" => err.kind()).increment(1);
                self.phase = Phase::Disposed;
                self.field = None;
                self.particles.clear();
                self.cancel_frame();
                self.last_error = Some(err.clone());
                LoadOutcome::Failed(err)
            }
        }
    }

    fn activate<M: MapProjection + ?Sized>(&mut self, map: &M, grid: DecodedGrid) -> OverlayResult<()> {
        let (width, height) = self.canvas_size();
        map.project_to_geo(ScreenPoint::new(width as f64 / 2.0, height as f64 / 2.0))?;

        let header = grid.header();
        debug!(
            nx = header.nx,
            ny = header.ny,
            bounds = ?header.bounds(),
            global = header.is_global(),
            "Installing wind field"
        );

        self.field = Some(Interpolator::new(grid));
        self.phase = Phase::Active;
        self.regenerate(map);
        self.request_frame();

        info!(
            generation = self.generation,
            particles = self.particles.len(),
            state = %self.state(),
            "Wind overlay active"
        );
        Ok(())
    }

    /// React to a camera event from the host map.
    pub fn handle_event<M: MapHost + ?Sized>(&mut self, map: &M, event: MapEvent) {
        if matches!(self.phase, Phase::Uninitialized | Phase::Disposed) {
            trace!(%event, state = %self.state(), "Ignoring map event");
            return;
        }

        match event {
            MapEvent::MoveStart | MapEvent::ZoomStart => {
                self.moving = true;
                if let Some(canvas) = self.canvas.as_mut() {
                    canvas.clear();
                }
                if event == MapEvent::ZoomStart {
                    self.reposition(map.pane_offset());
                }
            }
            MapEvent::Move => self.reposition(map.pane_offset()),
            MapEvent::MoveEnd | MapEvent::ZoomEnd => {
                self.moving = false;
                if self.phase == Phase::Active {
                    self.regenerate(map);
                    self.request_frame();
                }
            }
            MapEvent::Resize => {
                let (width, height) = map.viewport_size();
                if let Some(canvas) = self.canvas.as_mut() {
                    canvas.resize(width, height);
                }
                self.reposition(map.pane_offset());
                if self.phase == Phase::Active {
                    self.cancel_frame();
                    self.regenerate(map);
                    self.request_frame();
                }
            }
        }

        debug!(%event, state = %self.state(), "Handled map event");
    }

    /// Run the pending animation frame, if any.
    ///
    /// Fades the trails, advances particles unless the camera is moving, and
    /// requests the next frame. Returns false when no frame was pending.
    pub fn animate_frame<M: MapProjection + ?Sized>(&mut self, map: &M) -> bool {
        if self.phase != Phase::Active || self.pending_frame.take().is_none() {
            return false;
        }
        let (Some(canvas), Some(field)) = (self.canvas.as_mut(), self.field.as_ref()) else {
            return false;
        };

        canvas.fade(FADE_ALPHA);
        if !self.moving {
            let sampler = FieldSampler::new(field, map, self.options.velocity_scale);
            self.particles.step(&sampler, canvas);
        }

        self.frames_rendered += 1;
        counter!("wind_overlay_frames_total").increment(1);
        self.request_frame();
        true
    }

    /// Detach from the map: cancel the pending frame, remove the canvas and
    /// unsubscribe every listener.
    pub fn on_remove<M: MapHost + ?Sized>(&mut self, map: &mut M) {
        let attached = self.canvas_id.is_some() || !self.listeners.is_empty();
        if self.phase == Phase::Uninitialized || (self.phase == Phase::Disposed && !attached) {
            return;
        }

        self.cancel_frame();
        if let Some(id) = self.canvas_id.take() {
            map.remove_overlay(&id);
        }
        self.canvas = None;
        for id in self.listeners.drain(..) {
            map.unsubscribe(id);
        }

        self.field = None;
        self.particles.clear();
        self.moving = false;
        self.phase = Phase::Disposed;
        self.generation += 1;

        info!(generation = self.generation, "Wind overlay detached");
    }

    /// Tear down and attach again, starting a fresh load.
    pub fn reload<M: MapHost + ?Sized>(&mut self, map: &mut M) -> OverlayResult<LoadTicket> {
        self.on_remove(map);
        self.on_add(map)
    }

    fn canvas_size(&self) -> (u32, u32) {
        self.canvas
            .as_ref()
            .map(|c| (c.width(), c.height()))
            .unwrap_or((0, 0))
    }

    fn regenerate<M: MapProjection + ?Sized>(&mut self, map: &M) {
        let (width, height) = self.canvas_size();
        let Some(field) = self.field.as_ref() else {
            return;
        };
        let sampler = FieldSampler::new(field, map, self.options.velocity_scale);
        self.particles.regenerate(width, height, &sampler);
        debug!(width, height, particles = self.particles.len(), "Regenerated particle pool");
    }

    /// Keep the canvas pinned to the viewport while the pane is translated.
    fn reposition(&mut self, offset: Option<PaneOffset>) {
        let Some(canvas) = self.canvas.as_mut() else {
            return;
        };
        let pinned = offset.unwrap_or_default().inverse();
        canvas.set_translation(pinned.x, pinned.y);
    }

    fn request_frame(&mut self) -> FrameHandle {
        if let Some(handle) = self.pending_frame {
            return handle;
        }
        self.next_frame_id += 1;
        let handle = FrameHandle(self.next_frame_id);
        self.pending_frame = Some(handle);
        handle
    }

    fn cancel_frame(&mut self) -> Option<FrameHandle> {
        self.pending_frame.take()
    }

    fn new_canvas_id(&mut self) -> String {
        const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let rng = self.particles.rng_mut();
        let suffix: String = (0..9)
            .map(|_| DIGITS[rng.gen_range(0..DIGITS.len())] as char)
            .collect();
        format!("{}{}", CANVAS_ID_PREFIX, suffix)
    }
}

impl<S: Surface> fmt::Debug for WindOverlay<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindOverlay")
            .field("state", &self.state())
            .field("generation", &self.generation)
            .field("canvas_id", &self.canvas_id)
            .field("particles", &self.particles.len())
            .field("pending_frame", &self.pending_frame)
            .finish()
    }
}
