//! Scripted overlay sessions.
//!
//! A session attaches an overlay to a [`SimulatedMap`], races the payload
//! load against the frame ticker, then renders a fixed number of frames
//! while replaying camera actions the way a user would produce them.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use projection::MapEvent;
use renderer::{Surface, TrailCanvas};
use tracing::{debug, info, warn};
use wind_overlay::{
    load_grid, FrameTicker, LoadOutcome, OverlayState, PayloadSource, WindOverlay,
};

use crate::map::SimulatedMap;

/// A camera change scheduled at a frame index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraAction {
    /// Drag by (dx, dy) pixels per frame for `frames` frames.
    Pan { dx: i32, dy: i32, frames: u32 },
    /// Jump to a new zoom level.
    Zoom { zoom: f64 },
    /// Resize the map container.
    Resize { width: u32, height: u32 },
}

/// How many frames to render and when to move the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub frames: u32,
    pub actions: Vec<(u32, CameraAction)>,
    /// Give up on a payload that takes longer than this.
    pub load_timeout: Duration,
}

impl SessionPlan {
    /// Render `frames` frames with no camera changes.
    pub fn still(frames: u32) -> Self {
        Self {
            frames,
            actions: Vec::new(),
            load_timeout: Duration::from_secs(30),
        }
    }

    /// A pan at the first quarter, a zoom at half time and a resize at the
    /// third quarter, ending on a settled camera.
    pub fn scripted(frames: u32, zoom: f64, width: u32, height: u32) -> Self {
        let pan_frames = (frames / 8).max(1);
        Self {
            frames,
            actions: vec![
                (frames / 4, CameraAction::Pan { dx: 4, dy: -2, frames: pan_frames }),
                (frames / 2, CameraAction::Zoom { zoom: zoom + 1.0 }),
                (
                    frames * 3 / 4,
                    CameraAction::Resize {
                        width: width * 3 / 4,
                        height: height * 3 / 4,
                    },
                ),
            ],
            load_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }
}

/// Summary of a finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub outcome: LoadOutcome,
    pub state: OverlayState,
    /// Ticks that elapsed while the payload was loading.
    pub loading_ticks: u64,
    pub frames_rendered: u64,
    pub particles: usize,
    pub painted_pixels: usize,
    pub canvas_size: (u32, u32),
}

struct Gesture {
    dx: i32,
    dy: i32,
    remaining: u32,
}

/// Forward an event to the overlay if it is subscribed.
fn dispatch(overlay: &mut WindOverlay<TrailCanvas>, map: &SimulatedMap, event: MapEvent) {
    if map.emit(event) {
        overlay.handle_event(map, event);
    }
}

/// Attach `overlay` to `map`, load its payload from `source` and render the
/// frames in `plan`.
///
/// The overlay is left attached so the caller can snapshot its canvas.
pub async fn run_session<P: PayloadSource + ?Sized>(
    overlay: &mut WindOverlay<TrailCanvas>,
    map: &mut SimulatedMap,
    source: &P,
    plan: &SessionPlan,
) -> Result<SessionReport> {
    let mut ticker = FrameTicker::new(overlay.options().frame_interval());
    let ticket = overlay.on_add(map)?;
    info!(url = ticket.url(), frames = plan.frames, "Starting viewer session");

    let load = load_grid(source, ticket.url());
    tokio::pin!(load);
    let deadline = tokio::time::sleep(plan.load_timeout);
    tokio::pin!(deadline);

    let mut loading_ticks = 0u64;
    let outcome = loop {
        tokio::select! {
            result = &mut load => break overlay.complete_load(&*map, &ticket, result),
            _ = &mut deadline => {
                return Err(anyhow!(
                    "payload {} did not load within {:?}",
                    ticket.url(),
                    plan.load_timeout
                ));
            }
            _ = ticker.tick() => {
                loading_ticks += 1;
                // Nothing is pending while loading; keeps the frame cadence honest
                overlay.animate_frame(&*map);
            }
        }
    };
    debug!(loading_ticks, ?outcome, "Payload settled");

    if let LoadOutcome::Failed(err) = &outcome {
        warn!(error = %err, "Overlay failed to load, rendering nothing");
    }

    let mut gesture: Option<Gesture> = None;
    for frame in 0..plan.frames {
        ticker.tick().await;

        for (_, action) in plan.actions.iter().filter(|(at, _)| *at == frame) {
            match *action {
                CameraAction::Pan { dx, dy, frames } => {
                    dispatch(overlay, map, MapEvent::MoveStart);
                    gesture = Some(Gesture {
                        dx,
                        dy,
                        remaining: frames.max(1),
                    });
                }
                CameraAction::Zoom { zoom } => {
                    dispatch(overlay, map, MapEvent::ZoomStart);
                    map.zoom_to(zoom);
                    dispatch(overlay, map, MapEvent::ZoomEnd);
                }
                CameraAction::Resize { width, height } => {
                    map.resize(width, height);
                    dispatch(overlay, map, MapEvent::Resize);
                }
            }
        }

        if let Some(active) = gesture.as_mut() {
            map.pan_by(active.dx, active.dy);
            dispatch(overlay, map, MapEvent::Move);
            active.remaining -= 1;
            if active.remaining == 0 {
                gesture = None;
                dispatch(overlay, map, MapEvent::MoveEnd);
            }
        }

        overlay.animate_frame(&*map);
    }

    if gesture.is_some() {
        dispatch(overlay, map, MapEvent::MoveEnd);
    }

    let canvas = overlay.canvas();
    let report = SessionReport {
        outcome,
        state: overlay.state(),
        loading_ticks,
        frames_rendered: overlay.frames_rendered(),
        particles: overlay.particles().len(),
        painted_pixels: canvas.map(|c| c.painted_pixels()).unwrap_or(0),
        canvas_size: canvas.map(|c| (c.width(), c.height())).unwrap_or((0, 0)),
    };
    info!(
        frames = report.frames_rendered,
        particles = report.particles,
        painted = report.painted_pixels,
        state = %report.state,
        "Viewer session finished"
    );
    Ok(report)
}

/// Write the overlay's canvas as a PNG file.
pub async fn write_snapshot(overlay: &WindOverlay<TrailCanvas>, path: &Path) -> Result<()> {
    let canvas = overlay
        .canvas()
        .ok_or_else(|| anyhow!("overlay has no canvas to snapshot"))?;
    let png = canvas.encode_png().map_err(|e| anyhow!(e))?;
    tokio::fs::write(path, &png)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), bytes = png.len(), "Wrote trail snapshot");
    Ok(())
}
