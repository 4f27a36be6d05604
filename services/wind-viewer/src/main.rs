//! Headless wind overlay viewer.
//!
//! Loads a wind payload, animates the particle overlay over a simulated
//! Web Mercator map and writes the resulting trails as a PNG:
//! - Payload from HTTP, or from a local directory mirror
//! - Scripted pan, zoom and resize to exercise the overlay lifecycle
//! - Options from YAML, environment or command line

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use projection::LatLon;
use renderer::TrailCanvas;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use wind_overlay::{
    payload_url, FilePayloadSource, HttpPayloadSource, LoadOutcome, OverlayOptions, PayloadSource,
    WindOverlay, DEFAULT_PAYLOAD_TEMPLATE,
};

use wind_viewer::{run_session, write_snapshot, SessionPlan, SimulatedMap};

#[derive(Parser, Debug)]
#[command(name = "wind-viewer")]
#[command(about = "Render the wind particle overlay headlessly to PNG")]
struct Args {
    /// Payload URL (overrides config and forecast template)
    #[arg(long, env = "WIND_BASE_URL")]
    url: Option<String>,

    /// Payload URL template, `{date}` becomes YYYYMMDDHH00
    #[arg(long, default_value = DEFAULT_PAYLOAD_TEMPLATE)]
    template: String,

    /// Forecast offset in hours from now
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    forecast_offset: i64,

    /// Read payloads from this directory instead of HTTP
    #[arg(long, env = "WIND_PAYLOAD_DIR")]
    payload_dir: Option<PathBuf>,

    /// Overlay options file (YAML)
    #[arg(long, env = "WIND_CONFIG")]
    config: Option<PathBuf>,

    /// Map container width in pixels
    #[arg(long, default_value = "1024")]
    width: u32,

    /// Map container height in pixels
    #[arg(long, default_value = "768")]
    height: u32,

    /// Map center latitude
    #[arg(long, default_value = "51.0", allow_hyphen_values = true)]
    lat: f64,

    /// Map center longitude
    #[arg(long, default_value = "10.5", allow_hyphen_values = true)]
    lon: f64,

    /// Initial zoom level
    #[arg(long, default_value = "5.0")]
    zoom: f64,

    /// Frames to render after the payload has loaded
    #[arg(long, default_value = "240")]
    frames: u32,

    /// Keep the camera still instead of scripting pan/zoom/resize
    #[arg(long)]
    still: bool,

    /// Seed for reproducible particle placement
    #[arg(long)]
    seed: Option<u64>,

    /// Output PNG path
    #[arg(short, long, default_value = "wind.png")]
    output: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn resolve_options(args: &Args) -> Result<OverlayOptions> {
    let mut options = match &args.config {
        Some(path) => OverlayOptions::from_yaml_file(path)?,
        None => OverlayOptions::from_env(),
    };

    if let Some(url) = &args.url {
        options.base_url = url.clone();
    }
    if options.base_url.trim().is_empty() {
        let now = chrono::Utc::now().naive_utc();
        options.base_url = payload_url(&args.template, now, args.forecast_offset);
    }

    options.validate()?;
    Ok(options)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let options = resolve_options(&args)?;
    info!(
        url = %options.base_url,
        unit = %options.unit,
        frame_rate = options.frame_rate,
        "Starting wind viewer"
    );

    let source: Box<dyn PayloadSource> = match &args.payload_dir {
        Some(dir) => Box::new(FilePayloadSource::new(dir)),
        None => Box::new(HttpPayloadSource::new()?),
    };

    let mut overlay = match args.seed {
        Some(seed) => WindOverlay::<TrailCanvas>::with_seed(options, seed)?,
        None => WindOverlay::<TrailCanvas>::new(options)?,
    };
    let mut map = SimulatedMap::new(LatLon::new(args.lat, args.lon), args.zoom, args.width, args.height);

    let plan = if args.still {
        SessionPlan::still(args.frames)
    } else {
        SessionPlan::scripted(args.frames, args.zoom, args.width, args.height)
    };

    let report = run_session(&mut overlay, &mut map, source.as_ref(), &plan).await?;

    if let LoadOutcome::Failed(err) = &report.outcome {
        error!(error = %err, "No wind field to render");
        overlay.on_remove(&mut map);
        bail!("wind overlay failed to load: {}", err);
    }

    write_snapshot(&overlay, &args.output).await?;
    overlay.on_remove(&mut map);

    info!(
        output = %args.output.display(),
        frames = report.frames_rendered,
        particles = report.particles,
        "Done"
    );
    Ok(())
}
