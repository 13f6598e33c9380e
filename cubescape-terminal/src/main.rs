//! cubescape - rotating ASCII cubes in the terminal
//!
//! Controls (fullscreen mode):
//!   - Q / Esc / Ctrl-C: Quit

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context as _;
use clap::Parser;
use cubescape_core::{FrameDriver, RenderConfig, StopToken};
use cubescape_terminal::{OutputMode, TerminalApp};

#[derive(Parser, Debug)]
#[command(name = "cubescape", version, about = "Rotating ASCII cubes in the terminal")]
struct Cli {
    /// Scene/screen configuration JSON. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frame width in columns.
    #[arg(long)]
    width: Option<usize>,

    /// Frame height in rows.
    #[arg(long)]
    height: Option<usize>,

    /// Camera distance from the cube centers.
    #[arg(long)]
    distance: Option<f32>,

    /// Perspective scale.
    #[arg(long)]
    perspective: Option<f32>,

    /// Glyph for empty cells.
    #[arg(long)]
    background: Option<char>,

    /// Sample spacing along each face, for every cube.
    #[arg(long)]
    step: Option<f32>,

    /// Minimum milliseconds per frame (0 = uncapped).
    #[arg(long = "delay-ms")]
    delay_ms: Option<u64>,

    /// Snap sample coordinates to whole numbers before rotating.
    #[arg(long)]
    truncate_samples: bool,

    /// Stop after this many frames.
    #[arg(long)]
    frames: Option<u64>,

    /// Draw on the normal screen instead of taking over the terminal.
    #[arg(long)]
    plain: bool,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    dump_config: bool,

    /// Write logs to this file (stdout is the display).
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path, cli.verbose)?;
    }

    let config = build_config(&cli)?;

    if cli.dump_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    let driver = FrameDriver::new(config).context("build frame driver")?;
    let mode = if cli.plain {
        OutputMode::Plain
    } else {
        OutputMode::Fullscreen
    };

    let mut app = TerminalApp::new(driver, mode).with_frame_limit(cli.frames);
    install_stop_signals(app.stop_token())?;

    let result = app.run();
    tracing::info!(frames = app.frames_drawn(), "frame loop stopped");
    result
}

/// Stops the frame loop on SIGINT, SIGTERM or SIGHUP so teardown still
/// runs. Raw mode turns Ctrl-C into a key press instead, which the loop
/// handles itself.
#[cfg(unix)]
fn install_stop_signals(stop: StopToken) -> anyhow::Result<()> {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("install signal handlers")?;
    std::thread::Builder::new()
        .name("cubescape-signals".into())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                tracing::debug!(signal, "stop signal received");
                stop.stop();
            }
        })
        .context("spawn signal thread")?;
    Ok(())
}

#[cfg(not(unix))]
fn install_stop_signals(_stop: StopToken) -> anyhow::Result<()> {
    Ok(())
}

fn init_logging(path: &Path, verbose: bool) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("create log file '{}'", path.display()))?;
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn read_config(path: &Path) -> anyhow::Result<RenderConfig> {
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let config = RenderConfig::from_json_reader(BufReader::new(f))
        .with_context(|| format!("parse config '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

fn build_config(cli: &Cli) -> anyhow::Result<RenderConfig> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => RenderConfig::default(),
    };

    if let Some(width) = cli.width {
        config.width = width;
    }
    if let Some(height) = cli.height {
        config.height = height;
    }
    if let Some(distance) = cli.distance {
        config.camera_distance = distance;
    }
    if let Some(perspective) = cli.perspective {
        config.perspective = perspective;
    }
    if let Some(background) = cli.background {
        config.background = background;
    }
    if let Some(step) = cli.step {
        config.set_sample_step(step);
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.frame_delay_ms = delay_ms;
    }
    if cli.truncate_samples {
        config.truncate_samples = true;
    }

    config.validate().context("command-line overrides")?;
    Ok(config)
}
