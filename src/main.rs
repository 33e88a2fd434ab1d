//! pixel-layout: series placement and daisy-chain routing of addressable LEDs
//!
//! Opens a board document, applies the requested clean-up, drawing and
//! layout steps, and saves it back (keeping a `.layoutbak` backup).

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use pixel_layout::board::{Board, FootprintLibrary};
use pixel_layout::config::{self, Config};
use pixel_layout::layout::{
    CircleSpec, LayoutJob, LayoutPlan, LayoutResult, LayoutRun, PixelSource, PolygonSpec,
    RunOptions,
};

/// Series placement and daisy-chain routing of addressable LED footprints.
///
/// Steps run in a fixed order: delete traces, delete drawings, delete short
/// traces, draw polygon, draw circle, layout, hide labels. The board is
/// then saved unless `--dry-run` is given.
#[derive(Parser, Debug)]
#[command(name = "pixel-layout")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Board document to modify
    #[arg(short = 'p', long, value_name = "BOARD")]
    path: PathBuf,

    /// Path to configuration file
    #[arg(long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Placement plan to lay out
    #[arg(long, value_name = "PLAN_FILE")]
    plan: Option<PathBuf>,

    /// Replace the pixel layout with the one described by --plan
    #[arg(short = 'L', long, requires = "plan")]
    do_layout: bool,

    /// Draw a regular polygon around the origin: "sides,radius,layer"
    #[arg(long, value_name = "SPEC")]
    draw_poly: Option<String>,

    /// Draw a circle around the origin: "radius,layer"
    #[arg(long, value_name = "SPEC")]
    draw_circle: Option<String>,

    /// Delete all tracks and vias
    #[arg(long)]
    delete_all_traces: bool,

    /// Delete all graphic drawings
    #[arg(long)]
    delete_all_drawings: bool,

    /// Delete short traces (refused: it would also remove vias)
    #[arg(long)]
    delete_short_traces: bool,

    /// Hide the reference labels of all pixels
    #[arg(long)]
    hide_pixel_labels: bool,

    /// Place pixels without routing tracks or vias
    #[arg(long)]
    skip_traces: bool,

    /// Do everything except saving the board
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolves the footprint library relative to the board's directory.
fn library_dir(board_path: &Path, library: &Path) -> PathBuf {
    if library.is_absolute() {
        return library.to_path_buf();
    }
    board_path
        .parent()
        .map_or_else(|| library.to_path_buf(), |dir| dir.join(library))
}

/// Builds the run options, loading the plan and parsing the polygon first.
fn run_options(args: &Args, cfg: &Config) -> LayoutResult<RunOptions> {
    let polygon = args
        .draw_poly
        .as_deref()
        .map(str::parse::<PolygonSpec>)
        .transpose()?;
    let circle = args
        .draw_circle
        .as_deref()
        .map(str::parse::<CircleSpec>)
        .transpose()?;
    let layout = match (&args.plan, args.do_layout) {
        (Some(plan), true) => {
            let plan = LayoutPlan::load(plan)?;
            let library = FootprintLibrary::open(library_dir(&args.path, &cfg.pixel.library))?;
            Some(LayoutJob {
                plan,
                source: PixelSource::Library {
                    library,
                    name: cfg.pixel.footprint.clone(),
                },
            })
        }
        _ => None,
    };

    Ok(RunOptions {
        delete_all_traces: args.delete_all_traces,
        delete_all_drawings: args.delete_all_drawings,
        delete_short_traces: args.delete_short_traces,
        polygon,
        circle,
        layout,
        hide_pixel_labels: args.hide_pixel_labels,
    })
}

fn run(args: &Args, cfg: &Config) -> LayoutResult<()> {
    let options = run_options(args, cfg)?;

    let mut board = Board::open(&args.path)?;
    info!(
        path = %args.path.display(),
        footprints = board.footprints().len(),
        tracks = board.tracks().len(),
        "Opened board"
    );

    let report = LayoutRun::new(cfg).execute(&mut board, &options)?;
    info!(?report, "Run complete");

    if args.dry_run {
        info!("Dry run, board not saved");
    } else {
        board.save(&args.path)?;
    }
    Ok(())
}

/// Entry point for pixel-layout.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let mut cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nConfig was read from: {}", default_path.display());
                }
            }
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    if args.skip_traces {
        cfg.routing.enabled = false;
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Starting pixel-layout");

    match run(&args, &cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Layout failed");
            let mut source = e.source();
            while let Some(cause) = source {
                error!(cause = %cause, "Caused by");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
