//! # Vapor Control Unit
//!
//! Deterministic control loop for the vapor process rig: simulated
//! plant, safety supervision, ESD sequencing, operator input and
//! telemetry, all advanced on one fixed-period tick.
//!
//! Configuration is a single TOML file; every section is optional and
//! falls back to the shipped defaults. `--scenario` replays a scripted
//! operator input tape and `--ticks` bounds the run, which together
//! make unattended rig sessions reproducible.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use vapor_common::config::VaporConfig;
use vapor_common::io::InputSource;
use vapor_common::telemetry::Announcement;
use vapor_control_unit::config::load_config;
use vapor_control_unit::cycle::{rt_setup, CycleRunner, Ports};
use vapor_hal::{
    NullOperator, ScriptedOperator, SerialLineSink, SimulatedPlant, TracingActuator,
    TracingIndicator, UdpFeedPublisher,
};

/// Vapor Control Unit — deterministic process control loop
#[derive(Parser, Debug)]
#[command(name = "vapor_control_unit")]
#[command(author = "VaporSur Controls")]
#[command(version)]
#[command(about = "Deterministic control loop for the vapor process rig")]
struct Args {
    /// Path to the configuration TOML. Defaults apply when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Scripted operator input tape (TOML) to replay against the rig.
    #[arg(long, value_name = "FILE")]
    scenario: Option<PathBuf>,

    /// Stop after this many ticks (default: run until interrupted).
    #[arg(long)]
    ticks: Option<u64>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!(
        "Vapor Control Unit v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Vapor Control Unit shutdown complete");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match args.config {
        Some(ref path) => {
            info!("Loading config from {}", path.display());
            load_config(path)?
        }
        None => {
            info!("No config file given; using defaults");
            VaporConfig::default()
        }
    };

    info!(
        "Config OK: tick_period={}ms, publish_interval={} ticks",
        config.control.tick_period_ms, config.control.publish_interval_ticks
    );

    // RT setup (mlockall, prefault, affinity, scheduler).
    rt_setup(config.control.cpu_core, config.control.rt_priority)?;
    info!(
        "RT setup complete (cpu_core={}, priority={})",
        config.control.cpu_core, config.control.rt_priority
    );

    let inputs: Box<dyn InputSource> = match args.scenario {
        Some(ref path) => {
            info!("Replaying operator scenario from {}", path.display());
            Box::new(ScriptedOperator::load(path)?)
        }
        None => Box::new(NullOperator),
    };

    let ports = Ports {
        plant: Box::new(SimulatedPlant::new(&config.plant)),
        inputs,
        actuators: Box::new(TracingActuator::default()),
        indicator: Box::new(TracingIndicator::default()),
        serial: Box::new(SerialLineSink::open(&config.telemetry.serial_path)?),
        publisher: Box::new(UdpFeedPublisher::connect(&config.telemetry.uplink_addr)?),
    };

    let announcement = Announcement::new(&config.telemetry.device_name, env!("CARGO_PKG_VERSION"));
    let mut runner = CycleRunner::new(&config, ports, announcement);
    runner.set_tick_limit(args.ticks);
    info!("CycleRunner initialized, entering control loop");

    // Signal handler for graceful shutdown.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    if let Err(e) = runner.run(&running) {
        error!("Control loop error: {e}");
        return Err(Box::new(e) as Box<dyn std::error::Error>);
    }

    let stats = &runner.stats;
    let min_ns = if stats.cycle_count == 0 {
        0
    } else {
        stats.min_cycle_ns
    };
    info!(
        "Timing: {} cycles, avg={}ns, min={}ns, max={}ns, stddev={}ns, max_latency={}ns, overruns={}",
        stats.cycle_count,
        stats.avg_cycle_ns(),
        min_ns,
        stats.max_cycle_ns,
        stats.stddev_cycle_ns(),
        stats.max_latency_ns,
        stats.overruns,
    );

    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
