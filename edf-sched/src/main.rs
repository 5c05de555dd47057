/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tokio::sync::watch;
use tracing::{error, info, warn};

use edf_sched::config::SchedulerConfig;
use edf_sched::driver::TickDriver;
use edf_sched::indicator::LogIndicator;
use edf_sched::random::SplitMix64;
use edf_sched::runtime::TokioRuntime;
use edf_sched::scheduler::EdfScheduler;
use edf_sched::simulation::Simulation;
use edf_sched::trigger::{forward_lines, trigger_channel};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Tick-driven EDF scheduler.  Each button press admits one periodic task
/// with a random budget and period.
///
/// Example:
///   edf-sched --tick-ms 500 --capacity 3 run
///   edf-sched --seed 7 simulate --ticks 80 --trigger-at 0,4,9
#[derive(Debug, Parser)]
#[command(
    name = "edf-sched",
    about = "Tick-driven Earliest-Deadline-First scheduler",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML scheduler configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Tick length in milliseconds (overrides the file).
    #[arg(short = 't', long = "tick-ms")]
    tick_ms: Option<u64>,

    /// Maximum number of admitted tasks (overrides the file).
    #[arg(short = 'n', long = "capacity")]
    capacity: Option<usize>,

    /// Seed for the task parameter generator (overrides the file).
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run in real time.  Every line read from stdin is one button press.
    Run,

    /// Run a scripted simulation without sleeping and print the timeline.
    Simulate {
        /// Number of ticks to simulate.
        #[arg(long, default_value_t = 60)]
        ticks: u64,

        /// Ticks at which a button press arrives (comma separated).
        #[arg(long = "trigger-at", value_delimiter = ',', default_values_t = [0, 5, 10])]
        trigger_at: Vec<u64>,
    },
}

// ── Configuration ─────────────────────────────────────────────────────────────

fn load_config(cli: &Cli) -> anyhow::Result<SchedulerConfig> {
    let mut config = match &cli.config {
        Some(path) => SchedulerConfig::load_from_file(path)?,
        None => {
            warn!("No configuration file provided, using default scheduler settings");
            SchedulerConfig::default()
        }
    };

    if let Some(tick_ms) = cli.tick_ms {
        config.tick_ms = tick_ms;
    }
    if let Some(capacity) = cli.capacity {
        config.capacity = capacity;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.validate()?;
    Ok(config)
}

fn seeded_rng(config: &SchedulerConfig) -> SplitMix64 {
    let (rng, seed) = match config.seed {
        Some(seed) => (SplitMix64::new(seed), seed),
        None => SplitMix64::from_clock(),
    };
    info!(seed, "task parameter generator seeded");
    rng
}

// ── Modes ─────────────────────────────────────────────────────────────────────

async fn run_realtime(config: SchedulerConfig) {
    let scheduler = EdfScheduler::from_config(&config, seeded_rng(&config), LogIndicator);
    let (line, triggers) = trigger_channel(config.capacity, config.debounce());

    tokio::spawn(async move {
        info!("Press Enter to admit a task");
        if let Err(e) = forward_lines(BufReader::new(tokio::io::stdin()), line).await {
            error!("trigger input failed: {e}");
        }
    });

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, shutting down");
                let _ = stop_tx.send(true);
            }
            Err(e) => {
                error!("cannot listen for Ctrl-C: {e}");
                // Keep the sender alive so the driver keeps running.
                std::future::pending::<()>().await;
            }
        }
    });

    let driver = TickDriver::new(scheduler, TokioRuntime::new(config.tick_ms), triggers, &config);
    let (_scheduler, runtime) = driver.run(stop_rx).await;
    runtime.shutdown().await;
}

fn run_simulation(config: SchedulerConfig, ticks: u64, trigger_at: &[u64]) -> anyhow::Result<()> {
    let scheduler = EdfScheduler::from_config(&config, seeded_rng(&config), LogIndicator);
    let report = Simulation::new(scheduler, config.tick_ms).run(trigger_at, ticks)?;
    report.log();
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialise structured logging.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("EDF scheduler starting up...");

    // ── Parse CLI arguments ───────────────────────────────────────────────────
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            process::exit(1);
        }
    };

    info!(
        tick_ms     = config.tick_ms,
        capacity    = config.capacity,
        period_min  = config.period_min,
        period_max  = config.period_max,
        debounce_ms = config.debounce_ms,
        seed        = ?config.seed,
        "Configuration"
    );

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            run_realtime(config).await;
            // The stdin reader may still be parked in a blocking read.
            process::exit(0);
        }
        Command::Simulate { ticks, trigger_at } => {
            if let Err(e) = run_simulation(config, ticks, &trigger_at) {
                error!("Simulation failed: {:#}", e);
                process::exit(1);
            }
        }
    }
}
