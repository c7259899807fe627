// ldrlab - LED and LDR color detector exercises
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use clap::{Parser, Subcommand};
use ldrlab_config::{LabConfig, NamedTarget, TargetSpec};
use ldrlab_core::color::{Detection, ReflectionSample};
use ldrlab_core::detector::{compensate, Classifier, ColorDetector};
use ldrlab_core::metrics::DetectionMetrics;
use ldrlab_core::programs::{Program, ProgramKind};
use ldrlab_core::system::SimBoard;
use ldrlab_core::{DetectorObserver, PinId};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

mod vcd_trace;

const EXIT_PASS: u8 = 0;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

const SNAPSHOT_SCHEMA_VERSION: &str = "1.0";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "LED and LDR color detector on a simulated PIC18 board",
    long_about = None
)]
struct Cli {
    /// Enable debug-level logging on stderr
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a program on the simulated board for a number of cycles.
    Run(RunArgs),

    /// Classify one set of raw readings without running the board.
    Classify(ClassifyArgs),

    /// Load and validate a configuration file.
    CheckConfig(CheckConfigArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// color-detector, blink, counter or patterns
    #[arg(short, long, default_value = "color-detector")]
    program: ProgramKind,

    /// Path to the lab configuration (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Main-loop iterations to run after start-up
    #[arg(long, default_value = "1")]
    cycles: u64,

    /// Override the target placed in front of the sensor
    #[arg(long)]
    target: Option<NamedTarget>,

    /// Skip the detector's indicator start-up sequence
    #[arg(long)]
    no_startup: bool,

    /// Write the output pin waveform as VCD
    #[arg(long)]
    vcd: Option<PathBuf>,

    /// Write the final board state as JSON
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Print each detection as a JSON line on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ClassifyArgs {
    /// Raw reading with the red LED lit
    #[arg(long)]
    red: u16,

    /// Raw reading with the green LED lit
    #[arg(long)]
    green: u16,

    /// Raw reading with the blue LED lit
    #[arg(long)]
    blue: u16,

    /// Raw reading with every LED off
    #[arg(long, default_value = "0")]
    ambient: u16,

    /// Take thresholds from this configuration instead of the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct CheckConfigArgs {
    #[arg(short, long)]
    config: PathBuf,
}

/// Prints every detection as one JSON line.
#[derive(Debug, Default)]
struct JsonReporter;

impl DetectorObserver for JsonReporter {
    fn on_detection(&self, detection: &Detection) {
        match serde_json::to_string(detection) {
            Ok(line) => println!("{}", line),
            Err(e) => error!("Failed to encode detection: {}", e),
        }
    }
}

#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    status: &'static str,
    program: &'static str,
    cycles: u64,
    virtual_time_us: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<ldrlab_core::metrics::MetricsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vcd: Option<&'a Path>,
}

#[derive(Debug, Serialize)]
struct Snapshot {
    snapshot_schema_version: String,
    program: &'static str,
    cycles: u64,
    board: serde_json::Value,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout is reserved for results
    let level = if cli.trace {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => run_program(args),
        Commands::Classify(args) => run_classify(args),
        Commands::CheckConfig(args) => run_check_config(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<LabConfig> {
    match path {
        Some(path) => LabConfig::from_file(path),
        None => Ok(LabConfig::default()),
    }
}

fn run_program(args: RunArgs) -> ExitCode {
    let mut config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };
    if let Some(target) = args.target {
        config.scene.target = TargetSpec::Named(target);
    }
    if args.no_startup {
        config.detector.startup_sequence = false;
    }

    let mut board = match SimBoard::from_config(&config) {
        Ok(board) => board,
        Err(e) => {
            error!("Failed to set up the board: {}", e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    };
    if args.vcd.is_none() {
        *board.trace_mut() = ldrlab_core::signals::SignalTrace::disabled();
    }

    let metrics = Arc::new(DetectionMetrics::new());
    let mut program: Box<dyn Program<SimBoard>> = match args.program {
        ProgramKind::ColorDetector => {
            let mut detector = ColorDetector::new(&config).with_observer(metrics.clone());
            if args.json {
                detector = detector.with_observer(Arc::new(JsonReporter));
            }
            Box::new(detector)
        }
        other => other.build::<SimBoard>(&config),
    };

    info!("Running {} for {} cycle(s)", program.name(), args.cycles);
    program.start(&mut board);
    for _ in 0..args.cycles {
        program.run_cycle(&mut board);
    }

    if let Some(path) = &args.vcd {
        let pins = output_pins(&config);
        let trace = board.take_trace();
        if let Err(e) = vcd_trace::write_vcd(path, &trace, &pins, board.now_us()) {
            error!("{:#}", e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
        info!("VCD written to {:?}", path);
    }

    if let Some(path) = &args.snapshot {
        let snapshot = Snapshot {
            snapshot_schema_version: SNAPSHOT_SCHEMA_VERSION.to_string(),
            program: program.name(),
            cycles: args.cycles,
            board: board.snapshot(),
        };
        if let Err(e) = write_json(path, &snapshot) {
            error!("{:#}", e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    }

    let summary = RunSummary {
        status: "finished",
        program: program.name(),
        cycles: args.cycles,
        virtual_time_us: board.now_us(),
        metrics: (args.program == ProgramKind::ColorDetector).then(|| metrics.summary()),
        vcd: args.vcd.as_deref(),
    };
    match serde_json::to_string(&summary) {
        Ok(line) => println!("{}", line),
        Err(e) => {
            error!("Failed to encode summary: {}", e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    }
    ExitCode::from(EXIT_PASS)
}

fn output_pins(config: &LabConfig) -> Vec<PinId> {
    let pins = &config.pins;
    pins.illumination
        .all()
        .into_iter()
        .chain(pins.indicators.all())
        .chain(pins.led_bank.iter().copied())
        .collect()
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    use anyhow::Context;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create snapshot parent dir {:?}", parent))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create snapshot {:?}", path))?;
    serde_json::to_writer_pretty(file, value)
        .with_context(|| format!("Failed to write snapshot {:?}", path))?;
    Ok(())
}

fn run_classify(args: ClassifyArgs) -> ExitCode {
    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let sample = ReflectionSample {
        ambient: args.ambient,
        red: args.red,
        green: args.green,
        blue: args.blue,
    };
    let compensated = compensate(sample);
    let label = Classifier::new(&config.detector).classify(compensated);

    if args.json {
        let detection = Detection {
            cycle: 0,
            sample,
            compensated,
            label,
        };
        match serde_json::to_string(&detection) {
            Ok(line) => println!("{}", line),
            Err(e) => {
                error!("Failed to encode detection: {}", e);
                return ExitCode::from(EXIT_RUNTIME_ERROR);
            }
        }
    } else {
        println!(
            "{} (compensated red={} green={} blue={})",
            label, compensated.red, compensated.green, compensated.blue
        );
    }
    ExitCode::from(EXIT_PASS)
}

fn run_check_config(args: CheckConfigArgs) -> ExitCode {
    match LabConfig::from_file(&args.config) {
        Ok(config) => {
            println!(
                "{}: ok (target {:?}, adc {} bits)",
                args.config.display(),
                config.scene.target,
                config.adc.resolution_bits
            );
            ExitCode::from(EXIT_PASS)
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{}: {:#}", args.config.display(), e);
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}
