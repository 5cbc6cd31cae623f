//! Pulse Display CLI
//!
//! Live heart-rate and workout timer for BLE chest straps.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use pulse_display::{
    config::Config,
    core::decode,
    display::{DisplaySink, TerminalDisplay},
    session::{Session, SessionError, SessionOutcome},
    stats::{create_shared_stats, SharedSessionStats},
    transport::{workout_script, SimulatedTransport, Transport},
    VERSION,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Address reported by the simulated sensor when none is configured.
const SIMULATED_ADDRESS: &str = "00:00:00:00:00:00";

/// Length of the simulated workout in seconds.
const SIMULATED_WORKOUT_SECS: u64 = 150;

#[derive(Parser)]
#[command(name = "pulse-display")]
#[command(version = VERSION)]
#[command(about = "Live heart-rate and workout timer for BLE chest straps", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the sensor and show heart rate until it disconnects
    Run {
        /// Bluetooth address of the sensor (overrides the config file)
        #[arg(long)]
        address: Option<String>,

        /// Replay a synthetic workout instead of using Bluetooth
        #[arg(long)]
        simulate: bool,

        /// Connection timeout in seconds
        #[arg(long)]
        connect_timeout: Option<u64>,

        /// Liveness poll interval in seconds
        #[arg(long)]
        poll_interval: Option<u64>,

        /// Don't show the connection status message
        #[arg(long)]
        no_status: bool,
    },

    /// Decode a single Heart Rate Measurement frame given as hex
    Decode {
        /// Frame bytes, e.g. `16:48` or `01 2c 01`
        frame: String,
    },

    /// Show configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            address,
            simulate,
            connect_timeout,
            poll_interval,
            no_status,
        } => cmd_run(address, simulate, connect_timeout, poll_interval, no_status),
        Commands::Decode { frame } => cmd_decode(&frame),
        Commands::Config => cmd_config(),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr so they don't interleave with the terminal display
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_run(
    address: Option<String>,
    simulate: bool,
    connect_timeout: Option<u64>,
    poll_interval: Option<u64>,
    no_status: bool,
) -> anyhow::Result<()> {
    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Could not load config, using defaults: {e}");
        Config::default()
    });

    if address.is_some() {
        config.sensor_address = address;
    }
    if let Some(secs) = connect_timeout {
        config.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = poll_interval {
        config.poll_interval = Duration::from_secs(secs);
    }
    if no_status {
        config.show_connection_status = false;
    }
    config.validate()?;

    let address = match (&config.sensor_address, simulate) {
        (Some(address), _) => address.clone(),
        (None, true) => SIMULATED_ADDRESS.to_string(),
        (None, false) => bail!(
            "no sensor address: pass --address or set sensor_address in {:?}",
            Config::config_path()
        ),
    };

    tracing::info!("Pulse Display v{VERSION}");
    tracing::info!(
        connect_timeout_secs = config.connect_timeout.as_secs(),
        poll_interval_secs = config.poll_interval.as_secs(),
        simulate,
        "starting"
    );

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    let stats = create_shared_stats();
    let display = TerminalDisplay::stdout();

    let result = if simulate {
        let transport =
            SimulatedTransport::new(workout_script(SIMULATED_WORKOUT_SECS)).paced(true);
        run_session(transport, display, config, &address, stats.clone(), running)
    } else {
        run_bluetooth(display, config, &address, stats.clone(), running)?
    };

    tracing::info!("{}", stats.summary());

    match result {
        Ok(SessionOutcome::Stopped) => Ok(()),
        Ok(SessionOutcome::Disconnected) => {
            tracing::info!("Sensor disconnected, exiting");
            Ok(())
        }
        Err(SessionError::Transport(e)) => Err(e).context("sensor connection failed"),
        Err(SessionError::Display(e)) => Err(e).context("display failed"),
    }
}

fn run_session<T: Transport, D: DisplaySink>(
    transport: T,
    display: D,
    config: Config,
    address: &str,
    stats: SharedSessionStats,
    running: Arc<AtomicBool>,
) -> Result<SessionOutcome, SessionError> {
    Session::new(transport, display, config)
        .with_stats(stats)
        .with_shutdown(running)
        .run(address)
}

#[cfg(feature = "ble")]
fn run_bluetooth<D: DisplaySink>(
    display: D,
    config: Config,
    address: &str,
    stats: SharedSessionStats,
    running: Arc<AtomicBool>,
) -> anyhow::Result<Result<SessionOutcome, SessionError>> {
    let transport = pulse_display::transport::BleTransport::new()
        .context("failed to initialise Bluetooth")?;
    Ok(run_session(transport, display, config, address, stats, running))
}

#[cfg(not(feature = "ble"))]
fn run_bluetooth<D: DisplaySink>(
    _display: D,
    _config: Config,
    _address: &str,
    _stats: SharedSessionStats,
    _running: Arc<AtomicBool>,
) -> anyhow::Result<Result<SessionOutcome, SessionError>> {
    bail!("built without Bluetooth support: rebuild with `--features ble` or use --simulate")
}

fn cmd_decode(frame: &str) -> anyhow::Result<()> {
    let cleaned: String = frame
        .chars()
        .filter(|c| !matches!(c, ':' | '-') && !c.is_whitespace())
        .collect();
    let bytes = hex::decode(&cleaned).with_context(|| format!("invalid hex frame {frame:?}"))?;

    let reading = decode(&bytes)?;
    let flags = reading.flags;

    println!("Heart rate: {} bpm", reading.value);
    println!("Flags: {:#010b}", flags.bits());
    println!("  Value format: {:?}", flags.value_format());
    println!(
        "  Sensor contact: {}",
        match flags.contact() {
            Some(true) => "detected",
            Some(false) => "not detected",
            None => "not supported",
        }
    );
    println!(
        "  Energy expended present: {}",
        flags.energy_expended_present()
    );
    println!("  RR-interval present: {}", flags.rr_interval_present());
    if !reading.has_signal() {
        println!("(no signal: would end an open workout)");
    }
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    let config = Config::load()?;

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
