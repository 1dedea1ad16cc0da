//! HIDIRT host bridge — entry point.
//!
//! Opens the HIDIRT USB infrared transceiver, executes the register requests
//! given on the command line and then, unless only requests were given,
//! listens for IR codes and turns them into key sequences and program
//! launches according to the configuration file.
//!
//! # Usage
//!
//! ```text
//! hidirt [OPTIONS]
//!
//! Options:
//!   -b, --control-pc [<V>]          Read/write control-PC enable (0x11)
//!   -i, --forward-ir [<V>]          Read/write forward-IR enable (0x12)
//!   -n, --power-on-code [<P,A,C,F>] Read/write power-on IR code (0x13)
//!   -f, --power-off-code [<P,A,C,F>]
//!   -r, --reset-code [<P,A,C,F>]
//!   -m, --min-repeats [<V>]
//!   -t, --device-time               Read the device clock (0x17)
//!   -d, --clock-deviation [<V>]
//!   -w, --wakeup-time [<V>]
//!   -s, --wakeup-time-span [<V>]
//!   -u, --bootloader [<V>]
//!   -e, --watchdog-enable [<V>]
//!   -a, --watchdog-reset [<V>]
//!   -x, --transmit <P,A,C,F>        Send an IR code
//!   -v, --verbose                   Show device details and stream IR codes
//!   -c, --config <PATH>             Configuration file
//! ```
//!
//! A register flag without a value reads the register and prints it; with a
//! value it writes.  Values are decimal or, if they contain an `x`,
//! hexadecimal.  IR codes are up to four fields separated by `,`, `;` or `-`.
//!
//! # Architecture overview
//!
//! ```text
//! HIDIRT transceiver  (USB HID feature + interrupt reports)
//!       ↕ hidapi
//! hidirt  ← this process
//!   application/    DeviceSession, register access, action execution, loop
//!   infrastructure/ hidapi transport, XTest + shell actuators, TOML config
//!       ↓
//! hidirt-core       report codec, register table, rule dispatch
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use hidirt_core::{Register, Settings};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use hidirt::application::device_session::{shutdown_channel, DeviceSession};
use hidirt::application::execute_actions::{ExecuteActionsUseCase, KeySequenceInjector};
use hidirt::application::register_access::{
    execute_request, read_device_details, transmit_ir_code, RegisterOutcome, RegisterRequest,
};
use hidirt::application::session_loop::{LoopConfig, SessionLoop};
use hidirt::infrastructure::actuators::{shell::ShellLauncher, KeyInjectionUnavailable};
use hidirt::infrastructure::device::usb_hid::HidapiConnector;
use hidirt::infrastructure::storage::config::{config_file_path, load_or_create_config};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Host bridge for the HIDIRT USB infrared transceiver.
///
/// `Option<Option<String>>` fields distinguish "flag absent" (`None`),
/// "flag without value" (`Some(None)`, a read) and "flag with value"
/// (`Some(Some(v))`, a write).
#[derive(Debug, Parser)]
#[command(
    name = "hidirt",
    about = "Turns IR remote control codes received by a HIDIRT transceiver into key sequences and program launches",
    version
)]
struct Cli {
    /// Control-PC enable register; writes V if given.
    #[arg(short = 'b', long, value_name = "V")]
    control_pc: Option<Option<String>>,

    /// Forward-IR enable register; writes V if given.
    #[arg(short = 'i', long, value_name = "V")]
    forward_ir: Option<Option<String>>,

    /// IR code that powers the PC on.
    #[arg(short = 'n', long, value_name = "P,A,C,F")]
    power_on_code: Option<Option<String>>,

    /// IR code that powers the PC off.
    #[arg(short = 'f', long, value_name = "P,A,C,F")]
    power_off_code: Option<Option<String>>,

    /// IR code that resets the PC.
    #[arg(short = 'r', long, value_name = "P,A,C,F")]
    reset_code: Option<Option<String>>,

    /// Minimum number of repeats before a power code is accepted.
    #[arg(short = 'm', long, value_name = "V")]
    min_repeats: Option<Option<String>>,

    /// Device clock (read only).
    #[arg(short = 't', long, value_name = "V")]
    device_time: Option<Option<String>>,

    /// Clock deviation correction.
    #[arg(short = 'd', long, value_name = "V", allow_negative_numbers = true)]
    clock_deviation: Option<Option<String>>,

    /// Wakeup time.
    #[arg(short = 'w', long, value_name = "V", allow_negative_numbers = true)]
    wakeup_time: Option<Option<String>>,

    /// Wakeup time span.
    #[arg(short = 's', long, value_name = "V", allow_negative_numbers = true)]
    wakeup_time_span: Option<Option<String>>,

    /// Bootloader request register.
    #[arg(short = 'u', long, value_name = "V")]
    bootloader: Option<Option<String>>,

    /// Watchdog enable register.
    #[arg(short = 'e', long, value_name = "V")]
    watchdog_enable: Option<Option<String>>,

    /// Watchdog reset register.
    #[arg(short = 'a', long, value_name = "V")]
    watchdog_reset: Option<Option<String>>,

    /// Sends an IR code through the transceiver.
    #[arg(short = 'x', long, value_name = "P,A,C,F")]
    transmit: Option<String>,

    /// Shows device details and prints every received IR code.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Configuration file [default: platform config directory].
    #[arg(short = 'c', long, value_name = "PATH", env = "HIDIRT_CONFIG")]
    config: Option<PathBuf>,
}

/// One command-line request, executed before the session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CliRequest {
    Register(RegisterRequest),
    Transmit(String),
}

impl Cli {
    /// Collects the requests in the order they are executed.
    fn requests(&self) -> Vec<CliRequest> {
        let registers = [
            (Register::ControlPcEnable, &self.control_pc),
            (Register::ForwardIrEnable, &self.forward_ir),
            (Register::PowerOnCode, &self.power_on_code),
            (Register::PowerOffCode, &self.power_off_code),
            (Register::ResetCode, &self.reset_code),
            (Register::MinRepeats, &self.min_repeats),
            (Register::DeviceTime, &self.device_time),
            (Register::ClockDeviation, &self.clock_deviation),
            (Register::WakeupTime, &self.wakeup_time),
            (Register::WakeupTimeSpan, &self.wakeup_time_span),
            (Register::RequestBootloader, &self.bootloader),
            (Register::WatchdogEnable, &self.watchdog_enable),
            (Register::WatchdogReset, &self.watchdog_reset),
        ];

        let mut requests: Vec<CliRequest> = registers
            .into_iter()
            .filter_map(|(register, flag)| {
                flag.as_ref().map(|value| {
                    CliRequest::Register(RegisterRequest {
                        register,
                        value: value.clone(),
                    })
                })
            })
            .collect();
        if let Some(code) = &self.transmit {
            requests.push(CliRequest::Transmit(code.clone()));
        }
        requests
    }

    /// The session loop runs when nothing else was asked for, or in verbose
    /// mode.
    fn runs_session_loop(&self, requests: &[CliRequest]) -> bool {
        requests.is_empty() || self.verbose
    }
}

// ── Request execution ─────────────────────────────────────────────────────────

/// Executes one request and prints its result.  Failures are logged and do
/// not stop later requests.
fn run_request(session: &mut DeviceSession, request: &CliRequest) {
    match request {
        CliRequest::Register(request) => match execute_request(session, request) {
            Ok(RegisterOutcome::Read(value)) => println!("{value}"),
            Ok(RegisterOutcome::Written(value)) => info!("{} set to {value}", request.register),
            Ok(RegisterOutcome::NotSupported(register)) => {
                warn!("writing {register} is not supported")
            }
            Err(e) => error!("{}: {e}", request.register),
        },
        CliRequest::Transmit(text) => match transmit_ir_code(session, text) {
            Ok(code) => info!("transmitted IR code {code}"),
            Err(e) => error!("transmitting IR code {text:?} failed: {e}"),
        },
    }
}

fn print_device_details(session: &mut DeviceSession) {
    match read_device_details(session) {
        Ok(details) => {
            let unknown = || "(unknown)".to_string();
            println!("Firmware version: {}", details.firmware_version);
            println!("Manufacturer:     {}", details.description.manufacturer.unwrap_or_else(unknown));
            println!("Product:          {}", details.description.product.unwrap_or_else(unknown));
            println!("Serial number:    {}", details.description.serial_number.unwrap_or_else(unknown));
        }
        Err(e) => error!("reading device details failed: {e}"),
    }
}

/// Connects the key injector for the session loop.
///
/// Without an X display the loop still runs when key sending is switched
/// off; every key action then fails with the connection error.
#[cfg(target_os = "linux")]
fn key_injector(settings: &Settings) -> anyhow::Result<Arc<dyn KeySequenceInjector>> {
    use hidirt::infrastructure::actuators::xtest::X11KeySequenceInjector;

    match X11KeySequenceInjector::open() {
        Ok(injector) => Ok(Arc::new(injector)),
        Err(e) if settings.send_keys => Err(e).context("key sending is enabled but the X display is unavailable"),
        Err(e) => {
            warn!("{e}; key sequences cannot be sent");
            Ok(Arc::new(KeyInjectionUnavailable::new(e.to_string())))
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn key_injector(settings: &Settings) -> anyhow::Result<Arc<dyn KeySequenceInjector>> {
    if settings.send_keys {
        warn!("key sending is only supported on X11; key rules will fail");
    }
    Ok(Arc::new(KeyInjectionUnavailable::new("key sending requires X11")))
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. CLI arguments are parsed with `clap` into a [`Cli`] struct.
/// 2. `tracing_subscriber` is initialised; log lines go to stderr so stdout
///    only carries register values and streamed IR codes.
/// 3. The configuration file is loaded (and created on first run).
/// 4. The device is opened.  A missing device is fatal.
/// 5. Register requests run in table order, then the session loop runs until
///    Ctrl+C.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ─────────────────────────────────────────────────────────
    let default_filter = if cli.verbose { "info,hidirt=debug,hidirt_core=debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => config_file_path().context("no configuration file location")?,
    };
    let config = load_or_create_config(&config_path)
        .with_context(|| format!("could not load configuration from {}", config_path.display()))?;

    // ── Device ────────────────────────────────────────────────────────────────
    let connector = HidapiConnector::new(config.device.vendor_id, config.device.product_id)?;
    let mut session = DeviceSession::open(Box::new(connector)).context("could not open the HIDIRT device")?;

    // ── Graceful shutdown flag ────────────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    // ── One-shot requests ─────────────────────────────────────────────────────
    if cli.verbose {
        print_device_details(&mut session);
    }
    let requests = cli.requests();
    for request in &requests {
        run_request(&mut session, request);
    }

    // ── Session loop ──────────────────────────────────────────────────────────
    if cli.runs_session_loop(&requests) {
        let actions = ExecuteActionsUseCase::new(key_injector(&config.settings)?, Arc::new(ShellLauncher));
        let loop_config = LoopConfig {
            poll_interval: config.device.poll_interval(),
            reconnect_interval: config.device.reconnect_interval(),
            echo_codes: cli.verbose,
        };
        let summary = SessionLoop::new(&mut session, &config.mappings, &config.settings, &actions, loop_config)
            .run(shutdown_rx)
            .await;
        info!(
            "received {} IR codes, executed {} actions, reconnected {} times",
            summary.codes_received, summary.actions_executed, summary.reconnects
        );
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_means_no_requests_and_loop_runs() {
        // Arrange
        let cli = Cli::parse_from(["hidirt"]);

        // Act
        let requests = cli.requests();

        // Assert
        assert!(requests.is_empty());
        assert!(cli.runs_session_loop(&requests));
    }

    #[test]
    fn test_flag_without_value_is_read() {
        let cli = Cli::parse_from(["hidirt", "-m"]);
        assert_eq!(
            cli.requests(),
            vec![CliRequest::Register(RegisterRequest::read(Register::MinRepeats))]
        );
    }

    #[test]
    fn test_flag_with_value_is_write() {
        let cli = Cli::parse_from(["hidirt", "--min-repeats", "0x03"]);
        assert_eq!(
            cli.requests(),
            vec![CliRequest::Register(RegisterRequest::write(Register::MinRepeats, "0x03"))]
        );
    }

    #[test]
    fn test_attached_short_value_is_write() {
        let cli = Cli::parse_from(["hidirt", "-b1"]);
        assert_eq!(
            cli.requests(),
            vec![CliRequest::Register(RegisterRequest::write(Register::ControlPcEnable, "1"))]
        );
    }

    #[test]
    fn test_negative_signed_value_is_accepted() {
        let cli = Cli::parse_from(["hidirt", "-d", "-2"]);
        assert_eq!(
            cli.requests(),
            vec![CliRequest::Register(RegisterRequest::write(Register::ClockDeviation, "-2"))]
        );
    }

    #[test]
    fn test_requests_follow_table_order_not_argument_order() {
        // Arrange: flags given in reverse table order
        let cli = Cli::parse_from(["hidirt", "-x", "1,2,3", "-a", "-t", "-b"]);

        // Act
        let registers: Vec<CliRequest> = cli.requests();

        // Assert
        assert_eq!(
            registers,
            vec![
                CliRequest::Register(RegisterRequest::read(Register::ControlPcEnable)),
                CliRequest::Register(RegisterRequest::read(Register::DeviceTime)),
                CliRequest::Register(RegisterRequest::read(Register::WatchdogReset)),
                CliRequest::Transmit("1,2,3".to_string()),
            ]
        );
    }

    #[test]
    fn test_requests_alone_skip_loop() {
        let cli = Cli::parse_from(["hidirt", "-t"]);
        assert!(!cli.runs_session_loop(&cli.requests()));
    }

    #[test]
    fn test_verbose_runs_loop_after_requests() {
        let cli = Cli::parse_from(["hidirt", "-t", "-v"]);
        assert!(cli.runs_session_loop(&cli.requests()));
    }

    #[test]
    fn test_config_override() {
        let cli = Cli::parse_from(["hidirt", "--config", "/tmp/hidirt.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/hidirt.toml")));
    }
}
