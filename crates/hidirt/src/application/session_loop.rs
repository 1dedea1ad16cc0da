//! The session loop: poll for IR codes, dispatch them, execute the actions.
//!
//! # What happens every tick? (for beginners)
//!
//! ```text
//!   sleep(poll_interval)  ──shutdown?──► stop
//!         │
//!         ▼
//!   poll_interrupt() ── no data ─────────────► next tick
//!         │ report
//!         ▼
//!   decode_interrupt() ── unknown id ─► log ─► next tick
//!         │ IrCode
//!         ▼
//!   dispatch(code, rules, settings) ─► execute(actions) ─► next tick
//! ```
//!
//! A failed interrupt read means the transceiver was unplugged.  The loop
//! then hands over to [`DeviceSession::reconnect`] and resumes polling once
//! the device is back.  Shutdown is observed both while sleeping between
//! polls and while waiting between reconnection attempts.
//!
//! IR codes are handled strictly one at a time: actions for one code are
//! finished before the next interrupt report is read.

use std::io::Write;
use std::time::Duration;

use hidirt_core::{decode_interrupt, dispatch, CodecError, MappingRule, Settings};
use tracing::{debug, info, warn};

use super::device_session::{shutdown_requested, DeviceError, DeviceSession, ShutdownSignal};
use super::execute_actions::ExecuteActionsUseCase;

/// Timing and output options of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Pause between interrupt reads.
    pub poll_interval: Duration,
    /// Pause between reconnection attempts.
    pub reconnect_interval: Duration,
    /// Print every received IR code, one `0x..,0x....,0x....,0x..` line
    /// per code.
    pub echo_codes: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(25),
            reconnect_interval: Duration::from_millis(500),
            echo_codes: false,
        }
    }
}

/// What a finished loop did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Interrupt reports decoded as IR codes.
    pub codes_received: u64,
    /// Actions that completed successfully.
    pub actions_executed: u64,
    /// Successful reconnections.
    pub reconnects: u32,
    /// Failed open attempts across all reconnections.
    pub failed_reconnect_attempts: u32,
}

/// Drives one [`DeviceSession`] until shutdown.
pub struct SessionLoop<'a> {
    session: &'a mut DeviceSession,
    rules: &'a [MappingRule],
    settings: &'a Settings,
    actions: &'a ExecuteActionsUseCase,
    config: LoopConfig,
    echo: Box<dyn Write + Send + 'a>,
}

impl<'a> SessionLoop<'a> {
    pub fn new(
        session: &'a mut DeviceSession,
        rules: &'a [MappingRule],
        settings: &'a Settings,
        actions: &'a ExecuteActionsUseCase,
        config: LoopConfig,
    ) -> Self {
        Self {
            session,
            rules,
            settings,
            actions,
            config,
            echo: Box::new(std::io::stdout()),
        }
    }

    /// Writes echoed IR codes to `out` instead of stdout.
    pub fn with_echo_output(mut self, out: impl Write + Send + 'a) -> Self {
        self.echo = Box::new(out);
        self
    }

    /// Runs until `shutdown` fires.
    pub async fn run(mut self, mut shutdown: ShutdownSignal) -> LoopSummary {
        let mut summary = LoopSummary::default();
        info!(
            "listening for IR codes ({} rules, poll every {:?})",
            self.rules.len(),
            self.config.poll_interval
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => break,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }

            match self.session.poll_interrupt() {
                Ok(None) => {}
                Ok(Some(report)) => self.handle_report(&report, &mut summary).await,
                Err(DeviceError::Disconnected) => {
                    match self
                        .session
                        .reconnect(self.config.reconnect_interval, &mut shutdown)
                        .await
                    {
                        Ok(failed) => {
                            summary.reconnects += 1;
                            summary.failed_reconnect_attempts += failed;
                        }
                        Err(DeviceError::Cancelled) => break,
                        Err(e) => warn!("reconnection failed: {e}"),
                    }
                }
                Err(e) => warn!("interrupt read failed: {e}"),
            }
        }

        info!("session loop stopped");
        summary
    }

    async fn handle_report(&mut self, report: &[u8], summary: &mut LoopSummary) {
        let code = match decode_interrupt(report) {
            Ok(code) => code,
            Err(CodecError::UnknownReport(id)) => {
                warn!("ignoring report with unknown identifier 0x{id:02x}");
                return;
            }
            Err(e) => {
                warn!("ignoring malformed interrupt report: {e}");
                return;
            }
        };
        summary.codes_received += 1;

        if self.config.echo_codes {
            if let Err(e) = writeln!(self.echo, "{code}").and_then(|()| self.echo.flush()) {
                warn!("failed to echo IR code {code}: {e}");
            }
        }

        let actions = dispatch(&code, self.rules, self.settings);
        if actions.is_empty() {
            debug!("no rule matches IR code {code}");
            return;
        }
        summary.actions_executed += self.actions.execute(&actions).await as u64;
    }
}
