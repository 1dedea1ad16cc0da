//! DeviceSession: exclusive owner of the device handle and its connectivity.
//!
//! The session hides the USB HID transport behind two seams so the state
//! machine can be tested without hardware:
//!
//! - [`HidTransport`]: one open device handle (feature report get/set,
//!   interrupt read, output report write).
//! - [`DeviceConnector`]: locates the device by vendor/product id and opens
//!   a fresh handle; used at startup and by the reconnection loop.
//!
//! The hidapi-backed implementations live in the infrastructure layer.
//!
//! # Connectivity state machine
//!
//! ```text
//!            open() ok
//!   start ───────────────► Connected ◄─────────────┐
//!                              │                   │ open() ok
//!              read() failed   │                   │
//!                              ▼                   │
//!                        Disconnected ──────► Reconnecting ──┐
//!                       (handle closed)           ▲          │ open() failed,
//!                                                 └──────────┘ wait interval
//! ```
//!
//! Reconnection retries forever at a fixed interval.  The only way out other
//! than success is the shutdown signal, which interrupts the wait.
//!
//! Feature report failures are *not* treated as disconnection: they fail the
//! single transaction and leave the session connected.  Only a failed
//! interrupt read (hidapi reports a negative length) means the device is gone.

use std::time::Duration;

use hidirt_core::protocol::registers::MAX_FEATURE_REPORT_LEN;
use hidirt_core::{CodecError, Register};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Receiving side of the process-wide shutdown flag.
pub type ShutdownSignal = watch::Receiver<bool>;

/// Creates the shutdown flag pair.  Send `true` to request shutdown.
pub fn shutdown_channel() -> (watch::Sender<bool>, ShutdownSignal) {
    watch::channel(false)
}

/// Resolves once shutdown has been requested.
///
/// If the sender is dropped without ever requesting shutdown the future
/// never resolves.
pub async fn shutdown_requested(signal: &mut ShutdownSignal) {
    while !*signal.borrow_and_update() {
        if signal.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Error reported by a transport implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Errors surfaced by device session operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// No device with the configured identifiers could be opened.
    #[error("device {vendor_id:04x}:{product_id:04x} not found: {reason}")]
    NotFound {
        vendor_id: u16,
        product_id: u16,
        reason: String,
    },

    /// A single report transaction failed.
    #[error("I/O error on report 0x{report_id:02x}: {message}")]
    Io { report_id: u8, message: String },

    /// The device was unplugged; the session needs to reconnect.
    #[error("device disconnected")]
    Disconnected,

    /// Shutdown was requested while waiting for the device.
    #[error("cancelled by shutdown request")]
    Cancelled,

    /// A report could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl DeviceError {
    fn io(report_id: u8, message: impl Into<String>) -> Self {
        DeviceError::Io {
            report_id,
            message: message.into(),
        }
    }
}

/// USB descriptor strings of an open device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceDescription {
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
}

/// One open device handle.
///
/// Every buffer passed in or out starts with the report identifier byte.
/// Dropping the handle closes the device.
#[cfg_attr(test, mockall::automock)]
pub trait HidTransport: Send {
    /// Reads the feature report whose id is in `buf[0]`; returns the number
    /// of bytes stored in `buf` (identifier included).
    fn get_feature_report(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Sends a feature report; returns the number of bytes transferred.
    fn send_feature_report(&mut self, data: &[u8]) -> Result<usize, TransportError>;

    /// Writes an output report over the interrupt channel.
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError>;

    /// Non-blocking interrupt read.  `Ok(0)` means no data is pending; an
    /// error means the device is gone.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// USB descriptor strings.
    fn describe(&self) -> DeviceDescription;
}

/// Opens device handles.
pub trait DeviceConnector: Send {
    /// Locates the device and opens it in non-blocking read mode.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::NotFound`] when the device is absent or cannot
    /// be opened.
    fn open(&mut self) -> Result<Box<dyn HidTransport>, DeviceError>;
}

/// Connectivity of a [`DeviceSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
    Reconnecting,
}

/// Maintains connectivity to exactly one device.
pub struct DeviceSession {
    connector: Box<dyn DeviceConnector>,
    handle: Option<Box<dyn HidTransport>>,
    state: ConnectionState,
    observers: Vec<mpsc::UnboundedSender<ConnectionState>>,
}

impl DeviceSession {
    /// Opens the device through `connector`.
    ///
    /// # Errors
    ///
    /// Returns the connector's error (normally [`DeviceError::NotFound`]);
    /// at startup this is fatal.
    pub fn open(mut connector: Box<dyn DeviceConnector>) -> Result<Self, DeviceError> {
        let handle = connector.open()?;
        info!("device opened");
        Ok(Self {
            connector,
            handle: Some(handle),
            state: ConnectionState::Connected,
            observers: Vec::new(),
        })
    }

    /// Current connectivity state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns a channel that receives every subsequent state transition.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ConnectionState> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.observers.push(tx);
        rx
    }

    /// Reads a register's feature report.
    ///
    /// Returns the report as received (identifier included), truncated to
    /// the number of bytes the transport reported.
    ///
    /// # Errors
    ///
    /// [`DeviceError::Io`] if the transaction fails or transfers no bytes;
    /// [`DeviceError::Disconnected`] if there is no open handle.
    pub fn read_register(&mut self, register: Register) -> Result<Vec<u8>, DeviceError> {
        let report_id = register.report_id();
        let handle = self.handle_mut()?;

        let mut buf = vec![0u8; register.report_len()];
        buf[0] = report_id;
        let n = handle
            .get_feature_report(&mut buf)
            .map_err(|e| DeviceError::io(report_id, e.0))?;
        if n < 1 {
            return Err(DeviceError::io(report_id, "no bytes transferred"));
        }
        buf.truncate(n);
        debug!("read {n} bytes from {register}");
        Ok(buf)
    }

    /// Writes a complete feature report (identifier included).
    ///
    /// # Errors
    ///
    /// [`DeviceError::Io`] if the transaction fails or transfers no bytes;
    /// [`DeviceError::Disconnected`] if there is no open handle.
    pub fn write_register(&mut self, report: &[u8]) -> Result<(), DeviceError> {
        let report_id = report.first().copied().unwrap_or_default();
        let handle = self.handle_mut()?;

        let n = handle
            .send_feature_report(report)
            .map_err(|e| DeviceError::io(report_id, e.0))?;
        if n < 1 {
            return Err(DeviceError::io(report_id, "no bytes transferred"));
        }
        debug!("wrote {n} bytes to report 0x{report_id:02x}");
        Ok(())
    }

    /// Sends an output report over the interrupt channel.
    ///
    /// # Errors
    ///
    /// Same as [`DeviceSession::write_register`].
    pub fn transmit(&mut self, report: &[u8]) -> Result<(), DeviceError> {
        let report_id = report.first().copied().unwrap_or_default();
        let handle = self.handle_mut()?;

        let n = handle
            .write(report)
            .map_err(|e| DeviceError::io(report_id, e.0))?;
        if n < 1 {
            return Err(DeviceError::io(report_id, "no bytes transferred"));
        }
        Ok(())
    }

    /// One non-blocking interrupt read.
    ///
    /// Returns `Ok(None)` when nothing is pending.  A transport failure closes
    /// the handle, moves the session to [`ConnectionState::Disconnected`] and
    /// returns [`DeviceError::Disconnected`].
    pub fn poll_interrupt(&mut self) -> Result<Option<Vec<u8>>, DeviceError> {
        let handle = self.handle_mut()?;

        let mut buf = [0u8; MAX_FEATURE_REPORT_LEN];
        match handle.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(n) => Ok(Some(buf[..n.min(buf.len())].to_vec())),
            Err(e) => {
                warn!("interrupt read failed, device was probably unplugged: {e}");
                self.mark_disconnected();
                Err(DeviceError::Disconnected)
            }
        }
    }

    /// USB descriptor strings of the open device.
    ///
    /// # Errors
    ///
    /// [`DeviceError::Disconnected`] if there is no open handle.
    pub fn describe(&mut self) -> Result<DeviceDescription, DeviceError> {
        Ok(self.handle_mut()?.describe())
    }

    /// Closes the handle and enters [`ConnectionState::Disconnected`].
    pub fn mark_disconnected(&mut self) {
        if self.handle.take().is_some() {
            debug!("device handle closed");
        }
        self.transition(ConnectionState::Disconnected);
    }

    /// Re-opens the device, retrying every `interval` until it succeeds.
    ///
    /// Returns the number of failed attempts before the successful one.  A
    /// session that is already connected returns `Ok(0)` immediately.
    ///
    /// # Errors
    ///
    /// [`DeviceError::Cancelled`] if `shutdown` fires during a wait.
    pub async fn reconnect(
        &mut self,
        interval: Duration,
        shutdown: &mut ShutdownSignal,
    ) -> Result<u32, DeviceError> {
        if self.state == ConnectionState::Connected && self.handle.is_some() {
            return Ok(0);
        }

        self.transition(ConnectionState::Reconnecting);
        info!("trying to reconnect every {interval:?}");

        let mut failed_attempts = 0u32;
        loop {
            tokio::select! {
                biased;
                _ = shutdown_requested(shutdown) => {
                    info!("reconnection cancelled after {failed_attempts} failed attempts");
                    return Err(DeviceError::Cancelled);
                }
                _ = tokio::time::sleep(interval) => {}
            }

            match self.connector.open() {
                Ok(handle) => {
                    self.handle = Some(handle);
                    self.transition(ConnectionState::Connected);
                    info!("device reconnected after {failed_attempts} failed attempts");
                    return Ok(failed_attempts);
                }
                Err(e) => {
                    failed_attempts = failed_attempts.saturating_add(1);
                    debug!("reconnect attempt {failed_attempts} failed: {e}");
                }
            }
        }
    }

    fn handle_mut(&mut self) -> Result<&mut (dyn HidTransport + 'static), DeviceError> {
        self.handle.as_deref_mut().ok_or(DeviceError::Disconnected)
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state == next {
            return;
        }
        debug!("session state {:?} -> {next:?}", self.state);
        self.state = next;
        self.observers.retain(|tx| tx.send(next).is_ok());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
