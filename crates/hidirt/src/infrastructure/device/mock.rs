//! Scripted in-memory device for tests.
//!
//! A [`ScriptedDevice`] owns the simulated device state behind an
//! `Arc<Mutex<...>>`.  The connector and every transport it opens share that
//! state, so a test keeps the `ScriptedDevice` to feed interrupt reports in
//! and to inspect what the code under test wrote.
//!
//! # Usage in tests
//!
//! ```ignore
//! let device = ScriptedDevice::new();
//! device.push_report(vec![0x01, 1, 2, 0, 3, 0, 0]);
//! device.push_unplug_for(2);
//!
//! let mut session = DeviceSession::open(Box::new(device.connector()))?;
//! ```
//!
//! Interrupt reads consume the script in order.  Once the script is empty
//! every read returns "no data".

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::application::device_session::{
    DeviceConnector, DeviceDescription, DeviceError, HidTransport, TransportError,
};

const VENDOR_ID: u16 = 0x0483;
const PRODUCT_ID: u16 = 0x6611;

/// One scripted interrupt read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// The read returns these bytes.
    Report(Vec<u8>),
    /// The read returns no data.
    Idle,
    /// The read fails as if the device had been unplugged; the next
    /// `failed_reopens` open attempts fail as well.
    Unplug { failed_reopens: u32 },
}

#[derive(Default)]
struct DeviceState {
    script: VecDeque<ScriptStep>,
    registers: HashMap<u8, Vec<u8>>,
    written: Vec<Vec<u8>>,
    transmitted: Vec<Vec<u8>>,
    failing_opens: u32,
    open_attempts: u32,
    fail_feature_reports: bool,
}

/// Handle on the simulated device state.
#[derive(Clone, Default)]
pub struct ScriptedDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl ScriptedDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        lock(&self.state)
    }

    /// Queues an interrupt report.
    pub fn push_report(&self, report: Vec<u8>) {
        self.lock().script.push_back(ScriptStep::Report(report));
    }

    /// Queues a read that returns no data.
    pub fn push_idle(&self) {
        self.lock().script.push_back(ScriptStep::Idle);
    }

    /// Queues a failing read.
    pub fn push_unplug(&self) {
        self.push_unplug_for(0);
    }

    /// Queues a failing read after which the device stays absent for
    /// `failed_reopens` open attempts.
    pub fn push_unplug_for(&self, failed_reopens: u32) {
        self.lock().script.push_back(ScriptStep::Unplug { failed_reopens });
    }

    /// Makes the next `count` open attempts fail with `NotFound`.
    pub fn fail_next_opens(&self, count: u32) {
        self.lock().failing_opens = count;
    }

    /// Makes every feature report transaction fail.
    pub fn fail_feature_reports(&self, fail: bool) {
        self.lock().fail_feature_reports = fail;
    }

    /// Stores the full feature report (identifier first) returned for reads
    /// of that identifier.
    pub fn set_register(&self, report: Vec<u8>) {
        if let Some(&id) = report.first() {
            self.lock().registers.insert(id, report);
        }
    }

    /// Feature reports written so far, in order.
    pub fn written_reports(&self) -> Vec<Vec<u8>> {
        self.lock().written.clone()
    }

    /// Output reports written so far, in order.
    pub fn transmitted_reports(&self) -> Vec<Vec<u8>> {
        self.lock().transmitted.clone()
    }

    /// Number of open attempts, successful or not.
    pub fn open_attempts(&self) -> u32 {
        self.lock().open_attempts
    }

    /// Number of scripted reads not consumed yet.
    pub fn pending_steps(&self) -> usize {
        self.lock().script.len()
    }

    pub fn connector(&self) -> ScriptedConnector {
        ScriptedConnector {
            state: Arc::clone(&self.state),
        }
    }
}

fn lock(state: &Mutex<DeviceState>) -> MutexGuard<'_, DeviceState> {
    // A panicking test thread must not hide the state from the others.
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Opens [`ScriptedTransport`]s over a shared [`ScriptedDevice`].
pub struct ScriptedConnector {
    state: Arc<Mutex<DeviceState>>,
}

impl DeviceConnector for ScriptedConnector {
    fn open(&mut self) -> Result<Box<dyn HidTransport>, DeviceError> {
        let mut state = lock(&self.state);
        state.open_attempts += 1;
        if state.failing_opens > 0 {
            state.failing_opens -= 1;
            return Err(DeviceError::NotFound {
                vendor_id: VENDOR_ID,
                product_id: PRODUCT_ID,
                reason: "scripted device unplugged".to_string(),
            });
        }
        Ok(Box::new(ScriptedTransport {
            state: Arc::clone(&self.state),
        }))
    }
}

/// One open handle on a [`ScriptedDevice`].
pub struct ScriptedTransport {
    state: Arc<Mutex<DeviceState>>,
}

impl HidTransport for ScriptedTransport {
    fn get_feature_report(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let state = lock(&self.state);
        if state.fail_feature_reports {
            return Err(TransportError("scripted feature report failure".to_string()));
        }
        let id = buf.first().copied().unwrap_or_default();
        let report = state
            .registers
            .get(&id)
            .ok_or_else(|| TransportError(format!("no report 0x{id:02x}")))?;
        let n = report.len().min(buf.len());
        buf[..n].copy_from_slice(&report[..n]);
        Ok(n)
    }

    fn send_feature_report(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        let mut state = lock(&self.state);
        if state.fail_feature_reports {
            return Err(TransportError("scripted feature report failure".to_string()));
        }
        state.written.push(data.to_vec());
        if let Some(&id) = data.first() {
            state.registers.insert(id, data.to_vec());
        }
        Ok(data.len())
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        lock(&self.state).transmitted.push(data.to_vec());
        Ok(data.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut state = lock(&self.state);
        match state.script.pop_front() {
            Some(ScriptStep::Report(report)) => {
                let n = report.len().min(buf.len());
                buf[..n].copy_from_slice(&report[..n]);
                Ok(n)
            }
            Some(ScriptStep::Idle) | None => Ok(0),
            Some(ScriptStep::Unplug { failed_reopens }) => {
                state.failing_opens = failed_reopens;
                Err(TransportError("scripted unplug".to_string()))
            }
        }
    }

    fn describe(&self) -> DeviceDescription {
        DeviceDescription {
            manufacturer: Some("ScriptedDevice".to_string()),
            product: Some("HIDIRT".to_string()),
            serial_number: Some("0001".to_string()),
        }
    }
}
