//! Recording actuators for unit and integration tests.
//!
//! Both record every call in a `Mutex<Vec<...>>` so that assertions can
//! inspect exactly what was requested and in what order.  The `failing`
//! constructors make every call return [`ActuatorError::Failed`] after
//! recording it, which exercises the error paths of callers.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::execute_actions::{ActuatorError, KeySequenceInjector, ProcessLauncher};

/// Records key sequences instead of typing them.
#[derive(Default)]
pub struct RecordingInjector {
    sequences: Mutex<Vec<String>>,
    should_fail: bool,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Key sequences received so far.
    pub fn sequences(&self) -> Vec<String> {
        self.sequences.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl KeySequenceInjector for RecordingInjector {
    async fn send_key_sequence(&self, sequence: &str) -> Result<(), ActuatorError> {
        if let Ok(mut sequences) = self.sequences.lock() {
            sequences.push(sequence.to_string());
        }
        if self.should_fail {
            return Err(ActuatorError::Failed {
                program: "recording injector".to_string(),
                reason: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

/// Records launch requests instead of starting programs.
#[derive(Default)]
pub struct RecordingLauncher {
    launches: Mutex<Vec<(String, String)>>,
    should_fail: bool,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// `(application, parameter)` pairs received so far.
    pub fn launches(&self) -> Vec<(String, String)> {
        self.launches.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ProcessLauncher for RecordingLauncher {
    async fn launch(&self, application: &str, parameter: &str) -> Result<(), ActuatorError> {
        if let Ok(mut launches) = self.launches.lock() {
            launches.push((application.to_string(), parameter.to_string()));
        }
        if self.should_fail {
            return Err(ActuatorError::Failed {
                program: application.to_string(),
                reason: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}
