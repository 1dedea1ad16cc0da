//! ExecuteActionsUseCase: carries out the actions the dispatch engine chose.
//!
//! This use case sits at the application layer and delegates to two trait
//! objects: a [`KeySequenceInjector`] that types into the active window and
//! a [`ProcessLauncher`] that starts programs.  The platform implementations
//! are in the infrastructure layer.
//!
//! Action failures are logged and never stop the remaining actions or the
//! session loop.

use std::sync::Arc;

use async_trait::async_trait;
use hidirt_core::Action;
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for actuator operations.
#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} failed: {reason}")]
    Failed { program: String, reason: String },
    #[error("key injection unavailable: {0}")]
    Display(String),
    #[error("unknown key in sequence {0:?}")]
    UnknownKey(String),
}

/// Sends a key sequence such as `ctrl+alt+t` to the active window.
#[async_trait]
pub trait KeySequenceInjector: Send + Sync {
    async fn send_key_sequence(&self, sequence: &str) -> Result<(), ActuatorError>;
}

/// Starts `application` with `parameter` without waiting for it to finish.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    async fn launch(&self, application: &str, parameter: &str) -> Result<(), ActuatorError>;
}

/// The Execute Actions use case.
pub struct ExecuteActionsUseCase {
    injector: Arc<dyn KeySequenceInjector>,
    launcher: Arc<dyn ProcessLauncher>,
}

impl ExecuteActionsUseCase {
    pub fn new(injector: Arc<dyn KeySequenceInjector>, launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self { injector, launcher }
    }

    /// Performs a single action.
    ///
    /// # Errors
    ///
    /// Returns the actuator's [`ActuatorError`].
    pub async fn execute_one(&self, action: &Action) -> Result<(), ActuatorError> {
        match action {
            Action::SendKeys(sequence) => {
                debug!("sending key sequence {sequence:?}");
                self.injector.send_key_sequence(sequence).await
            }
            Action::LaunchProcess {
                application,
                parameter,
            } => {
                debug!("launching {application:?} with {parameter:?}");
                self.launcher.launch(application, parameter).await
            }
        }
    }

    /// Performs every action in order and returns how many succeeded.
    pub async fn execute(&self, actions: &[Action]) -> usize {
        let mut succeeded = 0;
        for action in actions {
            match self.execute_one(action).await {
                Ok(()) => succeeded += 1,
                Err(e) => warn!("action {action:?} failed: {e}"),
            }
        }
        succeeded
    }
}
