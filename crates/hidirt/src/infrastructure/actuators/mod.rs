//! Actuators: the desktop side effects an IR code can trigger.
//!
//! - **`xtest`** (Linux) – key sequence injection into the focused X11
//!   window through the XTest extension.
//! - **`shell`** – detached program launch through the platform shell.
//! - **`mock`** – recording implementations for tests.
//!
//! Platforms without an X server get [`KeyInjectionUnavailable`], which
//! fails every key sequence with the reason it was created with.

use async_trait::async_trait;

use crate::application::execute_actions::{ActuatorError, KeySequenceInjector};

pub mod mock;
pub mod shell;
#[cfg(target_os = "linux")]
pub mod xtest;

/// Stands in for a key injector that could not be created.
pub struct KeyInjectionUnavailable {
    reason: String,
}

impl KeyInjectionUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl KeySequenceInjector for KeyInjectionUnavailable {
    async fn send_key_sequence(&self, _sequence: &str) -> Result<(), ActuatorError> {
        Err(ActuatorError::Display(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_injector_reports_its_reason() {
        let injector = KeyInjectionUnavailable::new("no X display");
        let result = tokio_test::block_on(injector.send_key_sequence("ctrl+alt+t"));
        assert!(matches!(result, Err(ActuatorError::Display(reason)) if reason == "no X display"));
    }
}
