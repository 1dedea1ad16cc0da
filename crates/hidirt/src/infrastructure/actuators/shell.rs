//! Program launch through the platform shell.
//!
//! The application and its parameter are joined into one command line and
//! handed to `sh -c` (`cmd /C` on Windows), so rules may use shell syntax
//! such as `~`, pipes or environment variables.  The launch does not wait
//! for the program: a background task reaps the child and logs its exit
//! status.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::application::execute_actions::{ActuatorError, ProcessLauncher};

/// Joins application and parameter with a single space.  An empty
/// parameter adds nothing.
pub fn command_line(application: &str, parameter: &str) -> String {
    if parameter.is_empty() {
        application.to_string()
    } else {
        format!("{application} {parameter}")
    }
}

#[cfg(windows)]
fn shell_command(line: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(line);
    command
}

#[cfg(not(windows))]
fn shell_command(line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(line);
    command
}

/// Launches programs detached from the bridge.
#[derive(Debug, Default)]
pub struct ShellLauncher;

#[async_trait]
impl ProcessLauncher for ShellLauncher {
    async fn launch(&self, application: &str, parameter: &str) -> Result<(), ActuatorError> {
        let line = command_line(application, parameter);
        let mut child = shell_command(&line).spawn().map_err(|source| ActuatorError::Spawn {
            program: application.to_string(),
            source,
        })?;

        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => debug!("{line:?} finished"),
                Ok(status) => warn!("{line:?} exited with {status}"),
                Err(e) => warn!("waiting for {line:?} failed: {e}"),
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_without_parameter() {
        assert_eq!(command_line("/usr/bin/gedit", ""), "/usr/bin/gedit");
    }

    #[test]
    fn test_command_line_with_parameter() {
        assert_eq!(command_line("xterm", "-e top"), "xterm -e top");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_launch_returns_without_waiting() {
        let started = std::time::Instant::now();
        ShellLauncher.launch("sleep", "5").await.unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }
}
