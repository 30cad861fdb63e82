//! Desktop notifications for session start and end.

use std::io;
use std::process::{Command, ExitStatus};

use thiserror::Error;

const NOTIFY_COMMAND: &str = "notify-send";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("could not run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{command} exited with {status}")]
    Failed { command: String, status: ExitStatus },
}

pub trait Notifier {
    /// Surfaces `message` to the user. When `verbose`, it is also echoed to stdout.
    fn notify(&mut self, message: &str, verbose: bool) -> Result<(), NotifyError>;
}

/// Sends notifications through an external command, `notify-send` by default.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    command: String,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self::with_command(NOTIFY_COMMAND)
    }

    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&mut self, message: &str, verbose: bool) -> Result<(), NotifyError> {
        if verbose {
            println!("{}", message);
            println!();
        }

        log::debug!("running {} {:?}", self.command, message);
        let status = Command::new(&self.command)
            .arg(message)
            .status()
            .map_err(|source| NotifyError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(NotifyError::Failed {
                command: self.command.clone(),
                status,
            })
        }
    }
}

pub fn start_message(duration_display: &str) -> String {
    format!("Session started: {}", duration_display)
}

pub fn end_message(duration_display: &str) -> String {
    format!("Session ended: {}", duration_display)
}
