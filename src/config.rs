//! Configuration module for session settings.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;
use crate::timer::duration_from_minutes;

pub const DEFAULT_CATEGORY: &str = "development";
pub const DEFAULT_SESSIONS_FILE: &str = "sessions.json";
pub const DEFAULT_SESSION_MINUTES: u64 = 25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub duration: Duration,
    pub category: String,
    /// Also echo notifications to stdout.
    pub notifications: bool,
    /// Draw the elapsed-time line while the session runs.
    pub timer: bool,
    pub sessions_file: PathBuf,
}

impl Config {
    pub fn new() -> Self {
        Self {
            duration: duration_from_minutes(DEFAULT_SESSION_MINUTES),
            category: DEFAULT_CATEGORY.to_string(),
            notifications: true,
            timer: true,
            sessions_file: PathBuf::from(DEFAULT_SESSIONS_FILE),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            duration: cli.duration,
            category: cli.category,
            notifications: cli.notifications,
            timer: cli.timer,
            sessions_file: cli.sessions_file,
        }
    }
}
