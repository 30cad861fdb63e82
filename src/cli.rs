//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::config::{DEFAULT_CATEGORY, DEFAULT_SESSIONS_FILE};

/// Run one timed focus session and append it to the session log
#[derive(Parser, Debug)]
#[command(name = "pomodoro")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Category of the session
    #[arg(long, default_value = DEFAULT_CATEGORY)]
    pub category: String,

    /// Duration of the session (e.g. 25m, 30s, 1h30m; a bare number means minutes)
    #[arg(long, default_value = "25m", value_parser = parse_duration)]
    pub duration: Duration,

    /// Echo notifications to stdout as well as sending them with notify-send
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub notifications: bool,

    /// Output timer to stdout
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub timer: bool,

    /// File the session log is kept in
    #[arg(long, env = "POMODORO_SESSIONS_FILE", default_value = DEFAULT_SESSIONS_FILE)]
    pub sessions_file: PathBuf,
}

pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim().to_lowercase();

    // A bare number is minutes
    if let Ok(minutes) = input.parse::<u64>() {
        return positive(minutes.saturating_mul(60));
    }

    let mut total_seconds = 0u64;
    let mut current_number = String::new();

    for ch in input.chars() {
        if ch.is_ascii_digit() {
            current_number.push(ch);
        } else if ch == 'h' || ch == 'm' || ch == 's' {
            if current_number.is_empty() {
                return Err("Invalid duration format. Use formats like: 25m, 30s, 1h30m".to_string());
            }

            let number: u64 = current_number
                .parse()
                .map_err(|_| "Invalid number in duration".to_string())?;

            let unit = match ch {
                'h' => 3600,
                'm' => 60,
                _ => 1,
            };
            total_seconds = total_seconds.saturating_add(number.saturating_mul(unit));

            current_number.clear();
        } else if !ch.is_whitespace() {
            return Err("Invalid character in duration. Use formats like: 25m, 30s, 1h30m".to_string());
        }
    }

    if !current_number.is_empty() {
        return Err("Duration must end with 'h', 'm' or 's'".to_string());
    }

    positive(total_seconds)
}

fn positive(seconds: u64) -> Result<Duration, String> {
    if seconds == 0 {
        Err("Duration must be greater than 0".to_string())
    } else {
        Ok(Duration::from_secs(seconds))
    }
}

/// Human-readable span, e.g. `1 hour 30 minutes`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let parts = [
        (total / 3600, "hour"),
        ((total % 3600) / 60, "minute"),
        (total % 60, "second"),
    ];

    let shown: Vec<String> = parts
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| format!("{} {}{}", n, unit, if *n == 1 { "" } else { "s" }))
        .collect();

    if shown.is_empty() {
        "0 seconds".to_string()
    } else {
        shown.join(" ")
    }
}
