//! pomodoro - run a timed focus session and keep a log of completed sessions.
//!
//! Each invocation runs exactly one session: it sends a start notification,
//! waits for the configured duration (optionally drawing the elapsed time),
//! sends an end notification, and appends the session to a JSON log file.

mod app;
mod cli;
mod config;
mod notify;
mod session;
mod store;
mod timer;

use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use cli::Cli;
use config::Config;
use notify::DesktopNotifier;

/// Exit status conventionally used for termination by SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::from(Cli::parse());

    // The session is only written once the timer completes, so an interrupt
    // leaves the log untouched.
    ctrlc::set_handler(|| {
        println!("\n🛑 Interrupted! Session not recorded.");
        log::warn!("session interrupted before completion");
        process::exit(INTERRUPTED_EXIT_CODE);
    })
    .context("Error setting Ctrl-C handler")?;

    let mut notifier = DesktopNotifier::new();
    let session = app::run(&config, &mut notifier, timer::run_session)?;
    log::debug!("completed session: {:?}", session);
    Ok(())
}
