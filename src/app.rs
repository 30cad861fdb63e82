//! Runs one session from start notification to saved log entry.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::cli::format_duration;
use crate::config::Config;
use crate::notify::{Notifier, end_message, start_message};
use crate::session::SessionRecord;
use crate::store::{self, StoreError};

/// Loads the log, times the session, and appends it to the log.
///
/// `run_timer` blocks for the session and returns its record; production code
/// passes [`crate::timer::run_session`]. Failures to load, notify or save abort
/// the run; the `.pending` sidecar is best effort and only logs its failures.
pub fn run<N, T>(config: &Config, notifier: &mut N, run_timer: T) -> Result<SessionRecord>
where
    N: Notifier,
    T: FnOnce(Duration, &str, bool) -> SessionRecord,
{
    let path = config.sessions_file.as_path();
    let mut sessions = store::load_sessions(path)?;
    let mut unsaved = match store::recover_pending(path, &mut sessions) {
        Ok(recovered) => recovered,
        Err(e @ StoreError::Io { .. }) => {
            log::warn!("skipping unsaved-session recovery: {e}");
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };
    if !unsaved.is_empty() {
        println!("Recovered {} session(s) that were not saved last time.", unsaved.len());
    }

    let duration_display = format_duration(config.duration);
    log::info!(
        "starting {} session ({}), log at {}",
        config.category,
        duration_display,
        path.display()
    );

    notifier
        .notify(&start_message(&duration_display), config.notifications)
        .context("Failed to send start notification")?;
    let session = run_timer(config.duration, &config.category, config.timer);
    notifier
        .notify(&end_message(&duration_display), config.notifications)
        .context("Failed to send end notification")?;

    // Keep every unsaved session on disk before rewriting the whole log.
    unsaved.push(session.clone());
    if let Err(e) = store::stash_pending(path, &unsaved) {
        log::warn!("could not stash unsaved sessions, saving log directly: {e}");
    }
    sessions.push(session.clone());
    store::save_sessions(path, &sessions)?;
    if let Err(e) = store::clear_pending(path) {
        log::warn!("session log saved but stale sidecar remains: {e}");
    }

    log::info!("recorded session #{} in {}", sessions.len(), path.display());
    Ok(session)
}
