//! Session records persisted to the log.

use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One completed focus session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub start: DateTime<FixedOffset>,
    /// Whole minutes the session was configured for. Stored as `duration` on disk.
    #[serde(rename = "duration")]
    pub duration_minutes: u64,
    pub category: String,
}

impl SessionRecord {
    pub fn new(start: DateTime<FixedOffset>, duration: Duration, category: impl Into<String>) -> Self {
        Self {
            start,
            duration_minutes: duration.as_secs() / 60,
            category: category.into(),
        }
    }
}

/// Chronological history of completed sessions, oldest first.
pub type SessionLog = Vec<SessionRecord>;
