//! Session log persistence.
//!
//! The log is a single JSON array of [`SessionRecord`]s, rewritten in full on
//! every save. A missing or blank file is a fresh log. Before the rewrite the
//! records not yet in the log are stashed in a `<log>.pending` sidecar so a
//! failed save can be recovered on a later run instead of losing sessions.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde_json::Deserializer;
use thiserror::Error;

use crate::session::{SessionLog, SessionRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access session log {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("session log {} is not a valid list of sessions: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode sessions for {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn decode(path: &Path, source: serde_json::Error) -> Self {
        Self::Decode {
            path: path.to_path_buf(),
            source,
        }
    }

    fn encode(path: &Path, source: serde_json::Error) -> Self {
        Self::Encode {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Loads every recorded session, creating the file if it does not exist yet.
pub fn load_sessions(path: &Path) -> Result<SessionLog, StoreError> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| StoreError::io(path, e))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| StoreError::io(path, e))?;

    let sessions = decode_log(&content).map_err(|e| StoreError::decode(path, e))?;
    log::debug!("loaded {} session(s) from {}", sessions.len(), path.display());
    Ok(sessions)
}

/// Only the first JSON value counts; anything after it is ignored.
fn decode_log(content: &str) -> Result<SessionLog, serde_json::Error> {
    let mut values = Deserializer::from_str(content).into_iter::<Option<SessionLog>>();
    match values.next() {
        None => Ok(Vec::new()),
        Some(value) => Ok(value?.unwrap_or_default()),
    }
}

/// Overwrites the log with `sessions`. Not crash-atomic.
pub fn save_sessions(path: &Path, sessions: &[SessionRecord]) -> Result<(), StoreError> {
    let mut encoded = serde_json::to_vec(sessions).map_err(|e| StoreError::encode(path, e))?;
    encoded.push(b'\n');

    let mut file = File::create(path).map_err(|e| StoreError::io(path, e))?;
    file.write_all(&encoded)
        .and_then(|()| file.flush())
        .map_err(|e| StoreError::io(path, e))?;

    log::debug!("saved {} session(s) to {}", sessions.len(), path.display());
    Ok(())
}

/// Sidecar file holding completed sessions that have not reached the log yet.
pub fn pending_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".pending");
    PathBuf::from(name)
}

/// Writes every record that has not reached the log yet, replacing the previous stash.
pub fn stash_pending(path: &Path, unsaved: &[SessionRecord]) -> Result<(), StoreError> {
    let pending = pending_path(path);
    let encoded = serde_json::to_vec(unsaved).map_err(|e| StoreError::encode(&pending, e))?;
    fs::write(&pending, encoded).map_err(|e| StoreError::io(&pending, e))?;
    log::debug!("stashed {} pending session(s) in {}", unsaved.len(), pending.display());
    Ok(())
}

pub fn clear_pending(path: &Path) -> Result<(), StoreError> {
    let pending = pending_path(path);
    match fs::remove_file(&pending) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::io(&pending, e)),
    }
}

/// Appends sessions left behind by earlier runs whose save failed.
///
/// Records already present in `sessions` are skipped. Returns the records that
/// were appended; the sidecar stays in place until a later save clears it.
pub fn recover_pending(
    path: &Path,
    sessions: &mut SessionLog,
) -> Result<Vec<SessionRecord>, StoreError> {
    let pending = pending_path(path);
    let content = match fs::read_to_string(&pending) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::io(&pending, e)),
    };

    let stashed = decode_log(&content).map_err(|e| StoreError::decode(&pending, e))?;
    let recovered: Vec<SessionRecord> = stashed
        .into_iter()
        .filter(|record| !sessions.contains(record))
        .collect();

    for record in &recovered {
        log::warn!(
            "recovered unsaved {} session started at {} from {}",
            record.category,
            record.start,
            pending.display()
        );
    }
    sessions.extend(recovered.iter().cloned());
    Ok(recovered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use std::time::Duration;
    use tempfile::tempdir;

    fn record(minutes: u64, category: &str, start: &str) -> SessionRecord {
        SessionRecord::new(
            DateTime::parse_from_rfc3339(start).unwrap(),
            Duration::from_secs(minutes * 60),
            category,
        )
    }

    fn sample() -> SessionLog {
        vec![
            record(25, "development", "2025-01-06T09:00:00+01:00"),
            record(50, "writing", "2025-01-06T10:30:00.5+01:00"),
            record(5, "reading", "2025-01-07T16:45:12.123456789-05:00"),
        ]
    }

    #[test]
    fn test_load_missing_file_is_empty_and_creates_it() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.json");

        let sessions = load_sessions(&path).unwrap();

        assert!(sessions.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn test_load_blank_or_null_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        for content in ["", "   \n\t\n", "null", "[]\n"] {
            fs::write(&path, content).unwrap();
            assert!(load_sessions(&path).unwrap().is_empty(), "content {content:?}");
        }
    }

    #[test]
    fn test_load_garbage_is_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        for content in ["not json at all", "{\"start\": 1}", "[{\"duration\": \"x\"}]", "[{"] {
            fs::write(&path, content).unwrap();
            let err = load_sessions(&path).unwrap_err();
            assert!(matches!(err, StoreError::Decode { .. }), "content {content:?}: {err}");
        }
    }

    #[test]
    fn test_load_unopenable_path_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("sessions.json");

        let err = load_sessions(&path).unwrap_err();

        assert!(matches!(err, StoreError::Io { .. }));
        assert!(err.to_string().contains("missing-dir"));
    }

    #[test]
    fn test_load_ignores_trailing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        let mut content = serde_json::to_string(&sample()).unwrap();
        content.push_str("\n[]\n");
        fs::write(&path, content).unwrap();

        assert_eq!(load_sessions(&path).unwrap(), sample());
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.json");

        save_sessions(&path, &sample()).unwrap();
        let loaded = load_sessions(&path).unwrap();

        assert_eq!(loaded, sample());
        let categories: Vec<&str> = loaded.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(categories, ["development", "writing", "reading"]);
    }

    #[test]
    fn test_save_empty_log_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.json");

        save_sessions(&path, &[]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]\n");
        assert!(load_sessions(&path).unwrap().is_empty());
    }

    #[test]
    fn test_append_keeps_existing_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        save_sessions(&path, &sample()).unwrap();

        let mut sessions = load_sessions(&path).unwrap();
        sessions.push(record(15, "review", "2025-01-08T08:00:00Z"));
        save_sessions(&path, &sessions).unwrap();

        let reloaded = load_sessions(&path).unwrap();
        assert_eq!(reloaded.len(), 4);
        assert_eq!(reloaded[..3], sample()[..]);
        assert_eq!(reloaded[3].category, "review");
    }

    #[test]
    fn test_save_overwrites_longer_previous_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        save_sessions(&path, &sample()).unwrap();

        save_sessions(&path, &sample()[..1]).unwrap();

        assert_eq!(load_sessions(&path).unwrap(), sample()[..1]);
    }

    #[test]
    fn test_pending_path_appends_suffix() {
        assert_eq!(
            pending_path(Path::new("/tmp/sessions.json")),
            PathBuf::from("/tmp/sessions.json.pending")
        );
    }

    #[test]
    fn test_recover_pending_appends_every_stashed_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        let first = record(25, "development", "2025-02-01T12:00:00Z");
        let second = record(10, "review", "2025-02-01T13:00:00Z");
        stash_pending(&path, &[first.clone(), second.clone()]).unwrap();

        let mut sessions = sample();
        let recovered = recover_pending(&path, &mut sessions).unwrap();

        assert_eq!(recovered, vec![first.clone(), second.clone()]);
        assert_eq!(sessions.len(), 5);
        assert_eq!(sessions[3..], [first, second]);
    }

    #[test]
    fn test_recover_pending_skips_records_already_saved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        let mut sessions = sample();
        let extra = record(15, "planning", "2025-02-02T08:00:00Z");
        stash_pending(&path, &[sessions[1].clone(), extra.clone()]).unwrap();

        let recovered = recover_pending(&path, &mut sessions).unwrap();

        assert_eq!(recovered, vec![extra]);
        assert_eq!(sessions.len(), 4);
        assert_eq!(sessions[..3], sample()[..]);
    }

    #[test]
    fn test_recover_without_pending_is_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        let mut sessions = sample();

        assert!(recover_pending(&path, &mut sessions).unwrap().is_empty());
        assert_eq!(sessions, sample());
    }

    #[test]
    fn test_blank_pending_is_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        fs::write(pending_path(&path), "").unwrap();
        let mut sessions = sample();

        assert!(recover_pending(&path, &mut sessions).unwrap().is_empty());
        assert_eq!(sessions, sample());
    }

    #[test]
    fn test_unreadable_pending_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        fs::create_dir(pending_path(&path)).unwrap();

        let err = recover_pending(&path, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn test_encode_error_message_is_not_a_decode_message() {
        let source = serde_json::from_str::<SessionLog>("{").unwrap_err();
        let err = StoreError::encode(Path::new("sessions.json"), source);
        assert!(matches!(err, StoreError::Encode { .. }));
        assert!(err.to_string().starts_with("failed to encode sessions for sessions.json"));
    }

    #[test]
    fn test_corrupt_pending_is_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        fs::write(pending_path(&path), "{oops").unwrap();

        let err = recover_pending(&path, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }

    #[test]
    fn test_clear_pending_removes_sidecar_and_tolerates_absence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        stash_pending(&path, &sample()[..1]).unwrap();

        clear_pending(&path).unwrap();
        assert!(!pending_path(&path).exists());
        clear_pending(&path).unwrap();
    }
}
