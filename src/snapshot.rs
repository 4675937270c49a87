use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::MonitorError;
use crate::events::Event;

/// Durable storage for the last-observed event list.
///
/// The snapshot is a JSON array structurally identical to the API response.
/// A missing file is the explicit "no baseline yet" state, not an error.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<Option<Vec<Event>>, MonitorError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let snapshot = serde_json::from_str(&raw).map_err(|err| {
            MonitorError::Parse(format!("corrupt snapshot {}: {err}", self.path.display()))
        })?;

        Ok(Some(snapshot))
    }

    /// Replace the stored snapshot. Writes to a temp file and renames it into
    /// place so a crash mid-write cannot corrupt the next load.
    pub fn save(&self, snapshot: &[Event]) -> Result<(), MonitorError> {
        let raw = serde_json::to_string_pretty(snapshot)
            .map_err(|err| MonitorError::Parse(err.to_string()))?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, raw)?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}
