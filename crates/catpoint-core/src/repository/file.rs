//! File-backed repository adapter
//!
//! State lives in memory and the whole document is rewritten as JSON after
//! every mutation, so the panel comes back in the same state after a
//! restart.
//!
//! A mutation is applied to a copy of the state first. The copy is written
//! to a temporary file next to the store and renamed over it, and only then
//! becomes the current state. A failed write leaves both the file and the
//! in-memory state as they were.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::{SecurityRepository, SecurityState};
use crate::sensor::Sensor;
use crate::status::{AlarmStatus, ArmingStatus};
use crate::{CatpointError, Result};

/// Repository persisted to a single JSON file
#[derive(Debug)]
pub struct FileSecurityRepository {
    path: PathBuf,
    state: SecurityState,
}

impl FileSecurityRepository {
    /// Open the store at `path`.
    ///
    /// A missing file starts from the default state (`NO_ALARM`,
    /// `DISARMED`, no sensors). A file that cannot be parsed is an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let state = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str::<SecurityState>(&content).map_err(|e| {
                CatpointError::Serialization(format!(
                    "failed to load security store {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            SecurityState::default()
        };

        tracing::debug!(
            "Security store opened: {} ({} sensors)",
            path.display(),
            state.sensors.len()
        );
        Ok(Self { path, state })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Borrow the current state
    pub fn state(&self) -> &SecurityState {
        &self.state
    }

    /// Persist `next`, then adopt it as the current state
    fn commit(&mut self, next: SecurityState) -> Result<()> {
        self.write(&next)?;
        self.state = next;
        Ok(())
    }

    fn write(&self, state: &SecurityState) -> Result<()> {
        let content = serde_json::to_string_pretty(state)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(content.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl SecurityRepository for FileSecurityRepository {
    fn add_sensor(&mut self, sensor: Sensor) -> Result<()> {
        let mut next = self.state.clone();
        next.sensors.insert(sensor);
        self.commit(next)
    }

    fn remove_sensor(&mut self, sensor: &Sensor) -> Result<()> {
        let mut next = self.state.clone();
        next.sensors.remove(sensor);
        self.commit(next)
    }

    fn update_sensor(&mut self, sensor: &Sensor) -> Result<()> {
        let mut next = self.state.clone();
        next.upsert_sensor(sensor);
        self.commit(next)
    }

    fn sensors(&self) -> Result<BTreeSet<Sensor>> {
        Ok(self.state.sensors.clone())
    }

    fn alarm_status(&self) -> Result<AlarmStatus> {
        Ok(self.state.alarm_status)
    }

    fn set_alarm_status(&mut self, status: AlarmStatus) -> Result<()> {
        self.commit(SecurityState {
            alarm_status: status,
            ..self.state.clone()
        })
    }

    fn arming_status(&self) -> Result<ArmingStatus> {
        Ok(self.state.arming_status)
    }

    fn set_arming_status(&mut self, status: ArmingStatus) -> Result<()> {
        self.commit(SecurityState {
            arming_status: status,
            ..self.state.clone()
        })
    }
}
