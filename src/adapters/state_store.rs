//! Persistence adapters.
//!
//! | Store            | Backing                                   |
//! |------------------|-------------------------------------------|
//! | `JsonStateStore` | one JSON document, rewritten atomically   |
//! | `MemoryStore`    | in-process, for tests and `--simulate`    |
//!
//! The JSON document keeps the latest status per channel, the latest
//! setpoint, and a bounded history of status changes.

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::utils::write_atomically;
use crate::app::ports::{PersistencePort, StatusRecord, TargetRecord};
use crate::command::Channel;
use crate::error::PersistenceError;

/// Status changes kept in the history ring.
pub const HISTORY_CAP: usize = 256;

const STATE_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredState {
    pub version: u32,
    pub status: BTreeMap<Channel, StatusRecord>,
    pub target: Option<TargetRecord>,
    pub history: VecDeque<StatusRecord>,
}

impl StoredState {
    fn push_status(&mut self, record: StatusRecord) {
        self.status.insert(record.channel, record);
        if self.history.len() == HISTORY_CAP {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }
}

// ───────────────────────────────────────────────────────────────
// JSON file store
// ───────────────────────────────────────────────────────────────

pub struct JsonStateStore {
    path: PathBuf,
    state: StoredState,
}

impl JsonStateStore {
    /// Load `path`, or start empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(text) => {
                let state: StoredState =
                    serde_json::from_str(&text).map_err(|_| PersistenceError::Corrupted)?;
                info!(
                    "state: loaded {} ({} history entries)",
                    path.display(),
                    state.history.len()
                );
                state
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("state: {} not found, starting empty", path.display());
                StoredState {
                    version: STATE_VERSION,
                    ..StoredState::default()
                }
            }
            Err(_) => return Err(PersistenceError::IoError),
        };
        Ok(Self { path, state })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &StoredState {
        &self.state
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        let json = serde_json::to_vec_pretty(&self.state).map_err(|_| PersistenceError::Encode)?;
        write_atomically(&self.path, &json).map_err(|_| PersistenceError::IoError)?;
        debug!("state: wrote {}", self.path.display());
        Ok(())
    }
}

impl PersistencePort for JsonStateStore {
    fn record_status(&mut self, record: &StatusRecord) -> Result<(), PersistenceError> {
        self.state.push_status(*record);
        self.flush()
    }

    fn record_target(&mut self, record: &TargetRecord) -> Result<(), PersistenceError> {
        self.state.target = Some(*record);
        self.flush()
    }

    fn last_target(&self) -> Result<Option<TargetRecord>, PersistenceError> {
        Ok(self.state.target)
    }
}

// ───────────────────────────────────────────────────────────────
// In-memory store
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStore {
    statuses: Vec<StatusRecord>,
    targets: Vec<TargetRecord>,
}

impl MemoryStore {
    /// Every status record in write order.
    pub fn statuses(&self) -> &[StatusRecord] {
        &self.statuses
    }

    /// Every setpoint record in write order.
    pub fn targets(&self) -> &[TargetRecord] {
        &self.targets
    }
}

impl PersistencePort for MemoryStore {
    fn record_status(&mut self, record: &StatusRecord) -> Result<(), PersistenceError> {
        self.statuses.push(*record);
        Ok(())
    }

    fn record_target(&mut self, record: &TargetRecord) -> Result<(), PersistenceError> {
        self.targets.push(*record);
        Ok(())
    }

    fn last_target(&self) -> Result<Option<TargetRecord>, PersistenceError> {
        Ok(self.targets.last().copied())
    }
}
