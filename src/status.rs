use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default file the status map is persisted under
pub const STATUS_STORE_FILE: &str = "interview_statuses.json";

/// Outcome of a candidate's interview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterviewStatus {
    Pending,
    Completed,
    NoShow,
}

/// Aggregate over one day's scheduled candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub completed: u32,
    pub no_shows: u32,
    pub pending: u32,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("status store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("status store serialization: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Persisted candidate-id -> outcome map.
///
/// Only non-pending entries are held; resetting a candidate to pending
/// deletes the key. The map survives restarts independently of the slot
/// grid, since identity is the candidate id rather than the slot position.
#[derive(Debug)]
pub struct StatusStore {
    path: PathBuf,
    statuses: HashMap<String, InterviewStatus>,
}

impl StatusStore {
    /// Loads the store from disk; a missing file yields an empty store
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let statuses = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            HashMap::new()
        };
        Ok(StatusStore { path, statuses })
    }

    /// Marks a candidate's outcome. Pending removes the entry; any other
    /// status upserts it. Every transition is allowed from every status.
    pub fn set_status(&mut self, candidate_id: &str, status: InterviewStatus) -> Result<(), StoreError> {
        match status {
            InterviewStatus::Pending => {
                self.statuses.remove(candidate_id);
            }
            _ => {
                self.statuses.insert(candidate_id.to_string(), status);
            }
        }
        info!("status for {} set to {:?}", candidate_id, status);
        self.persist()
    }

    /// A candidate's current outcome; absent means pending
    pub fn get_status(&self, candidate_id: &str) -> InterviewStatus {
        self.statuses
            .get(candidate_id)
            .copied()
            .unwrap_or(InterviewStatus::Pending)
    }

    /// Counts outcomes over a caller-supplied id subset (the ids scheduled
    /// for one day), since the store itself is global across days
    pub fn count_for<'a, I>(&self, candidate_ids: I) -> StatusCounts
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts = StatusCounts {
            completed: 0,
            no_shows: 0,
            pending: 0,
        };
        for id in candidate_ids {
            match self.get_status(id) {
                InterviewStatus::Completed => counts.completed += 1,
                InterviewStatus::NoShow => counts.no_shows += 1,
                InterviewStatus::Pending => counts.pending += 1,
            }
        }
        counts
    }

    fn persist(&self) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(&self.statuses)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}
