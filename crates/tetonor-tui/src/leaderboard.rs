//! File-backed ranking store
//!
//! Rows live in memory and the whole table is rewritten on every change.
//! Last write wins; there is no locking between processes.

use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use tetonor_core::{Difficulty, MemoryRankingStore, RankingError, RankingRow, RankingStore};

/// Ranking table persisted as a JSON file in the data directory
pub struct FileRankingStore {
    path: Option<PathBuf>,
    data: MemoryRankingStore,
}

impl FileRankingStore {
    /// Open the store at `path`, starting empty if the file is missing or unreadable
    pub fn open(path: &Path) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!("Ignoring unreadable rankings file {}: {}", path.display(), e);
                MemoryRankingStore::default()
            }),
            Err(_) => MemoryRankingStore::default(),
        };

        Self {
            path: Some(path.to_path_buf()),
            data,
        }
    }

    /// A store that never touches the disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: MemoryRankingStore::default(),
        }
    }

    fn save(&self) -> Result<(), RankingError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| RankingError::Storage(e.to_string()))?;
        fs::write(path, json).map_err(|e| RankingError::Storage(e.to_string()))
    }
}

impl RankingStore for FileRankingStore {
    fn top(&self, level: Difficulty, limit: usize) -> Result<Vec<RankingRow>, RankingError> {
        self.data.top(level, limit)
    }

    fn find(&self, name: &str, level: Difficulty) -> Result<Option<RankingRow>, RankingError> {
        self.data.find(name, level)
    }

    fn insert(
        &mut self,
        name: &str,
        score: u32,
        level: Difficulty,
        date: u64,
    ) -> Result<u64, RankingError> {
        let id = self.data.insert(name, score, level, date)?;
        self.save()?;
        Ok(id)
    }

    fn update(&mut self, id: u64, score: u32, date: u64) -> Result<(), RankingError> {
        self.data.update(id, score, date)?;
        self.save()
    }
}
