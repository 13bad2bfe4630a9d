//! Score ranking store and its request/response contract
//!
//! Two endpoints are supported:
//! - `GET /api/rankings/{level}` returns the top ten scores for a level
//! - `POST /api/score` with `{name, score, level}` keeps the best score per
//!   player and level
//!
//! The API is transport agnostic: `RankingApi::handle` takes a method, a
//! path and an optional JSON body and returns a status code with a JSON
//! body. Storage sits behind the `RankingStore` trait.

use crate::config::Difficulty;
use crate::error::RankingError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// Number of rows returned by a rankings query
pub const TOP_LIMIT: usize = 10;

/// One persisted score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingRow {
    pub id: u64,
    pub name: String,
    pub score: u32,
    pub level: Difficulty,
    /// Seconds since the Unix epoch of the last write
    pub date: u64,
}

/// Public view of a row in a rankings listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub name: String,
    pub score: u32,
}

impl From<&RankingRow> for RankingEntry {
    fn from(row: &RankingRow) -> Self {
        Self {
            name: row.name.clone(),
            score: row.score,
        }
    }
}

/// Result of submitting a score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// First score for this player and level
    Inserted { id: u64 },
    /// Higher than the stored score, which was replaced
    Improved { id: u64 },
    /// Not higher than the stored score, nothing written
    Kept { id: u64 },
}

impl SubmitOutcome {
    pub fn id(&self) -> u64 {
        match *self {
            Self::Inserted { id } | Self::Improved { id } | Self::Kept { id } => id,
        }
    }

    pub fn improved(&self) -> bool {
        !matches!(self, Self::Kept { .. })
    }
}

/// Storage backend for ranking rows
pub trait RankingStore {
    /// Highest scores for a level, best first
    fn top(&self, level: Difficulty, limit: usize) -> Result<Vec<RankingRow>, RankingError>;

    /// The stored row for a player and level, if any
    fn find(&self, name: &str, level: Difficulty) -> Result<Option<RankingRow>, RankingError>;

    /// Insert a new row and return its id
    fn insert(
        &mut self,
        name: &str,
        score: u32,
        level: Difficulty,
        date: u64,
    ) -> Result<u64, RankingError>;

    /// Replace the score of an existing row
    fn update(&mut self, id: u64, score: u32, date: u64) -> Result<(), RankingError>;
}

/// Sort rows for a level by score descending, oldest id first on ties
pub fn rank_rows<'a>(
    rows: impl IntoIterator<Item = &'a RankingRow>,
    level: Difficulty,
    limit: usize,
) -> Vec<RankingRow> {
    let mut ranked: Vec<RankingRow> = rows
        .into_iter()
        .filter(|r| r.level == level)
        .cloned()
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
    ranked.truncate(limit);
    ranked
}

/// In-memory store, also the on-disk shape of file-backed stores
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRankingStore {
    next_id: u64,
    rows: Vec<RankingRow>,
}

impl MemoryRankingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[RankingRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl RankingStore for MemoryRankingStore {
    fn top(&self, level: Difficulty, limit: usize) -> Result<Vec<RankingRow>, RankingError> {
        Ok(rank_rows(&self.rows, level, limit))
    }

    fn find(&self, name: &str, level: Difficulty) -> Result<Option<RankingRow>, RankingError> {
        Ok(self
            .rows
            .iter()
            .find(|r| r.name == name && r.level == level)
            .cloned())
    }

    fn insert(
        &mut self,
        name: &str,
        score: u32,
        level: Difficulty,
        date: u64,
    ) -> Result<u64, RankingError> {
        self.next_id += 1;
        let id = self.next_id;
        self.rows.push(RankingRow {
            id,
            name: name.to_string(),
            score,
            level,
            date,
        });
        Ok(id)
    }

    fn update(&mut self, id: u64, score: u32, date: u64) -> Result<(), RankingError> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RankingError::Storage(format!("no row with id {}", id)))?;
        row.score = score;
        row.date = date;
        Ok(())
    }
}

/// Status code and JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<RankingError> for ApiResponse {
    fn from(err: RankingError) -> Self {
        Self::error(err.status(), err.to_string())
    }
}

/// Ranking endpoints over a store
pub struct RankingApi<S: RankingStore> {
    store: S,
}

impl<S: RankingStore> RankingApi<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Route a request to the matching endpoint
    pub fn handle(&mut self, method: &str, path: &str, body: Option<&Value>) -> ApiResponse {
        debug!("{} {}", method, path);
        match (method, path.strip_prefix("/api/")) {
            ("GET", Some(rest)) if rest.starts_with("rankings/") => {
                self.get_rankings(&rest["rankings/".len()..])
            }
            ("POST", Some("score")) => self.post_score(body.unwrap_or(&Value::Null)),
            _ => ApiResponse::error(404, "Not found"),
        }
    }

    /// `GET /api/rankings/{level}`
    ///
    /// Levels match their stored key exactly. An unknown level has no rows,
    /// so it returns an empty list.
    pub fn get_rankings(&self, level: &str) -> ApiResponse {
        let Some(level) = Difficulty::from_key(level) else {
            return ApiResponse::ok(json!({ "message": "success", "data": [] }));
        };
        match self.top(level) {
            Ok(entries) => ApiResponse::ok(json!({ "message": "success", "data": entries })),
            Err(err) => {
                warn!("Failed to load rankings for {}: {}", level, err);
                err.into()
            }
        }
    }

    /// `POST /api/score`
    pub fn post_score(&mut self, body: &Value) -> ApiResponse {
        let result = parse_submission(body)
            .and_then(|(name, score, level)| self.submit(&name, score, level));

        match result {
            Ok(SubmitOutcome::Kept { id }) => ApiResponse::ok(json!({
                "message": "Score not higher, kept previous",
                "id": id,
                "improved": false,
            })),
            Ok(outcome) => ApiResponse::ok(json!({
                "message": "success",
                "id": outcome.id(),
                "improved": true,
            })),
            Err(err) => {
                if err.status() >= 500 {
                    warn!("Failed to save score: {}", err);
                }
                err.into()
            }
        }
    }

    /// Top entries for a level
    pub fn top(&self, level: Difficulty) -> Result<Vec<RankingEntry>, RankingError> {
        let rows = self.store.top(level, TOP_LIMIT)?;
        Ok(rows.iter().map(RankingEntry::from).collect())
    }

    /// Keep the higher of the stored and submitted score for a player and level
    pub fn submit(
        &mut self,
        name: &str,
        score: u32,
        level: Difficulty,
    ) -> Result<SubmitOutcome, RankingError> {
        let now = unix_now();
        match self.store.find(name, level)? {
            None => {
                let id = self.store.insert(name, score, level, now)?;
                debug!("New ranking {} for {} on {}: {}", id, name, level, score);
                Ok(SubmitOutcome::Inserted { id })
            }
            Some(row) if score > row.score => {
                self.store.update(row.id, score, now)?;
                debug!("Improved ranking for {} on {}: {} -> {}", name, level, row.score, score);
                Ok(SubmitOutcome::Improved { id: row.id })
            }
            Some(row) => Ok(SubmitOutcome::Kept { id: row.id }),
        }
    }
}

fn parse_submission(body: &Value) -> Result<(String, u32, Difficulty), RankingError> {
    let name = body.get("name").filter(|v| !v.is_null());
    let score = body.get("score").filter(|v| !v.is_null());
    let level = body.get("level").filter(|v| !v.is_null());

    let (Some(name), Some(score), Some(level)) = (name, score, level) else {
        return Err(RankingError::MissingFields);
    };

    let name = name
        .as_str()
        .map(str::trim)
        .ok_or_else(|| RankingError::InvalidField("name", "expected a string".to_string()))?;
    if name.is_empty() {
        return Err(RankingError::MissingFields);
    }

    let score = score
        .as_u64()
        .and_then(|s| u32::try_from(s).ok())
        .ok_or_else(|| {
            RankingError::InvalidField("score", "expected a non-negative integer".to_string())
        })?;

    let level = level
        .as_str()
        .ok_or_else(|| RankingError::InvalidField("level", "expected a string".to_string()))?;
    let level = Difficulty::from_key(level).ok_or_else(|| {
        RankingError::InvalidField("level", format!("unknown level `{}`", level))
    })?;

    Ok((name.to_string(), score, level))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
