use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::RitualState;
use crate::artifact::{ArtifactHandle, ArtifactStore};

/// How the reading of a completed ritual is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadingMode {
    /// Use whatever the description call resolves to (possibly nothing).
    Resolved,
    /// Always use this fixed text; the description call is skipped.
    Placeholder(String),
}

/// Which gateway strategy served a ritual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Mock,
    Live,
}

impl Strategy {
    pub fn from_mock_flag(use_mock: bool) -> Self {
        if use_mock { Strategy::Mock } else { Strategy::Live }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Mock => write!(f, "mock"),
            Strategy::Live => write!(f, "live"),
        }
    }
}

/// The terminal artifact bundle of a completed ritual.
#[derive(Debug, PartialEq, Eq)]
pub struct ProcessedImage {
    pub source_name: String,
    pub original: ArtifactHandle,
    pub processed: ArtifactHandle,
    pub reading: Option<String>,
}

impl ProcessedImage {
    /// Release both handles. Consuming `self` keeps the pair from being
    /// released partially or twice.
    pub fn release(self, store: &mut ArtifactStore) {
        store.release(&self.original);
        store.release(&self.processed);
    }
}

/// One end-to-end submission-to-result cycle.
#[derive(Debug, Clone)]
pub struct Ritual {
    pub id: String,
    pub file_name: String,
    pub input_bytes: usize,
    pub strategy: Strategy,
    pub state_history: Vec<RitualState>,
    pub reading: Option<String>,
    pub failure: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl Ritual {
    pub fn begin(file_name: String, input_bytes: usize, strategy: Strategy) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            file_name,
            input_bytes,
            strategy,
            state_history: vec![RitualState::Severing],
            reading: None,
            failure: None,
            started_at: Utc::now(),
        }
    }

    pub fn record(&mut self, state: RitualState) {
        self.state_history.push(state);
    }
}

/// Structured record produced when a ritual reaches a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RitualRecord {
    pub ritual_id: String,
    pub file_name: String,
    pub input_bytes: usize,
    pub strategy: Strategy,
    pub state_transitions: Vec<RitualState>,
    pub reading: Option<String>,
    pub failure: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl RitualRecord {
    pub fn from_ritual(ritual: &Ritual) -> Self {
        let now = Utc::now();
        let duration = now - ritual.started_at;

        Self {
            ritual_id: ritual.id.clone(),
            file_name: ritual.file_name.clone(),
            input_bytes: ritual.input_bytes,
            strategy: ritual.strategy,
            state_transitions: ritual.state_history.clone(),
            reading: ritual.reading.clone(),
            failure: ritual.failure.clone(),
            started_at: ritual.started_at,
            completed_at: now,
            duration_ms: duration.num_milliseconds(),
        }
    }
}
