//! Core domain types for the Draftmill pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current schema version for the persisted selection state format.
pub const CURRENT_STATE_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one pipeline run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Topic / Catalog
// ---------------------------------------------------------------------------

/// One candidate subject from the topic catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    /// Stable unique identifier, never reused.
    pub id: String,
    /// Human-readable subject line.
    pub title: String,
    /// Category labels used for repetition-avoidance grouping.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Relative selection weight. Must be positive.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Optional keywords fed to the generation prompt template.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

fn default_weight() -> f64 {
    1.0
}

impl Topic {
    /// True if this topic shares at least one tag with `other`.
    pub fn shares_tag(&self, other: &Topic) -> bool {
        self.tags.iter().any(|t| other.tags.contains(t))
    }
}

/// Validated, ordered set of candidate topics. Immutable within a run.
#[derive(Debug, Clone)]
pub struct Catalog {
    topics: Vec<Topic>,
}

impl Catalog {
    /// Wrap an already-validated topic list.
    ///
    /// Only the catalog loader constructs these; validation lives there.
    pub fn from_validated(topics: Vec<Topic>) -> Self {
        Self { topics }
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Look up a topic by id.
    pub fn get(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }
}

// ---------------------------------------------------------------------------
// SelectionRecord / SelectionState
// ---------------------------------------------------------------------------

/// One entry in the selection history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionRecord {
    /// Id of the topic that was chosen.
    pub topic_id: String,
    /// When the selection was made.
    pub selected_at: DateTime<Utc>,
    /// Path of the draft artifact produced for this selection.
    pub draft_path: String,
}

/// Persisted history of past topic choices, oldest first.
///
/// Owned by the pipeline orchestrator; mutated only by appending one
/// record per successful run. The state store replaces the file
/// atomically as a whole, never in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionState {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    /// Chronological selection records.
    #[serde(default)]
    pub records: Vec<SelectionRecord>,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_STATE_VERSION,
            records: Vec::new(),
        }
    }
}

impl SelectionState {
    /// Append a record, keeping at most `limit` entries (oldest dropped).
    ///
    /// A `limit` of zero means unbounded.
    pub fn push_trimmed(&mut self, record: SelectionRecord, limit: usize) {
        self.records.push(record);
        if limit > 0 && self.records.len() > limit {
            let excess = self.records.len() - limit;
            self.records.drain(..excess);
        }
    }

    /// Records from most recent to oldest.
    pub fn recent(&self) -> impl Iterator<Item = &SelectionRecord> {
        self.records.iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> SelectionRecord {
        SelectionRecord {
            topic_id: id.into(),
            selected_at: Utc::now(),
            draft_path: format!("drafts/2026-01-01-{id}"),
        }
    }

    #[test]
    fn run_id_roundtrip() {
        let id = RunId::new();
        let s = id.to_string();
        let parsed: RunId = s.parse().expect("parse RunId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn topic_defaults() {
        let toml_str = r#"
id = "a"
title = "Widgets"
"#;
        let topic: Topic = toml::from_str(toml_str).expect("parse topic");
        assert_eq!(topic.weight, 1.0);
        assert!(topic.tags.is_empty());
        assert!(topic.keywords.is_empty());
    }

    #[test]
    fn shares_tag() {
        let a: Topic = toml::from_str(r#"id = "a"
title = "A"
tags = ["layout", "state"]"#)
            .unwrap();
        let b: Topic = toml::from_str(r#"id = "b"
title = "B"
tags = ["state"]"#)
            .unwrap();
        let c: Topic = toml::from_str(r#"id = "c"
title = "C"
tags = ["testing"]"#)
            .unwrap();
        assert!(a.shares_tag(&b));
        assert!(!a.shares_tag(&c));
    }

    #[test]
    fn state_serialization_roundtrip() {
        let mut state = SelectionState::default();
        state.push_trimmed(record("a"), 0);
        state.push_trimmed(record("b"), 0);

        let json = serde_json::to_string_pretty(&state).expect("serialize");
        let parsed: SelectionState = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.schema_version, CURRENT_STATE_VERSION);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[1].topic_id, "b");
    }

    #[test]
    fn push_trimmed_keeps_newest() {
        let mut state = SelectionState::default();
        for id in ["a", "b", "c", "d"] {
            state.push_trimmed(record(id), 3);
        }
        assert_eq!(state.records.len(), 3);
        assert_eq!(state.records[0].topic_id, "b");
        assert_eq!(state.records[2].topic_id, "d");
    }

    #[test]
    fn recent_is_newest_first() {
        let mut state = SelectionState::default();
        state.push_trimmed(record("a"), 0);
        state.push_trimmed(record("b"), 0);
        let ids: Vec<_> = state.recent().map(|r| r.topic_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
