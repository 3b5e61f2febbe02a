//! Neo4j graph models for the question/answer memory

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Separator used when joining sorted word ids into a creation key.
pub const CREATION_KEY_SEPARATOR: &str = ":";

// ============================================================================
// Vocabulary Nodes
// ============================================================================

/// A word seen in a question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordNode {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl WordNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// A candidate answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerNode {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl AnswerNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// Hidden layer
// ============================================================================

/// A concept node bridging a set of words to a set of answers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HiddenNode {
    pub id: Uuid,
    /// Sorted word ids joined with `:`; unique across all hidden nodes
    pub creation_key: String,
}

/// Build the canonical creation key for a word set.
///
/// Ids are compared as strings, so `[b, a]` and `[a, b]` yield the same key.
pub fn creation_key(words: &[Uuid]) -> String {
    let mut ids: Vec<String> = words.iter().map(Uuid::to_string).collect();
    ids.sort();
    ids.join(CREATION_KEY_SEPARATOR)
}

// ============================================================================
// Strength relations
// ============================================================================

/// Which strength relation an edge belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthKind {
    /// word → hidden node
    Word,
    /// answer → hidden node (read as hidden → answer during feed-forward)
    Answer,
}

impl StrengthKind {
    /// Strength reported for a pair with no stored edge.
    ///
    /// Unseen word/hidden pairs are inhibitory; unseen answer pairs are neutral.
    pub fn default_strength(self) -> f64 {
        match self {
            StrengthKind::Word => -0.2,
            StrengthKind::Answer => 0.0,
        }
    }

    /// Label of the source node in Neo4j
    pub fn source_label(self) -> &'static str {
        match self {
            StrengthKind::Word => "Word",
            StrengthKind::Answer => "Answer",
        }
    }

    /// Relationship type in Neo4j
    pub fn relationship(self) -> &'static str {
        match self {
            StrengthKind::Word => "WORD_STRENGTH",
            StrengthKind::Answer => "ANSWER_STRENGTH",
        }
    }
}

impl std::fmt::Display for StrengthKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrengthKind::Word => write!(f, "word"),
            StrengthKind::Answer => write!(f, "answer"),
        }
    }
}

impl std::str::FromStr for StrengthKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "word" => Ok(StrengthKind::Word),
            "answer" => Ok(StrengthKind::Answer),
            other => Err(format!("unknown strength relation '{}'", other)),
        }
    }
}

/// A directed weighted edge from a word or answer to a hidden node
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StrengthEdge {
    pub from: Uuid,
    pub to: Uuid,
    pub strength: f64,
}
