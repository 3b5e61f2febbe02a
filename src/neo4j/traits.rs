//! Storage trait definitions
//!
//! Defines the abstract interfaces the network consumes. `Neo4jClient` and
//! `Neo4jStrengthRelation` are the production implementations; the in-memory
//! mocks back the unit tests.

use std::collections::HashMap;

use crate::neo4j::models::*;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// One strength relation (word → hidden or answer → hidden).
///
/// A handle is bound to a single [`StrengthKind`], which fixes the default
/// returned for absent edges.
#[async_trait]
pub trait StrengthRelation: Send + Sync {
    /// The relation this handle reads and writes
    fn kind(&self) -> StrengthKind;

    /// Point lookup. `None` when no edge is stored for the pair.
    async fn get(&self, from: Uuid, to: Uuid) -> Result<Option<f64>>;

    /// Upsert the edge `(from, to)` with `strength`
    async fn set(&self, from: Uuid, to: Uuid, strength: f64) -> Result<()>;

    /// Targets of every stored edge whose source is in `from`.
    ///
    /// One entry per edge, so a target reached from two sources appears twice.
    async fn targets(&self, from: &[Uuid]) -> Result<Vec<Uuid>>;

    /// Bulk lookup of every stored edge between `from` and `to`.
    ///
    /// Pairs with no edge are absent from the map.
    async fn get_many(&self, from: &[Uuid], to: &[Uuid]) -> Result<HashMap<(Uuid, Uuid), f64>> {
        let mut found = HashMap::new();
        for f in from {
            for t in to {
                if let Some(strength) = self.get(*f, *t).await? {
                    found.insert((*f, *t), strength);
                }
            }
        }
        Ok(found)
    }

    /// Lookup resolved to the relation's default when absent
    async fn strength(&self, from: Uuid, to: Uuid) -> Result<f64> {
        Ok(self
            .get(from, to)
            .await?
            .unwrap_or_else(|| self.kind().default_strength()))
    }
}

/// Registry of hidden nodes keyed by creation key.
#[async_trait]
pub trait HiddenNodeStore: Send + Sync {
    /// Return the node for `key`, creating it if absent.
    ///
    /// Must be atomic: concurrent calls with the same key converge on one node.
    async fn find_or_create(&self, key: &str) -> Result<HiddenNode>;

    /// Look up a node by creation key without creating it
    async fn get_by_key(&self, key: &str) -> Result<Option<HiddenNode>>;
}

/// Words and answers, upserted by text.
#[async_trait]
pub trait VocabularyStore: Send + Sync {
    /// Return the word with this text, creating it if absent
    async fn add_word(&self, text: &str) -> Result<WordNode>;

    /// Return the answer with this text, creating it if absent
    async fn add_answer(&self, text: &str) -> Result<AnswerNode>;
}
