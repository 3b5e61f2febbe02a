//! In-memory mock implementations of the storage traits for testing.
//!
//! Uses `tokio::sync::RwLock` collections. Conditionally compiled with
//! `#[cfg(test)]`.

use crate::neo4j::models::*;
use crate::neo4j::traits::{HiddenNodeStore, StrengthRelation, VocabularyStore};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

// ============================================================================
// Strength relation
// ============================================================================

/// In-memory strength relation. Edges are kept in insertion order.
pub struct MockStrengthRelation {
    kind: StrengthKind,
    pub edges: RwLock<Vec<StrengthEdge>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    /// Number of point lookups served by `get`
    pub point_reads: AtomicUsize,
}

impl MockStrengthRelation {
    pub fn new(kind: StrengthKind) -> Self {
        Self {
            kind,
            edges: RwLock::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            point_reads: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent `set` fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent read fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Seed an edge without going through `set`
    pub async fn seed(&self, from: Uuid, to: Uuid, strength: f64) {
        self.edges
            .write()
            .await
            .push(StrengthEdge { from, to, strength });
    }

    pub async fn edge_count(&self) -> usize {
        self.edges.read().await.len()
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("mock {} strength relation: read failed", self.kind);
        }
        Ok(())
    }
}

#[async_trait]
impl StrengthRelation for MockStrengthRelation {
    fn kind(&self) -> StrengthKind {
        self.kind
    }

    async fn get(&self, from: Uuid, to: Uuid) -> Result<Option<f64>> {
        self.check_reads()?;
        self.point_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .edges
            .read()
            .await
            .iter()
            .find(|e| e.from == from && e.to == to)
            .map(|e| e.strength))
    }

    async fn set(&self, from: Uuid, to: Uuid, strength: f64) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("mock {} strength relation: write failed", self.kind);
        }
        let mut edges = self.edges.write().await;
        match edges.iter_mut().find(|e| e.from == from && e.to == to) {
            Some(edge) => edge.strength = strength,
            None => edges.push(StrengthEdge { from, to, strength }),
        }
        Ok(())
    }

    async fn targets(&self, from: &[Uuid]) -> Result<Vec<Uuid>> {
        self.check_reads()?;
        Ok(self
            .edges
            .read()
            .await
            .iter()
            .filter(|e| from.contains(&e.from))
            .map(|e| e.to)
            .collect())
    }

    async fn get_many(&self, from: &[Uuid], to: &[Uuid]) -> Result<HashMap<(Uuid, Uuid), f64>> {
        self.check_reads()?;
        Ok(self
            .edges
            .read()
            .await
            .iter()
            .filter(|e| from.contains(&e.from) && to.contains(&e.to))
            .map(|e| ((e.from, e.to), e.strength))
            .collect())
    }
}

// ============================================================================
// Hidden nodes
// ============================================================================

/// In-memory hidden-node registry.
pub struct MockHiddenNodeStore {
    pub nodes: RwLock<HashMap<String, HiddenNode>>,
    fail: AtomicBool,
}

impl MockHiddenNodeStore {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.nodes.read().await.len()
    }
}

impl Default for MockHiddenNodeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HiddenNodeStore for MockHiddenNodeStore {
    async fn find_or_create(&self, key: &str) -> Result<HiddenNode> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("mock hidden node store: find_or_create failed");
        }
        // Let concurrent callers interleave before taking the lock
        tokio::task::yield_now().await;

        let mut nodes = self.nodes.write().await;
        let node = nodes.entry(key.to_string()).or_insert_with(|| HiddenNode {
            id: Uuid::new_v4(),
            creation_key: key.to_string(),
        });
        Ok(node.clone())
    }

    async fn get_by_key(&self, key: &str) -> Result<Option<HiddenNode>> {
        Ok(self.nodes.read().await.get(key).cloned())
    }
}

// ============================================================================
// Vocabulary
// ============================================================================

/// In-memory word/answer vocabulary keyed by text.
pub struct MockVocabularyStore {
    pub words: RwLock<HashMap<String, WordNode>>,
    pub answers: RwLock<HashMap<String, AnswerNode>>,
}

impl MockVocabularyStore {
    pub fn new() -> Self {
        Self {
            words: RwLock::new(HashMap::new()),
            answers: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MockVocabularyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VocabularyStore for MockVocabularyStore {
    async fn add_word(&self, text: &str) -> Result<WordNode> {
        let mut words = self.words.write().await;
        Ok(words
            .entry(text.to_string())
            .or_insert_with(|| WordNode::new(text))
            .clone())
    }

    async fn add_answer(&self, text: &str) -> Result<AnswerNode> {
        let mut answers = self.answers.write().await;
        Ok(answers
            .entry(text.to_string())
            .or_insert_with(|| AnswerNode::new(text))
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_absent_edge_resolves_to_default() {
        let words = MockStrengthRelation::new(StrengthKind::Word);
        let answers = MockStrengthRelation::new(StrengthKind::Answer);
        let (from, to) = (Uuid::new_v4(), Uuid::new_v4());

        assert_eq!(words.get(from, to).await.unwrap(), None);
        assert_eq!(words.strength(from, to).await.unwrap(), -0.2);
        assert_eq!(answers.strength(from, to).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_set_then_get_is_exact() {
        let words = MockStrengthRelation::new(StrengthKind::Word);
        let (from, to) = (Uuid::new_v4(), Uuid::new_v4());

        words.set(from, to, 0.3333333).await.unwrap();
        assert_eq!(words.strength(from, to).await.unwrap(), 0.3333333);

        // Upsert overwrites in place
        words.set(from, to, -1.5).await.unwrap();
        assert_eq!(words.strength(from, to).await.unwrap(), -1.5);
        assert_eq!(words.edge_count().await, 1);
    }

    #[tokio::test]
    async fn test_explicit_zero_is_distinct_from_absent() {
        let answers = MockStrengthRelation::new(StrengthKind::Answer);
        let (from, to) = (Uuid::new_v4(), Uuid::new_v4());

        answers.set(from, to, 0.0).await.unwrap();
        assert_eq!(answers.get(from, to).await.unwrap(), Some(0.0));
        assert_eq!(answers.get(to, from).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_targets_keep_one_entry_per_edge() {
        let words = MockStrengthRelation::new(StrengthKind::Word);
        let (w1, w2, h) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        words.seed(w1, h, 0.5).await;
        words.seed(w2, h, 0.5).await;
        words.seed(Uuid::new_v4(), Uuid::new_v4(), 0.5).await;

        assert_eq!(words.targets(&[w1, w2]).await.unwrap(), vec![h, h]);
    }

    #[tokio::test]
    async fn test_default_get_many_matches_override() {
        struct PointOnly(MockStrengthRelation);

        #[async_trait]
        impl StrengthRelation for PointOnly {
            fn kind(&self) -> StrengthKind {
                self.0.kind()
            }
            async fn get(&self, from: Uuid, to: Uuid) -> Result<Option<f64>> {
                self.0.get(from, to).await
            }
            async fn set(&self, from: Uuid, to: Uuid, strength: f64) -> Result<()> {
                self.0.set(from, to, strength).await
            }
            async fn targets(&self, from: &[Uuid]) -> Result<Vec<Uuid>> {
                self.0.targets(from).await
            }
        }

        let relation = PointOnly(MockStrengthRelation::new(StrengthKind::Word));
        let (w1, w2, h1, h2) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        relation.set(w1, h1, 0.25).await.unwrap();
        relation.set(w2, h2, -0.75).await.unwrap();

        let looped = relation.get_many(&[w1, w2], &[h1, h2]).await.unwrap();
        let bulk = relation.0.get_many(&[w1, w2], &[h1, h2]).await.unwrap();
        assert_eq!(looped, bulk);
        assert_eq!(looped.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_find_or_create_converges() {
        let store = Arc::new(MockHiddenNodeStore::new());
        let key = creation_key(&[Uuid::new_v4(), Uuid::new_v4()]);

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let store = store.clone();
                let key = key.clone();
                tokio::spawn(async move { store.find_or_create(&key).await.unwrap() })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().id);
        }

        assert_eq!(store.len().await, 1);
        assert!(ids.iter().all(|id| *id == ids[0]));
    }

    #[tokio::test]
    async fn test_vocabulary_upsert_by_text() {
        let vocab = MockVocabularyStore::new();

        let first = vocab.add_word("hello").await.unwrap();
        let again = vocab.add_word("hello").await.unwrap();
        let other = vocab.add_word("world").await.unwrap();
        assert_eq!(first.id, again.id);
        assert_ne!(first.id, other.id);

        let answer = vocab.add_answer("hi there").await.unwrap();
        assert_eq!(vocab.add_answer("hi there").await.unwrap().id, answer.id);
    }
}
