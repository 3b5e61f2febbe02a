//! Storage trait implementations for the Neo4j backend.
//!
//! Every method simply delegates to the corresponding inherent method on `Neo4jClient`.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use super::client::{Neo4jClient, Neo4jStrengthRelation};
use super::models::*;
use super::traits::{HiddenNodeStore, StrengthRelation, VocabularyStore};

#[async_trait]
impl StrengthRelation for Neo4jStrengthRelation {
    fn kind(&self) -> StrengthKind {
        self.kind
    }

    async fn get(&self, from: Uuid, to: Uuid) -> anyhow::Result<Option<f64>> {
        self.client.get_strength(self.kind, from, to).await
    }

    async fn set(&self, from: Uuid, to: Uuid, strength: f64) -> anyhow::Result<()> {
        self.client.set_strength(self.kind, from, to, strength).await
    }

    async fn targets(&self, from: &[Uuid]) -> anyhow::Result<Vec<Uuid>> {
        self.client.strength_targets(self.kind, from).await
    }

    async fn get_many(
        &self,
        from: &[Uuid],
        to: &[Uuid],
    ) -> anyhow::Result<HashMap<(Uuid, Uuid), f64>> {
        self.client.get_strengths(self.kind, from, to).await
    }
}

#[async_trait]
impl HiddenNodeStore for Neo4jClient {
    async fn find_or_create(&self, key: &str) -> anyhow::Result<HiddenNode> {
        self.find_or_create_hidden_node(key).await
    }

    async fn get_by_key(&self, key: &str) -> anyhow::Result<Option<HiddenNode>> {
        self.get_hidden_node_by_key(key).await
    }
}

#[async_trait]
impl VocabularyStore for Neo4jClient {
    async fn add_word(&self, text: &str) -> anyhow::Result<WordNode> {
        self.add_word(text).await
    }

    async fn add_answer(&self, text: &str) -> anyhow::Result<AnswerNode> {
        self.add_answer(text).await
    }
}
