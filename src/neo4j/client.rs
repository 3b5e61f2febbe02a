//! Neo4j client for the question/answer memory graph

use super::models::*;
use anyhow::{anyhow, Context, Result};
use neo4rs::{query, Graph};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Client for Neo4j operations
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

impl Neo4jClient {
    /// Create a new Neo4j client
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;

        let client = Self {
            graph: Arc::new(graph),
        };

        // Initialize schema
        client.init_schema().await?;

        Ok(client)
    }

    /// Initialize the graph schema with constraints and indexes
    async fn init_schema(&self) -> Result<()> {
        let constraints = vec![
            // Vocabulary constraints
            "CREATE CONSTRAINT word_id IF NOT EXISTS FOR (w:Word) REQUIRE w.id IS UNIQUE",
            "CREATE CONSTRAINT word_text IF NOT EXISTS FOR (w:Word) REQUIRE w.text IS UNIQUE",
            "CREATE CONSTRAINT answer_id IF NOT EXISTS FOR (a:Answer) REQUIRE a.id IS UNIQUE",
            "CREATE CONSTRAINT answer_text IF NOT EXISTS FOR (a:Answer) REQUIRE a.text IS UNIQUE",
            // Hidden layer constraints; creation_key uniqueness makes MERGE race-safe
            "CREATE CONSTRAINT hidden_id IF NOT EXISTS FOR (h:HiddenNode) REQUIRE h.id IS UNIQUE",
            "CREATE CONSTRAINT hidden_creation_key IF NOT EXISTS FOR (h:HiddenNode) REQUIRE h.creation_key IS UNIQUE",
        ];

        for constraint in constraints {
            if let Err(e) = self.graph.run(query(constraint)).await {
                tracing::warn!("Constraint may already exist: {}", e);
            }
        }

        Ok(())
    }

    // ========================================================================
    // Vocabulary operations
    // ========================================================================

    /// Get or create a word by its text
    pub async fn add_word(&self, text: &str) -> Result<WordNode> {
        let fresh = WordNode::new(text);
        let node = self
            .merge_by_text("Word", fresh.id, text, &fresh.created_at.to_rfc3339())
            .await?;
        Ok(WordNode {
            id: node.0,
            text: node.1,
            created_at: node.2,
        })
    }

    /// Get or create an answer by its text
    pub async fn add_answer(&self, text: &str) -> Result<AnswerNode> {
        let fresh = AnswerNode::new(text);
        let node = self
            .merge_by_text("Answer", fresh.id, text, &fresh.created_at.to_rfc3339())
            .await?;
        Ok(AnswerNode {
            id: node.0,
            text: node.1,
            created_at: node.2,
        })
    }

    async fn merge_by_text(
        &self,
        label: &str,
        id: Uuid,
        text: &str,
        created_at: &str,
    ) -> Result<(Uuid, String, chrono::DateTime<chrono::Utc>)> {
        let cypher = format!(
            r#"
            MERGE (n:{} {{text: $text}})
            ON CREATE SET n.id = $id, n.created_at = $created_at
            RETURN n
            "#,
            label
        );
        let q = query(&cypher)
            .param("text", text)
            .param("id", id.to_string())
            .param("created_at", created_at);

        let mut result = self.graph.execute(q).await?;
        let row = result
            .next()
            .await?
            .ok_or_else(|| anyhow!("MERGE on {} returned no row", label))?;
        let node: neo4rs::Node = row.get("n")?;

        Ok((
            node.get::<String>("id")?.parse()?,
            node.get("text")?,
            node.get::<String>("created_at")?
                .parse()
                .unwrap_or_else(|_| chrono::Utc::now()),
        ))
    }

    // ========================================================================
    // Hidden node operations
    // ========================================================================

    /// Find the hidden node for `key`, creating it if absent
    pub async fn find_or_create_hidden_node(&self, key: &str) -> Result<HiddenNode> {
        let q = query(
            r#"
            MERGE (h:HiddenNode {creation_key: $key})
            ON CREATE SET h.id = $id, h.created_at = datetime()
            RETURN h
            "#,
        )
        .param("key", key)
        .param("id", Uuid::new_v4().to_string());

        let mut result = self.graph.execute(q).await?;
        let row = result
            .next()
            .await?
            .ok_or_else(|| anyhow!("MERGE on HiddenNode returned no row"))?;
        let node: neo4rs::Node = row.get("h")?;
        self.node_to_hidden(&node)
    }

    /// Get a hidden node by creation key
    pub async fn get_hidden_node_by_key(&self, key: &str) -> Result<Option<HiddenNode>> {
        let q = query(
            r#"
            MATCH (h:HiddenNode {creation_key: $key})
            RETURN h
            "#,
        )
        .param("key", key);

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("h")?;
            Ok(Some(self.node_to_hidden(&node)?))
        } else {
            Ok(None)
        }
    }

    fn node_to_hidden(&self, node: &neo4rs::Node) -> Result<HiddenNode> {
        Ok(HiddenNode {
            id: node.get::<String>("id")?.parse()?,
            creation_key: node.get("creation_key")?,
        })
    }

    // ========================================================================
    // Strength operations
    // ========================================================================

    /// Get the stored strength between a word/answer and a hidden node
    pub async fn get_strength(
        &self,
        kind: StrengthKind,
        from: Uuid,
        to: Uuid,
    ) -> Result<Option<f64>> {
        let cypher = format!(
            r#"
            MATCH (f:{} {{id: $from}})-[s:{}]->(h:HiddenNode {{id: $to}})
            RETURN s.strength AS strength
            "#,
            kind.source_label(),
            kind.relationship()
        );
        let q = query(&cypher)
            .param("from", from.to_string())
            .param("to", to.to_string());

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            Ok(Some(row.get::<f64>("strength")?))
        } else {
            Ok(None)
        }
    }

    /// Upsert the strength between a word/answer and a hidden node.
    ///
    /// Both endpoints must already exist.
    pub async fn set_strength(
        &self,
        kind: StrengthKind,
        from: Uuid,
        to: Uuid,
        strength: f64,
    ) -> Result<()> {
        let cypher = format!(
            r#"
            MATCH (f:{} {{id: $from}}), (h:HiddenNode {{id: $to}})
            MERGE (f)-[s:{}]->(h)
            SET s.strength = $strength
            RETURN count(s) AS updated
            "#,
            kind.source_label(),
            kind.relationship()
        );
        let q = query(&cypher)
            .param("from", from.to_string())
            .param("to", to.to_string())
            .param("strength", strength);

        let mut result = self.graph.execute(q).await?;
        let updated = match result.next().await? {
            Some(row) => row.get::<i64>("updated")?,
            None => 0,
        };
        if updated == 0 {
            return Err(anyhow!(
                "Cannot set {} strength: {} or hidden node {} not found",
                kind,
                from,
                to
            ));
        }
        Ok(())
    }

    /// Targets of every edge leaving one of `from`, one row per edge
    pub async fn strength_targets(&self, kind: StrengthKind, from: &[Uuid]) -> Result<Vec<Uuid>> {
        if from.is_empty() {
            return Ok(vec![]);
        }

        let cypher = format!(
            r#"
            MATCH (f:{})-[:{}]->(h:HiddenNode)
            WHERE f.id IN $ids
            RETURN h.id AS to
            "#,
            kind.source_label(),
            kind.relationship()
        );
        let ids: Vec<String> = from.iter().map(Uuid::to_string).collect();
        let q = query(&cypher).param("ids", ids);

        let mut result = self.graph.execute(q).await?;
        let mut targets = Vec::new();
        while let Some(row) = result.next().await? {
            let to: String = row.get("to")?;
            targets.push(to.parse()?);
        }

        Ok(targets)
    }

    /// All stored strengths between `from` and `to` in one round-trip
    pub async fn get_strengths(
        &self,
        kind: StrengthKind,
        from: &[Uuid],
        to: &[Uuid],
    ) -> Result<HashMap<(Uuid, Uuid), f64>> {
        if from.is_empty() || to.is_empty() {
            return Ok(HashMap::new());
        }

        let cypher = format!(
            r#"
            MATCH (f:{})-[s:{}]->(h:HiddenNode)
            WHERE f.id IN $from AND h.id IN $to
            RETURN f.id AS from, h.id AS to, s.strength AS strength
            "#,
            kind.source_label(),
            kind.relationship()
        );
        let from_ids: Vec<String> = from.iter().map(Uuid::to_string).collect();
        let to_ids: Vec<String> = to.iter().map(Uuid::to_string).collect();
        let q = query(&cypher).param("from", from_ids).param("to", to_ids);

        let mut result = self.graph.execute(q).await?;
        let mut strengths = HashMap::new();
        while let Some(row) = result.next().await? {
            let f: String = row.get("from")?;
            let t: String = row.get("to")?;
            let strength: f64 = row.get("strength")?;
            strengths.insert((f.parse()?, t.parse()?), strength);
        }

        Ok(strengths)
    }
}

/// A [`StrengthRelation`](super::StrengthRelation) handle backed by Neo4j.
///
/// Cheap to clone; all handles share the client's connection pool.
#[derive(Clone)]
pub struct Neo4jStrengthRelation {
    pub(crate) client: Arc<Neo4jClient>,
    pub(crate) kind: StrengthKind,
}

impl Neo4jStrengthRelation {
    pub fn new(client: Arc<Neo4jClient>, kind: StrengthKind) -> Self {
        Self { client, kind }
    }
}
