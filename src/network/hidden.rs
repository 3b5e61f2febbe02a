//! Hidden-layer resolution
//!
//! `generate_node` lazily creates the concept node for a word set and seeds
//! its edges; `get_all` lists the hidden nodes reachable from a question.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{NetworkError, Result};
use crate::neo4j::{creation_key, HiddenNode, HiddenNodeStore, StrengthKind, StrengthRelation};

use super::config::{DuplicatePolicy, NetworkConfig, MAX_WEIGHT_PRECISION};

/// Handles to the storage collaborators the network reads and writes.
#[derive(Clone)]
pub struct MemoryStores {
    pub word_strength: Arc<dyn StrengthRelation>,
    pub answer_strength: Arc<dyn StrengthRelation>,
    pub hidden_nodes: Arc<dyn HiddenNodeStore>,
}

impl MemoryStores {
    pub fn new(
        word_strength: Arc<dyn StrengthRelation>,
        answer_strength: Arc<dyn StrengthRelation>,
        hidden_nodes: Arc<dyn HiddenNodeStore>,
    ) -> Self {
        Self {
            word_strength,
            answer_strength,
            hidden_nodes,
        }
    }

    /// Reject handles bound to the wrong relation
    pub fn validate(&self) -> Result<()> {
        if self.word_strength.kind() != StrengthKind::Word {
            return Err(NetworkError::precondition(
                "WordStrength needs to be a word strength relation",
            ));
        }
        if self.answer_strength.kind() != StrengthKind::Answer {
            return Err(NetworkError::precondition(
                "AnswerStrength needs to be an answer strength relation",
            ));
        }
        Ok(())
    }
}

/// Check that a question has at least one word and one answer.
pub(crate) fn validate_question(words: &[Uuid], answers: &[Uuid]) -> Result<()> {
    if words.is_empty() {
        return Err(NetworkError::precondition(
            "We need an array of words from the question",
        ));
    }
    if answers.is_empty() {
        return Err(NetworkError::precondition("We need an array of answers"));
    }
    Ok(())
}

/// Round `value` to `places` decimal places, half away from zero.
///
/// Beyond [`MAX_WEIGHT_PRECISION`] places the value is returned unchanged.
pub fn round_to(value: f64, places: u32) -> f64 {
    if places > MAX_WEIGHT_PRECISION {
        return value;
    }
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Initial word → hidden strength: every word gets an equal share.
pub fn initial_word_strength(word_count: usize, precision: u32) -> f64 {
    round_to(1.0 / word_count as f64, precision)
}

/// Find or create the hidden node for `words` and seed its edges.
///
/// Every word gets `round(1 / |words|)` toward the node and every answer gets
/// `config.answer_prior`. Writes are not transactional: if a later write
/// fails, earlier ones stay committed.
pub async fn generate_node(
    words: &[Uuid],
    answers: &[Uuid],
    stores: &MemoryStores,
    config: &NetworkConfig,
) -> Result<HiddenNode> {
    validate_question(words, answers)?;
    stores.validate()?;
    config.validate()?;

    let key = creation_key(words);
    let node = stores.hidden_nodes.find_or_create(&key).await?;
    info!("Hidden node {} resolved for key {}", node.id, key);

    let word_strength = initial_word_strength(words.len(), config.weight_precision);
    for word in words {
        stores
            .word_strength
            .set(*word, node.id, word_strength)
            .await?;
    }

    for answer in answers {
        stores
            .answer_strength
            .set(*answer, node.id, config.answer_prior)
            .await?;
    }

    debug!(
        "Seeded {} word edges ({}) and {} answer edges ({}) for node {}",
        words.len(),
        word_strength,
        answers.len(),
        config.answer_prior,
        node.id
    );

    Ok(node)
}

/// Hidden nodes reachable from the words or the answers of a question.
///
/// Word targets come first, then answer targets, one entry per stored edge
/// unless `policy` is [`DuplicatePolicy::Deduplicate`].
pub async fn get_all(
    words: &[Uuid],
    answers: &[Uuid],
    stores: &MemoryStores,
    policy: DuplicatePolicy,
) -> Result<Vec<Uuid>> {
    validate_question(words, answers)?;
    stores.validate()?;

    let (from_words, from_answers) = tokio::try_join!(
        stores.word_strength.targets(words),
        stores.answer_strength.targets(answers),
    )?;

    debug!(
        "{} hidden edges from words, {} from answers",
        from_words.len(),
        from_answers.len()
    );

    let all = from_words.into_iter().chain(from_answers);
    let hidden = match policy {
        DuplicatePolicy::Preserve => all.collect(),
        DuplicatePolicy::Deduplicate => {
            let mut seen = HashSet::new();
            all.filter(|id| seen.insert(*id)).collect()
        }
    };

    Ok(hidden)
}
