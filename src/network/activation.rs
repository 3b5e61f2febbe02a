//! Feed-forward answer network
//!
//! A single-hidden-layer network assembled on demand from stored strengths:
//! 1. **Hidden layer**: nodes reachable from the question's words and answers
//! 2. **Weights**: `wi[word][hidden]` and `wo[hidden][answer]` loaded from the
//!    two strength relations
//! 3. **Feed-forward**: `tanh` activations from fixed unit inputs to one score
//!    per answer

use std::collections::HashMap;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{NetworkError, Result};
use crate::neo4j::StrengthRelation;

use super::config::{NetworkConfig, WeightFetch};
use super::hidden::{get_all, validate_question, MemoryStores};

/// Setup progress of a [`Network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkState {
    Created,
    HiddenResolved,
    WeightsLoaded,
    Ready,
}

/// An answer with its feed-forward score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAnswer {
    pub answer_id: Uuid,
    pub score: f64,
}

/// Hidden and output activations of one forward pass.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Activations {
    pub hidden: Vec<f64>,
    pub output: Vec<f64>,
}

/// Run one forward pass.
///
/// `ah[i] = tanh(Σ_j ai[j]·wi[j][i])`, then `ao[k] = tanh(Σ_i ah[i]·wo[i][k])`.
/// With no hidden nodes every output is `tanh(0) = 0`. Weights missing from a
/// short row contribute nothing.
pub(crate) fn forward(
    ai: &[f64],
    wi: &[Vec<f64>],
    wo: &[Vec<f64>],
    hidden_len: usize,
    answer_len: usize,
) -> Activations {
    let hidden: Vec<f64> = (0..hidden_len)
        .map(|i| weighted_sum(ai, wi, i).tanh())
        .collect();

    let output = (0..answer_len)
        .map(|k| weighted_sum(&hidden, wo, k).tanh())
        .collect();

    Activations { hidden, output }
}

/// `Σ_j inputs[j]·weights[j][column]`
fn weighted_sum(inputs: &[f64], weights: &[Vec<f64>], column: usize) -> f64 {
    inputs
        .iter()
        .zip(weights)
        .filter_map(|(input, row)| row.get(column).map(|w| input * w))
        .sum()
}

/// Which way a matrix row/column pair maps onto a strength edge.
#[derive(Debug, Clone, Copy)]
enum Orientation {
    /// row is the edge source (`wi`: word → hidden)
    RowIsSource,
    /// column is the edge source (`wo`: answer → hidden, read hidden → answer)
    ColumnIsSource,
}

impl Orientation {
    fn edge(self, row: Uuid, column: Uuid) -> (Uuid, Uuid) {
        match self {
            Orientation::RowIsSource => (row, column),
            Orientation::ColumnIsSource => (column, row),
        }
    }
}

/// Load a `rows × columns` weight matrix from `relation`.
async fn fetch_matrix(
    relation: &dyn StrengthRelation,
    rows: &[Uuid],
    columns: &[Uuid],
    orientation: Orientation,
    strategy: WeightFetch,
) -> Result<Vec<Vec<f64>>> {
    let matrix = match strategy {
        WeightFetch::Sequential => {
            let mut matrix = Vec::with_capacity(rows.len());
            for row in rows {
                let mut weights = Vec::with_capacity(columns.len());
                for column in columns {
                    let (from, to) = orientation.edge(*row, *column);
                    weights.push(relation.strength(from, to).await?);
                }
                matrix.push(weights);
            }
            matrix
        }
        WeightFetch::Concurrent => {
            let lookups = rows.iter().flat_map(|row| {
                columns.iter().map(move |column| {
                    let (from, to) = orientation.edge(*row, *column);
                    relation.strength(from, to)
                })
            });
            let flat = try_join_all(lookups).await?;
            if columns.is_empty() {
                vec![Vec::new(); rows.len()]
            } else {
                flat.chunks(columns.len()).map(<[f64]>::to_vec).collect()
            }
        }
        WeightFetch::Batched => {
            let (sources, targets) = match orientation {
                Orientation::RowIsSource => (rows, columns),
                Orientation::ColumnIsSource => (columns, rows),
            };
            let stored: HashMap<(Uuid, Uuid), f64> = relation.get_many(sources, targets).await?;
            let default = relation.kind().default_strength();
            rows.iter()
                .map(|row| {
                    columns
                        .iter()
                        .map(|column| {
                            let edge = orientation.edge(*row, *column);
                            stored.get(&edge).copied().unwrap_or(default)
                        })
                        .collect()
                })
                .collect()
        }
    };

    Ok(matrix)
}

/// Answer-scoring network for one question.
///
/// Call [`Network::setup`] first; [`Network::feed_forward`] fails until the
/// weights are loaded.
pub struct Network {
    words: Vec<Uuid>,
    answers: Vec<Uuid>,
    stores: MemoryStores,
    config: NetworkConfig,
    state: NetworkState,
    hidden: Vec<Uuid>,
    // Activations
    ai: Vec<f64>,
    ah: Vec<f64>,
    ao: Vec<f64>,
    // Weights
    wi: Vec<Vec<f64>>,
    wo: Vec<Vec<f64>>,
}

impl Network {
    /// Create a network for `words` and candidate `answers`.
    ///
    /// Fails with `Precondition` when either list is empty, a strength
    /// handle is bound to the wrong relation, or `config` is out of range.
    pub fn new(
        words: Vec<Uuid>,
        answers: Vec<Uuid>,
        stores: MemoryStores,
        config: NetworkConfig,
    ) -> Result<Self> {
        validate_question(&words, &answers)?;
        stores.validate()?;
        config.validate()?;

        Ok(Self {
            words,
            answers,
            stores,
            config,
            state: NetworkState::Created,
            hidden: Vec::new(),
            ai: Vec::new(),
            ah: Vec::new(),
            ao: Vec::new(),
            wi: Vec::new(),
            wo: Vec::new(),
        })
    }

    /// Resolve the hidden layer and load both weight matrices.
    ///
    /// The first storage error aborts setup and leaves the network not ready.
    /// Calling it again reloads everything from storage.
    pub async fn setup(&mut self) -> Result<()> {
        self.state = NetworkState::Created;

        self.hidden = get_all(
            &self.words,
            &self.answers,
            &self.stores,
            self.config.duplicate_policy,
        )
        .await?;
        self.state = NetworkState::HiddenResolved;
        debug!("Hidden layer resolved: {} nodes", self.hidden.len());

        self.ai = vec![1.0; self.words.len()];
        self.ah = vec![1.0; self.hidden.len()];
        self.ao = vec![1.0; self.answers.len()];

        let strategy = self.config.weight_fetch;
        self.wi = fetch_matrix(
            self.stores.word_strength.as_ref(),
            &self.words,
            &self.hidden,
            Orientation::RowIsSource,
            strategy,
        )
        .await?;
        debug!(
            "Loaded word weights: {}x{} ({:?})",
            self.words.len(),
            self.hidden.len(),
            strategy
        );

        self.wo = fetch_matrix(
            self.stores.answer_strength.as_ref(),
            &self.hidden,
            &self.answers,
            Orientation::ColumnIsSource,
            strategy,
        )
        .await?;
        self.state = NetworkState::WeightsLoaded;
        debug!(
            "Loaded answer weights: {}x{} ({:?})",
            self.hidden.len(),
            self.answers.len(),
            strategy
        );

        self.state = NetworkState::Ready;
        Ok(())
    }

    /// Compute one score per answer, in configured answer order.
    ///
    /// No I/O; repeated calls on an unchanged network return identical output.
    pub fn feed_forward(&mut self) -> Result<Vec<f64>> {
        if self.state != NetworkState::Ready {
            return Err(NetworkError::precondition(format!(
                "feed_forward requires a ready network (state: {:?}); did you run setup first?",
                self.state
            )));
        }

        let activations = forward(
            &self.ai,
            &self.wi,
            &self.wo,
            self.hidden.len(),
            self.answers.len(),
        );
        self.ah = activations.hidden;
        self.ao = activations.output;

        Ok(self.ao.clone())
    }

    /// Score every answer and sort by score, highest first.
    ///
    /// Ties keep the configured answer order; NaN scores sort last.
    pub fn rank(&mut self) -> Result<Vec<ScoredAnswer>> {
        let scores = self.feed_forward()?;
        let mut ranked: Vec<ScoredAnswer> = self
            .answers
            .iter()
            .zip(scores)
            .map(|(answer_id, score)| ScoredAnswer {
                answer_id: *answer_id,
                score,
            })
            .collect();

        // Stable sort; `-0.0` and `0.0` compare equal
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or_else(|| a.score.is_nan().cmp(&b.score.is_nan()))
        });

        Ok(ranked)
    }

    pub fn state(&self) -> NetworkState {
        self.state
    }

    pub fn words(&self) -> &[Uuid] {
        &self.words
    }

    pub fn answers(&self) -> &[Uuid] {
        &self.answers
    }

    /// Hidden-layer node ids, in the order used by the weight matrices
    pub fn hidden(&self) -> &[Uuid] {
        &self.hidden
    }

    pub fn input_activations(&self) -> &[f64] {
        &self.ai
    }

    pub fn hidden_activations(&self) -> &[f64] {
        &self.ah
    }

    pub fn output_activations(&self) -> &[f64] {
        &self.ao
    }

    /// `wi[word][hidden]`
    pub fn word_weights(&self) -> &[Vec<f64>] {
        &self.wi
    }

    /// `wo[hidden][answer]`
    pub fn answer_weights(&self) -> &[Vec<f64>] {
        &self.wo
    }
}
