//! Answer network
//!
//! Scores candidate answers for a question by propagating activation from
//! the question's words through a layer of hidden concept nodes. Hidden
//! nodes are created lazily, one per distinct word set, and connection
//! strengths live in the two strength relations.

pub mod activation;
pub mod config;
pub mod hidden;

pub use activation::{Network, NetworkState, ScoredAnswer};
pub use config::{DuplicatePolicy, NetworkConfig, WeightFetch};
pub use hidden::{generate_node, get_all, MemoryStores};
