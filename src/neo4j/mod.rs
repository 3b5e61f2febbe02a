//! Neo4j client, storage traits and models for the memory graph

pub mod client;
mod impl_stores;
pub mod models;
pub mod traits;

pub use client::{Neo4jClient, Neo4jStrengthRelation};
pub use models::*;
pub use traits::{HiddenNodeStore, StrengthRelation, VocabularyStore};

#[cfg(test)]
pub(crate) mod mock;
