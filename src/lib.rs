//! Answer Network
//!
//! An associative-memory inference engine with:
//! - Neo4j storage for words, answers, hidden concept nodes and strengths
//! - Lazy, race-safe creation of one hidden node per distinct word set
//! - A single-hidden-layer feed-forward pass that ranks candidate answers

pub mod error;
pub mod neo4j;
pub mod network;

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use neo4j::{Neo4jClient, Neo4jStrengthRelation, StrengthKind, StrengthRelation};
use network::{MemoryStores, Network, NetworkConfig};

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub neo4j: Neo4jYamlConfig,
    pub network: NetworkConfig,
}

/// Neo4j configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jYamlConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Default for Neo4jYamlConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".into(),
            user: "neo4j".into(),
            password: "answer-network".into(),
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub network: NetworkConfig,
}

impl Config {
    /// Load configuration from environment variables only.
    /// Equivalent to from_yaml_and_env(None).
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        Ok(Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(yaml.neo4j.uri),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or(yaml.neo4j.user),
            neo4j_password: std::env::var("NEO4J_PASSWORD").unwrap_or(yaml.neo4j.password),
            network: yaml.network,
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub neo4j: Arc<Neo4jClient>,
    pub stores: MemoryStores,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connect to Neo4j and build the strength relation handles
    pub async fn new(config: Config) -> Result<Self> {
        let neo4j = Arc::new(
            Neo4jClient::new(
                &config.neo4j_uri,
                &config.neo4j_user,
                &config.neo4j_password,
            )
            .await?,
        );

        let stores = MemoryStores::new(
            Arc::new(Neo4jStrengthRelation::new(neo4j.clone(), StrengthKind::Word)),
            Arc::new(Neo4jStrengthRelation::new(neo4j.clone(), StrengthKind::Answer)),
            neo4j.clone(),
        );

        Ok(Self {
            neo4j,
            stores,
            config: Arc::new(config),
        })
    }

    /// The strength relation handle for `kind`
    pub fn relation(&self, kind: StrengthKind) -> Arc<dyn StrengthRelation> {
        match kind {
            StrengthKind::Word => self.stores.word_strength.clone(),
            StrengthKind::Answer => self.stores.answer_strength.clone(),
        }
    }

    /// Build an unconfigured network for a question
    pub fn network(&self, words: Vec<Uuid>, answers: Vec<Uuid>) -> error::Result<Network> {
        Network::new(
            words,
            answers,
            self.stores.clone(),
            self.config.network.clone(),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
