//! Answer Network - command line entry point
//!
//! Scores candidate answers against a question stored in Neo4j.

use answer_network::neo4j::{StrengthKind, StrengthRelation, VocabularyStore};
use answer_network::network::generate_node;
use answer_network::{AppState, Config};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "answer-network")]
#[command(about = "Associative-memory answer scoring")]
struct Cli {
    /// Path to the YAML config file
    #[arg(short, long, env = "ANSWER_NETWORK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a word (returns the existing one if the text is known)
    AddWord { text: String },

    /// Register an answer (returns the existing one if the text is known)
    AddAnswer { text: String },

    /// Create or refresh the hidden node linking these words and answers
    ///
    /// Every word and answer must already be registered. An unknown id fails
    /// the command after the hidden node is created; edges written before the
    /// failure are kept.
    Learn {
        #[arg(short, long = "word", required = true)]
        words: Vec<Uuid>,

        #[arg(short, long = "answer", required = true)]
        answers: Vec<Uuid>,
    },

    /// Score candidate answers for a question
    Score {
        #[arg(short, long = "word", required = true)]
        words: Vec<Uuid>,

        #[arg(short, long = "answer", required = true)]
        answers: Vec<Uuid>,

        /// Print the ranking as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read a strength (defaulted when no edge is stored)
    GetStrength {
        #[arg(short, long)]
        relation: StrengthKind,

        #[arg(long)]
        from: Uuid,

        #[arg(long)]
        to: Uuid,
    },

    /// Overwrite or create a strength edge
    ///
    /// Both the word/answer and the hidden node must already exist.
    SetStrength {
        #[arg(short, long)]
        relation: StrengthKind,

        #[arg(long)]
        from: Uuid,

        #[arg(long)]
        to: Uuid,

        #[arg(long, allow_hyphen_values = true)]
        value: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,answer_network=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config::from_yaml_and_env(cli.config.as_deref())?;
    let state = AppState::new(config).await?;
    tracing::info!("Connected to Neo4j");

    match cli.command {
        Commands::AddWord { text } => {
            let vocabulary: &dyn VocabularyStore = state.neo4j.as_ref();
            let word = vocabulary.add_word(&text).await?;
            println!("{}", word.id);
        }
        Commands::AddAnswer { text } => {
            let vocabulary: &dyn VocabularyStore = state.neo4j.as_ref();
            let answer = vocabulary.add_answer(&text).await?;
            println!("{}", answer.id);
        }
        Commands::Learn { words, answers } => {
            let node = generate_node(&words, &answers, &state.stores, &state.config.network).await?;
            println!("{} {}", node.id, node.creation_key);
        }
        Commands::Score {
            words,
            answers,
            json,
        } => run_score(&state, words, answers, json).await?,
        Commands::GetStrength { relation, from, to } => {
            let strength = state.relation(relation).strength(from, to).await?;
            println!("{}", strength);
        }
        Commands::SetStrength {
            relation,
            from,
            to,
            value,
        } => {
            state.relation(relation).set(from, to, value).await?;
            tracing::info!("Set {} strength {} -> {} = {}", relation, from, to, value);
        }
    }

    Ok(())
}

async fn run_score(
    state: &AppState,
    words: Vec<Uuid>,
    answers: Vec<Uuid>,
    json: bool,
) -> Result<()> {
    let mut network = state.network(words, answers)?;
    network.setup().await?;
    let ranked = network.rank()?;

    tracing::info!(
        "Scored {} answers over {} hidden nodes",
        ranked.len(),
        network.hidden().len()
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
    } else {
        for answer in &ranked {
            println!("{:>10.6}  {}", answer.score, answer.answer_id);
        }
    }

    Ok(())
}
