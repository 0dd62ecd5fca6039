//! CLI argument parsing and subcommand dispatch.

use std::path::{Path, PathBuf};

use airman_core::Config;
use airman_rag::eval;
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::router::build_router;
use crate::startup::build_app_state;

#[derive(Parser)]
#[command(name = "airman", version, about = "Grounded question answering over aviation documents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Rebuild the index from a directory of documents
    Ingest {
        /// Source directory (defaults to DATA_DIR)
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Answer one question and print the answer record as JSON
    Ask {
        question: String,
        /// Include the evidence chunks and their scores
        #[arg(long)]
        debug: bool,
    },
    /// Score answers for a question set
    Eval {
        /// JSON file: [{"question": "...", "type": "factual"}, ...]
        #[arg(long)]
        questions: PathBuf,
        #[arg(long, default_value = "evaluation_results.json")]
        output: PathBuf,
    },
}

pub async fn dispatch(config: &Config, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Serve => serve(config).await,
        Command::Ingest { source } => ingest(config, source.as_deref()).await,
        Command::Ask { question, debug } => ask(config, &question, debug).await,
        Command::Eval { questions, output } => evaluate(config, &questions, &output).await,
    }
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let state = build_app_state(config)?;
    let app = build_router(state, &config.server.cors_origin);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://localhost:{} (docs at /docs)", config.server.port);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn ingest(config: &Config, source: Option<&Path>) -> anyhow::Result<()> {
    let state = build_app_state(config)?;
    let report = match source {
        Some(dir) => state.ingestor.ingest_directory(dir).await,
        None => state.ingestor.ingest().await,
    }
    .context("ingestion failed")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn ask(config: &Config, question: &str, debug: bool) -> anyhow::Result<()> {
    let state = build_app_state(config)?;
    let record = state.pipeline.ask(question, debug).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn evaluate(config: &Config, questions: &Path, output: &Path) -> anyhow::Result<()> {
    let state = build_app_state(config)?;
    let questions = eval::load_questions(questions).context("failed to read question set")?;
    info!(questions = questions.len(), "Evaluation started");

    let report = eval::run(&state.pipeline, &questions).await;
    std::fs::write(output, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("{}", serde_json::to_string_pretty(&report.summary)?);
    info!(output = %output.display(), "Evaluation results saved");
    Ok(())
}
