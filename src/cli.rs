use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "newsdesk",
    version,
    about = "Local news retrieval and LinkedIn post drafting tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Ask(AskArgs),
    Sample(SampleArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    #[arg(long, default_value = "data/sample.json")]
    pub corpus_path: PathBuf,

    #[arg(long)]
    pub query: String,

    // Presence of additional content alone routes the request to post
    // generation.
    #[arg(long)]
    pub content: Option<String>,

    #[arg(long, default_value_t = 3)]
    pub top_k: usize,

    // 1.0 is pure semantic ranking, 0.0 pure keyword.
    #[arg(long, default_value_t = 0.5)]
    pub alpha: f64,

    #[arg(long, default_value_t = 3)]
    pub oversample: usize,

    #[arg(long, default_value_t = 200)]
    pub initial_max_length: usize,

    #[arg(long, default_value_t = 3)]
    pub max_iterations: usize,

    #[arg(long)]
    pub min_sentences: Option<usize>,

    #[arg(long, default_value = "miniLM-L6-v2-local-v1")]
    pub model_id: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SampleArgs {
    #[arg(long, default_value = "data/Dataset.json")]
    pub input_path: PathBuf,

    #[arg(long, default_value = "data/sample.json")]
    pub output_path: PathBuf,

    #[arg(long, default_value_t = 1000)]
    pub sample_size: usize,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "data/sample.json")]
    pub corpus_path: PathBuf,

    #[arg(long, default_value = "miniLM-L6-v2-local-v1")]
    pub model_id: String,
}
