//! CLI entry point for Reckon.

pub mod commands;

use clap::{Args, Parser, Subcommand};

/// Reckon math & search agent
#[derive(Parser, Debug)]
#[command(name = "reckon", version, about = "Reckon: answers quantitative questions with web search and a calculator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the agent over HTTP (JSON-RPC + SSE)
    Serve(ServeArgs),
    /// Ask a single question and print the answer
    Ask(AskArgs),
    /// Interactive chat keeping one conversation context
    Chat(ChatArgs),
}

/// Arguments for `reckon serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Interface to bind (defaults to RECKON_HOST or localhost)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (defaults to RECKON_PORT or 10000)
    #[arg(long)]
    pub port: Option<u16>,
}

/// Arguments for `reckon ask`.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question
    pub question: String,

    /// Conversation to continue
    #[arg(long)]
    pub context_id: Option<String>,
}

/// Arguments for `reckon chat`.
#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Conversation to continue
    #[arg(long)]
    pub context_id: Option<String>,
}
