//! CLI command handlers for serve, ask, and chat.

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context};
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::agent::Agent;
use crate::config::ReckonConfig;
use crate::executor::TaskExecutor;
use crate::server::{self, AgentCard, AppState};
use crate::task::InMemoryTaskStore;

use super::{AskArgs, ChatArgs, ServeArgs};

fn build_agent(config: &ReckonConfig) -> anyhow::Result<Agent> {
    if config.api_key().is_none() {
        bail!("OPENAI_API_KEY is required");
    }
    Agent::from_config(config).context("failed to build agent")
}

/// Handle `reckon serve`.
pub async fn handle_serve(args: ServeArgs, mut config: ReckonConfig) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config = config.with_host(host);
    }
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    let agent = build_agent(&config)?;
    let executor = TaskExecutor::new(agent, Arc::new(InMemoryTaskStore::new()))
        .with_stream_delay(config.stream_delay());
    let state = AppState::new(executor, AgentCard::new(config.public_url()));

    let addr = format!("{}:{}", config.host(), config.port());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    server::serve(listener, state).await?;
    Ok(())
}

/// Handle `reckon ask`.
pub async fn handle_ask(args: AskArgs, config: ReckonConfig) -> anyhow::Result<()> {
    let agent = build_agent(&config)?;
    let context_id = args.context_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    run_turn(&agent, &args.question, &context_id).await
}

/// Handle `reckon chat`.
pub async fn handle_chat(args: ChatArgs, config: ReckonConfig) -> anyhow::Result<()> {
    let agent = build_agent(&config)?;
    let context_id = args.context_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    eprintln!("Math & Search Agent (context {context_id}). Empty line or 'exit' to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() || question == "exit" || question == "quit" {
            break;
        }
        // A failed turn leaves the conversation usable.
        if let Err(e) = run_turn(&agent, question, &context_id).await {
            eprintln!("Error: {e}");
        }
    }
    Ok(())
}

async fn run_turn(agent: &Agent, question: &str, context_id: &str) -> anyhow::Result<()> {
    let mut updates = agent.stream(question, context_id, CancellationToken::new());
    while let Some(update) = updates.next().await {
        let update = update?;
        if update.done {
            println!("{}", update.text);
        } else {
            eprintln!("… {}", update.text);
        }
    }
    Ok(())
}
