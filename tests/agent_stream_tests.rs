//! Tests for the agent's progress-update stream.

mod common;

use std::sync::Arc;

use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use common::{agent_with, BrokenSearch, ScriptedProvider, StaticSearch};
use reckon::agent::{AgentUpdate, CALCULATING_TEXT, GATHERING_TEXT, NO_ANSWER_TEXT, PROCESSING_TEXT};
use reckon::error::ReckonError;

fn texts(updates: &[AgentUpdate]) -> Vec<&str> {
    updates.iter().map(|u| u.text.as_str()).collect()
}

#[tokio::test]
async fn lookup_and_computation_produce_progress_then_one_answer() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .tool_call("c1", "search_web", json!({ "query": "Pont des Arts length" }))
            .tool_call("c2", "calculator", json!({ "expression": "155 / 29" }))
            .text("  5.34 s (155 m / 29 m/s; 155 / 29 = 5.34)\n"),
    );
    let agent = agent_with(provider, Arc::new(StaticSearch::pont_des_arts()));

    let updates: Vec<AgentUpdate> = agent
        .stream("How long for a leopard to cross Pont des Arts?", "ctx", CancellationToken::new())
        .map(|u| u.unwrap())
        .collect()
        .await;

    assert_eq!(
        texts(&updates),
        vec![
            PROCESSING_TEXT,
            GATHERING_TEXT,
            CALCULATING_TEXT,
            GATHERING_TEXT,
            CALCULATING_TEXT,
            "5.34 s (155 m / 29 m/s; 155 / 29 = 5.34)",
        ]
    );
    assert_eq!(updates.iter().filter(|u| u.done).count(), 1);
    assert!(updates.last().unwrap().done);
    assert!(updates.iter().all(|u| !u.needs_input));
}

#[tokio::test]
async fn simple_arithmetic_needs_at_most_one_tool() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .tool_call("c1", "calculator", json!({ "expression": "100 / 4" }))
            .text("100 / 4 = 25.0"),
    );
    let agent = agent_with(provider.clone(), Arc::new(StaticSearch::new(vec![])));

    let updates: Vec<AgentUpdate> = agent
        .stream("What is 100 / 4?", "ctx", CancellationToken::new())
        .map(|u| u.unwrap())
        .collect()
        .await;

    let tool_runs = updates.iter().filter(|u| u.text == CALCULATING_TEXT).count();
    assert!(tool_runs <= 1);
    assert_eq!(updates.last().unwrap(), &AgentUpdate::done("100 / 4 = 25.0"));
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn empty_answer_falls_back() {
    let provider = Arc::new(ScriptedProvider::new().text("   "));
    let agent = agent_with(provider, Arc::new(StaticSearch::new(vec![])));

    let answer = agent.ask("Say nothing", "ctx").await.unwrap();
    assert_eq!(answer, NO_ANSWER_TEXT);
}

#[tokio::test]
async fn search_transport_failure_ends_the_stream_with_an_error() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .tool_call("c1", "search_web", json!({ "query": "leopard speed" }))
            .text("unreachable"),
    );
    let agent = agent_with(provider.clone(), Arc::new(BrokenSearch));

    let updates: Vec<Result<AgentUpdate, ReckonError>> = agent
        .stream("How fast is a leopard?", "ctx", CancellationToken::new())
        .collect()
        .await;

    assert_eq!(updates.len(), 3);
    assert_eq!(updates[0].as_ref().unwrap().text, PROCESSING_TEXT);
    assert_eq!(updates[1].as_ref().unwrap().text, GATHERING_TEXT);
    assert!(matches!(updates[2], Err(ReckonError::Search(_))));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn first_update_arrives_before_any_model_call() {
    let provider = Arc::new(ScriptedProvider::new().text("hi"));
    let agent = agent_with(provider.clone(), Arc::new(StaticSearch::new(vec![])));

    let mut stream = agent.stream("hello", "ctx", CancellationToken::new());
    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first, AgentUpdate::progress(PROCESSING_TEXT));
    assert_eq!(provider.call_count(), 0);
}
