//! Tests for the reasoning loop.

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use common::{agent_with, call, BrokenSearch, ScriptedProvider, SlowSearch, StaticSearch};
use reckon::agent_loop::{LoopStep, ReasoningLoop, RunLimits};
use reckon::error::ReckonError;
use reckon::session::{InMemorySessionStore, SessionStore};
use reckon::tools::{calculator_tool, search_tool};
use reckon::types::Role;

async fn collect(agent_loop: &ReasoningLoop, session: &str, query: &str) -> Vec<Result<LoopStep, ReckonError>> {
    agent_loop
        .run(session, query, CancellationToken::new())
        .collect()
        .await
}

#[tokio::test]
async fn search_then_calculate_then_answer() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .tool_call("c1", "search_web", json!({ "query": "Pont des Arts length" }))
            .tool_call("c2", "calculator", json!({ "expression": "155 / 29" }))
            .text("About 5.34 s. Bridge length: 155 m; leopard speed: 29 m/s; 155 / 29 = 5.34."),
    );
    let search = Arc::new(StaticSearch::pont_des_arts());
    let agent = agent_with(provider.clone(), search.clone());

    let steps: Vec<LoopStep> = collect(agent.reasoning(), "ctx", "How long for a leopard to cross Pont des Arts?")
        .await
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(steps.len(), 5);
    assert!(steps[0].requests_tool());
    assert!(matches!(steps[1], LoopStep::Tool { step: 1, .. }));
    assert!(steps[2].requests_tool());
    let calc = steps[3].message().tool_result_part().unwrap();
    assert_eq!(calc.result, json!("5.344827586206897"));
    assert!(steps[4].is_final());

    assert_eq!(search.queries(), vec!["Pont des Arts length".to_string()]);
    let search_result = steps[1].message().tool_result_part().unwrap();
    assert!(search_result.result.as_str().unwrap().contains("155 m long"));
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn same_session_shares_history_and_different_sessions_do_not() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .text("Noted: the bridge is 155 m.")
            .text("155 m.")
            .text("I don't know."),
    );
    let agent = agent_with(provider.clone(), Arc::new(StaticSearch::new(vec![])));
    let reasoning = agent.reasoning();

    collect(reasoning, "alice", "The bridge is 155 m long.").await;
    collect(reasoning, "alice", "How long is the bridge?").await;
    collect(reasoning, "bob", "How long is the bridge?").await;

    let requests = provider.requests();
    // system + user
    assert_eq!(requests[0].messages.len(), 2);
    // system + user + assistant + user
    assert_eq!(requests[1].messages.len(), 4);
    assert_eq!(requests[1].messages[1].text(), "The bridge is 155 m long.");
    // a fresh session only sees its own question
    assert_eq!(requests[2].messages.len(), 2);
    assert_eq!(requests[2].messages[1].text(), "How long is the bridge?");
}

#[tokio::test]
async fn step_budget_ends_the_turn() {
    let mut script = ScriptedProvider::new();
    for i in 0..5 {
        script = script.tool_call(&format!("c{i}"), "calculator", json!({ "expression": "1 + 1" }));
    }
    let provider = Arc::new(script);
    let agent_loop = ReasoningLoop::new(
        provider.clone(),
        vec![calculator_tool()],
        Arc::new(InMemorySessionStore::new()),
    )
    .with_limits(RunLimits {
        max_steps: 3,
        ..RunLimits::default()
    });

    let results = collect(&agent_loop, "s", "loop forever").await;
    let last = results.last().unwrap();
    assert!(matches!(last, Err(ReckonError::BudgetExhausted { max_steps: 3 })));
    assert_eq!(provider.call_count(), 3);
    // three assistant steps and three tool steps before the error
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 6);
}

#[tokio::test(start_paused = true)]
async fn slow_model_times_out() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .with_delay(Duration::from_secs(120))
            .text("too late"),
    );
    let agent_loop = ReasoningLoop::new(provider, vec![], Arc::new(InMemorySessionStore::new()))
        .with_limits(RunLimits {
            model_timeout: Duration::from_secs(5),
            ..RunLimits::default()
        });

    let results = collect(&agent_loop, "s", "hello").await;
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(ReckonError::Timeout(5000))));
}

#[tokio::test(start_paused = true)]
async fn slow_tool_times_out_and_still_answers_the_call() {
    let provider = Arc::new(
        ScriptedProvider::new().tool_call("c1", "search_web", json!({ "query": "cheetah top speed" })),
    );
    let sessions = Arc::new(InMemorySessionStore::new());
    let search = search_tool(
        Arc::new(SlowSearch {
            delay: Duration::from_secs(120),
        }),
        10,
    );
    let agent_loop = ReasoningLoop::new(provider, vec![search], sessions.clone()).with_limits(RunLimits {
        tool_timeout: Duration::from_secs(1),
        ..RunLimits::default()
    });

    let results = collect(&agent_loop, "s", "How fast is a cheetah?").await;
    assert_eq!(results.len(), 2);
    assert!(results[0].as_ref().unwrap().requests_tool());
    assert!(matches!(results[1], Err(ReckonError::Timeout(1000))));

    let session = sessions.get("s").await.unwrap().unwrap();
    let roles: Vec<Role> = session.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::Tool]);
    let answer = session.messages[2].tool_result_part().unwrap();
    assert_eq!(answer.tool_call_id, "c1");
    assert!(answer.is_error);
}

#[tokio::test]
async fn failed_search_leaves_a_history_the_next_turn_can_use() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .tool_call("c1", "search_web", json!({ "query": "Pont des Arts length" }))
            .text("The bridge is 155 m long."),
    );
    let sessions = Arc::new(InMemorySessionStore::new());
    let agent_loop = ReasoningLoop::new(
        provider.clone(),
        vec![search_tool(Arc::new(BrokenSearch), 10)],
        sessions.clone(),
    );

    let results = collect(&agent_loop, "s", "How long is the Pont des Arts?").await;
    assert!(matches!(results.last(), Some(Err(ReckonError::Search(_)))));

    let steps: Vec<LoopStep> = collect(&agent_loop, "s", "Try again from memory.")
        .await
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();
    assert!(steps[0].is_final());

    // system, first question, dangling call, its error answer, follow-up
    let request = &provider.requests()[1];
    let roles: Vec<Role> = request.messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::User, Role::Assistant, Role::Tool, Role::User]
    );
    let answer = request.messages[3].tool_result_part().unwrap();
    assert_eq!(answer.tool_call_id, "c1");
    assert!(answer.is_error);
    assert!(answer.result["error"].as_str().unwrap().contains("connection reset"));
}

#[tokio::test]
async fn only_the_first_parallel_call_runs() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .tool_calls(vec![
                call("c1", "calculator", json!({ "expression": "2 * 3" })),
                call("c2", "calculator", json!({ "expression": "4 * 5" })),
            ])
            .text("6"),
    );
    let sessions = Arc::new(InMemorySessionStore::new());
    let agent_loop = ReasoningLoop::new(provider.clone(), vec![calculator_tool()], sessions.clone());

    let steps: Vec<LoopStep> = collect(&agent_loop, "s", "2*3 and 4*5")
        .await
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();

    let tool_steps: Vec<_> = steps.iter().filter(|s| matches!(s, LoopStep::Tool { .. })).collect();
    assert_eq!(tool_steps.len(), 1);
    assert_eq!(tool_steps[0].message().tool_result_part().unwrap().result, json!("6"));

    let session = sessions.get("s").await.unwrap().unwrap();
    let assistant = &session.messages[1];
    assert_eq!(assistant.tool_calls().len(), 1);
    assert_eq!(assistant.tool_calls()[0].id, "c1");
    // The record keeps what the model actually asked for.
    assert_eq!(session.model_calls[0].requested_tools, vec!["calculator", "calculator"]);
}

#[tokio::test]
async fn unknown_tools_are_reported_to_the_model() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .tool_call("c1", "python", json!({ "code": "print(1)" }))
            .text("I can only use the calculator."),
    );
    let agent_loop = ReasoningLoop::new(provider, vec![calculator_tool()], Arc::new(InMemorySessionStore::new()));

    let steps: Vec<LoopStep> = collect(&agent_loop, "s", "run python")
        .await
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();
    let result = steps[1].message().tool_result_part().unwrap();
    assert!(result.is_error);
    assert_eq!(result.result["error"], "Tool 'python' not found");
    assert!(steps[2].is_final());
}

#[tokio::test]
async fn sessions_record_every_step() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .tool_call("c1", "calculator", json!({ "expression": "100 / 4" }))
            .text("25.0"),
    );
    let sessions = Arc::new(InMemorySessionStore::new());
    let agent_loop = ReasoningLoop::new(provider, vec![calculator_tool()], sessions.clone());
    collect(&agent_loop, "s", "What is 100 / 4?").await;

    let session = sessions.get("s").await.unwrap().unwrap();
    let roles: Vec<Role> = session.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::Tool, Role::Assistant]);
    assert_eq!(session.model_calls.len(), 2);
    assert_eq!(session.model_calls[1].step, 2);
    assert_eq!(session.usage().total_tokens, 45);
}
