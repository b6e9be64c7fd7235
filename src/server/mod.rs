//! HTTP front door: agent card, JSON-RPC task API and SSE streaming.

pub mod card;
pub mod jsonrpc;

pub use card::AgentCard;
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::error::ReckonError;
use crate::executor::TaskExecutor;
use crate::task::{Message, TaskEvent};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub executor: TaskExecutor,
    pub card: Arc<AgentCard>,
}

impl AppState {
    pub fn new(executor: TaskExecutor, card: AgentCard) -> Self {
        Self {
            executor,
            card: Arc::new(card),
        }
    }
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(rpc))
        .route("/.well-known/agent.json", get(agent_card))
        .route("/.well-known/agent-card.json", get(agent_card))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on an already-bound listener until ctrl-c.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), ReckonError> {
    let addr = listener.local_addr()?;
    info!(%addr, agent = %state.card.name, "serving");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .await?;
    Ok(())
}

async fn agent_card(State(state): State<AppState>) -> Json<AgentCard> {
    Json(state.card.as_ref().clone())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct MessageSendParams {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct TaskIdParams {
    id: String,
}

async fn rpc(State(state): State<AppState>, body: Bytes) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, "unparseable JSON-RPC body");
            return reply(JsonRpcResponse::failure(Value::Null, JsonRpcError::parse_error()));
        }
    };
    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(_) => {
            return reply(JsonRpcResponse::failure(
                Value::Null,
                JsonRpcError::invalid_request("Request must be a JSON object"),
            ))
        }
    };
    let id = request.id.clone().unwrap_or(Value::Null);
    if request.jsonrpc.as_deref() != Some("2.0") {
        return reply(JsonRpcResponse::failure(
            id,
            JsonRpcError::invalid_request("jsonrpc must be \"2.0\""),
        ));
    }
    let Some(method) = request.method.clone() else {
        return reply(JsonRpcResponse::failure(id, JsonRpcError::invalid_request("missing method")));
    };
    debug!(%method, "JSON-RPC request");

    match method.as_str() {
        "message/send" => message_send(&state, id, request.params).await,
        "message/stream" => message_stream(&state, id, request.params).await,
        "tasks/get" => tasks_get(&state, id, request.params).await,
        "tasks/cancel" => tasks_cancel(&state, id, request.params).await,
        other => reply(JsonRpcResponse::failure(id, JsonRpcError::method_not_found(other))),
    }
}

fn reply(response: JsonRpcResponse) -> Response {
    Json(response).into_response()
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, JsonRpcError> {
    serde_json::from_value(params).map_err(|e| JsonRpcError::invalid_params(e.to_string()))
}

/// Errors from submitting a message. A terminal `taskId` is a bad parameter,
/// not a cancel failure.
fn submit_error(err: &ReckonError) -> JsonRpcError {
    match err {
        ReckonError::InvalidState(detail) => JsonRpcError::invalid_params(detail.clone()),
        other => JsonRpcError::from(other),
    }
}

fn event_value(event: &TaskEvent) -> Value {
    serde_json::to_value(event).unwrap_or(Value::Null)
}

async fn message_send(state: &AppState, id: Value, params: Value) -> Response {
    let params: MessageSendParams = match parse_params(params) {
        Ok(params) => params,
        Err(err) => return reply(JsonRpcResponse::failure(id, err)),
    };
    match state.executor.execute(params.message).await {
        Ok(task) => reply(JsonRpcResponse::success(id, event_value(&TaskEvent::Task(task)))),
        Err(err) => reply(JsonRpcResponse::failure(id, submit_error(&err))),
    }
}

async fn message_stream(state: &AppState, id: Value, params: Value) -> Response {
    let params: MessageSendParams = match parse_params(params) {
        Ok(params) => params,
        Err(err) => return reply(JsonRpcResponse::failure(id, err)),
    };
    let (task, mut events) = match state.executor.start(params.message).await {
        Ok(started) => started,
        Err(err) => return reply(JsonRpcResponse::failure(id, submit_error(&err))),
    };
    debug!(task_id = %task.id, "SSE stream opened");

    let stream = async_stream::stream! {
        while let Some(event) = events.next().await {
            let response = match event {
                Ok(ref event) => JsonRpcResponse::success(id.clone(), event_value(event)),
                Err(ref err) => JsonRpcResponse::failure(id.clone(), JsonRpcError::from(err)),
            };
            match Event::default().json_data(&response) {
                Ok(sse) => yield Ok::<_, Infallible>(sse),
                Err(e) => warn!(error = %e, "failed to serialize SSE event; dropping"),
            }
            if event.is_err() {
                break;
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default()).into_response()
}

async fn tasks_get(state: &AppState, id: Value, params: Value) -> Response {
    let params: TaskIdParams = match parse_params(params) {
        Ok(params) => params,
        Err(err) => return reply(JsonRpcResponse::failure(id, err)),
    };
    match state.executor.get(&params.id).await {
        Ok(task) => reply(JsonRpcResponse::success(id, event_value(&TaskEvent::Task(task)))),
        Err(err) => reply(JsonRpcResponse::failure(id, JsonRpcError::from(&err))),
    }
}

async fn tasks_cancel(state: &AppState, id: Value, params: Value) -> Response {
    let params: TaskIdParams = match parse_params(params) {
        Ok(params) => params,
        Err(err) => return reply(JsonRpcResponse::failure(id, err)),
    };
    match state.executor.cancel(&params.id).await {
        Ok(task) => reply(JsonRpcResponse::success(id, event_value(&TaskEvent::Task(task)))),
        Err(err) => reply(JsonRpcResponse::failure(id, JsonRpcError::from(&err))),
    }
}
