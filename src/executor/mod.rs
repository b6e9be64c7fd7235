//! Task executor: turns agent updates into task lifecycle events.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_stream::try_stream;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::agent::{Agent, AgentUpdate};
use crate::error::ReckonError;
use crate::task::{
    Artifact, Message, MessageRole, Task, TaskArtifactUpdateEvent, TaskEvent, TaskState, TaskStatus,
    TaskStatusUpdateEvent, TaskStore, RESULT_ARTIFACT_NAME,
};

/// Text placed in the status of a failed task.
pub const FAILED_TEXT: &str = "Internal error";

/// Text placed in the status of a canceled task.
pub const CANCELED_TEXT: &str = "Task canceled.";

/// Events for one task, starting with the task itself.
pub type TaskEventStream = BoxStream<'static, Result<TaskEvent, ReckonError>>;

/// Cancellation handle of the run currently driving a task.
struct RunningTask {
    run_id: Uuid,
    cancel: CancellationToken,
}

type RunningTasks = Arc<Mutex<HashMap<String, RunningTask>>>;

/// Runs agent turns as tasks.
#[derive(Clone)]
pub struct TaskExecutor {
    agent: Agent,
    tasks: Arc<dyn TaskStore>,
    stream_delay: Duration,
    running: RunningTasks,
}

impl TaskExecutor {
    pub fn new(agent: Agent, tasks: Arc<dyn TaskStore>) -> Self {
        Self {
            agent,
            tasks,
            stream_delay: Duration::from_millis(100),
            running: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Pause after each working update so streaming clients can attach.
    pub fn with_stream_delay(mut self, delay: Duration) -> Self {
        self.stream_delay = delay;
        self
    }

    pub fn tasks(&self) -> &Arc<dyn TaskStore> {
        &self.tasks
    }

    /// Create (or resume) the task for `message` and return its event stream.
    ///
    /// The task is stored before this returns; work happens as the stream is
    /// polled. A message without a text part is rejected with
    /// [`ReckonError::InvalidArgument`]; a follow-up for a task that is still
    /// running, or already terminal, with [`ReckonError::InvalidState`].
    pub async fn start(&self, message: Message) -> Result<(Task, TaskEventStream), ReckonError> {
        if message.role != MessageRole::User {
            return Err(ReckonError::InvalidArgument("message role must be 'user'".into()));
        }
        let query = message
            .text()
            .ok_or_else(|| ReckonError::InvalidArgument("message has no text part".into()))?;

        let cancel = CancellationToken::new();
        let (task, guard) = match message.task_id.clone() {
            Some(task_id) => {
                let guard = self.claim(&task_id, &cancel)?;
                (self.resume(&task_id, message).await?, guard)
            }
            None => {
                let context_id = message
                    .context_id
                    .clone()
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                let task = Task::submitted(context_id, message);
                let guard = self.claim(&task.id, &cancel)?;
                self.tasks.insert(task.clone()).await?;
                (task, guard)
            }
        };
        info!(task_id = %task.id, context_id = %task.context_id, "task submitted");

        let events = self.drive(task.clone(), query, cancel, guard);
        Ok((task, events))
    }

    /// Run the task for `message` to completion and return its final state.
    ///
    /// Failures are reported as the opaque [`ReckonError::Internal`]; the
    /// cause is only logged.
    pub async fn execute(&self, message: Message) -> Result<Task, ReckonError> {
        let (task, mut events) = self.start(message).await?;
        while let Some(event) = events.next().await {
            event?;
        }
        self.get(&task.id).await
    }

    pub async fn get(&self, task_id: &str) -> Result<Task, ReckonError> {
        self.tasks
            .get(task_id)
            .await?
            .ok_or_else(|| ReckonError::TaskNotFound(task_id.to_string()))
    }

    /// Mark a task canceled and stop its loop at the next step boundary.
    pub async fn cancel(&self, task_id: &str) -> Result<Task, ReckonError> {
        let current = self.get(task_id).await?;
        if current.status.state.is_terminal() {
            return Err(ReckonError::InvalidState(format!(
                "task {task_id} is already {}",
                current.status.state
            )));
        }
        let message = Message::agent_text(CANCELED_TEXT, &current.context_id, task_id);
        let task = self
            .tasks
            .transition(task_id, TaskStatus::new(TaskState::Canceled, Some(message)))
            .await?;
        let token = self
            .running
            .lock()
            .ok()
            .and_then(|running| running.get(task_id).map(|run| run.cancel.clone()));
        if let Some(token) = token {
            token.cancel();
        }
        info!(task_id, "task canceled");
        Ok(task)
    }

    /// Register `cancel` as the only run of `task_id`.
    fn claim(&self, task_id: &str, cancel: &CancellationToken) -> Result<RunningGuard, ReckonError> {
        let mut running = self.running.lock().map_err(|_| ReckonError::Internal)?;
        if running.contains_key(task_id) {
            return Err(ReckonError::InvalidState(format!("task {task_id} is still running")));
        }
        let run_id = Uuid::new_v4();
        running.insert(
            task_id.to_string(),
            RunningTask {
                run_id,
                cancel: cancel.clone(),
            },
        );
        Ok(RunningGuard {
            running: self.running.clone(),
            task_id: task_id.to_string(),
            run_id,
        })
    }

    async fn resume(&self, task_id: &str, mut message: Message) -> Result<Task, ReckonError> {
        let current = self.get(task_id).await?;
        message.context_id = Some(current.context_id);
        self.tasks.append_message(task_id, message).await
    }

    fn drive(
        &self,
        task: Task,
        query: String,
        cancel: CancellationToken,
        guard: RunningGuard,
    ) -> TaskEventStream {
        let this = self.clone();
        Box::pin(try_stream! {
            let _guard = guard;
            yield TaskEvent::Task(task.clone());

            let mut updates = this.agent.stream(query, task.context_id.clone(), cancel);
            while let Some(update) = updates.next().await {
                let applied = match update {
                    Ok(update) => this.apply(&task, update).await,
                    Err(err) => Err(err),
                };
                match applied {
                    Ok(events) => {
                        let mut finished = false;
                        for event in events {
                            finished |= event.is_final();
                            yield event;
                        }
                        if finished {
                            break;
                        }
                        tokio::time::sleep(this.stream_delay).await;
                    }
                    Err(err) => {
                        let (event, failure) = this.settle(&task, err).await;
                        if let Some(event) = event {
                            yield event;
                        }
                        if let Some(failure) = failure {
                            Err::<(), _>(failure)?;
                        }
                        break;
                    }
                }
            }
        })
    }

    /// Record one agent update and return the events it produced.
    async fn apply(&self, task: &Task, update: AgentUpdate) -> Result<Vec<TaskEvent>, ReckonError> {
        if !update.done {
            debug!(task_id = %task.id, text = %update.text, "task working");
            let message = Message::agent_text(update.text, &task.context_id, &task.id);
            let stored = self
                .tasks
                .transition(&task.id, TaskStatus::new(TaskState::Working, Some(message)))
                .await?;
            return Ok(vec![TaskEvent::StatusUpdate(TaskStatusUpdateEvent {
                task_id: task.id.clone(),
                context_id: task.context_id.clone(),
                status: stored.status,
                is_final: false,
            })]);
        }

        let artifact = Artifact::text(RESULT_ARTIFACT_NAME, update.text);
        let stored = self.tasks.complete(&task.id, artifact.clone()).await?;
        info!(task_id = %task.id, "task completed");
        Ok(vec![
            TaskEvent::ArtifactUpdate(TaskArtifactUpdateEvent {
                task_id: task.id.clone(),
                context_id: task.context_id.clone(),
                artifact,
                append: false,
                last_chunk: true,
            }),
            TaskEvent::StatusUpdate(TaskStatusUpdateEvent {
                task_id: task.id.clone(),
                context_id: task.context_id.clone(),
                status: stored.status,
                is_final: true,
            }),
        ])
    }

    /// Resolve a failed turn into its final event and the error to surface.
    ///
    /// A task canceled meanwhile ends quietly with its canceled status.
    /// Anything else is logged, recorded as `failed` and surfaced as
    /// [`ReckonError::Internal`].
    async fn settle(&self, task: &Task, err: ReckonError) -> (Option<TaskEvent>, Option<ReckonError>) {
        let final_event = |status: TaskStatus| {
            TaskEvent::StatusUpdate(TaskStatusUpdateEvent {
                task_id: task.id.clone(),
                context_id: task.context_id.clone(),
                status,
                is_final: true,
            })
        };

        if let Ok(Some(current)) = self.tasks.get(&task.id).await {
            if current.status.state == TaskState::Canceled {
                debug!(task_id = %task.id, "task stopped after cancellation");
                return (Some(final_event(current.status)), None);
            }
        }

        error!(task_id = %task.id, category = ?err.category(), error = %err, "task execution failed");
        let message = Message::agent_text(FAILED_TEXT, &task.context_id, &task.id);
        let event = match self
            .tasks
            .transition(&task.id, TaskStatus::new(TaskState::Failed, Some(message)))
            .await
        {
            Ok(stored) => Some(final_event(stored.status)),
            Err(store_err) => {
                error!(task_id = %task.id, error = %store_err, "could not record task failure");
                None
            }
        };
        (event, Some(ReckonError::Internal))
    }
}

/// Forgets a run's cancellation token when its stream is dropped.
struct RunningGuard {
    running: RunningTasks,
    task_id: String,
    run_id: Uuid,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        if let Ok(mut running) = self.running.lock() {
            if running.get(&self.task_id).map(|run| run.run_id) == Some(self.run_id) {
                running.remove(&self.task_id);
            }
        }
    }
}
