//! In-memory task store (non-persistent).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Artifact, Message, Task, TaskState, TaskStatus, TaskStore};
use crate::error::ReckonError;

#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<HashMap<String, Task>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn live_task<'a>(tasks: &'a mut HashMap<String, Task>, id: &str) -> Result<&'a mut Task, ReckonError> {
    let task = tasks
        .get_mut(id)
        .ok_or_else(|| ReckonError::TaskNotFound(id.to_string()))?;
    if task.status.state.is_terminal() {
        return Err(ReckonError::InvalidState(format!(
            "task {id} is already {}",
            task.status.state
        )));
    }
    Ok(task)
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, task: Task) -> Result<(), ReckonError> {
        self.tasks.write().await.insert(task.id.clone(), task);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Task>, ReckonError> {
        Ok(self.tasks.read().await.get(id).cloned())
    }

    async fn transition(&self, id: &str, status: TaskStatus) -> Result<Task, ReckonError> {
        let mut tasks = self.tasks.write().await;
        let task = live_task(&mut tasks, id)?;
        if let Some(ref message) = status.message {
            task.history.push(message.clone());
        }
        task.status = status;
        Ok(task.clone())
    }

    async fn append_message(&self, id: &str, message: Message) -> Result<Task, ReckonError> {
        let mut tasks = self.tasks.write().await;
        let task = live_task(&mut tasks, id)?;
        task.history.push(message);
        Ok(task.clone())
    }

    async fn complete(&self, id: &str, artifact: Artifact) -> Result<Task, ReckonError> {
        let mut tasks = self.tasks.write().await;
        let task = live_task(&mut tasks, id)?;
        task.artifacts.push(artifact);
        task.status = TaskStatus::new(TaskState::Completed, None);
        Ok(task.clone())
    }
}
