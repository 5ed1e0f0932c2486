//! Server side of one agent: task lifecycle around an executor.

use std::sync::Arc;

use ap2_core::codec::Canonical;
use ap2_core::{AgentCard, Ap2Error, Ap2Result, Message, Part, Task};
use tracing::{debug, warn};

use crate::executor::AgentExecutor;
use crate::task_store::TaskStore;
use crate::updater::TaskUpdater;

/// Runs an executor per incoming message and keeps the resulting tasks.
#[derive(Clone)]
pub struct AgentService {
    executor: Arc<dyn AgentExecutor>,
    tasks: TaskStore,
}

impl AgentService {
    pub fn new(executor: Arc<dyn AgentExecutor>) -> Self {
        Self {
            executor,
            tasks: TaskStore::new(),
        }
    }

    pub fn with_task_store(mut self, tasks: TaskStore) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn agent_card(&self) -> AgentCard {
        self.executor.agent_card()
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    /// Handle one message.
    ///
    /// A message naming a task resumes it; naming an unknown task is
    /// `NotFound` and naming a terminal one is `InvalidTransition`. Every
    /// canonical object in the request is decoded before the executor runs,
    /// so a malformed mandate fails the task without reaching role logic.
    /// Executor errors do not propagate: they end the task in `failed` with
    /// the error text as the status message.
    pub async fn handle(&self, request: Message) -> Ap2Result<Task> {
        let current = match request.task_id.as_deref() {
            Some(task_id) => {
                let task = self
                    .tasks
                    .get(task_id)
                    .await
                    .ok_or_else(|| Ap2Error::not_found(format!("task {}", task_id)))?;
                if task.state().is_terminal() {
                    return Err(Ap2Error::InvalidTransition {
                        message: format!(
                            "task {} is already {}",
                            task.id,
                            task.state().as_str()
                        ),
                    });
                }
                Some(task)
            }
            None => None,
        };

        let mut task = match &current {
            Some(task) => task.clone(),
            None => {
                let context_id = request
                    .context_id
                    .clone()
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                Task::new(uuid::Uuid::new_v4().to_string(), context_id)
            }
        };
        task.history.push(request.clone());
        debug!(task_id = %task.id, resumed = current.is_some(), "handling request");

        let mut updater = TaskUpdater::new(task);
        updater.working();
        let outcome = match Canonical::decode_parts(&request.parts) {
            Ok(objects) => {
                debug!(task_id = %updater.task_id(), canonical = objects.len(), "decoded request");
                self.executor
                    .execute(&request, current.as_ref(), &mut updater)
                    .await
            }
            Err(e) => Err(e),
        };
        if let Err(e) = outcome {
            warn!(task_id = %updater.task_id(), error = %e, "request failed");
            let message = updater.agent_message(vec![Part::text(e.to_string())]);
            updater.failed(message);
        }

        let task = updater.into_task();
        self.tasks.put(task.clone()).await;
        Ok(task)
    }
}
