//! Mutating a task while an executor handles a request.

use ap2_core::a2a::TaskStatus;
use ap2_core::{Artifact, Message, Part, Task, TaskState};
use tracing::info;

#[derive(Debug)]
pub struct TaskUpdater {
    task: Task,
}

impl TaskUpdater {
    pub fn new(task: Task) -> Self {
        Self { task }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn task_id(&self) -> &str {
        &self.task.id
    }

    pub fn context_id(&self) -> &str {
        &self.task.context_id
    }

    pub fn add_artifact(&mut self, parts: Vec<Part>) {
        self.task.artifacts.push(Artifact::new(parts));
    }

    /// A status message bound to this task and context.
    pub fn agent_message(&self, parts: Vec<Part>) -> Message {
        let mut message = Message::agent(parts);
        message.context_id = Some(self.task.context_id.clone());
        message.task_id = Some(self.task.id.clone());
        message
    }

    fn set_state(&mut self, state: TaskState, message: Option<Message>) {
        info!(
            task_id = %self.task.id,
            context_id = %self.task.context_id,
            from = self.task.state().as_str(),
            to = state.as_str(),
            "task state"
        );
        self.task.status = TaskStatus { state, message };
    }

    pub fn working(&mut self) {
        self.set_state(TaskState::Working, None);
    }

    pub fn complete(&mut self, message: Option<Message>) {
        self.set_state(TaskState::Completed, message);
    }

    pub fn requires_input(&mut self, message: Message) {
        self.set_state(TaskState::InputRequired, Some(message));
    }

    pub fn failed(&mut self, message: Message) {
        self.set_state(TaskState::Failed, Some(message));
    }

    /// Set state and message verbatim, as reported by another agent.
    pub fn mirror(&mut self, state: TaskState, message: Option<Message>) {
        self.set_state(state, message);
    }

    pub fn into_task(self) -> Task {
        self.task
    }
}
