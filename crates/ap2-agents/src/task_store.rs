//! Tasks by id, for resuming a task with a follow-up message.
//!
//! Process-local. A deployment that restarts between a challenge and its
//! response needs a durable store behind the same interface.

use std::collections::HashMap;
use std::sync::Arc;

use ap2_core::Task;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    inner: Arc<RwLock<HashMap<String, Task>>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, task_id: &str) -> Option<Task> {
        self.inner.read().await.get(task_id).cloned()
    }

    pub async fn put(&self, task: Task) {
        self.inner.write().await.insert(task.id.clone(), task);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
