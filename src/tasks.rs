use std::fmt;
use std::sync::Arc;

use serde::de::IgnoredAny;
use serde::Serialize;
use thiserror::Error;

use crate::busy::Busy;
use crate::error::ApiError;
use crate::models::{CompletionUpdate, NewTask, Task, TaskUpdate};
use crate::navigation::Navigation;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOp {
    Load,
    Create,
    Update,
    Delete,
}

impl fmt::Display for TaskOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            TaskOp::Load => "load tasks",
            TaskOp::Create => "create task",
            TaskOp::Update => "update task",
            TaskOp::Delete => "delete task",
        };
        f.write_str(verb)
    }
}

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("You must be logged in to manage tasks.")]
    NotAuthenticated,

    #[error("Failed to {op}. Please try again.")]
    Request {
        op: TaskOp,
        #[source]
        source: ApiError,
    },
}

impl TaskError {
    pub fn navigation(&self) -> Option<Navigation> {
        match self {
            TaskError::NotAuthenticated => Some(Navigation::Login),
            TaskError::Request { source, .. } => source.navigation(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

/// Client-side copy of the signed-in user's tasks, kept in step with the
/// backend by explicit calls. Nothing changes locally until the backend
/// has answered.
pub struct TaskList {
    session: Arc<Session>,
    tasks: Vec<Task>,
    loading: bool,
    error: Option<String>,
}

impl TaskList {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            tasks: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn stats(&self) -> TaskStats {
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        TaskStats {
            total: self.tasks.len(),
            completed,
            pending: self.tasks.len() - completed,
        }
    }

    pub async fn fetch_tasks(&mut self) -> Result<(), TaskError> {
        let base = self.base_path()?;
        let busy = Busy::start(&mut self.loading);
        let result = self.session.client().get::<Vec<Task>>(&base).await;
        drop(busy);

        let tasks = self.settle(TaskOp::Load, result)?;
        log::info!("Loaded {} tasks", tasks.len());
        self.tasks = tasks;
        Ok(())
    }

    pub async fn create_task(
        &mut self,
        title: &str,
        description: Option<&str>,
    ) -> Result<Task, TaskError> {
        let base = self.base_path()?;
        log::info!("Creating new task: {}", title);
        let body = NewTask {
            title,
            description: description.filter(|d| !d.is_empty()),
            completed: false,
        };
        let result = self.session.client().post::<_, Task>(&base, &body).await;

        let task = self.settle(TaskOp::Create, result)?;
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub async fn get_task(&mut self, task_id: i64) -> Result<Task, TaskError> {
        let base = self.base_path()?;
        let result = self
            .session
            .client()
            .get::<Task>(&format!("{}/{}", base, task_id))
            .await;

        let task = self.settle(TaskOp::Load, result)?;
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task.clone(),
            None => self.tasks.push(task.clone()),
        }
        Ok(task)
    }

    pub async fn toggle_complete(
        &mut self,
        task_id: i64,
        current_completed: bool,
    ) -> Result<(), TaskError> {
        let base = self.base_path()?;
        log::info!("Setting task {} completed={}", task_id, !current_completed);
        let body = CompletionUpdate {
            completed: !current_completed,
        };
        let result = self
            .session
            .client()
            .patch::<_, Task>(&format!("{}/{}/complete", base, task_id), &body)
            .await;

        let task = self.settle(TaskOp::Update, result)?;
        self.replace(task_id, task);
        Ok(())
    }

    pub async fn update_task(&mut self, task_id: i64, update: &TaskUpdate) -> Result<(), TaskError> {
        let base = self.base_path()?;
        log::info!("Updating task: {}", task_id);
        let result = self
            .session
            .client()
            .put::<_, Task>(&format!("{}/{}", base, task_id), update)
            .await;

        let task = self.settle(TaskOp::Update, result)?;
        self.replace(task_id, task);
        Ok(())
    }

    pub async fn delete_task(&mut self, task_id: i64) -> Result<(), TaskError> {
        let base = self.base_path()?;
        log::info!("Deleting task: {}", task_id);
        let result = self
            .session
            .client()
            .delete::<IgnoredAny>(&format!("{}/{}", base, task_id))
            .await;

        self.settle(TaskOp::Delete, result)?;
        self.tasks.retain(|t| t.id != task_id);
        Ok(())
    }

    fn replace(&mut self, task_id: i64, task: Task) {
        if let Some(existing) = self.tasks.iter_mut().find(|t| t.id == task_id) {
            *existing = task;
        }
    }

    fn base_path(&mut self) -> Result<String, TaskError> {
        match self.session.user() {
            Some(user) => Ok(format!("/api/{}/tasks", user.id)),
            None => {
                let err = TaskError::NotAuthenticated;
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn settle<T>(&mut self, op: TaskOp, result: Result<T, ApiError>) -> Result<T, TaskError> {
        result.map_err(|source| {
            log::error!("Error trying to {}: {}", op, source);
            let err = TaskError::Request { op, source };
            self.error = Some(err.to_string());
            err
        })
    }
}
