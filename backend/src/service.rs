use std::sync::Arc;

use shared::{CreateTodoRequest, Todo, TodoDraft, UpdateTodoRequest};

use crate::{error::TodoError, repository::TodoRepository};

pub type TodoResult<T> = Result<T, TodoError>;

const EMPTY_TITLE: &str = "Title cannot be empty";

/// Business rules for todos, independent of the storage backend.
#[derive(Clone)]
pub struct TodoService {
    repo: Arc<dyn TodoRepository>,
}

impl TodoService {
    pub fn new(repo: Arc<dyn TodoRepository>) -> Self {
        Self { repo }
    }

    /// Lists every todo, or only those whose `completed` matches `filter`.
    pub async fn list(&self, filter: Option<bool>) -> TodoResult<Vec<Todo>> {
        let todos = match filter {
            Some(completed) => self.repo.find_by_completed(completed).await?,
            None => self.repo.find_all().await?,
        };
        tracing::debug!(?filter, count = todos.len(), "listed todos");
        Ok(todos)
    }

    /// A miss is `Ok(None)`, never an error.
    pub async fn get_by_id(&self, id: i64) -> TodoResult<Option<Todo>> {
        Ok(self.repo.find_by_id(id).await?)
    }

    pub async fn create(&self, request: CreateTodoRequest) -> TodoResult<Todo> {
        let title = require_title(request.title)?;
        let todo = self
            .repo
            .insert(TodoDraft {
                title,
                description: request.description,
                completed: request.completed,
            })
            .await?;
        tracing::info!(id = todo.id, "created todo");
        Ok(todo)
    }

    /// Replaces `title`, `description` and `completed` wholesale.
    pub async fn update(&self, id: i64, request: UpdateTodoRequest) -> TodoResult<Todo> {
        let mut todo = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(TodoError::NotFound(id))?;

        todo.title = require_title(request.title)?;
        todo.description = request.description;
        todo.completed = request.completed;

        // The record can vanish between the lookup and the write.
        let todo = self.repo.save(&todo).await?.ok_or(TodoError::NotFound(id))?;
        tracing::info!(id, completed = todo.completed, "updated todo");
        Ok(todo)
    }

    pub async fn delete(&self, id: i64) -> TodoResult<()> {
        if !self.repo.exists_by_id(id).await? {
            return Err(TodoError::NotFound(id));
        }
        self.repo.delete_by_id(id).await?;
        tracing::info!(id, "deleted todo");
        Ok(())
    }
}

fn require_title(title: Option<String>) -> TodoResult<String> {
    match title {
        Some(title) if !title.trim().is_empty() => Ok(title),
        _ => {
            tracing::warn!("rejected todo with blank title");
            Err(TodoError::Validation(EMPTY_TITLE.to_string()))
        }
    }
}
