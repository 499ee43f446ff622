use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicI64, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use shared::{Todo, TodoDraft};
use tokio::sync::RwLock;

use super::{StorageResult, TodoRepository};

/// Process-local storage. Contents are lost on restart.
#[derive(Debug)]
pub struct InMemoryTodoRepository {
    todos: RwLock<BTreeMap<i64, Todo>>,
    next_id: AtomicI64,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self {
            todos: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn find_all(&self) -> StorageResult<Vec<Todo>> {
        let todos = self.todos.read().await;
        Ok(todos.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> StorageResult<Option<Todo>> {
        let todos = self.todos.read().await;
        Ok(todos.get(&id).cloned())
    }

    async fn find_by_completed(&self, completed: bool) -> StorageResult<Vec<Todo>> {
        let todos = self.todos.read().await;
        Ok(todos
            .values()
            .filter(|todo| todo.completed == completed)
            .cloned()
            .collect())
    }

    async fn insert(&self, draft: TodoDraft) -> StorageResult<Todo> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let todo = Todo::from_draft(id, draft, Utc::now());
        self.todos.write().await.insert(id, todo.clone());
        Ok(todo)
    }

    async fn save(&self, todo: &Todo) -> StorageResult<Option<Todo>> {
        let mut todos = self.todos.write().await;
        let Some(stored) = todos.get_mut(&todo.id) else {
            return Ok(None);
        };
        stored.title.clone_from(&todo.title);
        stored.description.clone_from(&todo.description);
        stored.completed = todo.completed;
        Ok(Some(stored.clone()))
    }

    async fn delete_by_id(&self, id: i64) -> StorageResult<bool> {
        Ok(self.todos.write().await.remove(&id).is_some())
    }

    async fn exists_by_id(&self, id: i64) -> StorageResult<bool> {
        Ok(self.todos.read().await.contains_key(&id))
    }
}
