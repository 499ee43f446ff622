//! Storage backends for todos.
//!
//! Every backend assigns `id` and `created_at` on insert and never changes
//! them afterwards. Listing returns records in ascending id order.

mod memory;
mod postgres;
mod redis;

use async_trait::async_trait;
use shared::{Todo, TodoDraft};

use crate::error::StorageError;

pub use self::memory::InMemoryTodoRepository;
pub use self::postgres::PostgresTodoRepository;
pub use self::redis::RedisTodoRepository;

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn find_all(&self) -> StorageResult<Vec<Todo>>;

    async fn find_by_id(&self, id: i64) -> StorageResult<Option<Todo>>;

    async fn find_by_completed(&self, completed: bool) -> StorageResult<Vec<Todo>>;

    /// Persists a new record and returns it with its assigned identity.
    async fn insert(&self, draft: TodoDraft) -> StorageResult<Todo>;

    /// Overwrites `title`, `description` and `completed` of an existing
    /// record. Returns `None` when no record with `todo.id` exists.
    async fn save(&self, todo: &Todo) -> StorageResult<Option<Todo>>;

    /// Returns whether a record was removed.
    async fn delete_by_id(&self, id: i64) -> StorageResult<bool>;

    async fn exists_by_id(&self, id: i64) -> StorageResult<bool>;
}
