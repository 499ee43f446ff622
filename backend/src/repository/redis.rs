//! Redis backend.
//!
//! Key layout:
//! - `todo:{id}` -> JSON serialized `Todo`
//! - `todos:index` -> ZSET of ids, score = id
//! - `todos:next_id` -> counter used for id assignment

use async_trait::async_trait;
use chrono::Utc;
use redis::{aio::Connection, AsyncCommands, Client};
use shared::{Todo, TodoDraft};

use super::{StorageResult, TodoRepository};

const TODO_KEY_PREFIX: &str = "todo:";
const INDEX_KEY: &str = "todos:index";
const NEXT_ID_KEY: &str = "todos:next_id";

fn todo_key(id: i64) -> String {
    format!("{TODO_KEY_PREFIX}{id}")
}

#[derive(Debug, Clone)]
pub struct RedisTodoRepository {
    client: Client,
}

impl RedisTodoRepository {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_url(redis_url: &str) -> StorageResult<Self> {
        Ok(Self::new(Client::open(redis_url)?))
    }

    async fn connection(&self) -> StorageResult<Connection> {
        Ok(self.client.get_async_connection().await?)
    }

    async fn load_all(&self, conn: &mut Connection) -> StorageResult<Vec<Todo>> {
        let ids: Vec<i64> = conn.zrange(INDEX_KEY, 0, -1).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| todo_key(*id)).collect();
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(conn)
            .await?;

        let mut todos = Vec::with_capacity(values.len());
        for json in values.into_iter().flatten() {
            todos.push(serde_json::from_str::<Todo>(&json)?);
        }
        Ok(todos)
    }
}

#[async_trait]
impl TodoRepository for RedisTodoRepository {
    async fn find_all(&self) -> StorageResult<Vec<Todo>> {
        let mut conn = self.connection().await?;
        self.load_all(&mut conn).await
    }

    async fn find_by_id(&self, id: i64) -> StorageResult<Option<Todo>> {
        let mut conn = self.connection().await?;
        let json: Option<String> = conn.get(todo_key(id)).await?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn find_by_completed(&self, completed: bool) -> StorageResult<Vec<Todo>> {
        let mut conn = self.connection().await?;
        let mut todos = self.load_all(&mut conn).await?;
        todos.retain(|todo| todo.completed == completed);
        Ok(todos)
    }

    async fn insert(&self, draft: TodoDraft) -> StorageResult<Todo> {
        let mut conn = self.connection().await?;
        let id: i64 = conn.incr(NEXT_ID_KEY, 1).await?;
        let todo = Todo::from_draft(id, draft, Utc::now());
        let json = serde_json::to_string(&todo)?;

        redis::pipe()
            .atomic()
            .set(todo_key(id), &json)
            .ignore()
            .zadd(INDEX_KEY, id, id)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;

        Ok(todo)
    }

    async fn save(&self, todo: &Todo) -> StorageResult<Option<Todo>> {
        let mut conn = self.connection().await?;
        let key = todo_key(todo.id);

        let stored: Option<String> = conn.get(&key).await?;
        let Some(stored) = stored else {
            return Ok(None);
        };
        let mut updated: Todo = serde_json::from_str(&stored)?;
        updated.title.clone_from(&todo.title);
        updated.description.clone_from(&todo.description);
        updated.completed = todo.completed;
        let json = serde_json::to_string(&updated)?;

        // XX: only overwrite if the key still exists.
        let written: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(&json)
            .arg("XX")
            .query_async(&mut conn)
            .await?;

        Ok(written.map(|_| updated))
    }

    async fn delete_by_id(&self, id: i64) -> StorageResult<bool> {
        let mut conn = self.connection().await?;
        let (deleted, _): (i64, i64) = redis::pipe()
            .atomic()
            .del(todo_key(id))
            .zrem(INDEX_KEY, id)
            .query_async(&mut conn)
            .await?;
        Ok(deleted > 0)
    }

    async fn exists_by_id(&self, id: i64) -> StorageResult<bool> {
        let mut conn = self.connection().await?;
        Ok(conn.exists(todo_key(id)).await?)
    }
}
