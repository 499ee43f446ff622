//! HTTP adapter for [`TodoService`].

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use shared::{CreateTodoRequest, Todo, TodoFilter, UpdateTodoRequest};

use crate::{error::ApiError, service::TodoService};

type ApiResult<T> = Result<T, ApiError>;

/// Route table for the todo API.
pub fn routes(service: TodoService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route(
            "/api/todos/:id",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .with_state(service)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_todos(
    State(service): State<TodoService>,
    filter: Result<Query<TodoFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Todo>>> {
    let Query(filter) = filter?;
    Ok(Json(service.list(filter.completed).await?))
}

async fn get_todo(
    State(service): State<TodoService>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Todo>> {
    let Path(id) = id?;
    service
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Todo not found with id: {id}")))
}

async fn create_todo(
    State(service): State<TodoService>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> ApiResult<Json<Todo>> {
    let Json(request) = payload?;
    Ok(Json(service.create(request).await?))
}

async fn update_todo(
    State(service): State<TodoService>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> ApiResult<Json<Todo>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    Ok(Json(service.update(id, request).await?))
}

async fn delete_todo(
    State(service): State<TodoService>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
