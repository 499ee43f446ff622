use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use backend::{app, config::Config, repository::InMemoryTodoRepository, service::TodoService};
use http_body_util::BodyExt;
use rstest::rstest;
use shared::{ErrorBody, Todo};
use tower::ServiceExt;

fn test_app() -> Router {
    let service = TodoService::new(Arc::new(InMemoryTodoRepository::new()));
    app(service, &Config::default())
}

async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn create(app: &Router, body: &str) -> Todo {
    let resp = send(app, json_request("POST", "/api/todos", body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let app = test_app();
    let resp = send(&app, empty_request("GET", "/api/todos")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}

#[tokio::test]
async fn list_todos_filters_by_completed() {
    let app = test_app();
    create(&app, r#"{"title":"open"}"#).await;
    create(&app, r#"{"title":"done","completed":true}"#).await;

    let resp = send(&app, empty_request("GET", "/api/todos?completed=true")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let done: Vec<Todo> = body_json(resp).await;
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].title, "done");

    let resp = send(&app, empty_request("GET", "/api/todos?completed=false")).await;
    let open: Vec<Todo> = body_json(resp).await;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].title, "open");

    let resp = send(&app, empty_request("GET", "/api/todos")).await;
    let all: Vec<Todo> = body_json(resp).await;
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn list_todos_empty_filter_lists_everything() {
    let app = test_app();
    create(&app, r#"{"title":"open"}"#).await;
    create(&app, r#"{"title":"done","completed":true}"#).await;

    let resp = send(&app, empty_request("GET", "/api/todos?completed=")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let all: Vec<Todo> = body_json(resp).await;
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn list_todos_bad_filter_returns_400() {
    let app = test_app();
    let resp = send(&app, empty_request("GET", "/api/todos?completed=maybe")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error: ErrorBody = body_json(resp).await;
    assert!(!error.message.is_empty());
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_200_with_identity() {
    let app = test_app();
    let resp = send(&app, json_request("POST", "/api/todos", r#"{"title":"Buy milk"}"#)).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = body_json(resp).await;
    assert_eq!(json["id"], 1);
    assert_eq!(json["title"], "Buy milk");
    assert!(json["description"].is_null());
    assert_eq!(json["completed"], false);
    assert!(json["createdAt"].is_string());
}

#[rstest]
#[case::empty(r#"{"title":""}"#)]
#[case::blank(r#"{"title":"   "}"#)]
#[case::null(r#"{"title":null}"#)]
#[case::missing(r#"{"description":"no title"}"#)]
#[tokio::test]
async fn create_todo_blank_title_returns_400(#[case] body: &str) {
    let app = test_app();
    let resp = send(&app, json_request("POST", "/api/todos", body)).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error: ErrorBody = body_json(resp).await;
    assert_eq!(error.message, "Title cannot be empty");
}

#[tokio::test]
async fn create_todo_malformed_json_returns_400() {
    let app = test_app();
    let resp = send(&app, json_request("POST", "/api/todos", r#"{"title":"#)).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error: ErrorBody = body_json(resp).await;
    assert!(!error.message.is_empty());
}

// --- get ---

#[tokio::test]
async fn get_todo_not_found() {
    let app = test_app();
    let resp = send(&app, empty_request("GET", "/api/todos/999")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case::get("GET")]
#[case::put("PUT")]
#[case::delete("DELETE")]
#[tokio::test]
async fn non_numeric_id_returns_400(#[case] method: &str) {
    let app = test_app();
    let resp = send(
        &app,
        json_request(method, "/api/todos/abc", r#"{"title":"x"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- update ---

#[tokio::test]
async fn update_todo_not_found() {
    let app = test_app();
    let resp = send(
        &app,
        json_request("PUT", "/api/todos/999", r#"{"title":"Nope","completed":true}"#),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let error: ErrorBody = body_json(resp).await;
    assert_eq!(error.message, "Todo not found with id: 999");
}

#[rstest]
#[case::empty_body("{}")]
#[case::no_title(r#"{"description":"x","completed":true}"#)]
#[tokio::test]
async fn update_unknown_id_without_title_returns_404(#[case] body: &str) {
    let app = test_app();
    let resp = send(&app, json_request("PUT", "/api/todos/999", body)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn null_completed_is_false_on_create_and_update() {
    let app = test_app();
    let created = create(&app, r#"{"title":"a","completed":null}"#).await;
    assert!(!created.completed);

    let resp = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/todos/{}", created.id),
            r#"{"title":"a","description":null,"completed":null}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert!(!updated.completed);
    assert!(updated.description.is_none());
}

#[tokio::test]
async fn update_todo_blank_title_returns_400() {
    let app = test_app();
    let created = create(&app, r#"{"title":"keep me"}"#).await;
    let resp = send(
        &app,
        json_request("PUT", &format!("/api/todos/{}", created.id), r#"{"title":" "}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- delete ---

#[tokio::test]
async fn delete_todo_not_found() {
    let app = test_app();
    let resp = send(&app, empty_request("DELETE", "/api/todos/999")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- cors ---

#[tokio::test]
async fn cors_preflight_allows_dev_origin() {
    let app = test_app();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/todos")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let resp = send(&app, request).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:3000"
    );
}

#[tokio::test]
async fn cors_ignores_other_origins() {
    let app = test_app();
    let request = Request::builder()
        .uri("/api/todos")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let resp = send(&app, request).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app();
    let resp = send(&app, empty_request("GET", "/health")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = body_json(resp).await;
    assert_eq!(json["status"], "ok");
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    let app = test_app();

    // create
    let created = create(&app, r#"{"title":"Buy milk"}"#).await;
    assert_eq!(created.title, "Buy milk");
    assert!(created.description.is_none());
    assert!(!created.completed);
    let id = created.id;

    // get
    let resp = send(&app, empty_request("GET", &format!("/api/todos/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Todo = body_json(resp).await;
    assert_eq!(fetched, created);

    // update: every mutable field is replaced
    let resp = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/todos/{id}"),
            r#"{"title":"Buy milk","description":"2%","completed":true}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.id, id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.description.as_deref(), Some("2%"));
    assert!(updated.completed);

    // update without description or completed resets them
    let resp = send(
        &app,
        json_request("PUT", &format!("/api/todos/{id}"), r#"{"title":"Buy oat milk"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let replaced: Todo = body_json(resp).await;
    assert_eq!(replaced.title, "Buy oat milk");
    assert!(replaced.description.is_none());
    assert!(!replaced.completed);

    // delete
    let resp = send(&app, empty_request("DELETE", &format!("/api/todos/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    assert!(body.is_empty());

    // get after delete
    let resp = send(&app, empty_request("GET", &format!("/api/todos/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // second delete
    let resp = send(&app, empty_request("DELETE", &format!("/api/todos/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(&app, empty_request("GET", "/api/todos")).await;
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}

#[tokio::test]
async fn static_dir_serves_fallback() {
    let dir = std::env::temp_dir().join(format!("todo-static-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<h1>todos</h1>").unwrap();

    let config = Config {
        static_dir: Some(dir.clone()),
        ..Config::default()
    };
    let service = TodoService::new(Arc::new(InMemoryTodoRepository::new()));
    let app = app(service, &config);

    let resp = send(&app, empty_request("GET", "/index.html")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"<h1>todos</h1>");

    let resp = send(&app, empty_request("GET", "/api/todos")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    std::fs::remove_dir_all(&dir).ok();
}
