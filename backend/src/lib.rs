pub mod config;
pub mod controller;
pub mod error;
pub mod repository;
pub mod service;
pub mod telemetry;

use std::sync::Arc;

use axum::{
    http::{header, Method},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    config::{Config, StorageConfig},
    error::StorageError,
    repository::{
        InMemoryTodoRepository, PostgresTodoRepository, RedisTodoRepository, TodoRepository,
    },
    service::TodoService,
};

/// Opens the storage backend selected by `storage`.
pub async fn connect_repository(
    storage: &StorageConfig,
) -> Result<Arc<dyn TodoRepository>, StorageError> {
    let repository: Arc<dyn TodoRepository> = match storage {
        StorageConfig::Memory => Arc::new(InMemoryTodoRepository::new()),
        StorageConfig::Redis { url } => Arc::new(RedisTodoRepository::from_url(url)?),
        StorageConfig::Postgres {
            url,
            max_connections,
        } => Arc::new(PostgresTodoRepository::connect(url, *max_connections).await?),
    };
    Ok(repository)
}

/// Full application router: API routes, CORS, request tracing and the
/// optional static file fallback.
pub fn app(service: TodoService, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.clone())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let mut router = controller::routes(service);
    if let Some(dir) = &config.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
}
