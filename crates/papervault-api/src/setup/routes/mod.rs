//! Route configuration and setup.
//!
//! Public routes, admin routes behind the shared credential, API docs, and the
//! static payload directory when the local backend is in use.

mod health;

use crate::auth::admin_auth_middleware;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post, put},
    Json, Router,
};
use papervault_core::{Config, StorageBackend};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Extra room on top of the file payloads for the text fields and multipart framing.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let http_concurrency_limit = config.http_concurrency_limit();
    let body_limit = config
        .max_file_size_bytes()
        .saturating_mul(config.max_files_per_upload())
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    tracing::info!(
        http_concurrency_limit,
        body_limit_bytes = body_limit,
        "HTTP limits configured"
    );

    let serves_local_payloads = state.storage.backend_type() == StorageBackend::Local;

    let admin = admin_routes().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        admin_auth_middleware,
    ));

    let mut app = public_routes()
        .merge(admin)
        .with_state(state)
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"));

    if serves_local_payloads {
        if let Some(path) = config.local_storage_path() {
            tracing::info!(path = %path, "Serving local payloads under /uploads");
            app = app.nest_service("/uploads", ServeDir::new(path));
        }
    }

    let app = app
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/upload", post(handlers::upload::upload_paper))
        .route("/papers", get(handlers::papers::list_papers))
        .route(
            "/papers/{paper_id}/files/{index}/upvote",
            put(handlers::votes::upvote),
        )
        .route(
            "/papers/{paper_id}/files/{index}/downvote",
            put(handlers::votes::downvote),
        )
        .route("/api/feedback", post(handlers::feedback::submit_feedback))
        .route(
            "/api/subjects",
            get(handlers::subjects::list_subjects).post(handlers::subjects::create_subject),
        )
}

fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/papers", get(handlers::admin::list_all_papers))
        .route("/admin/papers/{id}", delete(handlers::admin::delete_paper))
}
