use axum::routing::{get, patch};
use axum::Router;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use drinks_api::config;
use drinks_api::database::manager::DatabaseManager;
use drinks_api::error::ApiError;
use drinks_api::handlers::drinks;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH0_DOMAIN, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    let app = app();

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("drinks API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Drinks resource
        .route(
            "/drinks",
            get(drinks::list)
                .post(drinks::create)
                .fallback(method_not_allowed),
        )
        .route(
            "/drinks-detail",
            get(drinks::list_detail).fallback(method_not_allowed),
        )
        .route(
            "/drinks/:id",
            patch(drinks::update)
                .delete(drinks::remove)
                .fallback(method_not_allowed),
        )
        // Unmatched paths get the JSON 404 envelope, not axum's default
        .fallback(not_found)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Drinks API",
            "version": version,
            "endpoints": {
                "drinks": "GET /drinks (public)",
                "drinks_detail": "GET /drinks-detail (requires get:drinks-detail)",
                "create": "POST /drinks (requires post:drinks)",
                "update": "PATCH /drinks/:id (requires patch:drinks)",
                "delete": "DELETE /drinks/:id (requires delete:drinks)"
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
