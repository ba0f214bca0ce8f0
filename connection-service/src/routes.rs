//! 路由模块

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use common::config::AppConfig;
use common::middleware::request_id_middleware;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::docs::ApiDoc;
use crate::handlers;
use crate::state::AppState;

/// API 路由
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/api/connections",
            get(handlers::list_connections).post(handlers::create_connection),
        )
        .route("/api/connections/test", post(handlers::test_connection))
        .route("/api/connections/{id}", delete(handlers::delete_connection))
        .route(
            "/api/connections/{id}/disconnect",
            post(handlers::disconnect_connection),
        )
        .route("/api/query", post(handlers::execute_query))
        .route("/api/databases/{id}", get(handlers::list_databases))
        .route("/api/tables/{id}/{db}", get(handlers::list_tables))
        .route("/api/schema/{id}/{table}", get(handlers::get_table_schema))
        .route("/api/data/{id}/{db}/{table}", get(handlers::get_table_data))
        .route("/api/collections/{id}/{db}", get(handlers::list_collections))
        .route("/api/documents/find", post(handlers::find_documents))
}

/// 完整应用：路由、文档、中间件
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "忽略无效的 CORS 来源");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
