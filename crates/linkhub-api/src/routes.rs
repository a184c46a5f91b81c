//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use std::path::Path;

use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

use linkhub_shared::config::{AppConfig, PartnersConfig};
use linkhub_shared::observability::middleware as obs_middleware;

use crate::{
    handlers,
    middleware::{security_headers, workspace_auth_middleware},
    state::AppState,
};

/// 工作区 API 路由（需要 API Key）
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/customers/{id}/activity",
            get(handlers::customer::get_customer_activity),
        )
        .route("/programs/{id}", get(handlers::program::get_program))
        .route(
            "/links/{id}/complete-ab-test",
            post(handlers::link::complete_ab_test),
        )
        .route("/analytics", get(handlers::analytics::get_analytics))
        .route_layer(middleware::from_fn_with_state(
            state,
            workspace_auth_middleware,
        ))
}

/// 合作伙伴门户前端应用
///
/// 挂在重写前缀下，找不到的文件回退到 index.html
pub fn portal_routes(partners: &PartnersConfig) -> Router<AppState> {
    let static_dir = Path::new(&partners.static_dir);
    let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));
    Router::new().nest_service(&partners.rewrite_prefix, spa)
}

/// 根据逗号分隔的来源列表构造 CORS
pub fn cors_layer(allowed_origins: &str) -> CorsLayer {
    if allowed_origins.trim() == "*" {
        info!("CORS allowed_origins: * (all origins)");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    info!("CORS allowed_origins: {}", allowed_origins);
    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 组装完整应用路由
pub fn build_app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .nest("/api", api_routes(state.clone()))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .merge(portal_routes(&config.partners))
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer(&config.server.cors_origins))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
