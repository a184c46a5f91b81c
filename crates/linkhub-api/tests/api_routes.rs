//! 工作区 API 路由测试
//!
//! 连接池为 lazy 模式，测试只覆盖不触达数据库的路径

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;

use link_management::models::{ApiToken, Workspace};
use link_management::repository::WorkspaceRepositoryTrait;
use linkhub_api::{auth::hash_api_key, routes, state::AppState};
use linkhub_shared::config::AppConfig;
use linkhub_shared::database::Database;
use linkhub_shared::test_utils::test_database_config;

const VALID_KEY: &str = "lh_live_valid";
const EXPIRED_KEY: &str = "lh_live_expired";

/// 内存中的工作区仓储
struct FakeWorkspaces;

fn workspace() -> Workspace {
    let created = Utc::now() - Duration::days(30);
    Workspace {
        id: "ws_1".into(),
        name: "Acme".into(),
        slug: "acme".into(),
        logo: None,
        stripe_connect_id: None,
        created_at: created,
        updated_at: created,
    }
}

#[async_trait]
impl WorkspaceRepositoryTrait for FakeWorkspaces {
    async fn find_workspace(&self, id: &str) -> link_management::Result<Option<Workspace>> {
        Ok((id == "ws_1").then(workspace))
    }

    async fn find_token_by_hash(
        &self,
        hashed_key: &str,
    ) -> link_management::Result<Option<ApiToken>> {
        let token = |id: &str, expires: Option<DateTime<Utc>>| ApiToken {
            id: id.into(),
            name: "ci".into(),
            project_id: "ws_1".into(),
            expires,
        };

        if hashed_key == hash_api_key(VALID_KEY) {
            Ok(Some(token("tok_valid", None)))
        } else if hashed_key == hash_api_key(EXPIRED_KEY) {
            Ok(Some(token("tok_expired", Some(Utc::now() - Duration::hours(1)))))
        } else {
            Ok(None)
        }
    }

    async fn touch_token(&self, _id: &str, _used_at: DateTime<Utc>) -> link_management::Result<()> {
        Ok(())
    }
}

fn test_app() -> Router {
    let config = AppConfig::default();
    let db = Database::connect_lazy(&test_database_config()).unwrap();
    let state = AppState::new(db.pool().clone(), &config)
        .unwrap()
        .with_workspaces(Arc::new(FakeWorkspaces));
    routes::build_app(state, &config)
}

fn get(uri: &str, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(key) = api_key {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", key));
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_sets_security_headers() {
    let response = test_app().oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert!(response.headers().contains_key("x-request-id"));

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "linkhub-api");
}

#[tokio::test]
async fn test_missing_api_key_is_unauthorized() {
    let response = test_app()
        .oneshot(get("/api/customers/cus_1/activity", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unknown_and_expired_keys_are_rejected() {
    for key in ["lh_live_unknown", EXPIRED_KEY] {
        let response = test_app()
            .oneshot(get("/api/programs/prog_1", Some(key)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "key {}", key);
    }
}

#[tokio::test]
async fn test_analytics_rejects_unknown_interval() {
    let response = test_app()
        .oneshot(get("/api/analytics?interval=fortnight", Some(VALID_KEY)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_analytics_rejects_half_open_range() {
    let response = test_app()
        .oneshot(get(
            "/api/analytics?start=2025-01-01T00:00:00Z",
            Some(VALID_KEY),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
