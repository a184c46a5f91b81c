//! 合作伙伴门户中间件测试
//!
//! 中间件包在一个回显 URI 的路由外层，重写结果直接体现在响应体中

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, Uri, header},
    middleware,
    response::Response,
};
use chrono::Duration;
use tower::{Layer, ServiceExt};

use linkhub_api::{
    ApiError,
    auth::SessionManager,
    middleware::{DefaultPartnerResolver, PartnerPortalState, partners_middleware},
};
use linkhub_shared::config::{AuthConfig, PartnersConfig};

const HOST: &str = "partners.linkhub.localhost";

/// 固定返回同一个默认合作伙伴
struct FixedResolver(Option<&'static str>);

#[async_trait]
impl DefaultPartnerResolver for FixedResolver {
    async fn default_partner_id(&self, _user_id: &str) -> Result<Option<String>, ApiError> {
        Ok(self.0.map(String::from))
    }
}

fn portal_state(resolver: FixedResolver) -> PartnerPortalState {
    PartnerPortalState::new(
        &PartnersConfig::default(),
        &AuthConfig::default(),
        Arc::new(resolver),
    )
}

async fn send(
    resolver: FixedResolver,
    host: &str,
    uri: &str,
    session: Option<String>,
) -> Response {
    let echo = Router::new().fallback(|uri: Uri| async move { uri.to_string() });
    let app = middleware::from_fn_with_state(portal_state(resolver), partners_middleware).layer(echo);

    let mut builder = Request::builder().uri(uri).header(header::HOST, host);
    if let Some(token) = session {
        builder = builder.header(
            header::COOKIE,
            format!("next-auth.session-token={}", token),
        );
    }
    app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
}

fn session(default_partner_id: Option<&str>) -> Option<String> {
    let manager = SessionManager::new(&AuthConfig::default().session_secret);
    Some(
        manager
            .issue("user_1", "partner@example.com", default_partner_id, Duration::hours(1))
            .unwrap(),
    )
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

async fn text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_other_hosts_pass_through() {
    let response = send(FixedResolver(None), "api.linkhub.localhost", "/programs", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "/programs");
}

#[tokio::test]
async fn test_anonymous_user_redirected_to_program_login() {
    let response = send(FixedResolver(None), HOST, "/programs/acme/links", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "https://partners.linkhub.localhost/acme/login");
}

#[tokio::test]
async fn test_forwarded_proto_is_respected() {
    let echo = Router::new().fallback(|uri: Uri| async move { uri.to_string() });
    let app = middleware::from_fn_with_state(portal_state(FixedResolver(None)), partners_middleware)
        .layer(echo);
    let request = Request::builder()
        .uri("/")
        .header(header::HOST, HOST)
        .header("x-forwarded-proto", "http")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(location(&response), "http://partners.linkhub.localhost/login");
}

#[tokio::test]
async fn test_public_pages_are_rewritten() {
    let response = send(FixedResolver(None), HOST, "/acme/apply?via=twitter", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        text(response).await,
        "/partners.linkhub.app/acme/apply?via=twitter"
    );
}

#[tokio::test]
async fn test_default_partner_falls_back_to_resolver() {
    // 会话中没有默认合作伙伴，且数据库也查不到
    let response = send(FixedResolver(None), HOST, "/payouts", session(None)).await;
    assert_eq!(location(&response), "https://partners.linkhub.localhost/onboarding");

    // 数据库中能查到
    let response = send(FixedResolver(Some("pn_9")), HOST, "/payouts", session(None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "/partners.linkhub.app/payouts");
}

#[tokio::test]
async fn test_logged_in_user_leaves_login_page() {
    let response = send(
        FixedResolver(None),
        HOST,
        "/acme/login",
        session(Some("pn_1")),
    )
    .await;
    assert_eq!(
        location(&response),
        "https://partners.linkhub.localhost/programs/acme"
    );

    let response = send(
        FixedResolver(None),
        HOST,
        "/login?next=%2Fprograms%2Facme%2Fearnings",
        session(Some("pn_1")),
    )
    .await;
    assert_eq!(
        location(&response),
        "https://partners.linkhub.localhost/programs/acme/earnings"
    );
}

#[tokio::test]
async fn test_invalid_session_cookie_counts_as_anonymous() {
    let forged = SessionManager::new("another-secret")
        .issue("user_1", "partner@example.com", Some("pn_1"), Duration::hours(1))
        .ok();
    let response = send(FixedResolver(Some("pn_1")), HOST, "/", forged).await;
    assert_eq!(location(&response), "https://partners.linkhub.localhost/login");
}
