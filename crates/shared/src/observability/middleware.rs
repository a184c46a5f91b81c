//! HTTP 中间件
//!
//! `request_id` 需要放在 `http_tracing` 外层，追踪 span 才能带上请求 ID。

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, Span, field, info_span};

use super::metrics;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 外部传入的请求 ID 超过该长度时重新生成
const MAX_REQUEST_ID_LEN: usize = 128;

/// 未命中任何路由时使用的指标标签
const UNMATCHED_ROUTE: &str = "unmatched";

/// HTTP 请求追踪和指标中间件
///
/// 指标按路由模板（如 `/api/customers/{id}/activity`）聚合，不使用原始路径。
/// span 上的 `workspace_id` 由认证中间件通过 [`record_workspace`] 补上。
///
/// ```ignore
/// let app = Router::new()
///     .nest("/api", api_routes)
///     .layer(middleware::from_fn(http_tracing))
///     .layer(middleware::from_fn(request_id));
/// ```
pub async fn http_tracing(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let route = route_label(&request);
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_string())
        .unwrap_or_default();

    let span = info_span!(
        "linkhub_request",
        method = %method,
        route = %route,
        host = %host,
        request_id = %request_id,
        workspace_id = field::Empty,
        status = field::Empty,
        latency_ms = field::Empty,
    );

    let start = Instant::now();
    let response = next.run(request).instrument(span.clone()).await;
    let latency = start.elapsed();
    let status = response.status().as_u16();

    span.record("status", status);
    span.record("latency_ms", latency.as_millis() as i64);
    metrics::record_http_request(&method, &route, status, latency.as_secs_f64());

    response
}

/// 在当前请求 span 上记录已认证的工作区
pub fn record_workspace(workspace_id: &str) {
    Span::current().record("workspace_id", workspace_id);
}

/// 路由模板；请求未命中路由时为 `unmatched`
pub fn route_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string())
}

/// 请求 ID 中间件
///
/// 沿用调用方传入的 `x-request-id`，缺失或不合法时生成 UUID，并在响应头中返回。
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let incoming = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map(String::from);
    let request_id = incoming.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// 请求 ID 包装类型
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
