//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// 全局 Prometheus handle，用于渲染指标
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    let _ = PROMETHEUS_HANDLE.set(handle.clone());

    register_common_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 注册通用指标描述
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    metrics::describe_counter!(
        "customer_activity_requests_total",
        "Total number of customer activity lookups"
    );
    metrics::describe_counter!(
        "ab_tests_completed_total",
        "Total number of A/B test completions by outcome"
    );
    metrics::describe_counter!("webhooks_sent_total", "Total number of webhook deliveries");
    metrics::describe_histogram!(
        "webhook_delivery_duration_seconds",
        "Webhook delivery duration in seconds"
    );
    metrics::describe_counter!(
        "partner_portal_decisions_total",
        "Partner portal middleware decisions by action"
    );

    metrics::describe_gauge!(
        "worker_last_run_timestamp_seconds",
        "Unix timestamp of the last background worker run"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

/// 获取全局 Prometheus handle（用于自定义渲染）
pub fn get_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录客户活动查询
#[inline]
pub fn record_customer_activity(event_count: usize) {
    metrics::counter!("customer_activity_requests_total").increment(1);
    metrics::histogram!("customer_activity_event_count").record(event_count as f64);
}

/// 记录 A/B 测试完成结果
#[inline]
pub fn record_ab_test_completion(outcome: &str) {
    metrics::counter!("ab_tests_completed_total", "outcome" => outcome.to_string()).increment(1);
}

/// 记录 Webhook 投递
#[inline]
pub fn record_webhook_delivery(trigger: &str, status: &str, duration_secs: f64) {
    metrics::counter!(
        "webhooks_sent_total",
        "trigger" => trigger.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "webhook_delivery_duration_seconds",
        "trigger" => trigger.to_string()
    )
    .record(duration_secs);
}

/// 记录合作伙伴门户中间件决策
#[inline]
pub fn record_partner_portal_decision(action: &str) {
    metrics::counter!("partner_portal_decisions_total", "action" => action.to_string())
        .increment(1);
}

/// 记录后台 Worker 最近一次运行时间（Unix 秒）
#[inline]
pub fn set_worker_last_run(worker: &str) {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default();
    metrics::gauge!("worker_last_run_timestamp_seconds", "worker" => worker.to_string()).set(now);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_recorder_is_noop() {
        // 未安装 recorder 时所有记录函数都应静默忽略
        record_http_request("GET", "/health", 200, 0.01);
        record_ab_test_completion("no_leads");
        record_webhook_delivery("link.updated", "success", 0.2);
        record_partner_portal_decision("rewrite");
        record_customer_activity(3);
        set_worker_last_run("ab_test_worker");
        assert!(get_handle().is_none());
    }
}
