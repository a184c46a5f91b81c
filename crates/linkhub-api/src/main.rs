//! Linkhub REST API 服务
//!
//! 提供工作区 API，并承载合作伙伴门户的重定向与重写。

use std::sync::Arc;

use axum::{ServiceExt, extract::Request, middleware};
use link_management::repository::UserRepository;
use linkhub_api::{
    middleware::{PartnerPortalState, partners_middleware},
    routes,
    state::AppState,
    worker::AbTestWorker,
};
use linkhub_shared::{config::AppConfig, database::Database, observability};
use tokio::net::TcpListener;
use tower::Layer;
use tracing::{info, warn};

const SERVICE_NAME: &str = "linkhub-api";
const DEFAULT_SESSION_SECRET: &str = "linkhub-session-secret-change-in-production";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // 统一加载配置：config/default.toml -> config/{env}.toml -> config/linkhub-api.toml -> 环境变量
    let config = AppConfig::load(SERVICE_NAME).unwrap_or_default();

    let obs_config = config.observability.clone().with_service_name(SERVICE_NAME);
    let _guard = observability::init(&obs_config).await?;

    info!("Starting {} on {}", SERVICE_NAME, config.server_addr());

    if config.auth.session_secret == DEFAULT_SESSION_SECRET {
        if config.is_production() {
            anyhow::bail!("LINKHUB_AUTH__SESSION_SECRET must be set in production environment");
        }
        warn!("Using default session secret - set LINKHUB_AUTH__SESSION_SECRET for production");
    }

    let db = Database::connect(&config.database).await?;
    let state = AppState::new(db.pool().clone(), &config)?;

    // 启动 A/B 测试完成 Worker
    if config.ab_test.worker_enabled {
        let worker = AbTestWorker::from_config(state.ab_tests.clone(), &config.ab_test);
        tokio::spawn(async move {
            worker.run().await;
        });
    } else {
        info!("AbTestWorker disabled by configuration");
    }

    // 门户中间件包在整个 Router 外层，重写后的路径才能匹配到门户静态资源
    let portal = PartnerPortalState::new(
        &config.partners,
        &config.auth,
        Arc::new(UserRepository::new(db.pool().clone())),
    );
    let app = routes::build_app(state, &config);
    let app = middleware::from_fn_with_state(portal, partners_middleware).layer(app);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 优雅关闭：收到 SIGTERM 或 Ctrl+C 时停止接收新连接并等待已有请求处理完毕
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
