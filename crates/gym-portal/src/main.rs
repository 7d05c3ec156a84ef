//! 健身房会员门户
//!
//! 启动 REST API 与静态页面服务。

use std::path::Path;
use std::sync::Arc;

use axum::{http::HeaderValue, middleware};
use gym_portal::{
    auth::{JwtConfig, JwtVerifier},
    routes,
    state::{AppState, Backends},
};
use gym_shared::{
    auth_client::HostedAuthClient,
    config::AppConfig,
    database::Database,
    observability::{self, middleware as obs_middleware},
    storage::HostedStorageClient,
};
use membership::service::ReceiptSettings;
use membership::{
    MemberRepository, PaymentRepository, ReceiptRepository, ReviewRepository, StatsRepository,
};
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};
use tracing::{info, warn};

/// 全局请求体上限在单个收据上限之外预留的余量
const BODY_LIMIT_HEADROOM_BYTES: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load("gym-portal").unwrap_or_default();

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!("Starting gym-portal on {}", config.server_addr());

    if config.is_production() && config.backend.jwt_secret == JwtConfig::default().secret {
        anyhow::bail!("GYM_BACKEND__JWT_SECRET must be set in production environment");
    }
    if config.backend.service_role_key.is_empty() {
        warn!("service_role_key 未配置，收据与相册存储调用将失败");
    }

    // 托管数据库暂时不可达时仍然启动，由就绪探针报告 degraded
    let db = Database::connect_lazy(&config.database)?;
    let pool = db.pool().clone();

    let backends = Backends {
        members: Arc::new(MemberRepository::new(pool.clone())),
        receipts: Arc::new(ReceiptRepository::new(pool.clone())),
        payments: Arc::new(PaymentRepository::new(pool.clone())),
        reviews: Arc::new(ReviewRepository::new(pool.clone())),
        stats: Arc::new(StatsRepository::new(pool)),
        auth: Arc::new(HostedAuthClient::new(&config.backend)),
        storage: Arc::new(HostedStorageClient::new(&config.backend)),
    };

    let receipt_settings = ReceiptSettings {
        bucket: config.storage.receipts_bucket.clone(),
        max_upload_bytes: config.storage.max_upload_bytes,
        signed_url_ttl_seconds: config.storage.signed_url_ttl_seconds,
    };
    let jwt = JwtVerifier::new(JwtConfig {
        secret: config.backend.jwt_secret.clone(),
        audience: config.backend.jwt_audience.clone(),
    });

    let state = AppState::new(
        backends,
        receipt_settings,
        config.storage.gallery_bucket.clone(),
        jwt,
    )
    .with_database(db.clone());

    let static_dir = Path::new(&config.web.static_dir);
    let static_dir = if static_dir.is_dir() {
        info!("Serving static pages from {}", static_dir.display());
        Some(static_dir)
    } else {
        warn!("静态页面目录不存在: {}，仅提供 API", static_dir.display());
        None
    };

    let body_limit = config.storage.max_upload_bytes + BODY_LIMIT_HEADROOM_BYTES;

    let app = routes::app(state, static_dir)
        .layer(cors_layer(&config.web.cors_origins, config.is_production()))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CompressionLayer::new())
        // 可观测性中间件：请求追踪和指标收集
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// CORS 配置：逗号分隔的来源列表，"*" 表示全部放行
fn cors_layer(allowed_origins: &str, production: bool) -> CorsLayer {
    if allowed_origins.trim() == "*" {
        if production {
            warn!("cors_origins=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
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

/// 监听关闭信号
///
/// 收到 SIGTERM 或 Ctrl+C 后返回，触发 axum 的优雅关闭流程。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("注册 Ctrl+C 处理器失败: {}", e);
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
                warn!("注册 SIGTERM 处理器失败: {}", e);
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
