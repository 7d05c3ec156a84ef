//! 健康检查处理器

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::state::AppState;

/// 存活探针：服务进程正常即返回 ok
///
/// GET /health
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "gym-portal"
    }))
}

/// 就绪探针：检查数据库连接是否可用
///
/// GET /ready
pub async fn readiness_check(State(state): State<AppState>) -> Json<Value> {
    let db_status = match &state.database {
        Some(db) if db.health_check().await.is_ok() => "ok",
        Some(_) => "fail",
        None => "skipped",
    };

    Json(json!({
        "status": if db_status == "fail" { "degraded" } else { "ok" },
        "service": "gym-portal",
        "checks": {
            "database": db_status
        }
    }))
}
