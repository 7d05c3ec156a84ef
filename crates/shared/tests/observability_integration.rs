//! 可观测性模块集成测试
//!
//! 测试 metrics 记录函数、请求 ID 与请求追踪中间件。

// ============================================================================
// 指标记录测试
// ============================================================================

mod metrics_tests {
    use gym_shared::observability::metrics::{
        record_http_request, record_receipt_review, record_receipt_upload,
        record_review_submission, record_signup,
    };

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/api/receipts", 200, 0.05);
        record_http_request("POST", "/api/receipts", 413, 0.12);
        record_http_request("POST", "/api/admin/receipts/{id}/approve", 409, 0.08);
        record_http_request("GET", "/api/admin/stats/overview", 500, 0.25);
    }

    #[test]
    fn test_record_business_metrics() {
        record_signup("success");
        record_signup("failed");
        record_receipt_upload("success");
        record_receipt_upload("rejected");
        record_receipt_review("approve", "success");
        record_receipt_review("reject", "conflict");
        record_review_submission("success");
        record_review_submission("too_soon");
    }
}

// ============================================================================
// 中间件测试
// ============================================================================

mod middleware_tests {
    use axum::{
        Router,
        body::Body,
        extract::Extension,
        http::{Request, StatusCode},
        middleware,
        routing::get,
    };
    use gym_shared::observability::middleware::{RequestId, http_tracing, request_id};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route(
                "/echo",
                get(|Extension(id): Extension<RequestId>| async move { id.0 }),
            )
            .layer(middleware::from_fn(http_tracing))
            .layer(middleware::from_fn(request_id))
    }

    #[tokio::test]
    async fn test_request_id_is_generated() {
        let response = app()
            .oneshot(Request::get("/echo").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let header = response
            .headers()
            .get("x-request-id")
            .expect("响应缺少 x-request-id")
            .to_str()
            .unwrap()
            .to_string();
        assert!(uuid::Uuid::parse_str(&header).is_ok());

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, header.as_bytes());
    }

    #[tokio::test]
    async fn test_upstream_request_id_is_preserved() {
        let response = app()
            .oneshot(
                Request::get("/echo")
                    .header("x-request-id", "upstream-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers().get("x-request-id").unwrap(), "upstream-42");
    }

    #[tokio::test]
    async fn test_tracing_passes_through_not_found() {
        let response = app()
            .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get("x-request-id").is_some());
    }

    #[test]
    fn test_request_id_debug() {
        let id = RequestId("debug-test".to_string());
        assert!(format!("{:?}", id).contains("debug-test"));
    }
}

// ============================================================================
// 配置测试
// ============================================================================

mod config_tests {
    use gym_shared::observability::ObservabilityConfig;
    use gym_shared::observability::tracing::build_env_filter;

    #[test]
    fn test_partial_config_deserialize() {
        let config: ObservabilityConfig =
            serde_json::from_str(r#"{"json_logs": true, "metrics_port": 9100}"#).unwrap();
        assert!(config.json_logs);
        assert_eq!(config.metrics_port, 9100);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_build_env_filter_with_invalid_level_falls_back() {
        let config = ObservabilityConfig {
            log_level: "gym_portal=debug,[bad".to_string(),
            ..Default::default()
        };
        // 非法过滤表达式不应 panic
        let _ = build_env_filter(&config);
    }
}
