//! 路由配置模块
//!
//! 定义所有 REST API 端点与页面的路由映射

use std::path::Path;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post},
};
use tower_http::services::{ServeDir, ServeFile};

use crate::{
    handlers,
    middleware::{auth_middleware, require_admin, security_headers},
    state::AppState,
};

/// multipart 表单除文件外的额外开销
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// 页面路由与静态文件的对应关系（首页由 index.html 提供）
const PAGES: &[(&str, &str)] = &[
    ("/auth", "auth.html"),
    ("/dashboard", "dashboard.html"),
    ("/admin", "admin.html"),
    ("/upload", "upload.html"),
    ("/payments", "payments.html"),
    ("/gallery", "gallery.html"),
    ("/our-story", "our-story.html"),
];

/// 构建认证相关的路由
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(handlers::auth::sign_up))
        .route("/auth/signin", post(handlers::auth::sign_in))
        .route("/auth/refresh", post(handlers::auth::refresh_session))
        .route("/auth/signout", post(handlers::auth::sign_out))
        .route("/auth/session", get(handlers::auth::session_status))
}

/// 构建会员路由
///
/// 包含资料、收据、付款和评价
fn member_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/me",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        // 收据
        .route(
            "/receipts",
            post(handlers::receipt::upload_receipt)
                .layer(DefaultBodyLimit::max(
                    max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
                ))
                .get(handlers::receipt::list_my_receipts),
        )
        .route(
            "/receipts/by-month",
            get(handlers::receipt::list_my_receipts_by_month),
        )
        .route(
            "/receipts/{id}/file",
            get(handlers::receipt::get_receipt_file),
        )
        .route(
            "/receipts/{id}",
            delete(handlers::receipt::delete_my_receipt),
        )
        // 付款
        .route("/payments", get(handlers::payment::list_my_payments))
        .route(
            "/payments/summary",
            get(handlers::payment::my_payment_summary),
        )
        // 评价
        .route("/reviews", post(handlers::review::submit_review))
        .route(
            "/reviews/featured",
            get(handlers::review::featured_reviews),
        )
        .route(
            "/reviews/approved",
            get(handlers::review::approved_reviews),
        )
        .route(
            "/reviews/eligibility",
            get(handlers::review::review_eligibility),
        )
        // 相册
        .route("/gallery", get(handlers::gallery::list_images))
}

/// 构建后台管理路由
///
/// 收据审核、付款台账、会员管理、评价审核和统计
fn admin_routes() -> Router<AppState> {
    Router::new()
        // 收据审核
        .route("/receipts", get(handlers::admin_receipt::list_receipts))
        .route(
            "/receipts/cleanup",
            post(handlers::admin_receipt::cleanup_receipts),
        )
        .route(
            "/receipts/{id}",
            delete(handlers::admin_receipt::delete_receipt),
        )
        .route(
            "/receipts/{id}/file",
            get(handlers::admin_receipt::get_receipt_file),
        )
        .route(
            "/receipts/{id}/approve",
            post(handlers::admin_receipt::approve_receipt),
        )
        .route(
            "/receipts/{id}/reject",
            post(handlers::admin_receipt::reject_receipt),
        )
        // 付款台账
        .route("/payments", get(handlers::payment::list_payments))
        // 会员管理
        .route("/members", get(handlers::member::list_members))
        .route(
            "/members/deactivation-candidates",
            get(handlers::member::deactivation_candidates),
        )
        .route(
            "/members/deactivate",
            post(handlers::member::deactivate_members),
        )
        .route("/members/{id}", get(handlers::member::get_member))
        .route(
            "/members/{id}/status",
            patch(handlers::member::update_member_status),
        )
        // 评价审核
        .route("/reviews", get(handlers::admin_review::list_reviews))
        .route(
            "/reviews/{id}",
            delete(handlers::admin_review::delete_review),
        )
        .route(
            "/reviews/{id}/approve",
            post(handlers::admin_review::approve_review),
        )
        .route(
            "/reviews/{id}/reject",
            post(handlers::admin_review::reject_review),
        )
        .route(
            "/reviews/{id}/feature",
            post(handlers::admin_review::feature_review),
        )
        .route(
            "/reviews/{id}/unfeature",
            post(handlers::admin_review::unfeature_review),
        )
        // 统计
        .route("/stats/overview", get(handlers::stats::get_overview))
        .route("/stats/revenue", get(handlers::stats::get_revenue))
        .route("/stats/unpaid", get(handlers::stats::get_unpaid_members))
}

/// 构建所有 API 路由（挂载在 /api 下）
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(member_routes(state.max_upload_bytes()))
        .nest(
            "/admin",
            admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_admin,
            )),
        )
}

/// 页面路由，未匹配的路径交给静态目录
fn page_routes(static_dir: &Path) -> Router<AppState> {
    PAGES
        .iter()
        .fold(Router::new(), |router, (route, file)| {
            router.route_service(route, ServeFile::new(static_dir.join(file)))
        })
        .fallback_service(ServeDir::new(static_dir))
}

/// 构建完整应用
///
/// 认证和安全头在这里挂载；CORS、请求追踪等部署相关的层由 main 添加
pub fn app(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new()
        .nest("/api", api_routes(&state))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    if let Some(dir) = static_dir {
        router = router.merge(page_routes(dir));
    }

    router
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use membership::repository::ReviewRepositoryTrait;
    use membership::service::ReceiptSettings;
    use membership::test_utils::{
        FakeAuthProvider, InMemoryMemberRepository, InMemoryPaymentRepository,
        InMemoryReceiptRepository, InMemoryReviewRepository, InMemoryStatsRepository,
        InMemoryStorage,
    };
    use membership::{
        DashboardOverview, Member, MemberRole, MembershipStatus, NewReview, ReviewStatus,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::auth::{AuthClaims, JwtConfig, JwtVerifier};
    use crate::state::Backends;

    const BOUNDARY: &str = "gym-portal-test-boundary";

    fn mint_token(id: Uuid) -> String {
        let claims = AuthClaims {
            sub: id.to_string(),
            email: Some(format!("{}@example.com", id.simple())),
            role: Some("authenticated".to_string()),
            aud: "authenticated".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            iat: Some(Utc::now().timestamp()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(JwtConfig::default().secret.as_bytes()),
        )
        .unwrap()
    }

    struct TestApp {
        router: Router,
        members: Arc<InMemoryMemberRepository>,
        reviews: Arc<InMemoryReviewRepository>,
        storage: Arc<InMemoryStorage>,
        auth: Arc<FakeAuthProvider>,
    }

    impl TestApp {
        fn new() -> Self {
            let stats = InMemoryStatsRepository {
                overview: DashboardOverview {
                    total_members: 3,
                    ..Default::default()
                },
                ..Default::default()
            };
            Self::with_stats(stats)
        }

        fn with_stats(stats: InMemoryStatsRepository) -> Self {
            let members = Arc::new(InMemoryMemberRepository::new());
            let reviews = Arc::new(InMemoryReviewRepository::new());
            let storage = Arc::new(InMemoryStorage::new());
            let auth = Arc::new(FakeAuthProvider::new().with_token_issuer(mint_token));

            let backends = Backends {
                members: members.clone(),
                receipts: Arc::new(InMemoryReceiptRepository::new()),
                payments: Arc::new(InMemoryPaymentRepository::new()),
                reviews: reviews.clone(),
                stats: Arc::new(stats),
                auth: auth.clone(),
                storage: storage.clone(),
            };
            let settings = ReceiptSettings {
                max_upload_bytes: 1024,
                ..Default::default()
            };
            let state = AppState::new(
                backends,
                settings,
                "gallery",
                JwtVerifier::new(JwtConfig::default()),
            );

            Self {
                router: app(state, None),
                members,
                reviews,
                storage,
                auth,
            }
        }

        fn seed(&self, role: MemberRole) -> (Member, String) {
            let email = format!("{}@example.com", Uuid::new_v4().simple());
            let member = self.members.seed(&email, role, MembershipStatus::Active);
            let token = mint_token(member.id);
            (member, token)
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, body)
        }

        async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
            self.send(request("GET", uri, token, Body::empty())).await
        }

        async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
            let mut req = request("POST", uri, token, Body::from(body.to_string()));
            req.headers_mut().insert(
                header::CONTENT_TYPE,
                "application/json".parse().unwrap(),
            );
            self.send(req).await
        }

        async fn upload(&self, token: &str, amount: &str, description: &str, file: &[u8]) -> (StatusCode, Value) {
            let mut req = request("POST", "/api/receipts", Some(token), multipart_body(amount, description, file));
            req.headers_mut().insert(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY)
                    .parse()
                    .unwrap(),
            );
            self.send(req).await
        }
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Body) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(body).unwrap()
    }

    fn multipart_body(amount: &str, description: &str, file: &[u8]) -> Body {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"amount\"\r\n\r\n{amount}\r\n\
                 --{b}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\n{description}\r\n\
                 --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"slip.png\"\r\n\
                 Content-Type: image/png\r\n\r\n",
                b = BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(file);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        Body::from(body)
    }

    // ---- 公开接口与认证 ----

    #[tokio::test]
    async fn test_health_is_public_and_has_security_headers() {
        let app = TestApp::new();
        let response = app
            .router
            .clone()
            .oneshot(request("GET", "/health", None, Body::empty()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
    }

    #[tokio::test]
    async fn test_ready_without_database_reports_skipped() {
        let app = TestApp::new();
        let (status, body) = app.get("/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["database"], "skipped");
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let app = TestApp::new();

        let (status, body) = app.get("/api/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let (status, _) = app.get("/api/me", Some("not-a-jwt")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_signup_then_signin_and_profile() {
        let app = TestApp::new();

        let (status, body) = app
            .post_json(
                "/api/auth/signup",
                None,
                json!({"email": "New@Example.com", "password": "secret123", "fullName": "New Member"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["membershipStatus"], "pending");

        let (status, body) = app
            .post_json(
                "/api/auth/signin",
                None,
                json!({"email": "new@example.com", "password": "secret123"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let token = body["data"]["session"]["accessToken"].as_str().unwrap().to_string();

        let (status, body) = app.get("/api/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["fullName"], "New Member");

        let (status, body) = app.get("/api/auth/session", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["expiresInSeconds"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_signin_wrong_password() {
        let app = TestApp::new();
        app.auth.register(Uuid::new_v4(), "a@example.com", "right-password");

        let (status, body) = app
            .post_json(
                "/api/auth/signin",
                None,
                json!({"email": "a@example.com", "password": "wrong-password"}),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn test_signup_validation_error() {
        let app = TestApp::new();
        let (status, body) = app
            .post_json(
                "/api/auth/signup",
                None,
                json!({"email": "bad", "password": "1", "fullName": ""}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    // ---- 收据流程 ----

    #[tokio::test]
    async fn test_upload_then_admin_approve_creates_payment() {
        let app = TestApp::new();
        let (member, member_token) = app.seed(MemberRole::Member);
        let (_, admin_token) = app.seed(MemberRole::Admin);

        let (status, body) = app
            .upload(&member_token, "150", "Monthly dues + admin fee", b"png-bytes")
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["status"], "pending");
        let receipt_id = body["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(app.storage.object_count(), 1);

        let (status, body) = app
            .post_json(
                &format!("/api/admin/receipts/{}/approve", receipt_id),
                Some(&admin_token),
                json!({}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["receipt"]["status"], "verified");
        assert_eq!(body["data"]["joiningFeeMarked"], true);

        let (status, body) = app.get("/api/payments", Some(&member_token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["userId"], member.id.to_string());

        // 已审核通过的收据不能再次审核
        let (status, body) = app
            .post_json(
                &format!("/api/admin/receipts/{}/approve", receipt_id),
                Some(&admin_token),
                json!({}),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "INVALID_RECEIPT_STATUS");
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_amount_and_oversized_file() {
        let app = TestApp::new();
        let (_, token) = app.seed(MemberRole::Member);

        let (status, body) = app.upload(&token, "abc", "", b"png").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, _) = app.upload(&token, "100", "", &vec![0u8; 2048]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(app.storage.object_count(), 0);
    }

    #[tokio::test]
    async fn test_reject_receipt_without_body() {
        let app = TestApp::new();
        let (_, member_token) = app.seed(MemberRole::Member);
        let (_, admin_token) = app.seed(MemberRole::Admin);

        let (_, body) = app.upload(&member_token, "80", "", b"png").await;
        let receipt_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = app
            .send(request(
                "POST",
                &format!("/api/admin/receipts/{}/reject", receipt_id),
                Some(&admin_token),
                Body::empty(),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["status"], "rejected");

        let (status, body) = app
            .get("/api/admin/receipts?status=rejected", Some(&admin_token))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_member_cannot_read_others_receipt_file() {
        let app = TestApp::new();
        let (_, owner_token) = app.seed(MemberRole::Member);
        let (_, other_token) = app.seed(MemberRole::Member);

        let (_, body) = app.upload(&owner_token, "80", "", b"png").await;
        let receipt_id = body["data"]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/receipts/{}/file", receipt_id);

        let (status, body) = app.get(&uri, Some(&owner_token)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["url"].as_str().unwrap().starts_with("memory://sign/"));

        let (status, body) = app.get(&uri, Some(&other_token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");
    }

    // ---- 管理员权限 ----

    #[tokio::test]
    async fn test_admin_routes_reject_members() {
        let app = TestApp::new();
        let (_, member_token) = app.seed(MemberRole::Member);

        let (status, body) = app.get("/api/admin/stats/overview", Some(&member_token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");

        // 令牌有效但没有会员资料
        let orphan = mint_token(Uuid::new_v4());
        let (status, _) = app.get("/api/admin/members", Some(&orphan)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_stats_and_members() {
        let app = TestApp::new();
        let (member, _) = app.seed(MemberRole::Member);
        let (_, admin_token) = app.seed(MemberRole::Admin);

        let (status, body) = app.get("/api/admin/stats/overview", Some(&admin_token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalMembers"], 3);

        let (status, body) = app
            .get("/api/admin/stats/revenue?year=2024", Some(&admin_token))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["months"].as_array().unwrap().len(), 12);

        let (status, body) = app
            .get("/api/admin/stats/unpaid?month=2024-13", Some(&admin_token))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let mut req = request(
            "PATCH",
            &format!("/api/admin/members/{}/status", member.id),
            Some(&admin_token),
            Body::from(json!({"status": "inactive"}).to_string()),
        );
        req.headers_mut()
            .insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        let (status, body) = app.send(req).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["membershipStatus"], "inactive");

        let (status, body) = app
            .post_json(
                "/api/admin/members/deactivate",
                Some(&admin_token),
                json!({"memberIds": [member.id, member.id]}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["requested"], 1);
    }

    // ---- 评价 ----

    #[tokio::test]
    async fn test_review_submission_is_limited_per_quarter() {
        let app = TestApp::new();
        let (_, token) = app.seed(MemberRole::Member);

        let (status, body) = app.get("/api/reviews/eligibility", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["canSubmit"], true);

        let review = json!({"rating": 5, "content": "Friendly trainers and great hours"});
        let (status, body) = app.post_json("/api/reviews", Some(&token), review.clone()).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["status"], "pending");

        let (status, body) = app.post_json("/api/reviews", Some(&token), review).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "REVIEW_TOO_SOON");
        assert!(body["data"]["nextEligibleAt"].is_string());
    }

    #[tokio::test]
    async fn test_featuring_respects_limit_and_shows_on_landing() {
        let app = TestApp::new();
        let (_, admin_token) = app.seed(MemberRole::Admin);

        let mut ids = Vec::new();
        for i in 0..11 {
            let review = app
                .reviews
                .create(&NewReview {
                    user_id: Uuid::new_v4(),
                    author_name: format!("Member {}", i),
                    rating: 5,
                    content: "Clean equipment and kind staff".to_string(),
                })
                .await
                .unwrap();
            app.reviews
                .update_status(review.id, ReviewStatus::Approved)
                .await
                .unwrap();
            ids.push(review.id);
        }

        for id in &ids[..10] {
            let (status, body) = app
                .post_json(&format!("/api/admin/reviews/{}/feature", id), Some(&admin_token), json!({}))
                .await;
            assert_eq!(status, StatusCode::OK, "{body}");
        }

        let (status, body) = app
            .post_json(&format!("/api/admin/reviews/{}/feature", ids[10]), Some(&admin_token), json!({}))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "FEATURED_LIMIT_REACHED");
        assert_eq!(body["data"]["featured"].as_array().unwrap().len(), 10);

        let (status, body) = app.get("/api/reviews/featured", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 10);

        let (status, body) = app.get("/api/reviews/approved", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 11);
    }

    #[tokio::test]
    async fn test_gallery_is_public() {
        let app = TestApp::new();
        let (status, body) = app.get("/api/gallery", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_admin_route_is_not_found() {
        let app = TestApp::new();
        let (_, admin_token) = app.seed(MemberRole::Admin);
        let (status, _) = app.get("/api/admin/unknown", Some(&admin_token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
