//! 托管认证服务客户端
//!
//! 注册、登录、刷新和登出都委托给托管认证服务的 REST 接口，
//! 本服务不签发令牌，只消费其返回的会话。

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::config::BackendConfig;
use crate::error::{GymError, Result};

/// 认证服务中的用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// 登录会话
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

/// 认证服务接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// 注册新账号，返回认证服务分配的用户
    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<AuthUser>;
    /// 邮箱密码登录
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession>;
    /// 用 refresh token 换取新会话
    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession>;
    /// 注销会话
    async fn sign_out(&self, access_token: &str) -> Result<()>;
}

/// 认证接口原始响应中的用户
#[derive(Debug, Deserialize)]
struct RawUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

/// 认证接口原始 token 响应
#[derive(Debug, Deserialize)]
struct RawSession {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: RawUser,
}

impl RawSession {
    fn into_session(self, now: DateTime<Utc>) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(|| now + chrono::Duration::seconds(self.expires_in.unwrap_or(3600)));

        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: AuthUser {
                id: self.user.id,
                email: self.user.email.unwrap_or_default(),
            },
        }
    }
}

/// 从错误响应体中提取可读信息
///
/// 认证服务的错误体格式不统一：`msg`、`error_description`、`message`、`error` 都可能出现
fn extract_error_message(body: &Value) -> String {
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .unwrap_or("unknown error")
        .to_string()
}

/// 托管认证服务 REST 客户端
#[derive(Clone)]
pub struct HostedAuthClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HostedAuthClient {
    pub fn new(config: &BackendConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.anon_key.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// 发送请求并把非 2xx 响应转换为错误
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request.header("apikey", &self.api_key).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(body);
        }

        let message = extract_error_message(&body);
        warn!(status = status.as_u16(), message = %message, "认证服务返回错误");

        Err(GymError::Backend {
            status: status.as_u16(),
            message,
        })
    }

    /// token 授权失败（400/401）统一视为凭证无效
    fn map_grant_error(err: GymError) -> GymError {
        match err {
            GymError::Backend { status, message } if status == 400 || status == 401 => {
                GymError::Unauthorized(message)
            }
            other => other,
        }
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> Result<AuthSession> {
        let request = self
            .client
            .post(self.endpoint("token"))
            .query(&[("grant_type", grant_type)])
            .json(&body);

        let body = self.send(request).await.map_err(Self::map_grant_error)?;
        let raw: RawSession = serde_json::from_value(body)
            .map_err(|e| GymError::Internal(format!("认证响应解析失败: {}", e)))?;
        Ok(raw.into_session(Utc::now()))
    }
}

#[async_trait]
impl AuthProvider for HostedAuthClient {
    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<AuthUser> {
        let request = self.client.post(self.endpoint("signup")).json(&json!({
            "email": email,
            "password": password,
            "data": { "full_name": full_name },
        }));

        let body = self.send(request).await?;

        // 开启邮箱确认时直接返回用户；关闭时返回带 user 字段的会话
        let user_value = body.get("user").cloned().unwrap_or(body);
        let raw: RawUser = serde_json::from_value(user_value)
            .map_err(|e| GymError::Internal(format!("注册响应解析失败: {}", e)))?;

        Ok(AuthUser {
            id: raw.id,
            email: raw.email.unwrap_or_else(|| email.to_string()),
        })
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        self.token_grant(
            "password",
            json!({ "email": email, "password": password }),
        )
        .await
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let request = self
            .client
            .post(self.endpoint("logout"))
            .bearer_auth(access_token);
        self.send(request).await.map(|_| ())
    }
}
