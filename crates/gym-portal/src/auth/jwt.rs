//! JWT Token 校验
//!
//! 使用托管认证服务的签名密钥（HS256）在本地校验访问令牌，
//! 避免每个请求都回源认证服务

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PortalError;

/// JWT 配置
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// 签名密钥
    pub secret: String,
    /// 期望的 aud 声明
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "gym-portal-jwt-secret-change-in-production".to_string(),
            audience: "authenticated".to_string(),
        }
    }
}

/// JWT Claims（托管认证服务签发的载荷，只取用到的字段）
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthClaims {
    /// 用户 ID
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    /// 认证服务侧的角色（通常为 authenticated），与会员角色无关
    #[serde(default)]
    pub role: Option<String>,
    pub aud: String,
    /// 过期时间
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// 当前登录用户
///
/// 由认证中间件注入请求扩展，处理器通过 `Extension<CurrentUser>` 获取
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub expires_at: DateTime<Utc>,
    /// 原始访问令牌，注销时需要转交给认证服务
    pub access_token: String,
}

impl CurrentUser {
    /// 令牌剩余有效秒数（已过期返回 0）
    pub fn expires_in_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

/// JWT 校验器
#[derive(Clone)]
pub struct JwtVerifier {
    config: JwtConfig,
    decoding_key: DecodingKey,
}

impl JwtVerifier {
    pub fn new(config: JwtConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            decoding_key,
        }
    }

    /// 验证并解析 JWT Token
    pub fn verify_token(&self, token: &str) -> Result<AuthClaims, PortalError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);

        let token_data = decode::<AuthClaims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    PortalError::Unauthorized("Token 已过期".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    PortalError::Unauthorized("无效的 Token".to_string())
                }
                _ => PortalError::Unauthorized(format!("Token 验证失败: {}", e)),
            },
        )?;

        Ok(token_data.claims)
    }

    /// 校验令牌并转换为当前用户
    pub fn authenticate(&self, token: &str) -> Result<CurrentUser, PortalError> {
        let claims = self.verify_token(token)?;

        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| PortalError::Unauthorized("无效的用户 ID".to_string()))?;
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| PortalError::Unauthorized("无效的过期时间".to_string()))?;

        Ok(CurrentUser {
            id,
            email: claims.email.unwrap_or_default(),
            expires_at,
            access_token: token.to_string(),
        })
    }
}
