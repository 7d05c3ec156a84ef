//! 账号服务
//!
//! 注册、登录与会话管理委托托管认证服务，会员资料保存在 `users` 表。
//! 注册是两步远程调用（认证账号 + 资料行），不具备原子性。

use std::sync::Arc;

use gym_shared::auth_client::{AuthProvider, AuthSession};
use gym_shared::error::GymError;
use gym_shared::observability::metrics;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::error::{MembershipError, Result};
use crate::models::{Member, NewMember, ProfileUpdate};
use crate::repository::MemberRepositoryTrait;
use crate::service::dto::{SignInInput, SignInResult, SignUpInput, UpdateProfileInput};

/// 账号服务
pub struct AccountService {
    auth: Arc<dyn AuthProvider>,
    members: Arc<dyn MemberRepositoryTrait>,
}

impl AccountService {
    pub fn new(auth: Arc<dyn AuthProvider>, members: Arc<dyn MemberRepositoryTrait>) -> Self {
        Self { auth, members }
    }

    /// 注册会员
    ///
    /// 已有会员资料的邮箱直接拒绝；认证服务对重复邮箱、弱密码返回 4xx，
    /// 同样转换为参数校验错误
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn sign_up(&self, input: SignUpInput) -> Result<Member> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();
        if self.members.find_by_email(&email).await?.is_some() {
            metrics::record_signup("rejected");
            return Err(MembershipError::Validation("该邮箱已注册".to_string()));
        }

        let user = match self
            .auth
            .sign_up(&email, &input.password, input.full_name.trim())
            .await
        {
            Ok(user) => user,
            Err(GymError::Backend { status, message }) if (400..500).contains(&status) => {
                metrics::record_signup("rejected");
                return Err(MembershipError::Validation(message));
            }
            Err(e) => {
                error!(error = %e, "认证服务注册失败");
                metrics::record_signup("failed");
                return Err(e.into());
            }
        };

        let new_member = NewMember {
            id: user.id,
            email: user.email,
            full_name: input.full_name.trim().to_string(),
            phone: input.phone.filter(|p| !p.trim().is_empty()),
        };

        let member = self.members.create(&new_member).await.inspect_err(|e| {
            error!(user_id = %new_member.id, error = %e, "认证账号已创建，但会员资料写入失败");
            metrics::record_signup("failed");
        })?;

        metrics::record_signup("success");
        info!(user_id = %member.id, "会员注册成功");
        Ok(member)
    }

    /// 登录，返回会话和会员资料
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn sign_in(&self, input: SignInInput) -> Result<SignInResult> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();
        let session = self.auth.sign_in(&email, &input.password).await?;

        let member = self
            .members
            .get(session.user.id)
            .await?
            .ok_or(MembershipError::MemberNotFound(session.user.id))?;

        info!(user_id = %member.id, "会员登录成功");
        Ok(SignInResult { session, member })
    }

    /// 刷新会话
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession> {
        if refresh_token.is_empty() {
            return Err(MembershipError::Validation("refresh token 不能为空".to_string()));
        }
        Ok(self.auth.refresh(refresh_token).await?)
    }

    /// 登出
    #[instrument(skip_all)]
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.auth.sign_out(access_token).await?;
        Ok(())
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<Member> {
        self.members
            .get(user_id)
            .await?
            .ok_or(MembershipError::MemberNotFound(user_id))
    }

    #[instrument(skip(self, input))]
    pub async fn update_profile(&self, user_id: Uuid, input: UpdateProfileInput) -> Result<Member> {
        input.validate()?;

        let update = ProfileUpdate {
            full_name: input.full_name.map(|n| n.trim().to_string()),
            phone: input.phone.map(|p| p.trim().to_string()),
        };

        self.members
            .update_profile(user_id, &update)
            .await?
            .ok_or(MembershipError::MemberNotFound(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockMemberRepositoryTrait;
    use crate::test_utils::{FakeAuthProvider, InMemoryMemberRepository};

    fn sign_up_input(email: &str) -> SignUpInput {
        SignUpInput {
            email: email.to_string(),
            password: "secret123".to_string(),
            full_name: "Jamie Lee".to_string(),
            phone: Some("  ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_sign_up_creates_pending_member() {
        let members = Arc::new(InMemoryMemberRepository::new());
        let service = AccountService::new(Arc::new(FakeAuthProvider::new()), members.clone());

        let member = service
            .sign_up(sign_up_input("Jamie@Example.com"))
            .await
            .unwrap();

        assert_eq!(member.email, "jamie@example.com");
        assert_eq!(member.membership_status, crate::models::MembershipStatus::Pending);
        assert!(!member.joining_fee_paid);
        assert!(member.phone.is_none());
        assert!(members.get(member.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_email_is_validation_error() {
        let service = AccountService::new(
            Arc::new(FakeAuthProvider::new()),
            Arc::new(InMemoryMemberRepository::new()),
        );

        service.sign_up(sign_up_input("dup@example.com")).await.unwrap();
        let err = service
            .sign_up(sign_up_input("dup@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, MembershipError::Validation(_)));
    }

    #[tokio::test]
    async fn test_sign_up_profile_insert_failure_propagates() {
        let mut members = MockMemberRepositoryTrait::new();
        members.expect_find_by_email().returning(|_| Ok(None));
        members
            .expect_create()
            .returning(|_| Err(MembershipError::Database(sqlx::Error::PoolTimedOut)));

        let service = AccountService::new(Arc::new(FakeAuthProvider::new()), Arc::new(members));
        let err = service
            .sign_up(sign_up_input("a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, MembershipError::Database(_)));
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password() {
        let service = AccountService::new(
            Arc::new(FakeAuthProvider::new()),
            Arc::new(InMemoryMemberRepository::new()),
        );
        service.sign_up(sign_up_input("b@example.com")).await.unwrap();

        let err = service
            .sign_in(SignInInput {
                email: "b@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MembershipError::InvalidCredentials(_)));

        let ok = service
            .sign_in(SignInInput {
                email: "b@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(ok.member.email, "b@example.com");
        assert_eq!(ok.session.user.id, ok.member.id);
    }

    #[tokio::test]
    async fn test_update_profile_keeps_unset_fields() {
        let service = AccountService::new(
            Arc::new(FakeAuthProvider::new()),
            Arc::new(InMemoryMemberRepository::new()),
        );
        let member = service.sign_up(sign_up_input("c@example.com")).await.unwrap();

        let updated = service
            .update_profile(
                member.id,
                UpdateProfileInput {
                    full_name: None,
                    phone: Some(" 0400 000 000 ".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.full_name, "Jamie Lee");
        assert_eq!(updated.phone.as_deref(), Some("0400 000 000"));
    }

    #[tokio::test]
    async fn test_get_profile_missing() {
        let service = AccountService::new(
            Arc::new(FakeAuthProvider::new()),
            Arc::new(InMemoryMemberRepository::new()),
        );
        let err = service.get_profile(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, MembershipError::MemberNotFound(_)));
    }
}
