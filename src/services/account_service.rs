//! 账户服务：注册、登录、当前用户

use crate::{
    auth::{jwt::TokenService, password::PasswordHasher, AuthError},
    error::AppError,
    models::account::{Account, LoginRequest, NewAccount, RegisterRequest},
    repository::AccountRepository,
};
use std::sync::Arc;

/// 登录成功的结果
#[derive(Debug)]
pub struct LoginOutcome {
    pub token: String,
    pub account: Account,
}

pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
    token_ttl_hours: i64,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        tokens: Arc<TokenService>,
        token_ttl_hours: i64,
    ) -> Self {
        Self {
            accounts,
            tokens,
            hasher: PasswordHasher::new(),
            token_ttl_hours,
        }
    }

    /// 用户注册
    ///
    /// 调用方负责先做请求格式校验。
    pub async fn register(&self, req: RegisterRequest) -> Result<Account, AppError> {
        if self.accounts.username_exists(&req.username).await? {
            return Err(AppError::conflict("Username already exists"));
        }

        if self.accounts.email_exists(&req.email).await? {
            return Err(AppError::conflict("Email already exists"));
        }

        let password_hash = self.hash_password(req.password).await?;

        let account = self
            .accounts
            .create(NewAccount {
                username: req.username,
                email: req.email,
                password_hash,
                nickname: req.nickname,
            })
            .await?;

        tracing::info!(user_id = account.id, username = %account.username, "Account registered");

        Ok(account)
    }

    /// 用户登录
    ///
    /// 用户不存在与密码错误返回同一个错误，不暴露用户名是否存在。
    pub async fn login(&self, req: LoginRequest) -> Result<LoginOutcome, AppError> {
        let account = self
            .accounts
            .find_by_username(&req.username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self
            .verify_password(req.password, account.password_hash.clone())
            .await?
        {
            tracing::info!(username = %req.username, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self
            .tokens
            .issue(account.id, self.token_ttl_hours)
            .map_err(|e| {
                tracing::error!(user_id = account.id, error = %e, "Failed to issue token");
                AppError::Internal(format!("Failed to issue token: {}", e))
            })?;

        tracing::info!(user_id = account.id, "Login succeeded");

        Ok(LoginOutcome { token, account })
    }

    /// 获取当前用户
    pub async fn current(&self, user_id: i64) -> Result<Account, AppError> {
        self.accounts
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("account"))
    }

    /// Argon2 是 CPU 密集型计算，放到阻塞线程池执行
    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
    }
}
