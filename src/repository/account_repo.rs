//! Account repository (数据库访问层)

use super::AccountRepository;
use crate::{
    error::AppError,
    models::account::{Account, NewAccount},
};
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL 唯一约束冲突错误码
const UNIQUE_VIOLATION: &str = "23505";

pub struct PgAccountRepository {
    db: PgPool,
}

impl PgAccountRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    /// 根据 ID 查找账户
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL"
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(account)
    }

    /// 根据用户名查找账户
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT * FROM users WHERE username = $1 AND deleted_at IS NULL"
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(account)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND deleted_at IS NULL)"
        )
        .bind(username)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND deleted_at IS NULL)"
        )
        .bind(email)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    /// 创建账户
    async fn create(&self, account: NewAccount) -> Result<Account, AppError> {
        let result = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO users (username, email, password_hash, nickname)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#
        )
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.nickname)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(account) => Ok(account),
            // 检查与插入之间的并发注册落到唯一索引上
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                tracing::debug!(constraint = ?db_err.constraint(), "Account unique violation");
                Err(AppError::conflict("Username or email already exists"))
            }
            Err(e) => Err(e.into()),
        }
    }
}
