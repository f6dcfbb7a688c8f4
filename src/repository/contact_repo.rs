//! Contact repository (数据库访问层)

use super::ContactRepository;
use crate::{
    error::AppError,
    models::contact::{Contact, CreateContactRequest, UpdateContactRequest},
};
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PgContactRepository {
    db: PgPool,
}

impl PgContactRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    /// 列出所有联系人
    async fn list(&self) -> Result<Vec<Contact>, AppError> {
        let contacts = sqlx::query_as::<_, Contact>(
            "SELECT * FROM contacts WHERE deleted_at IS NULL ORDER BY id"
        )
        .fetch_all(&self.db)
        .await?;

        Ok(contacts)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Contact>, AppError> {
        let contact = sqlx::query_as::<_, Contact>(
            "SELECT * FROM contacts WHERE id = $1 AND deleted_at IS NULL"
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(contact)
    }

    async fn create(&self, req: CreateContactRequest) -> Result<Contact, AppError> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (first_name, second_name, email, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#
        )
        .bind(&req.first_name)
        .bind(&req.second_name)
        .bind(&req.email)
        .bind(&req.phone)
        .fetch_one(&self.db)
        .await?;

        Ok(contact)
    }

    /// 部分更新，未提供的字段保持原值
    async fn update(&self, id: i64, req: UpdateContactRequest) -> Result<Option<Contact>, AppError> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts
            SET
                first_name = COALESCE($2, first_name),
                second_name = COALESCE($3, second_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#
        )
        .bind(id)
        .bind(&req.first_name)
        .bind(&req.second_name)
        .bind(&req.email)
        .bind(&req.phone)
        .fetch_optional(&self.db)
        .await?;

        Ok(contact)
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE contacts SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL"
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
