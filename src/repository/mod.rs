//! Database repository layer
//!
//! Handlers and services only see the traits; `main` wires the PostgreSQL
//! implementations, tests wire the in-memory one.

pub mod account_repo;
pub mod contact_repo;
pub mod memory;

use crate::{
    error::AppError,
    models::{
        account::{Account, NewAccount},
        contact::{Contact, CreateContactRequest, UpdateContactRequest},
    },
};
use async_trait::async_trait;

pub use account_repo::PgAccountRepository;
pub use contact_repo::PgContactRepository;
pub use memory::InMemoryStore;

/// Account persistence. Soft-deleted accounts are invisible to every method.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AppError>;
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;
    /// Fails with [`AppError::Conflict`] when username or email is taken.
    async fn create(&self, account: NewAccount) -> Result<Account, AppError>;
}

/// Contact persistence. Soft-deleted contacts are invisible to every method.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Contact>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Contact>, AppError>;
    async fn create(&self, req: CreateContactRequest) -> Result<Contact, AppError>;
    async fn update(&self, id: i64, req: UpdateContactRequest) -> Result<Option<Contact>, AppError>;
    /// Returns `false` when nothing was deleted.
    async fn soft_delete(&self, id: i64) -> Result<bool, AppError>;
}
