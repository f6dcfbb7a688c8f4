//! In-memory storage implementation
//!
//! Same semantics as the PostgreSQL repositories (soft delete, uniqueness among
//! live accounts), without a database. Used by the test suite and for running
//! the service locally.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{AccountRepository, ContactRepository};
use crate::{
    error::AppError,
    models::{
        account::{Account, NewAccount},
        contact::{Contact, CreateContactRequest, UpdateContactRequest},
    },
};

#[derive(Default)]
struct Tables {
    accounts: BTreeMap<i64, Account>,
    contacts: BTreeMap<i64, Contact>,
    next_account_id: i64,
    next_contact_id: i64,
}

impl Tables {
    fn live_accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values().filter(|a| a.deleted_at.is_none())
    }
}

/// In-memory storage for development and testing
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Soft delete an account. Not part of the HTTP surface.
    pub async fn soft_delete_account(&self, id: i64) -> bool {
        let mut tables = self.tables.write().await;
        match tables.accounts.get_mut(&id) {
            Some(account) if account.deleted_at.is_none() => {
                account.deleted_at = Some(Utc::now());
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .get(&id)
            .filter(|a| a.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AppError> {
        let tables = self.tables.read().await;
        let found = tables.live_accounts().find(|a| a.username == username).cloned();
        Ok(found)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        let tables = self.tables.read().await;
        let exists = tables.live_accounts().any(|a| a.username == username);
        Ok(exists)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let tables = self.tables.read().await;
        let exists = tables.live_accounts().any(|a| a.email == email);
        Ok(exists)
    }

    async fn create(&self, account: NewAccount) -> Result<Account, AppError> {
        let mut tables = self.tables.write().await;

        if tables
            .live_accounts()
            .any(|a| a.username == account.username || a.email == account.email)
        {
            return Err(AppError::conflict("Username or email already exists"));
        }

        tables.next_account_id += 1;
        let now = Utc::now();
        let account = Account {
            id: tables.next_account_id,
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            nickname: account.nickname,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.accounts.insert(account.id, account.clone());

        Ok(account)
    }
}

#[async_trait]
impl ContactRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Contact>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .contacts
            .values()
            .filter(|c| c.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Contact>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .contacts
            .get(&id)
            .filter(|c| c.deleted_at.is_none())
            .cloned())
    }

    async fn create(&self, req: CreateContactRequest) -> Result<Contact, AppError> {
        let mut tables = self.tables.write().await;

        tables.next_contact_id += 1;
        let now = Utc::now();
        let contact = Contact {
            id: tables.next_contact_id,
            first_name: req.first_name,
            second_name: req.second_name,
            email: req.email,
            phone: req.phone,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.contacts.insert(contact.id, contact.clone());

        Ok(contact)
    }

    async fn update(&self, id: i64, req: UpdateContactRequest) -> Result<Option<Contact>, AppError> {
        let mut tables = self.tables.write().await;

        match tables.contacts.get_mut(&id) {
            Some(contact) if contact.deleted_at.is_none() => {
                req.apply_to(contact);
                contact.updated_at = Utc::now();
                Ok(Some(contact.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;

        match tables.contacts.get_mut(&id) {
            Some(contact) if contact.deleted_at.is_none() => {
                contact.deleted_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
