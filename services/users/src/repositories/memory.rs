//! In-memory user repository
//!
//! Mirrors the table's behavior, including the unique email and phone
//! number columns. Used for local runs without a database and in tests.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use tokio::sync::Mutex;

use super::UserRepository;
use crate::models::User;

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, User>,
    last_id: i64,
}

/// In-memory user repository
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    table: Arc<Mutex<Table>>,
}

impl InMemoryUserRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn exists_by_email(&self, email: &str) -> DatabaseResult<bool> {
        let table = self.table.lock().await;
        Ok(table.rows.values().any(|u| u.email == email))
    }

    async fn exists_by_phone_number(&self, phone_number: &str) -> DatabaseResult<bool> {
        let table = self.table.lock().await;
        Ok(table.rows.values().any(|u| u.phone_number == phone_number))
    }

    async fn exists_by_id(&self, id: i64) -> DatabaseResult<bool> {
        Ok(self.table.lock().await.rows.contains_key(&id))
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        Ok(self.table.lock().await.rows.get(&id).cloned())
    }

    async fn find_all(&self) -> DatabaseResult<Vec<User>> {
        Ok(self.table.lock().await.rows.values().cloned().collect())
    }

    async fn save(&self, mut user: User) -> DatabaseResult<User> {
        let mut table = self.table.lock().await;

        let clash = table.rows.values().find(|other| {
            other.id != user.id
                && (other.email == user.email || other.phone_number == user.phone_number)
        });
        if let Some(other) = clash {
            let column = if other.email == user.email {
                "email"
            } else {
                "phone_number"
            };
            return Err(DatabaseError::UniqueViolation(format!(
                "duplicate key value violates unique constraint on users.{}",
                column
            )));
        }

        let id = match user.id {
            Some(id) => {
                table.last_id = table.last_id.max(id);
                id
            }
            None => {
                table.last_id += 1;
                table.last_id
            }
        };
        user.id = Some(id);
        table.rows.insert(id, user.clone());

        Ok(user)
    }

    async fn delete_by_id(&self, id: i64) -> DatabaseResult<()> {
        self.table.lock().await.rows.remove(&id);
        Ok(())
    }
}
