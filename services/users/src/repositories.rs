//! Persistence gateway for user rows

use async_trait::async_trait;
use common::error::DatabaseResult;

use crate::models::User;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryUserRepository;
pub use postgres::PgUserRepository;

/// Typed access to stored users
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn exists_by_email(&self, email: &str) -> DatabaseResult<bool>;

    async fn exists_by_phone_number(&self, phone_number: &str) -> DatabaseResult<bool>;

    async fn exists_by_id(&self, id: i64) -> DatabaseResult<bool>;

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>>;

    /// All rows, ordered by id
    async fn find_all(&self) -> DatabaseResult<Vec<User>>;

    /// Insert when `user.id` is `None`, otherwise overwrite the row with that id
    async fn save(&self, user: User) -> DatabaseResult<User>;

    /// Remove a row; absent ids are not an error
    async fn delete_by_id(&self, id: i64) -> DatabaseResult<()>;
}
