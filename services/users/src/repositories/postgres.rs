//! PostgreSQL-backed user repository

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use tracing::debug;

use super::UserRepository;
use crate::models::User;

/// User repository for database operations
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn exists_by_email(&self, email: &str) -> DatabaseResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn exists_by_phone_number(&self, phone_number: &str) -> DatabaseResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE phone_number = $1)")
            .bind(phone_number)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn exists_by_id(&self, id: i64) -> DatabaseResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, last_name, first_name, patronymic, birth_date, email, phone_number, photo_path
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    async fn find_all(&self) -> DatabaseResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, last_name, first_name, patronymic, birth_date, email, phone_number, photo_path
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    async fn save(&self, user: User) -> DatabaseResult<User> {
        let query = match user.id {
            None => sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (last_name, first_name, patronymic, birth_date, email, phone_number, photo_path)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, last_name, first_name, patronymic, birth_date, email, phone_number, photo_path
                "#,
            ),
            Some(id) => sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (id, last_name, first_name, patronymic, birth_date, email, phone_number, photo_path)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id) DO UPDATE SET
                last_name = EXCLUDED.last_name,
                first_name = EXCLUDED.first_name,
                patronymic = EXCLUDED.patronymic,
                birth_date = EXCLUDED.birth_date,
                email = EXCLUDED.email,
                phone_number = EXCLUDED.phone_number,
                photo_path = EXCLUDED.photo_path
                RETURNING id, last_name, first_name, patronymic, birth_date, email, phone_number, photo_path
                "#,
            )
            .bind(id),
        };

        let saved = query
            .bind(&user.last_name)
            .bind(&user.first_name)
            .bind(&user.patronymic)
            .bind(&user.birth_date)
            .bind(&user.email)
            .bind(&user.phone_number)
            .bind(&user.photo_path)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        debug!("Saved user {:?}", saved.id);
        Ok(saved)
    }

    async fn delete_by_id(&self, id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(())
    }
}
