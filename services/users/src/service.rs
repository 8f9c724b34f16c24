//! User lifecycle and photo management
//!
//! Orchestrates the persistence gateway and the photo store. Operations are
//! independent request/response sequences; nothing is shared between them
//! besides the gateway and the store.

use std::sync::Arc;

use common::{
    error::{DatabaseError, StorageError},
    storage::FileStore,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    models::{PhotoUpload, User, UserContactInfo},
    repositories::UserRepository,
};

/// Failures of the user operations
#[derive(Error, Debug)]
pub enum UserError {
    #[error("User with ID {0} not found.")]
    NotFound(i64),

    #[error("User with this email or phone number already exists.")]
    AlreadyExists,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for UserError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::UniqueViolation(_) => UserError::AlreadyExists,
            other => UserError::Database(other),
        }
    }
}

pub type UserResult<T> = Result<T, UserError>;

/// User service
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    file_store: FileStore,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, file_store: FileStore) -> Self {
        Self {
            repository,
            file_store,
        }
    }

    pub async fn list_users(&self) -> UserResult<Vec<User>> {
        Ok(self.repository.find_all().await?)
    }

    pub async fn get_user(&self, id: i64) -> UserResult<User> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    pub async fn get_contact_info(&self, id: i64) -> UserResult<UserContactInfo> {
        self.get_user(id).await.map(UserContactInfo::from)
    }

    /// Insert a new user; email is checked before phone number
    pub async fn create_user(&self, mut user: User) -> UserResult<User> {
        if self.repository.exists_by_email(&user.email).await? {
            return Err(UserError::AlreadyExists);
        }
        if self.repository.exists_by_phone_number(&user.phone_number).await? {
            return Err(UserError::AlreadyExists);
        }

        user.id = None;
        let created = self.repository.save(user).await?;
        info!("Created user {:?}", created.id);
        Ok(created)
    }

    /// Overwrite every field of an existing user, keeping the path id
    pub async fn update_user(&self, id: i64, mut user: User) -> UserResult<User> {
        if !self.repository.exists_by_id(id).await? {
            return Err(UserError::NotFound(id));
        }

        user.id = Some(id);
        let updated = self.repository.save(user).await?;
        info!("Updated user {}", id);
        Ok(updated)
    }

    /// Delete a user and its photo; absent users are ignored
    pub async fn delete_user(&self, id: i64) -> UserResult<()> {
        let existing = self.repository.find_by_id(id).await?;
        self.repository.delete_by_id(id).await?;

        if let Some(user) = existing {
            info!("Deleted user {}", id);
            if let Err(e) = self.file_store.delete(user.photo_path.as_deref()).await {
                warn!("Failed to remove photo of deleted user {}: {}", id, e);
            }
        }

        Ok(())
    }

    /// Store a new photo for the user, replacing the previous one
    ///
    /// The new asset is written and the row persisted before the previous
    /// asset is removed. If persisting fails the new asset is removed again.
    pub async fn upload_photo(&self, id: i64, upload: PhotoUpload) -> UserResult<User> {
        let mut user = self.get_user(id).await?;
        let previous = user.photo_path.take();

        let new_path = self
            .file_store
            .save(&upload.bytes, upload.file_name.as_deref())
            .await?;
        user.photo_path = Some(new_path.clone());

        let saved = match self.repository.save(user).await {
            Ok(saved) => saved,
            Err(e) => {
                if let Err(cleanup) = self.file_store.delete(Some(&new_path)).await {
                    warn!("Failed to remove orphaned photo {}: {}", new_path, cleanup);
                }
                return Err(e.into());
            }
        };

        if let Err(e) = self.file_store.delete(previous.as_deref()).await {
            warn!("Failed to remove previous photo of user {}: {}", id, e);
        }

        info!("Stored photo {} for user {}", new_path, id);
        Ok(saved)
    }

    pub async fn get_photo_path(&self, id: i64) -> UserResult<Option<String>> {
        Ok(self.get_user(id).await?.photo_path)
    }

    /// Remove the user's photo; users without one are left unchanged
    pub async fn delete_photo(&self, id: i64) -> UserResult<()> {
        let mut user = self.get_user(id).await?;

        self.file_store.delete(user.photo_path.as_deref()).await?;
        user.photo_path = None;
        self.repository.save(user).await?;

        Ok(())
    }
}
