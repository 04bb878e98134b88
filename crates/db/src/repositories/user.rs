//! User repository for database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use tally_core::auth::{NewUser, User};
use tally_shared::types::UserId;
use uuid::Uuid;

use crate::entities::users;

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Another user already holds this email.
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    /// User not found.
    #[error("User not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: UserId::from_uuid(model.id),
            external_subject: model.external_subject,
            email: model.email,
            display_name: model.display_name,
            avatar_url: model.avatar_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds a user by identity-provider subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_subject(&self, subject: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::ExternalSubject.eq(subject))
            .one(&self.db)
            .await
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEmail` if the email is taken.
    pub async fn create(&self, input: NewUser) -> Result<users::Model, UserError> {
        let now = Utc::now();
        let email = input.email.clone();
        let user = users::ActiveModel {
            id: Set(UserId::new().into_inner()),
            external_subject: Set(input.external_subject),
            email: Set(input.email),
            display_name: Set(input.display_name),
            avatar_url: Set(input.avatar_url),
            created_at: Set(now),
            updated_at: Set(now),
        };

        user.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => UserError::DuplicateEmail(email),
            _ => UserError::Database(e),
        })
    }

    /// Replaces display name and avatar.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub async fn update_profile(
        &self,
        id: Uuid,
        display_name: String,
        avatar_url: Option<String>,
    ) -> Result<users::Model, UserError> {
        let existing = self.find_by_id(id).await?.ok_or(UserError::NotFound(id))?;

        let mut user: users::ActiveModel = existing.into();
        user.display_name = Set(display_name);
        user.avatar_url = Set(avatar_url);
        user.updated_at = Set(Utc::now());

        Ok(user.update(&self.db).await?)
    }
}
