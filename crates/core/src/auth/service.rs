//! Sign-in and profile lookup.

use std::sync::Arc;

use async_trait::async_trait;
use tally_shared::identity::VerifiedIdentity;
use tally_shared::types::UserId;
use tracing::info;

use super::error::AuthError;
use super::types::{NewUser, User};

/// Storage for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Looks a user up by id.
    async fn find_user(&self, id: UserId) -> Result<Option<User>, AuthError>;

    /// Looks a user up by identity-provider subject.
    async fn find_user_by_subject(&self, subject: &str) -> Result<Option<User>, AuthError>;

    /// Creates a user. Fails with `EmailTaken` on a duplicate email.
    async fn insert_user(&self, user: NewUser) -> Result<User, AuthError>;

    /// Replaces the display name and avatar.
    async fn update_profile(
        &self,
        id: UserId,
        display_name: String,
        avatar_url: Option<String>,
    ) -> Result<User, AuthError>;
}

/// Account use cases.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn UserStore>,
}

impl AccountService {
    /// Creates a new account service.
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Finds or creates the user behind a verified identity.
    ///
    /// New users take the provider's name, or their email when the provider
    /// shared none. Returning users get their name and avatar refreshed; a
    /// value the provider omits keeps the stored one.
    pub async fn sign_in(&self, identity: &VerifiedIdentity) -> Result<User, AuthError> {
        if identity.subject.trim().is_empty() {
            return Err(AuthError::IncompleteIdentity("subject"));
        }
        if identity.email.trim().is_empty() {
            return Err(AuthError::IncompleteIdentity("email"));
        }

        match self.store.find_user_by_subject(&identity.subject).await? {
            Some(existing) => {
                let display_name = identity
                    .name
                    .clone()
                    .unwrap_or_else(|| existing.display_name.clone());
                let avatar_url = identity.picture.clone().or(existing.avatar_url);
                self.store
                    .update_profile(existing.id, display_name, avatar_url)
                    .await
            }
            None => {
                let user = self
                    .store
                    .insert_user(NewUser {
                        external_subject: identity.subject.clone(),
                        email: identity.email.clone(),
                        display_name: identity
                            .name
                            .clone()
                            .unwrap_or_else(|| identity.email.clone()),
                        avatar_url: identity.picture.clone(),
                    })
                    .await?;
                info!(user_id = %user.id, "user registered");
                Ok(user)
            }
        }
    }

    /// Loads the profile of a signed-in user.
    pub async fn profile(&self, id: UserId) -> Result<User, AuthError> {
        self.store
            .find_user(id)
            .await?
            .ok_or(AuthError::UserNotFound(id))
    }
}
