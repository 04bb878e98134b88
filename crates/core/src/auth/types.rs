//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tally_shared::auth::UserInfo;
use tally_shared::types::UserId;

/// A person who signed in at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Subject id assigned by the identity provider.
    pub external_subject: String,
    /// Email address, unique across users.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
    /// First sign-in.
    pub created_at: DateTime<Utc>,
    /// Last profile refresh.
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.display_name.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// A user about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Subject id assigned by the identity provider.
    pub external_subject: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
}
