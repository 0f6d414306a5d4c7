use std::sync::Arc;

use anyhow::Result;

use crate::domain::user::UserProfile;
use crate::infra::store::DocumentStore;

/// Display-name lookup against the shared `users` collection.
#[derive(Clone)]
pub struct UserDirectory {
    users: Arc<dyn DocumentStore<UserProfile>>,
}

impl UserDirectory {
    pub fn new(users: Arc<dyn DocumentStore<UserProfile>>) -> Self {
        Self { users }
    }

    pub async fn display_name(&self, user_id: &str) -> Result<Option<String>> {
        let profile = self.users.find_by_id(user_id).await?;
        Ok(profile
            .map(|profile| profile.name)
            .filter(|name| !name.trim().is_empty()))
    }

    /// Resolves a display name, using `fallback` when the user is unknown or
    /// the lookup fails.
    pub async fn display_name_or(&self, user_id: &str, fallback: &str) -> String {
        match self.display_name(user_id).await {
            Ok(Some(name)) => name,
            Ok(None) => fallback.to_string(),
            Err(err) => {
                tracing::warn!(error = ?err, user_id = %user_id, "display name lookup failed");
                fallback.to_string()
            }
        }
    }
}
