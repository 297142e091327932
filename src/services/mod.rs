pub mod admin_service;
pub mod auth_service;
pub mod discovery_service;
pub mod membership_service;
pub mod message_service;
pub mod notification_service;
pub mod profile_service;
pub mod social_service;

/// Trims `value` and rejects blanks.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::database::{MemoryStore, Store};
    use crate::models::User;
    use crate::utils::time::now_millis;

    /// Inserts a user whose password is stored in legacy plaintext ("secret").
    pub async fn user(store: &MemoryStore, username: &str) -> User {
        let user = User::new(
            username,
            &format!("{}@example.com", username),
            "secret".to_string(),
            username,
            now_millis(),
        );
        store.insert_user(user).await.unwrap()
    }

    pub async fn reload(store: &MemoryStore, username: &str) -> User {
        store.find_user_by_username(username).await.unwrap().unwrap()
    }
}
