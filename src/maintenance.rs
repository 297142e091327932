//! Operator subcommands run against the live database.

use crate::config::Config;
use crate::database::{Store, UserUpdate};
use crate::models::{Notification, User, BOT_EMAIL_SUFFIX};
use crate::utils::error::AppError;
use crate::utils::password::hash_password;

const BODY_PREVIEW_CHARS: usize = 30;

pub fn user_line(user: &User) -> String {
    format!("- {} ({})", user.username, user.email)
}

pub fn notification_line(n: &Notification) -> String {
    let body: String = n.body.chars().take(BODY_PREVIEW_CHARS).collect();
    format!("- [{}] To: {} | From: {} | {}...", n.kind, n.recipient, n.sender, body)
}

pub async fn list_users(store: &dyn Store) -> Result<Vec<String>, AppError> {
    let users = store.list_users().await?;
    let mut lines = vec![format!("Users found: {}", users.len())];
    lines.extend(users.iter().map(user_line));
    Ok(lines)
}

pub async fn check_notifications(store: &dyn Store) -> Result<Vec<String>, AppError> {
    let notifications = store.all_notifications().await?;
    let mut lines = vec![format!("Notifications found: {}", notifications.len())];
    lines.extend(notifications.iter().map(notification_line));
    Ok(lines)
}

pub async fn remove_bots(store: &dyn Store) -> Result<u64, AppError> {
    store.delete_users_by_email_suffix(BOT_EMAIL_SUFFIX).await
}

/// Re-hashes the admin password. Returns false when no admin account exists.
pub async fn reset_admin_password(store: &dyn Store, config: &Config, password: &str) -> Result<bool, AppError> {
    if password.trim().is_empty() {
        return Err(AppError::InvalidRequest("Password required".to_string()));
    }

    let Some(admin) = store.find_user_by_username(&config.admin_username).await? else {
        return Ok(false);
    };
    let id = admin.id.ok_or_else(AppError::user_not_found)?;

    let update = UserUpdate {
        password: Some(hash_password(password, config.bcrypt_cost).await?),
        ..Default::default()
    };
    store.update_user(&id, &update).await?;
    log::info!("🔑 Password reset for '{}'", admin.username);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::NotificationKind;
    use crate::services::testing;
    use crate::utils::password::verify_password;

    #[test]
    fn test_notification_line() {
        let n = Notification::new(
            "alice",
            NotificationKind::Message,
            "Bob",
            "This body is definitely longer than thirty characters".to_string(),
            "bob",
            0,
        );
        assert_eq!(
            notification_line(&n),
            "- [message] To: alice | From: bob | This body is definitely longer...",
        );
    }

    #[tokio::test]
    async fn test_list_and_remove_bots() {
        let store = MemoryStore::new();
        testing::user(&store, "alice").await;
        let bot = User::new("bot_1", "bot_1@bot.com", "x".into(), "Bot", 1);
        store.insert_user(bot).await.unwrap();

        let lines = list_users(&store).await.unwrap();
        assert_eq!(lines[0], "Users found: 2");
        assert!(lines.contains(&"- alice (alice@example.com)".to_string()));

        assert_eq!(remove_bots(&store).await.unwrap(), 1);
        assert_eq!(store.count_users(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reset_admin_password() {
        let store = MemoryStore::new();
        let config = Config {
            bcrypt_cost: 4,
            ..Config::default()
        };

        assert!(!reset_admin_password(&store, &config, "admin123").await.unwrap());

        testing::user(&store, "admin").await;
        assert!(reset_admin_password(&store, &config, "admin123").await.unwrap());

        let admin = testing::reload(&store, "admin").await;
        assert!(verify_password("admin123", &admin.password).await.unwrap());
        assert!(!verify_password("secret", &admin.password).await.unwrap());
    }
}
