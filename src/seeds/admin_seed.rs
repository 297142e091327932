use crate::config::Config;
use crate::database::Store;
use crate::models::{User, DEFAULT_AVATAR};
use crate::utils::error::AppError;
use crate::utils::password::hash_password;
use crate::utils::time::now_millis;

/// Creates the configured admin account on first start.
/// Only runs when an admin password is configured.
pub async fn ensure_admin(store: &dyn Store, config: &Config) -> Result<(), AppError> {
    let Some(password) = config.admin_password.as_deref() else {
        log::info!("👑 ADMIN_PASSWORD not set, skipping admin seed");
        return Ok(());
    };

    if store.find_user_by_username(&config.admin_username).await?.is_some() {
        log::info!("👑 Admin account '{}' already exists", config.admin_username);
        return Ok(());
    }

    let hash = hash_password(password, config.bcrypt_cost).await?;
    let email = format!("{}@thevault.local", config.admin_username.to_lowercase());
    let mut admin = User::new(&config.admin_username, &email, hash, "The Vault Admin", now_millis());
    admin.avatar = DEFAULT_AVATAR.to_string();
    admin.is_member = true;
    admin.is_verified = true;

    store.insert_user(admin).await?;
    log::info!("   ✅ Admin account '{}' created", config.admin_username);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    #[tokio::test]
    async fn test_seeds_once_when_password_configured() {
        let store = MemoryStore::new();
        let mut config = Config {
            bcrypt_cost: 4,
            ..Config::default()
        };

        ensure_admin(&store, &config).await.unwrap();
        assert_eq!(store.count_users(None).await.unwrap(), 0);

        config.admin_password = Some("admin123".into());
        ensure_admin(&store, &config).await.unwrap();
        ensure_admin(&store, &config).await.unwrap();
        assert_eq!(store.count_users(None).await.unwrap(), 1);

        let admin = store.find_user_by_username("admin").await.unwrap().unwrap();
        assert!(admin.is_member && admin.is_verified);
        assert_eq!(admin.email, "admin@thevault.local");
    }
}
