//! Admin console operations. Every entry point assumes the caller already
//! passed [`require_admin`].

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::database::{Store, UserFlag, UserUpdate};
use crate::models::{
    is_reserved_username, preview, AccountResponse, AdminUserRow, Message, Notification, NotificationKind,
    ProfileDetails, User, ADMIN_SENDER, BOT_EMAIL_SUFFIX, DEFAULT_AVATAR,
};
use crate::seeds::bots::{generate_bots, BOT_COUNT, BOT_PASSWORD};
use crate::services::non_blank;
use crate::utils::error::AppError;
use crate::utils::password::hash_password;
use crate::utils::time::now_millis;

pub const BROADCAST_PREVIEW_CHARS: usize = 100;
pub const RECENT_USERS: usize = 20;
const LOCAL_EMAIL_DOMAIN: &str = "@thevault.local";

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminCreateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub is_member: Option<bool>,
    pub is_verified: Option<bool>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_member: Option<bool>,
    pub is_verified: Option<bool>,
    pub details: Option<ProfileDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum BulkAction {
    MakeVip,
    RemoveVip,
    Verify,
    Unverify,
    Delete,
}

impl BulkAction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "makeVip" => Some(BulkAction::MakeVip),
            "removeVip" => Some(BulkAction::RemoveVip),
            "verify" => Some(BulkAction::Verify),
            "unverify" => Some(BulkAction::Unverify),
            "delete" => Some(BulkAction::Delete),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct BulkActionRequest {
    pub usernames: Option<Vec<String>>,
    /// One of `makeVip`, `removeVip`, `verify`, `unverify`, `delete`
    pub action: Option<String>,
}

/// `"all"` or an explicit list of usernames
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum Recipients {
    Keyword(String),
    Usernames(Vec<String>),
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct BroadcastRequest {
    pub recipients: Option<Recipients>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub vip_users: u64,
    pub verified_users: u64,
    pub anonymous_users: u64,
    pub recent_users: Vec<AdminUserRow>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AdminUsersResponse {
    pub success: bool,
    pub users: Vec<AdminUserRow>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AdminUserResponse {
    pub success: bool,
    pub user: AccountResponse,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    pub success: bool,
    pub stats: DashboardStats,
}

pub fn require_admin(me: &User, config: &Config) -> Result<(), AppError> {
    if me.username == config.admin_username {
        Ok(())
    } else {
        log::warn!("⛔ {} tried to use the admin console", me.username);
        Err(AppError::Forbidden("Admin access only".to_string()))
    }
}

async fn find_target(store: &dyn Store, username: &str) -> Result<User, AppError> {
    store
        .find_user_by_username(username)
        .await?
        .ok_or_else(AppError::user_not_found)
}

pub async fn list_users(store: &dyn Store) -> Result<Vec<AdminUserRow>, AppError> {
    let users = store.list_users().await?;
    Ok(users.iter().map(AdminUserRow::from).collect())
}

pub fn local_email(username: &str) -> String {
    let local: String = username
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    format!("{}{}", local, LOCAL_EMAIL_DOMAIN)
}

pub async fn create_user(store: &dyn Store, bcrypt_cost: u32, request: &AdminCreateUser) -> Result<User, AppError> {
    let password = request.password.as_deref().filter(|p| !p.trim().is_empty());
    let (username, password) = match (non_blank(&request.username), password) {
        (Some(u), Some(p)) => (u, p),
        _ => {
            return Err(AppError::InvalidRequest(
                "Username and Password required".to_string(),
            ))
        }
    };
    let email = non_blank(&request.email)
        .map(str::to_string)
        .unwrap_or_else(|| local_email(username));

    if is_reserved_username(username) {
        return Err(AppError::InvalidRequest("Username not available".to_string()));
    }
    if store.find_user_by_username(username).await?.is_some() {
        return Err(AppError::InvalidRequest("Username already exists".to_string()));
    }
    if store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::InvalidRequest("Email already exists".to_string()));
    }

    let hash = hash_password(password, bcrypt_cost).await?;
    let full_name = request.full_name.as_deref().unwrap_or("");
    let mut user = User::new(username, &email, hash, full_name, now_millis());
    user.avatar = DEFAULT_AVATAR.to_string();
    user.is_member = request.is_member.unwrap_or(false);
    user.is_verified = request.is_verified.unwrap_or(false);

    let user = store.insert_user(user).await?;
    log::info!("👑 Admin created user {}", user.username);
    Ok(user)
}

pub async fn update_user(store: &dyn Store, username: &str, update: &AdminUpdateUser) -> Result<User, AppError> {
    let mut user = find_target(store, username).await?;

    if let Some(new_username) = non_blank(&update.username) {
        if new_username != user.username {
            if is_reserved_username(new_username) {
                return Err(AppError::InvalidRequest("Username not available".to_string()));
            }
            if store.find_user_by_username(new_username).await?.is_some() {
                return Err(AppError::InvalidRequest("Username taken".to_string()));
            }
            user.username = new_username.to_string();
        }
    }
    if let Some(email) = non_blank(&update.email) {
        if email != user.email {
            if store.find_user_by_email(email).await?.is_some() {
                return Err(AppError::InvalidRequest("Email taken".to_string()));
            }
            user.email = email.to_string();
        }
    }
    if let Some(full_name) = &update.full_name {
        user.full_name = full_name.clone();
    }
    if let Some(is_member) = update.is_member {
        user.is_member = is_member;
    }
    if let Some(is_verified) = update.is_verified {
        user.is_verified = is_verified;
    }
    if let Some(details) = &update.details {
        user.details = details.clone();
    }

    store.save_user(&user).await?;
    Ok(user)
}

pub async fn delete_user(store: &dyn Store, me: &User, username: &str) -> Result<(), AppError> {
    if me.username == username {
        return Err(AppError::InvalidRequest("Cannot delete self".to_string()));
    }
    if store.delete_users(&[username.to_string()]).await? == 0 {
        return Err(AppError::user_not_found());
    }
    log::info!("🗑️ Admin deleted user {}", username);
    Ok(())
}

/// Returns how many accounts actually changed.
pub async fn bulk_action(store: &dyn Store, request: &BulkActionRequest) -> Result<u64, AppError> {
    let usernames = request
        .usernames
        .as_ref()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("No users selected".to_string()))?;
    let action = request
        .action
        .as_deref()
        .and_then(BulkAction::parse)
        .ok_or_else(|| AppError::InvalidRequest("Unknown action".to_string()))?;

    let affected = match action {
        BulkAction::MakeVip => store.set_flag(usernames, UserFlag::Member, true).await?,
        BulkAction::RemoveVip => store.set_flag(usernames, UserFlag::Member, false).await?,
        BulkAction::Verify => store.set_flag(usernames, UserFlag::Verified, true).await?,
        BulkAction::Unverify => store.set_flag(usernames, UserFlag::Verified, false).await?,
        BulkAction::Delete => store.delete_users(usernames).await?,
    };

    log::info!("👑 Bulk {:?} on {} users: {} affected", action, usernames.len(), affected);
    Ok(affected)
}

fn broadcast_notification(recipient: &str, body: &str, now: i64) -> Notification {
    Notification::new(
        recipient,
        NotificationKind::AdminBroadcast,
        ADMIN_SENDER,
        preview(body, BROADCAST_PREVIEW_CHARS),
        "Admin",
        now,
    )
    .with_chat_user(ADMIN_SENDER)
}

/// Sends `message` from the admin account and returns the recipient count.
/// Keywords other than `"all"` address nobody.
pub async fn broadcast(store: &dyn Store, request: &BroadcastRequest) -> Result<usize, AppError> {
    let text = request
        .message
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::InvalidRequest("Message required".to_string()))?;

    let targets: Vec<String> = match &request.recipients {
        Some(Recipients::Keyword(k)) if k == "all" => {
            store.list_users().await?.into_iter().map(|u| u.username).collect()
        }
        Some(Recipients::Usernames(list)) => list.clone(),
        _ => Vec::new(),
    };

    let now = now_millis();
    let messages = targets
        .iter()
        .map(|to| Message::new(ADMIN_SENDER, to, text, now))
        .collect();
    let notifications = targets
        .iter()
        .map(|to| broadcast_notification(to, text, now))
        .collect();

    store.insert_messages(messages).await?;
    store.insert_notifications(notifications).await?;

    log::info!("📣 Admin broadcast to {} users", targets.len());
    Ok(targets.len())
}

pub async fn dashboard_stats(store: &dyn Store) -> Result<DashboardStats, AppError> {
    let recent = store.list_users().await?;

    Ok(DashboardStats {
        total_users: store.count_users(None).await?,
        vip_users: store.count_users(Some(UserFlag::Member)).await?,
        verified_users: store.count_users(Some(UserFlag::Verified)).await?,
        anonymous_users: store.count_users(Some(UserFlag::Anonymous)).await?,
        recent_users: recent.iter().take(RECENT_USERS).map(AdminUserRow::from).collect(),
    })
}

pub async fn upgrade(store: &dyn Store, username: &str) -> Result<(), AppError> {
    let user = find_target(store, username).await?;
    let id = user.id.ok_or_else(AppError::user_not_found)?;
    let update = UserUpdate {
        is_member: Some(true),
        is_verified: Some(true),
        ..Default::default()
    };
    store.update_user(&id, &update).await?;
    Ok(())
}

/// Replaces every bot account with a fresh batch.
pub async fn seed_bots(store: &dyn Store, bcrypt_cost: u32) -> Result<usize, AppError> {
    let removed = store.delete_users_by_email_suffix(BOT_EMAIL_SUFFIX).await?;
    let hash = hash_password(BOT_PASSWORD, bcrypt_cost).await?;

    let mut created = 0;
    for bot in generate_bots(BOT_COUNT, &hash, now_millis()) {
        store.insert_user(bot).await?;
        created += 1;
    }

    log::info!("🤖 Seeded {} bots (removed {})", created, removed);
    Ok(created)
}

pub async fn clear_bots(store: &dyn Store) -> Result<u64, AppError> {
    let removed = store.delete_users_by_email_suffix(BOT_EMAIL_SUFFIX).await?;
    log::info!("🤖 Removed {} bots", removed);
    Ok(removed)
}

pub async fn reset_interactions(store: &dyn Store) -> Result<u64, AppError> {
    let touched = store.reset_interactions().await?;
    log::info!("🔄 Reset seen/liked lists of {} users", touched);
    Ok(touched)
}
