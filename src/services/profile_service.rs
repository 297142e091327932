use serde::{Deserialize, Serialize};

use crate::database::{Store, UserList, UserUpdate};
use crate::models::{is_reserved_username, Location, ProfileCard, ProfileDetails, PublicProfile, User, UserSummary};
use crate::services::non_blank;
use crate::utils::error::AppError;
use crate::utils::time::now_millis;

pub const SEARCH_LIMIT: usize = 20;
pub const VIP_LIMIT: usize = 20;

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub username: Option<String>,
    pub avatar: Option<String>,
    pub is_anonymous: Option<bool>,
    pub details: Option<ProfileDetails>,
    pub interested_in: Option<Vec<String>>,
    pub location: Option<Location>,
    pub notifications: Option<bool>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPhotoRequest {
    /// URL or data URI
    pub photo_url: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletePhotoRequest {
    /// Index into the caller's photo list, as a number or numeric string
    #[schema(value_type = Option<i64>)]
    pub photo_index: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PhotosResponse {
    pub success: bool,
    pub photos: Vec<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: PublicProfile,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CardListResponse {
    pub success: bool,
    pub users: Vec<ProfileCard>,
}

pub async fn update_profile(store: &dyn Store, me: User, update: ProfileUpdate) -> Result<User, AppError> {
    let id = me.id.ok_or_else(AppError::user_not_found)?;
    let mut changes = UserUpdate {
        full_name: update.full_name,
        bio: update.bio,
        avatar: update.avatar,
        is_anonymous: update.is_anonymous,
        details: update.details,
        interested_in: update.interested_in,
        location: update.location,
        notifications: update.notifications,
        ..Default::default()
    };

    if let Some(username) = non_blank(&update.username) {
        if username != me.username {
            if is_reserved_username(username) {
                return Err(AppError::InvalidRequest("Username not available".to_string()));
            }
            if let Some(other) = store.find_user_by_username(username).await? {
                if other.id != me.id {
                    return Err(AppError::InvalidRequest("Username taken".to_string()));
                }
            }
            log::info!("✏️ Username change: {} -> {}", me.username, username);
            changes.username = Some(username.to_string());
            changes.last_username_change = Some(now_millis());
        }
    }

    store
        .update_user(&id, &changes)
        .await?
        .ok_or_else(AppError::user_not_found)
}

pub async fn add_photo(store: &dyn Store, me: User, request: &AddPhotoRequest) -> Result<Vec<String>, AppError> {
    let photo = non_blank(&request.photo_url)
        .ok_or_else(|| AppError::InvalidRequest("Photo required".to_string()))?;
    let id = me.id.ok_or_else(AppError::user_not_found)?;

    store.add_to_list(&id, UserList::Photos, photo).await?;
    let me = store.find_user_by_id(&id).await?.ok_or_else(AppError::user_not_found)?;
    Ok(me.photos)
}

fn photo_index(raw: &serde_json::Value) -> Option<i64> {
    match raw {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub async fn delete_photo(store: &dyn Store, me: User, request: &DeletePhotoRequest) -> Result<Vec<String>, AppError> {
    let raw = request
        .photo_index
        .as_ref()
        .filter(|v| !v.is_null())
        .ok_or_else(|| AppError::InvalidRequest("Photo index required".to_string()))?;
    let index = photo_index(raw).ok_or_else(|| AppError::InvalidRequest("Invalid index".to_string()))?;

    let id = me.id.ok_or_else(AppError::user_not_found)?;
    let mut photos = store
        .find_user_by_id(&id)
        .await?
        .ok_or_else(AppError::user_not_found)?
        .photos;
    if index < 0 || index as usize >= photos.len() {
        return Err(AppError::InvalidRequest("Invalid photo index range".to_string()));
    }
    photos.remove(index as usize);

    let update = UserUpdate {
        photos: Some(photos),
        ..Default::default()
    };
    let me = store.update_user(&id, &update).await?.ok_or_else(AppError::user_not_found)?;
    Ok(me.photos)
}

pub async fn search(store: &dyn Store, query: Option<&str>) -> Result<Vec<UserSummary>, AppError> {
    let q = match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => q,
        None => return Ok(Vec::new()),
    };

    let users = store.search_users(q, SEARCH_LIMIT).await?;
    Ok(users.iter().map(UserSummary::from).collect())
}

pub async fn vip_members(store: &dyn Store) -> Result<Vec<ProfileCard>, AppError> {
    let users = store.member_users(VIP_LIMIT).await?;
    Ok(users.iter().map(ProfileCard::from).collect())
}

/// Anonymous profiles are only revealed to the owner and to people the
/// owner follows.
pub async fn public_profile(store: &dyn Store, username: &str, viewer: Option<&User>) -> Result<PublicProfile, AppError> {
    let user = store
        .find_user_by_username(username)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    let is_following = viewer.map(|v| user.is_followed_by(&v.username)).unwrap_or(false);

    if user.is_anonymous {
        let revealed = viewer
            .map(|v| v.id == user.id || user.follows(&v.username))
            .unwrap_or(false);
        if !revealed {
            return Ok(PublicProfile::masked(&user));
        }
    }

    Ok(PublicProfile::visible(&user, is_following))
}

pub async fn followers(store: &dyn Store, username: &str) -> Result<Vec<UserSummary>, AppError> {
    let user = store
        .find_user_by_username(username)
        .await?
        .ok_or_else(AppError::user_not_found)?;
    let users = store.find_users_by_usernames(&user.followers).await?;
    Ok(users.iter().map(UserSummary::from).collect())
}

pub async fn following(store: &dyn Store, username: &str) -> Result<Vec<UserSummary>, AppError> {
    let user = store
        .find_user_by_username(username)
        .await?
        .ok_or_else(AppError::user_not_found)?;
    let users = store.find_users_by_usernames(&user.following).await?;
    Ok(users.iter().map(UserSummary::from).collect())
}
