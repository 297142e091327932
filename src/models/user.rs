use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::utils::time::{bson_millis, to_rfc3339};

pub const DEFAULT_AVATAR: &str =
    "https://cdn.pixabay.com/photo/2015/10/05/22/37/blank-profile-picture-973460_1280.png";

/// Placeholder for profile details the user has not filled in.
pub const UNSPECIFIED: &str = "Belirtilmedi";

/// Email domain reserved for seeded demo accounts.
pub const BOT_EMAIL_SUFFIX: &str = "@bot.com";

/// Names that collide with literal routes under `/api/users`.
pub const RESERVED_USERNAMES: &[&str] = &[
    "profile", "photos", "search", "vip", "my-likes", "liked-me", "discover", "like", "pass", "unlike",
    "follow", "unfollow", "block", "unblock", "report",
];

pub fn is_reserved_username(username: &str) -> bool {
    RESERVED_USERNAMES.iter().any(|r| r.eq_ignore_ascii_case(username))
}

/// User document (stored in the `users` collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default, with = "bson_millis::option")]
    pub last_username_change: Option<i64>,
    /// VIP / paid tier
    #[serde(default)]
    pub is_member: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default = "default_true")]
    pub notifications: bool,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub liked_users: Vec<String>,
    #[serde(default)]
    pub seen_users: Vec<String>,
    #[serde(default)]
    pub blocked_users: Vec<String>,
    #[serde(default)]
    pub followers: Vec<String>,
    #[serde(default)]
    pub following: Vec<String>,
    #[serde(default)]
    pub details: ProfileDetails,
    #[serde(default)]
    pub interested_in: Vec<String>,
    #[serde(default)]
    pub location: Location,
    #[serde(default, with = "bson_millis")]
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

fn unspecified() -> String {
    UNSPECIFIED.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetails {
    #[serde(default)]
    pub hobbies: Vec<String>,
    #[serde(default = "unspecified")]
    pub smoking: String,
    #[serde(default = "unspecified")]
    pub relationship_goal: String,
    #[serde(default = "unspecified")]
    pub gender: String,
}

impl Default for ProfileDetails {
    fn default() -> Self {
        Self {
            hobbies: Vec::new(),
            smoking: unspecified(),
            relationship_goal: unspecified(),
            gender: unspecified(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Location {
    #[serde(default)]
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl Location {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.lng?))
    }

    pub fn normalized_city(&self) -> String {
        self.city.trim().to_lowercase()
    }
}

impl User {
    pub fn new(username: &str, email: &str, password_hash: String, full_name: &str, now: i64) -> Self {
        Self {
            id: None,
            username: username.to_string(),
            email: email.to_string(),
            password: password_hash,
            full_name: full_name.to_string(),
            bio: String::new(),
            avatar: String::new(),
            last_username_change: None,
            is_member: false,
            is_verified: false,
            is_anonymous: false,
            notifications: true,
            photos: Vec::new(),
            liked_users: Vec::new(),
            seen_users: Vec::new(),
            blocked_users: Vec::new(),
            followers: Vec::new(),
            following: Vec::new(),
            details: ProfileDetails::default(),
            interested_in: Vec::new(),
            location: Location::default(),
            created_at: now,
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }

    pub fn is_bot(&self) -> bool {
        self.email.ends_with(BOT_EMAIL_SUFFIX)
    }

    /// Shown first in discovery: paying members who have not hidden themselves.
    pub fn is_featured(&self) -> bool {
        self.is_member && !self.is_anonymous
    }

    pub fn has_blocked(&self, username: &str) -> bool {
        self.blocked_users.iter().any(|u| u == username)
    }

    pub fn has_liked(&self, username: &str) -> bool {
        self.liked_users.iter().any(|u| u == username)
    }

    pub fn is_followed_by(&self, username: &str) -> bool {
        self.followers.iter().any(|u| u == username)
    }

    pub fn follows(&self, username: &str) -> bool {
        self.following.iter().any(|u| u == username)
    }

    pub fn stats(&self) -> ProfileStats {
        ProfileStats {
            posts: self.photos.len(),
            followers: self.followers.len(),
            following: self.following.len(),
        }
    }
}

/// Adds `value` to `list` unless already present. Returns true when added.
pub fn add_unique(list: &mut Vec<String>, value: &str) -> bool {
    if list.iter().any(|v| v == value) {
        false
    } else {
        list.push(value.to_string());
        true
    }
}

/// Removes every occurrence of `values`. Returns true when something was removed.
pub fn remove_all(list: &mut Vec<String>, values: &[String]) -> bool {
    let before = list.len();
    list.retain(|v| !values.contains(v));
    list.len() != before
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProfileStats {
    pub posts: usize,
    pub followers: usize,
    pub following: usize,
}

/// Full view of the caller's own account
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub bio: String,
    pub avatar: String,
    pub is_member: bool,
    pub is_verified: bool,
    pub is_anonymous: bool,
    pub notifications: bool,
    pub photos: Vec<String>,
    pub details: ProfileDetails,
    pub interested_in: Vec<String>,
    pub location: Location,
    pub stats: ProfileStats,
    pub created_at: String,
}

impl From<&User> for AccountResponse {
    fn from(user: &User) -> Self {
        AccountResponse {
            id: user.id_hex(),
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            bio: user.bio.clone(),
            avatar: user.avatar.clone(),
            is_member: user.is_member,
            is_verified: user.is_verified,
            is_anonymous: user.is_anonymous,
            notifications: user.notifications,
            photos: user.photos.clone(),
            details: user.details.clone(),
            interested_in: user.interested_in.clone(),
            location: user.location.clone(),
            stats: user.stats(),
            created_at: to_rfc3339(user.created_at),
        }
    }
}

/// Profile as seen by another user
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
    pub full_name: String,
    pub bio: String,
    pub avatar: String,
    pub is_member: bool,
    pub is_verified: bool,
    pub is_anonymous: bool,
    pub photos: Vec<String>,
    pub details: ProfileDetails,
    pub stats: ProfileStats,
    pub is_following: bool,
}

impl PublicProfile {
    pub fn visible(user: &User, is_following: bool) -> Self {
        PublicProfile {
            id: Some(user.id_hex()),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            bio: user.bio.clone(),
            avatar: user.avatar.clone(),
            is_member: user.is_member,
            is_verified: user.is_verified,
            is_anonymous: user.is_anonymous,
            photos: user.photos.clone(),
            details: user.details.clone(),
            stats: user.stats(),
            is_following,
        }
    }

    /// Stand-in profile for an anonymous user viewed by someone they do not follow.
    pub fn masked(user: &User) -> Self {
        let hex = user.id_hex();
        let code = if hex.len() >= 6 {
            hex[hex.len() - 6..].to_uppercase()
        } else {
            "UNK000".to_string()
        };

        PublicProfile {
            id: None,
            username: format!("Member_{}", code),
            full_name: "Gizli Üye".to_string(),
            bio: "Bu kullanıcı gizliliğe önem veriyor.".to_string(),
            avatar: DEFAULT_AVATAR.to_string(),
            is_member: user.is_member,
            is_verified: user.is_verified,
            is_anonymous: true,
            photos: Vec::new(),
            details: ProfileDetails::default(),
            stats: ProfileStats::default(),
            is_following: false,
        }
    }
}

/// Compact row for search results and follower lists
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
    pub bio: String,
    pub is_member: bool,
    pub is_verified: bool,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            id: user.id_hex(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            avatar: user.avatar.clone(),
            bio: user.bio.clone(),
            is_member: user.is_member,
            is_verified: user.is_verified,
        }
    }
}

/// Card used by the likes pages and the VIP strip
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCard {
    pub username: String,
    pub full_name: String,
    pub avatar: String,
    pub photos: Vec<String>,
    pub details: ProfileDetails,
    pub location: Location,
    pub is_member: bool,
}

impl From<&User> for ProfileCard {
    fn from(user: &User) -> Self {
        ProfileCard {
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            avatar: user.avatar.clone(),
            photos: user.photos.clone(),
            details: user.details.clone(),
            location: user.location.clone(),
            is_member: user.is_member,
        }
    }
}

/// Row in the admin user table
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserRow {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub is_member: bool,
    pub is_verified: bool,
    pub is_anonymous: bool,
    pub details: ProfileDetails,
    pub created_at: String,
}

impl From<&User> for AdminUserRow {
    fn from(user: &User) -> Self {
        AdminUserRow {
            id: user.id_hex(),
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            avatar: user.avatar.clone(),
            is_member: user.is_member,
            is_verified: user.is_verified,
            is_anonymous: user.is_anonymous,
            details: user.details.clone(),
            created_at: to_rfc3339(user.created_at),
        }
    }
}
