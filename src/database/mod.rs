//! Persistence for users, messages, notifications and membership records.
//!
//! [`MongoStore`] is the primary backend. When MongoDB cannot be reached at
//! startup the server runs on [`MemoryStore`] instead, which keeps the same
//! document shapes in process memory and loses everything on restart.

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::models::{add_unique, Application, Location, Member, Message, Notification, ProfileDetails, User};
use crate::utils::error::AppError;

pub type StoreResult<T> = Result<T, AppError>;

/// Boolean account flags that admin tooling can flip in bulk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserFlag {
    Member,
    Verified,
    Anonymous,
}

impl UserFlag {
    pub fn field(&self) -> &'static str {
        match self {
            UserFlag::Member => "isMember",
            UserFlag::Verified => "isVerified",
            UserFlag::Anonymous => "isAnonymous",
        }
    }

    pub fn get(&self, user: &User) -> bool {
        match self {
            UserFlag::Member => user.is_member,
            UserFlag::Verified => user.is_verified,
            UserFlag::Anonymous => user.is_anonymous,
        }
    }

    pub fn set(&self, user: &mut User, value: bool) {
        match self {
            UserFlag::Member => user.is_member = value,
            UserFlag::Verified => user.is_verified = value,
            UserFlag::Anonymous => user.is_anonymous = value,
        }
    }
}

/// Array fields of a user document edited one entry at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserList {
    Liked,
    Seen,
    Blocked,
    Followers,
    Following,
    /// Appended as-is; every other list keeps its entries unique
    Photos,
}

impl UserList {
    pub fn field(&self) -> &'static str {
        match self {
            UserList::Liked => "likedUsers",
            UserList::Seen => "seenUsers",
            UserList::Blocked => "blockedUsers",
            UserList::Followers => "followers",
            UserList::Following => "following",
            UserList::Photos => "photos",
        }
    }

    pub fn get_mut<'a>(&self, user: &'a mut User) -> &'a mut Vec<String> {
        match self {
            UserList::Liked => &mut user.liked_users,
            UserList::Seen => &mut user.seen_users,
            UserList::Blocked => &mut user.blocked_users,
            UserList::Followers => &mut user.followers,
            UserList::Following => &mut user.following,
            UserList::Photos => &mut user.photos,
        }
    }

    /// Adds `value` to the user's copy of the list. Returns true when it changed.
    pub fn push(&self, user: &mut User, value: &str) -> bool {
        let list = self.get_mut(user);
        if *self == UserList::Photos {
            list.push(value.to_string());
            return true;
        }
        add_unique(list, value)
    }
}

/// Fields to overwrite on one user document; `None` leaves the stored value.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub last_username_change: Option<i64>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub is_member: Option<bool>,
    pub is_verified: Option<bool>,
    pub is_anonymous: Option<bool>,
    pub notifications: Option<bool>,
    pub details: Option<ProfileDetails>,
    pub interested_in: Option<Vec<String>>,
    pub location: Option<Location>,
    pub photos: Option<Vec<String>>,
}

impl UserUpdate {
    pub fn apply(&self, user: &mut User) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }

        set(&mut user.username, &self.username);
        if self.last_username_change.is_some() {
            user.last_username_change = self.last_username_change;
        }
        set(&mut user.password, &self.password);
        set(&mut user.full_name, &self.full_name);
        set(&mut user.bio, &self.bio);
        set(&mut user.avatar, &self.avatar);
        set(&mut user.is_member, &self.is_member);
        set(&mut user.is_verified, &self.is_verified);
        set(&mut user.is_anonymous, &self.is_anonymous);
        set(&mut user.notifications, &self.notifications);
        set(&mut user.details, &self.details);
        set(&mut user.interested_in, &self.interested_in);
        set(&mut user.location, &self.location);
        set(&mut user.photos, &self.photos);
    }
}

/// Candidate filter for the discovery feed.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryQuery {
    /// Usernames never to show (seen, blocked, the caller)
    pub exclude: Vec<String>,
    /// When non-empty, only candidates whose gender is listed
    pub genders: Vec<String>,
}

impl DiscoveryQuery {
    pub fn matches(&self, user: &User) -> bool {
        !user.is_anonymous
            && !user.photos.is_empty()
            && !self.exclude.iter().any(|u| u == &user.username)
            && (self.genders.is_empty() || self.genders.iter().any(|g| g == &user.details.gender))
    }
}

/// Case-insensitive substring match on username or full name.
pub fn matches_search(user: &User, query: &str) -> bool {
    let q = query.to_lowercase();
    user.username.to_lowercase().contains(&q) || user.full_name.to_lowercase().contains(&q)
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for health output ("mongodb" / "memory")
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> StoreResult<()>;

    // ---- users ----
    async fn insert_user(&self, user: User) -> StoreResult<User>;
    async fn find_user_by_id(&self, id: &ObjectId) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Looks a user up by email or username
    async fn find_user_by_login(&self, handle: &str) -> StoreResult<Option<User>>;
    /// Replaces the whole stored document. Only for edits that own the
    /// entire record; everything else goes through the field-level calls.
    async fn save_user(&self, user: &User) -> StoreResult<()>;
    /// Overwrites the given fields and returns the updated document
    async fn update_user(&self, user_id: &ObjectId, update: &UserUpdate) -> StoreResult<Option<User>>;
    /// Returns true when the stored list changed
    async fn add_to_list(&self, user_id: &ObjectId, list: UserList, value: &str) -> StoreResult<bool>;
    /// Removes every occurrence of `values`; returns true when the stored list changed
    async fn remove_from_list(&self, user_id: &ObjectId, list: UserList, values: &[String]) -> StoreResult<bool>;
    /// All users, newest first
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn find_users_by_usernames(&self, usernames: &[String]) -> StoreResult<Vec<User>>;
    /// Verified, non-anonymous users matching `query`
    async fn search_users(&self, query: &str, limit: usize) -> StoreResult<Vec<User>>;
    /// Members, newest first
    async fn member_users(&self, limit: usize) -> StoreResult<Vec<User>>;
    async fn users_who_liked(&self, username: &str) -> StoreResult<Vec<User>>;
    async fn discovery_candidates(&self, query: &DiscoveryQuery) -> StoreResult<Vec<User>>;
    /// Adds `target` to both `likedUsers` and `seenUsers` in one update
    async fn add_like(&self, user_id: &ObjectId, target: &str) -> StoreResult<Option<User>>;
    /// Returns the number of documents whose flag actually changed
    async fn set_flag(&self, usernames: &[String], flag: UserFlag, value: bool) -> StoreResult<u64>;
    async fn delete_users(&self, usernames: &[String]) -> StoreResult<u64>;
    async fn delete_users_by_email_suffix(&self, suffix: &str) -> StoreResult<u64>;
    /// Clears `seenUsers` and `likedUsers` for every user; returns how many
    /// documents had anything to clear
    async fn reset_interactions(&self) -> StoreResult<u64>;
    async fn count_users(&self, flag: Option<UserFlag>) -> StoreResult<u64>;

    // ---- messages ----
    async fn insert_messages(&self, messages: Vec<Message>) -> StoreResult<Vec<Message>>;
    async fn find_message(&self, id: &ObjectId) -> StoreResult<Option<Message>>;
    async fn delete_message(&self, id: &ObjectId) -> StoreResult<bool>;
    /// Every message sent or received by `username`, newest first
    async fn messages_for(&self, username: &str) -> StoreResult<Vec<Message>>;
    /// Messages between two users, oldest first
    async fn conversation(&self, a: &str, b: &str) -> StoreResult<Vec<Message>>;

    // ---- notifications ----
    async fn insert_notifications(&self, notifications: Vec<Notification>) -> StoreResult<Vec<Notification>>;
    /// Newest first, capped at `limit`
    async fn notifications_for(&self, recipient: &str, limit: usize) -> StoreResult<Vec<Notification>>;
    async fn all_notifications(&self) -> StoreResult<Vec<Notification>>;
    /// Marks one notification (or all when `id` is None) of `recipient` as read
    async fn mark_notifications_read(&self, recipient: &str, id: Option<&ObjectId>) -> StoreResult<u64>;
    async fn delete_notification(&self, recipient: &str, id: &ObjectId) -> StoreResult<bool>;
    async fn delete_notifications_for(&self, recipient: &str) -> StoreResult<u64>;

    // ---- membership ----
    async fn insert_application(&self, application: Application) -> StoreResult<Application>;
    async fn insert_member(&self, member: Member) -> StoreResult<Member>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(username: &str, gender: &str) -> User {
        let mut user = User::new(username, &format!("{}@example.com", username), "x".into(), "", 0);
        user.photos = vec!["p.jpg".into()];
        user.details.gender = gender.into();
        user
    }

    #[test]
    fn test_discovery_query_filters() {
        let query = DiscoveryQuery {
            exclude: vec!["seen".into()],
            genders: vec!["Kadın".into()],
        };

        assert!(query.matches(&candidate("elif", "Kadın")));
        assert!(!query.matches(&candidate("seen", "Kadın")));
        assert!(!query.matches(&candidate("mert", "Erkek")));

        let mut hidden = candidate("gizli", "Kadın");
        hidden.is_anonymous = true;
        assert!(!query.matches(&hidden));

        let mut no_photos = candidate("bos", "Kadın");
        no_photos.photos.clear();
        assert!(!query.matches(&no_photos));
    }

    #[test]
    fn test_empty_gender_list_accepts_everyone() {
        let query = DiscoveryQuery::default();
        assert!(query.matches(&candidate("mert", "Erkek")));
    }

    #[test]
    fn test_user_list_push_keeps_usernames_unique() {
        let mut user = candidate("a", "");
        assert!(UserList::Liked.push(&mut user, "b"));
        assert!(!UserList::Liked.push(&mut user, "b"));
        assert!(UserList::Photos.push(&mut user, "p.jpg"));
        assert_eq!(user.photos, vec!["p.jpg".to_string(), "p.jpg".to_string()]);
    }

    #[test]
    fn test_user_update_touches_only_set_fields() {
        let mut user = candidate("a", "Kadın");
        user.bio = "eski".into();
        UserUpdate {
            full_name: Some("Ayşe".into()),
            is_member: Some(true),
            ..Default::default()
        }
        .apply(&mut user);

        assert_eq!(user.full_name, "Ayşe");
        assert!(user.is_member);
        assert_eq!(user.bio, "eski");
        assert_eq!(user.details.gender, "Kadın");
        assert_eq!(user.photos, vec!["p.jpg".to_string()]);
    }

    #[test]
    fn test_matches_search() {
        let mut user = candidate("zeynep_kaya", "");
        user.full_name = "Zeynep Kaya".into();
        assert!(matches_search(&user, "KAYA"));
        assert!(matches_search(&user, "eyne"));
        assert!(!matches_search(&user, "demir"));
    }
}
