use serde::{Deserialize, Serialize};

use mongodb::bson::oid::ObjectId;

use crate::database::{Store, UserList};
use crate::models::User;
use crate::utils::error::AppError;

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub success: bool,
    pub is_following: bool,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct ReportRequest {
    pub reason: Option<String>,
    pub description: Option<String>,
}

async fn target_user(store: &dyn Store, username: &str) -> Result<User, AppError> {
    store
        .find_user_by_username(username)
        .await?
        .ok_or_else(|| AppError::NotFound("Target user not found".to_string()))
}

fn user_id(user: &User) -> Result<ObjectId, AppError> {
    user.id.ok_or_else(AppError::user_not_found)
}

/// Two independent updates; the follow graph has no cross-document transaction.
pub async fn follow(store: &dyn Store, me: &User, target_username: &str) -> Result<(), AppError> {
    if me.username == target_username {
        return Err(AppError::InvalidRequest("Cannot follow self".to_string()));
    }
    let target = target_user(store, target_username).await?;

    store
        .add_to_list(&user_id(me)?, UserList::Following, &target.username)
        .await?;
    store
        .add_to_list(&user_id(&target)?, UserList::Followers, &me.username)
        .await?;
    Ok(())
}

pub async fn unfollow(store: &dyn Store, me: &User, target_username: &str) -> Result<(), AppError> {
    let target = target_user(store, target_username).await?;

    store
        .remove_from_list(&user_id(me)?, UserList::Following, &[target.username.clone()])
        .await?;
    store
        .remove_from_list(&user_id(&target)?, UserList::Followers, &[me.username.clone()])
        .await?;
    Ok(())
}

pub async fn block(store: &dyn Store, me: &User, target_username: &str) -> Result<(), AppError> {
    if me.username == target_username {
        return Err(AppError::InvalidRequest("Cannot block self".to_string()));
    }
    store
        .add_to_list(&user_id(me)?, UserList::Blocked, target_username)
        .await?;
    Ok(())
}

pub async fn unblock(store: &dyn Store, me: &User, target_username: &str) -> Result<(), AppError> {
    store
        .remove_from_list(&user_id(me)?, UserList::Blocked, &[target_username.to_string()])
        .await?;
    Ok(())
}

/// Reports are only logged for moderators to pick up.
pub fn report(reporter: &str, reported: &str, request: &ReportRequest) {
    log::warn!(
        "🚩 USER REPORT reporter={} reported={} reason={:?} description={:?}",
        reporter,
        reported,
        request.reason.as_deref().unwrap_or(""),
        request.description.as_deref().unwrap_or("")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::services::testing;

    #[tokio::test]
    async fn test_follow_is_idempotent_and_two_sided() {
        let store = MemoryStore::new();
        testing::user(&store, "a").await;
        testing::user(&store, "b").await;

        follow(&store, &testing::reload(&store, "a").await, "b").await.unwrap();
        follow(&store, &testing::reload(&store, "a").await, "b").await.unwrap();

        assert_eq!(testing::reload(&store, "a").await.following, vec!["b".to_string()]);
        assert_eq!(testing::reload(&store, "b").await.followers, vec!["a".to_string()]);

        unfollow(&store, &testing::reload(&store, "a").await, "b").await.unwrap();
        assert!(testing::reload(&store, "a").await.following.is_empty());
        assert!(testing::reload(&store, "b").await.followers.is_empty());
    }

    #[tokio::test]
    async fn test_follow_errors() {
        let store = MemoryStore::new();
        let a = testing::user(&store, "a").await;

        assert!(matches!(follow(&store, &a, "a").await, Err(AppError::InvalidRequest(_))));
        assert!(matches!(follow(&store, &a, "yok").await, Err(AppError::NotFound(_))));
        assert!(matches!(unfollow(&store, &a, "yok").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_follow_keeps_targets_own_edits() {
        let store = MemoryStore::new();
        let a = testing::user(&store, "a").await;
        let b = testing::user(&store, "b").await;

        let update = crate::database::UserUpdate {
            bio: Some("yeni bio".into()),
            ..Default::default()
        };
        store.update_user(&b.id.unwrap(), &update).await.unwrap();
        follow(&store, &a, "b").await.unwrap();

        let b = testing::reload(&store, "b").await;
        assert_eq!(b.bio, "yeni bio");
        assert_eq!(b.followers, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_block_and_unblock() {
        let store = MemoryStore::new();
        let a = testing::user(&store, "a").await;

        assert!(matches!(block(&store, &a, "a").await, Err(AppError::InvalidRequest(_))));
        block(&store, &a, "troll").await.unwrap();
        block(&store, &testing::reload(&store, "a").await, "troll").await.unwrap();
        assert_eq!(testing::reload(&store, "a").await.blocked_users, vec!["troll".to_string()]);

        unblock(&store, &testing::reload(&store, "a").await, "troll").await.unwrap();
        assert!(testing::reload(&store, "a").await.blocked_users.is_empty());
    }
}
