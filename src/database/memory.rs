use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{matches_search, DiscoveryQuery, Store, StoreResult, UserFlag, UserList, UserUpdate};
use crate::models::{add_unique, remove_all, Application, Member, Message, Notification, User};

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    messages: Vec<Message>,
    notifications: Vec<Notification>,
    applications: Vec<Application>,
    members: Vec<Member>,
}

/// Process-local fallback store. Vectors keep insertion order, which doubles
/// as the tie-breaker when two documents share a timestamp.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first; among equal timestamps the later insert wins.
fn newest_first<T: Clone>(items: &[T], created_at: impl Fn(&T) -> i64) -> Vec<T> {
    let mut out: Vec<T> = items.iter().rev().cloned().collect();
    out.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    out
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_user(&self, mut user: User) -> StoreResult<User> {
        user.id.get_or_insert_with(ObjectId::new);
        self.data.write().await.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: &ObjectId) -> StoreResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.id.as_ref() == Some(id)).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_login(&self, handle: &str) -> StoreResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data
            .users
            .iter()
            .find(|u| u.email == handle || u.username == handle)
            .cloned())
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        let mut data = self.data.write().await;
        if let Some(slot) = data.users.iter_mut().find(|u| u.id.is_some() && u.id == user.id) {
            *slot = user.clone();
        }
        Ok(())
    }

    async fn update_user(&self, user_id: &ObjectId, update: &UserUpdate) -> StoreResult<Option<User>> {
        let mut data = self.data.write().await;
        Ok(data
            .users
            .iter_mut()
            .find(|u| u.id.as_ref() == Some(user_id))
            .map(|user| {
                update.apply(user);
                user.clone()
            }))
    }

    async fn add_to_list(&self, user_id: &ObjectId, list: UserList, value: &str) -> StoreResult<bool> {
        let mut data = self.data.write().await;
        Ok(data
            .users
            .iter_mut()
            .find(|u| u.id.as_ref() == Some(user_id))
            .is_some_and(|user| list.push(user, value)))
    }

    async fn remove_from_list(&self, user_id: &ObjectId, list: UserList, values: &[String]) -> StoreResult<bool> {
        let mut data = self.data.write().await;
        let Some(user) = data.users.iter_mut().find(|u| u.id.as_ref() == Some(user_id)) else {
            return Ok(false);
        };
        Ok(remove_all(list.get_mut(user), values))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let data = self.data.read().await;
        Ok(newest_first(&data.users, |u| u.created_at))
    }

    async fn find_users_by_usernames(&self, usernames: &[String]) -> StoreResult<Vec<User>> {
        let data = self.data.read().await;
        Ok(data
            .users
            .iter()
            .filter(|u| usernames.contains(&u.username))
            .cloned()
            .collect())
    }

    async fn search_users(&self, query: &str, limit: usize) -> StoreResult<Vec<User>> {
        let data = self.data.read().await;
        Ok(data
            .users
            .iter()
            .filter(|u| u.is_verified && !u.is_anonymous && matches_search(u, query))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn member_users(&self, limit: usize) -> StoreResult<Vec<User>> {
        let data = self.data.read().await;
        let members: Vec<User> = data.users.iter().filter(|u| u.is_member).cloned().collect();
        Ok(newest_first(&members, |u| u.created_at).into_iter().take(limit).collect())
    }

    async fn users_who_liked(&self, username: &str) -> StoreResult<Vec<User>> {
        let data = self.data.read().await;
        Ok(data.users.iter().filter(|u| u.has_liked(username)).cloned().collect())
    }

    async fn discovery_candidates(&self, query: &DiscoveryQuery) -> StoreResult<Vec<User>> {
        let data = self.data.read().await;
        Ok(data.users.iter().filter(|u| query.matches(u)).cloned().collect())
    }

    async fn add_like(&self, user_id: &ObjectId, target: &str) -> StoreResult<Option<User>> {
        let mut data = self.data.write().await;
        Ok(data
            .users
            .iter_mut()
            .find(|u| u.id.as_ref() == Some(user_id))
            .map(|user| {
                add_unique(&mut user.liked_users, target);
                add_unique(&mut user.seen_users, target);
                user.clone()
            }))
    }

    async fn set_flag(&self, usernames: &[String], flag: UserFlag, value: bool) -> StoreResult<u64> {
        let mut data = self.data.write().await;
        let mut modified = 0;
        for user in data.users.iter_mut().filter(|u| usernames.contains(&u.username)) {
            if flag.get(user) != value {
                flag.set(user, value);
                modified += 1;
            }
        }
        Ok(modified)
    }

    async fn delete_users(&self, usernames: &[String]) -> StoreResult<u64> {
        let mut data = self.data.write().await;
        let before = data.users.len();
        data.users.retain(|u| !usernames.contains(&u.username));
        Ok((before - data.users.len()) as u64)
    }

    async fn delete_users_by_email_suffix(&self, suffix: &str) -> StoreResult<u64> {
        let mut data = self.data.write().await;
        let before = data.users.len();
        data.users.retain(|u| !u.email.ends_with(suffix));
        Ok((before - data.users.len()) as u64)
    }

    async fn reset_interactions(&self) -> StoreResult<u64> {
        let mut data = self.data.write().await;
        let mut modified = 0;
        for user in data.users.iter_mut() {
            if !user.seen_users.is_empty() || !user.liked_users.is_empty() {
                user.seen_users.clear();
                user.liked_users.clear();
                modified += 1;
            }
        }
        Ok(modified)
    }

    async fn count_users(&self, flag: Option<UserFlag>) -> StoreResult<u64> {
        let data = self.data.read().await;
        let count = match flag {
            Some(flag) => data.users.iter().filter(|u| flag.get(u)).count(),
            None => data.users.len(),
        };
        Ok(count as u64)
    }

    async fn insert_messages(&self, messages: Vec<Message>) -> StoreResult<Vec<Message>> {
        let mut data = self.data.write().await;
        let stored: Vec<Message> = messages
            .into_iter()
            .map(|mut m| {
                m.id.get_or_insert_with(ObjectId::new);
                m
            })
            .collect();
        data.messages.extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn find_message(&self, id: &ObjectId) -> StoreResult<Option<Message>> {
        let data = self.data.read().await;
        Ok(data.messages.iter().find(|m| m.id.as_ref() == Some(id)).cloned())
    }

    async fn delete_message(&self, id: &ObjectId) -> StoreResult<bool> {
        let mut data = self.data.write().await;
        let before = data.messages.len();
        data.messages.retain(|m| m.id.as_ref() != Some(id));
        Ok(data.messages.len() != before)
    }

    async fn messages_for(&self, username: &str) -> StoreResult<Vec<Message>> {
        let data = self.data.read().await;
        let mine: Vec<Message> = data.messages.iter().filter(|m| m.involves(username)).cloned().collect();
        Ok(newest_first(&mine, |m| m.created_at))
    }

    async fn conversation(&self, a: &str, b: &str) -> StoreResult<Vec<Message>> {
        let data = self.data.read().await;
        let mut pair: Vec<Message> = data.messages.iter().filter(|m| m.is_between(a, b)).cloned().collect();
        pair.sort_by_key(|m| m.created_at);
        Ok(pair)
    }

    async fn insert_notifications(&self, notifications: Vec<Notification>) -> StoreResult<Vec<Notification>> {
        let mut data = self.data.write().await;
        let stored: Vec<Notification> = notifications
            .into_iter()
            .map(|mut n| {
                n.id.get_or_insert_with(ObjectId::new);
                n
            })
            .collect();
        data.notifications.extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn notifications_for(&self, recipient: &str, limit: usize) -> StoreResult<Vec<Notification>> {
        let data = self.data.read().await;
        let mine: Vec<Notification> = data
            .notifications
            .iter()
            .filter(|n| n.recipient == recipient)
            .cloned()
            .collect();
        Ok(newest_first(&mine, |n| n.created_at).into_iter().take(limit).collect())
    }

    async fn all_notifications(&self) -> StoreResult<Vec<Notification>> {
        let data = self.data.read().await;
        Ok(data.notifications.clone())
    }

    async fn mark_notifications_read(&self, recipient: &str, id: Option<&ObjectId>) -> StoreResult<u64> {
        let mut data = self.data.write().await;
        let mut modified = 0;
        for n in data
            .notifications
            .iter_mut()
            .filter(|n| n.recipient == recipient && !n.is_read)
            .filter(|n| id.map_or(true, |id| n.id.as_ref() == Some(id)))
        {
            n.is_read = true;
            modified += 1;
        }
        Ok(modified)
    }

    async fn delete_notification(&self, recipient: &str, id: &ObjectId) -> StoreResult<bool> {
        let mut data = self.data.write().await;
        let before = data.notifications.len();
        data.notifications
            .retain(|n| !(n.recipient == recipient && n.id.as_ref() == Some(id)));
        Ok(data.notifications.len() != before)
    }

    async fn delete_notifications_for(&self, recipient: &str) -> StoreResult<u64> {
        let mut data = self.data.write().await;
        let before = data.notifications.len();
        data.notifications.retain(|n| n.recipient != recipient);
        Ok((before - data.notifications.len()) as u64)
    }

    async fn insert_application(&self, mut application: Application) -> StoreResult<Application> {
        application.id.get_or_insert_with(ObjectId::new);
        self.data.write().await.applications.push(application.clone());
        Ok(application)
    }

    async fn insert_member(&self, mut member: Member) -> StoreResult<Member> {
        member.id.get_or_insert_with(ObjectId::new);
        self.data.write().await.members.push(member.clone());
        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationKind;

    fn user(username: &str, created_at: i64) -> User {
        User::new(username, &format!("{}@example.com", username), "x".into(), "", created_at)
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_lookups_work() {
        let store = MemoryStore::new();
        let stored = store.insert_user(user("ayse", 1)).await.unwrap();
        let id = stored.id.unwrap();

        assert_eq!(store.find_user_by_id(&id).await.unwrap().unwrap().username, "ayse");
        assert!(store.find_user_by_login("ayse@example.com").await.unwrap().is_some());
        assert!(store.find_user_by_login("ayse").await.unwrap().is_some());
        assert!(store.find_user_by_login("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_users_newest_first() {
        let store = MemoryStore::new();
        store.insert_user(user("old", 1)).await.unwrap();
        store.insert_user(user("new", 5)).await.unwrap();
        store.insert_user(user("mid", 3)).await.unwrap();

        let names: Vec<String> = store.list_users().await.unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_add_like_is_idempotent() {
        let store = MemoryStore::new();
        let id = store.insert_user(user("me", 1)).await.unwrap().id.unwrap();

        store.add_like(&id, "you").await.unwrap();
        let me = store.add_like(&id, "you").await.unwrap().unwrap();
        assert_eq!(me.liked_users, vec!["you".to_string()]);
        assert_eq!(me.seen_users, vec!["you".to_string()]);

        let removed = store.remove_from_list(&id, UserList::Liked, &["you".to_string()]).await.unwrap();
        assert!(removed);
        let me = store.find_user_by_id(&id).await.unwrap().unwrap();
        assert!(me.liked_users.is_empty());
        assert_eq!(me.seen_users, vec!["you".to_string()]);
    }

    #[tokio::test]
    async fn test_field_updates_leave_other_fields_alone() {
        let store = MemoryStore::new();
        let id = store.insert_user(user("me", 1)).await.unwrap().id.unwrap();
        let stale = store.find_user_by_id(&id).await.unwrap().unwrap();

        store.add_like(&id, "c").await.unwrap();
        assert!(store.add_to_list(&id, UserList::Seen, "z").await.unwrap());
        assert!(!store.add_to_list(&id, UserList::Seen, "z").await.unwrap());
        let update = UserUpdate {
            bio: Some("merhaba".into()),
            ..Default::default()
        };
        let me = store.update_user(&id, &update).await.unwrap().unwrap();

        assert!(stale.liked_users.is_empty());
        assert_eq!(me.liked_users, vec!["c".to_string()]);
        assert_eq!(me.seen_users, vec!["c".to_string(), "z".to_string()]);
        assert_eq!(me.bio, "merhaba");

        let ghost = ObjectId::new();
        assert!(!store.add_to_list(&ghost, UserList::Seen, "z").await.unwrap());
        assert!(store.update_user(&ghost, &update).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_interactions_counts_changed_users() {
        let store = MemoryStore::new();
        let id = store.insert_user(user("active", 1)).await.unwrap().id.unwrap();
        store.insert_user(user("idle", 2)).await.unwrap();
        store.add_like(&id, "idle").await.unwrap();

        assert_eq!(store.reset_interactions().await.unwrap(), 1);
        assert_eq!(store.reset_interactions().await.unwrap(), 0);
        let active = store.find_user_by_id(&id).await.unwrap().unwrap();
        assert!(active.liked_users.is_empty() && active.seen_users.is_empty());
    }

    #[tokio::test]
    async fn test_set_flag_counts_only_changes() {
        let store = MemoryStore::new();
        let mut vip = user("vip", 1);
        vip.is_member = true;
        store.insert_user(vip).await.unwrap();
        store.insert_user(user("plain", 2)).await.unwrap();

        let names = vec!["vip".to_string(), "plain".to_string(), "ghost".to_string()];
        assert_eq!(store.set_flag(&names, UserFlag::Member, true).await.unwrap(), 1);
        assert_eq!(store.count_users(Some(UserFlag::Member)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_notifications_scoped_to_recipient() {
        let store = MemoryStore::new();
        let stored = store
            .insert_notifications(vec![
                Notification::new("a", NotificationKind::Message, "t", "1".into(), "b", 1),
                Notification::new("b", NotificationKind::Message, "t", "2".into(), "a", 2),
            ])
            .await
            .unwrap();
        let foreign = stored[1].id.unwrap();

        assert!(!store.delete_notification("a", &foreign).await.unwrap());
        assert_eq!(store.mark_notifications_read("a", Some(&foreign)).await.unwrap(), 0);
        assert_eq!(store.mark_notifications_read("a", None).await.unwrap(), 1);
        assert_eq!(store.delete_notifications_for("b").await.unwrap(), 1);
        assert_eq!(store.all_notifications().await.unwrap().len(), 1);
    }
}
