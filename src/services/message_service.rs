use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::database::Store;
use crate::models::{
    preview, ConversationSummary, Message, MessageResponse, Notification, NotificationKind, User,
    ADMIN_SENDER,
};
use crate::services::non_blank;
use crate::utils::error::AppError;
use crate::utils::time::now_millis;

pub const ADMIN_ICON: &str = "https://cdn-icons-png.flaticon.com/512/1246/1246326.png";
pub const MESSAGE_PREVIEW_CHARS: usize = 50;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SendMessageRequest {
    pub receiver: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ConversationsResponse {
    pub success: bool,
    pub conversations: Vec<ConversationSummary>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HistoryResponse {
    pub success: bool,
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SentMessageResponse {
    pub success: bool,
    pub message: MessageResponse,
}

/// One entry per partner, ordered by the latest message in each thread.
pub async fn conversations(store: &dyn Store, me: &User) -> Result<Vec<ConversationSummary>, AppError> {
    let messages = store.messages_for(&me.username).await?;

    let mut seen = HashSet::new();
    let mut latest: Vec<&Message> = Vec::new();
    for message in &messages {
        if seen.insert(message.partner_of(&me.username)) {
            latest.push(message);
        }
    }

    let mut summaries = Vec::with_capacity(latest.len());
    for message in latest {
        let partner = message.partner_of(&me.username);
        if partner == ADMIN_SENDER {
            summaries.push(ConversationSummary {
                username: ADMIN_SENDER.to_string(),
                avatar: ADMIN_ICON.to_string(),
                last_message: message.text.clone(),
                is_admin: true,
            });
            continue;
        }

        // System senders and deleted accounts have no user document
        if let Some(user) = store.find_user_by_username(partner).await? {
            summaries.push(ConversationSummary {
                username: user.username,
                avatar: user.avatar,
                last_message: message.text.clone(),
                is_admin: false,
            });
        }
    }

    Ok(summaries)
}

pub async fn history(store: &dyn Store, me: &User, other: &str) -> Result<Vec<MessageResponse>, AppError> {
    let messages = store.conversation(&me.username, other.trim()).await?;
    Ok(messages.iter().map(MessageResponse::from).collect())
}

pub async fn send(store: &dyn Store, me: &User, request: &SendMessageRequest) -> Result<MessageResponse, AppError> {
    let receiver = non_blank(&request.receiver);
    let text = request.text.as_deref().filter(|t| !t.trim().is_empty());
    let (receiver, text) = match (receiver, text) {
        (Some(r), Some(t)) => (r, t),
        _ => return Err(AppError::InvalidRequest("Receiver and text required".to_string())),
    };

    let receiver_user = store
        .find_user_by_username(receiver)
        .await?
        .ok_or_else(|| AppError::NotFound("Receiver not found".to_string()))?;

    if me.has_blocked(receiver) {
        return Err(AppError::Forbidden(
            "You have blocked this user. Unblock to send message.".to_string(),
        ));
    }
    if receiver_user.has_blocked(&me.username) {
        return Err(AppError::Forbidden("You are blocked by this user.".to_string()));
    }

    if !me.is_member && store.conversation(&me.username, receiver).await?.is_empty() {
        return Err(AppError::Forbidden(
            "Sadece VIP üyeler yeni sohbet başlatabilir.".to_string(),
        ));
    }

    let now = now_millis();
    let mut saved = store
        .insert_messages(vec![Message::new(&me.username, receiver, text, now)])
        .await?;
    let message = saved
        .pop()
        .ok_or_else(|| AppError::DatabaseError("Message was not stored".to_string()))?;

    let title = if me.full_name.is_empty() { &me.username } else { &me.full_name };
    let notification = Notification::new(
        receiver,
        NotificationKind::Message,
        title,
        preview(text, MESSAGE_PREVIEW_CHARS),
        &me.username,
        now,
    )
    .with_chat_user(&me.username);
    store.insert_notifications(vec![notification]).await?;

    Ok(MessageResponse::from(&message))
}

pub async fn delete(store: &dyn Store, me: &User, id: &str) -> Result<(), AppError> {
    let not_found = || AppError::NotFound("Message not found".to_string());
    let id = ObjectId::parse_str(id).map_err(|_| not_found())?;

    let message = store.find_message(&id).await?.ok_or_else(not_found)?;
    if message.sender != me.username {
        return Err(AppError::Forbidden(
            "You can only delete your own messages".to_string(),
        ));
    }

    store.delete_message(&id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing;
    use crate::database::MemoryStore;

    fn request(receiver: &str, text: &str) -> SendMessageRequest {
        SendMessageRequest {
            receiver: Some(receiver.to_string()),
            text: Some(text.to_string()),
        }
    }

    async fn member(store: &MemoryStore, username: &str) -> User {
        let mut user = testing::user(store, username).await;
        user.is_member = true;
        store.save_user(&user).await.unwrap();
        user
    }

    #[tokio::test]
    async fn test_non_member_cannot_open_conversation() {
        let store = MemoryStore::new();
        let free = testing::user(&store, "free").await;
        let vip = member(&store, "vip").await;

        let denied = send(&store, &free, &request("vip", "selam")).await;
        assert!(matches!(denied, Err(AppError::Forbidden(m)) if m.starts_with("Sadece VIP")));

        send(&store, &vip, &request("free", "merhaba")).await.unwrap();
        // once the thread exists the free user can reply
        send(&store, &free, &request("vip", "selam")).await.unwrap();

        let history = history(&store, &free, " vip ").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, "merhaba");
    }

    #[tokio::test]
    async fn test_blocks_and_validation() {
        let store = MemoryStore::new();
        let mut a = member(&store, "a").await;
        let b = member(&store, "b").await;

        assert!(matches!(
            send(&store, &a, &SendMessageRequest { receiver: Some("b".into()), text: None }).await,
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(send(&store, &a, &request("yok", "x")).await, Err(AppError::NotFound(_))));

        a.blocked_users = vec!["b".into()];
        store.save_user(&a).await.unwrap();
        assert!(matches!(send(&store, &a, &request("b", "x")).await, Err(AppError::Forbidden(_))));
        assert!(matches!(send(&store, &b, &request("a", "x")).await, Err(AppError::Forbidden(m)) if m == "You are blocked by this user."));
    }

    #[tokio::test]
    async fn test_send_creates_truncated_notification() {
        let store = MemoryStore::new();
        let mut sender = member(&store, "yazar").await;
        sender.full_name = "Yazar Bey".into();
        testing::user(&store, "okur").await;

        let long = "x".repeat(80);
        send(&store, &sender, &request("okur", &long)).await.unwrap();

        let notes = store.notifications_for("okur", 50).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Yazar Bey");
        assert_eq!(notes[0].body, format!("{}...", "x".repeat(50)));
        assert_eq!(notes[0].data["chatUser"], "yazar");
    }

    #[tokio::test]
    async fn test_conversation_list() {
        let store = MemoryStore::new();
        let me = member(&store, "ben").await;
        testing::user(&store, "ilk").await;
        testing::user(&store, "son").await;

        store
            .insert_messages(vec![
                Message::new("ben", "ilk", "eski", 1),
                Message::new(ADMIN_SENDER, "ben", "duyuru", 2),
                Message::new("son", "ben", "yeni", 3),
                Message::new("ben", "silinmis", "kayip", 4),
                Message::new("ilk", "ben", "cevap", 5),
            ])
            .await
            .unwrap();

        let list = conversations(&store, &me).await.unwrap();
        let names: Vec<_> = list.iter().map(|c| c.username.as_str()).collect();
        assert_eq!(names, vec!["ilk", "son", ADMIN_SENDER]);
        assert_eq!(list[0].last_message, "cevap");
        assert!(list[2].is_admin);
        assert_eq!(list[2].avatar, ADMIN_ICON);
    }

    #[tokio::test]
    async fn test_only_sender_deletes() {
        let store = MemoryStore::new();
        let a = member(&store, "a").await;
        let b = member(&store, "b").await;

        let sent = send(&store, &a, &request("b", "sil beni")).await.unwrap();
        assert!(matches!(delete(&store, &b, &sent.id).await, Err(AppError::Forbidden(_))));
        assert!(matches!(delete(&store, &a, "bozuk").await, Err(AppError::NotFound(_))));

        delete(&store, &a, &sent.id).await.unwrap();
        assert!(matches!(delete(&store, &a, &sent.id).await, Err(AppError::NotFound(_))));
    }
}
