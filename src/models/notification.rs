use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::time::{bson_millis, to_rfc3339};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Message,
    AdminBroadcast,
    Like,
    Match,
    System,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationKind::Message => "message",
            NotificationKind::AdminBroadcast => "admin_broadcast",
            NotificationKind::Like => "like",
            NotificationKind::Match => "match",
            NotificationKind::System => "system",
        };
        write!(f, "{}", s)
    }
}

/// In-app notification (stored in the `notifications` collection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub recipient: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, with = "bson_millis")]
    pub created_at: i64,
}

impl Notification {
    pub fn new(recipient: &str, kind: NotificationKind, title: &str, body: String, sender: &str, now: i64) -> Self {
        Self {
            id: None,
            recipient: recipient.to_string(),
            kind,
            title: title.to_string(),
            body,
            sender: sender.to_string(),
            data: serde_json::json!({}),
            is_read: false,
            created_at: now,
        }
    }

    pub fn with_chat_user(mut self, chat_user: &str) -> Self {
        self.data = serde_json::json!({ "chatUser": chat_user });
        self
    }
}

/// Shortens notification previews to `max` characters, appending an ellipsis.
pub fn preview(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub recipient: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub sender: String,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    pub is_read: bool,
    pub created_at: String,
}

impl From<&Notification> for NotificationResponse {
    fn from(n: &Notification) -> Self {
        NotificationResponse {
            id: n.id.map(|id| id.to_hex()).unwrap_or_default(),
            recipient: n.recipient.clone(),
            kind: n.kind,
            title: n.title.clone(),
            body: n.body.clone(),
            sender: n.sender.clone(),
            data: n.data.clone(),
            is_read: n.is_read,
            created_at: to_rfc3339(n.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_counts_characters() {
        assert_eq!(preview("kısa", 50), "kısa");
        assert_eq!(preview("çççççç", 3), "ççç...");
        assert_eq!(preview(&"a".repeat(50), 50), "a".repeat(50));
    }

    #[test]
    fn test_kind_wire_names() {
        let json = serde_json::to_value(NotificationKind::AdminBroadcast).unwrap();
        assert_eq!(json, "admin_broadcast");
        assert_eq!(NotificationKind::Match.to_string(), "match");
    }

    #[test]
    fn test_decodes_documents_with_bson_dates() {
        use mongodb::bson::{self, doc, DateTime};

        let stored = doc! {
            "_id": ObjectId::new(),
            "recipient": "ayse",
            "type": "like",
            "title": "New like",
            "isRead": false,
            "createdAt": DateTime::from_millis(86_400_000),
        };
        let n: Notification = bson::from_slice(&bson::to_vec(&stored).unwrap()).unwrap();
        assert_eq!(n.kind, NotificationKind::Like);
        assert_eq!(n.created_at, 86_400_000);
    }
}
