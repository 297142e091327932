use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::utils::time::{bson_millis, to_rfc3339};

/// Sender name used for admin broadcasts
pub const ADMIN_SENDER: &str = "The Vault Admin";
/// Sender name used for match announcements
pub const SYSTEM_SENDER: &str = "System";
pub const MATCH_GREETING: &str = "It's a Match! 🥂";

/// Direct message between two usernames
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub sender: String,
    pub receiver: String,
    pub text: String,
    #[serde(default, with = "bson_millis")]
    pub created_at: i64,
}

impl Message {
    pub fn new(sender: &str, receiver: &str, text: &str, now: i64) -> Self {
        Self {
            id: None,
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            text: text.to_string(),
            created_at: now,
        }
    }

    pub fn involves(&self, username: &str) -> bool {
        self.sender == username || self.receiver == username
    }

    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.sender == a && self.receiver == b) || (self.sender == b && self.receiver == a)
    }

    /// The other side of the conversation from `me`'s point of view.
    pub fn partner_of(&self, me: &str) -> &str {
        if self.sender == me {
            &self.receiver
        } else {
            &self.sender
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub sender: String,
    pub receiver: String,
    pub text: String,
    pub created_at: String,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        MessageResponse {
            id: message.id.map(|id| id.to_hex()).unwrap_or_default(),
            sender: message.sender.clone(),
            receiver: message.receiver.clone(),
            text: message.text.clone(),
            created_at: to_rfc3339(message.created_at),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub username: String,
    pub avatar: String,
    pub last_message: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_admin: bool,
}
