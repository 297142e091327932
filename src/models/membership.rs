use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::utils::time::bson_millis;

/// Liveness verification application
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    #[serde(default)]
    pub dob: Option<String>,
    pub liveness_image: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, with = "bson_millis")]
    pub created_at: i64,
}

fn default_status() -> String {
    "PENDING_REVIEW".to_string()
}

impl Application {
    pub fn new(username: &str, dob: Option<String>, liveness_image: &str, now: i64) -> Self {
        Self {
            id: None,
            username: username.to_string(),
            dob,
            liveness_image: liveness_image.to_string(),
            status: default_status(),
            created_at: now,
        }
    }
}

/// VIP subscription record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub member_id: String,
    pub email: String,
    pub payment_token: String,
    #[serde(default = "default_tier")]
    pub tier: String,
    #[serde(default, with = "bson_millis")]
    pub joined_at: i64,
}

fn default_tier() -> String {
    "VAULT_PREMIUM".to_string()
}

impl Member {
    pub fn new(member_id: String, email: String, payment_token: &str, now: i64) -> Self {
        Self {
            id: None,
            member_id,
            email,
            payment_token: payment_token.to_string(),
            tier: default_tier(),
            joined_at: now,
        }
    }
}
