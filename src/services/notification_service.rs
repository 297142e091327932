use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::database::Store;
use crate::models::{NotificationResponse, User};
use crate::utils::error::AppError;

pub const NOTIFICATION_LIMIT: usize = 50;

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationList {
    pub success: bool,
    pub notifications: Vec<NotificationResponse>,
    /// Unread among the returned page
    pub unread_count: usize,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub notification_id: Option<String>,
    pub mark_all: Option<bool>,
}

pub async fn list(store: &dyn Store, me: &User) -> Result<NotificationList, AppError> {
    let notifications = store.notifications_for(&me.username, NOTIFICATION_LIMIT).await?;
    let unread_count = notifications.iter().filter(|n| !n.is_read).count();

    Ok(NotificationList {
        success: true,
        notifications: notifications.iter().map(NotificationResponse::from).collect(),
        unread_count,
    })
}

/// Only ever touches the caller's own notifications. Unknown or malformed
/// ids are a no-op.
pub async fn mark_read(store: &dyn Store, me: &User, request: &MarkReadRequest) -> Result<u64, AppError> {
    if request.mark_all.unwrap_or(false) {
        return store.mark_notifications_read(&me.username, None).await;
    }

    match request.notification_id.as_deref().map(ObjectId::parse_str) {
        Some(Ok(id)) => store.mark_notifications_read(&me.username, Some(&id)).await,
        _ => Ok(0),
    }
}

pub async fn delete(store: &dyn Store, me: &User, id: &str) -> Result<bool, AppError> {
    match ObjectId::parse_str(id) {
        Ok(id) => store.delete_notification(&me.username, &id).await,
        Err(_) => Ok(false),
    }
}

pub async fn clear(store: &dyn Store, me: &User) -> Result<u64, AppError> {
    store.delete_notifications_for(&me.username).await
}
