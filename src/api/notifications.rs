use actix_web::{web, HttpResponse};

use crate::api::caller;
use crate::middleware::auth::AuthToken;
use crate::services::notification_service::{self, MarkReadRequest, NotificationList};
use crate::state::AppState;
use crate::utils::error::AppError;

#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    responses((status = 200, description = "Latest 50 notifications", body = NotificationList)),
    security(("bearer_auth" = []))
)]
pub async fn list(state: web::Data<AppState>, token: web::ReqData<AuthToken>) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    let list = notification_service::list(state.store.as_ref(), &me).await?;
    log::info!("🔔 GET /notifications - {}: {} unread", me.username, list.unread_count);
    Ok(HttpResponse::Ok().json(list))
}

#[utoipa::path(
    put,
    path = "/api/notifications/read",
    tag = "Notifications",
    request_body = MarkReadRequest,
    responses((status = 200, description = "Marked as read")),
    security(("bearer_auth" = []))
)]
pub async fn mark_read(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    request: web::Json<MarkReadRequest>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    let updated = notification_service::mark_read(state.store.as_ref(), &me, &request).await?;
    log::debug!("🔔 {} marked {} notifications read", me.username, updated);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    tag = "Notifications",
    params(("id" = String, Path, description = "Notification ObjectId")),
    responses((status = 200, description = "Deleted if it belonged to the caller")),
    security(("bearer_auth" = []))
)]
pub async fn delete(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    notification_service::delete(state.store.as_ref(), &me, &id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[utoipa::path(
    delete,
    path = "/api/notifications",
    tag = "Notifications",
    responses((status = 200, description = "All of the caller's notifications removed")),
    security(("bearer_auth" = []))
)]
pub async fn clear(state: web::Data<AppState>, token: web::ReqData<AuthToken>) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    let removed = notification_service::clear(state.store.as_ref(), &me).await?;
    log::info!("🧹 DELETE /notifications - {}: {} removed", me.username, removed);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
