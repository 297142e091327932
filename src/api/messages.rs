use actix_web::{web, HttpResponse};

use crate::api::caller;
use crate::middleware::auth::AuthToken;
use crate::services::message_service::{
    self, ConversationsResponse, HistoryResponse, SendMessageRequest, SentMessageResponse,
};
use crate::state::AppState;
use crate::utils::error::AppError;

#[utoipa::path(
    get,
    path = "/api/messages/conversations",
    tag = "Messages",
    responses((status = 200, description = "Latest message per partner", body = ConversationsResponse)),
    security(("bearer_auth" = []))
)]
pub async fn conversations(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    let conversations = message_service::conversations(state.store.as_ref(), &me).await?;
    log::info!("💬 GET /messages/conversations - {}: {}", me.username, conversations.len());
    Ok(HttpResponse::Ok().json(ConversationsResponse {
        success: true,
        conversations,
    }))
}

#[utoipa::path(
    get,
    path = "/api/messages/{username}",
    tag = "Messages",
    params(("username" = String, Path, description = "Conversation partner")),
    responses((status = 200, description = "Thread, oldest first", body = HistoryResponse)),
    security(("bearer_auth" = []))
)]
pub async fn history(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    other: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    let messages = message_service::history(state.store.as_ref(), &me, &other).await?;
    Ok(HttpResponse::Ok().json(HistoryResponse { success: true, messages }))
}

#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "Messages",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Stored message", body = SentMessageResponse),
        (status = 400, description = "Receiver and text required"),
        (status = 403, description = "Blocked, or a non-member opening a new conversation"),
        (status = 404, description = "Receiver not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn send(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    request: web::Json<SendMessageRequest>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    let receiver = request.receiver.clone().unwrap_or_default();
    log::info!("✉️ POST /messages - {} -> {}", me.username, receiver);

    match message_service::send(state.store.as_ref(), &me, &request).await {
        Ok(message) => Ok(HttpResponse::Ok().json(SentMessageResponse { success: true, message })),
        Err(e) => {
            log::warn!("❌ Message rejected: {} -> {} - {}", me.username, receiver, e);
            Err(e)
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/messages/{id}",
    tag = "Messages",
    params(("id" = String, Path, description = "Message ObjectId")),
    responses(
        (status = 200, description = "Message deleted"),
        (status = 403, description = "Not the sender"),
        (status = 404, description = "Message not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    log::info!("🗑️ DELETE /messages/{} - {}", id, me.username);

    message_service::delete(state.store.as_ref(), &me, &id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Message deleted"
    })))
}
