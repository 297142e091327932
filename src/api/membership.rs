use actix_web::{web, HttpRequest, HttpResponse};

use crate::middleware::auth::bearer_token;
use crate::services::auth_service;
use crate::services::membership_service::{self, ApplyRequest, ApplyResponse, SubscribeRequest, SubscribeResponse};
use crate::state::AppState;
use crate::utils::error::AppError;

#[utoipa::path(
    post,
    path = "/api/aesthetic/apply",
    tag = "Membership",
    request_body = ApplyRequest,
    responses(
        (status = 200, description = "Application stored, account verified", body = ApplyResponse),
        (status = 400, description = "Missing required fields")
    )
)]
pub async fn apply(state: web::Data<AppState>, request: web::Json<ApplyRequest>) -> Result<HttpResponse, AppError> {
    log::info!("🪪 POST /aesthetic/apply - {:?}", request.username);

    match membership_service::apply(state.store.as_ref(), &request).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => {
            log::warn!("❌ Application rejected: {}", e);
            Err(e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/vault/subscribe",
    tag = "Membership",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscription recorded", body = SubscribeResponse),
        (status = 400, description = "Invalid Payment Token")
    )
)]
pub async fn subscribe(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<SubscribeRequest>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(&req);
    let caller = auth_service::optional_user(state.store.as_ref(), token.as_ref()).await?;
    log::info!(
        "💳 POST /vault/subscribe - {}",
        caller.as_ref().map(|u| u.username.as_str()).unwrap_or("guest")
    );

    match membership_service::subscribe(state.store.as_ref(), caller, &request).await {
        Ok(response) => {
            log::info!("✅ Subscription {} ({})", response.member_id, response.transaction_id);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            log::warn!("❌ Subscription failed: {}", e);
            Err(e)
        }
    }
}
