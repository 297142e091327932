use actix_web::{web, HttpResponse};

use crate::api::caller;
use crate::middleware::auth::AuthToken;
use crate::services::auth_service::{self, AccountEnvelope, AuthResponse, LoginRequest, RegisterRequest};
use crate::state::AppState;
use crate::utils::error::AppError;

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing fields or user already exists")
    )
)]
pub async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let username = request.username.as_deref().unwrap_or("N/A");
    log::info!("📝 POST /auth/register - username: {}", username);

    match auth_service::register(state.store.as_ref(), state.config.bcrypt_cost, &request).await {
        Ok(response) => {
            log::info!("✅ Registration successful: {}", response.user.username);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            log::warn!("❌ Registration failed: {} - {}", username, e);
            Err(e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing or invalid credentials")
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let handle = request.handle().unwrap_or("N/A").to_string();
    log::info!("🔐 POST /auth/login - identifier: {}", handle);

    match auth_service::login(state.store.as_ref(), &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", response.user.username);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", handle, e);
            Err(e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current account", body = AccountEnvelope),
        (status = 401, description = "Missing or malformed token"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    log::debug!("👤 GET /auth/me - {}", me.username);
    Ok(HttpResponse::Ok().json(AccountEnvelope::new(&me)))
}
