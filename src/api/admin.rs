//! `/api/admin`: console for the configured admin account.

use actix_web::{web, HttpResponse};

use crate::api::caller;
use crate::middleware::auth::AuthToken;
use crate::models::{AccountResponse, User};
use crate::services::admin_service::{
    self, AdminCreateUser, AdminUpdateUser, AdminUserResponse, AdminUsersResponse, BroadcastRequest,
    BulkActionRequest, DashboardResponse,
};
use crate::state::AppState;
use crate::utils::error::AppError;

async fn admin(state: &AppState, token: &AuthToken) -> Result<User, AppError> {
    let me = caller(state, token).await?;
    admin_service::require_admin(&me, &state.config)?;
    Ok(me)
}

fn done(message: String) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "success": true, "message": message }))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    responses(
        (status = 200, description = "Every user, newest first", body = AdminUsersResponse),
        (status = 403, description = "Admin access only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(state: web::Data<AppState>, token: web::ReqData<AuthToken>) -> Result<HttpResponse, AppError> {
    admin(&state, &token).await?;
    let users = admin_service::list_users(state.store.as_ref()).await?;
    log::info!("🛠️ GET /admin/users - {} users", users.len());
    Ok(HttpResponse::Ok().json(AdminUsersResponse { success: true, users }))
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "Admin",
    request_body = AdminCreateUser,
    responses(
        (status = 200, description = "Created account", body = AdminUserResponse),
        (status = 400, description = "Missing fields or duplicate username/email"),
        (status = 403, description = "Admin access only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    request: web::Json<AdminCreateUser>,
) -> Result<HttpResponse, AppError> {
    admin(&state, &token).await?;
    log::info!("🛠️ POST /admin/users - {:?}", request.username);

    match admin_service::create_user(state.store.as_ref(), state.config.bcrypt_cost, &request).await {
        Ok(user) => {
            log::info!("✅ Admin created user {}", user.username);
            Ok(HttpResponse::Ok().json(AdminUserResponse {
                success: true,
                user: AccountResponse::from(&user),
            }))
        }
        Err(e) => {
            log::warn!("❌ Admin create user failed: {}", e);
            Err(e)
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{username}",
    tag = "Admin",
    params(("username" = String, Path, description = "Account to edit")),
    request_body = AdminUpdateUser,
    responses(
        (status = 200, description = "Updated account", body = AdminUserResponse),
        (status = 400, description = "Username or email taken"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    username: web::Path<String>,
    request: web::Json<AdminUpdateUser>,
) -> Result<HttpResponse, AppError> {
    admin(&state, &token).await?;
    log::info!("🛠️ PUT /admin/users/{}", username);

    let user = admin_service::update_user(state.store.as_ref(), &username, &request).await?;
    Ok(HttpResponse::Ok().json(AdminUserResponse {
        success: true,
        user: AccountResponse::from(&user),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{username}",
    tag = "Admin",
    params(("username" = String, Path, description = "Account to delete")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "Cannot delete self"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    username: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let me = admin(&state, &token).await?;
    log::warn!("🛠️ DELETE /admin/users/{}", username);

    admin_service::delete_user(state.store.as_ref(), &me, &username).await?;
    Ok(done(format!("User {} deleted.", username)))
}

#[utoipa::path(
    post,
    path = "/api/admin/bulk-action",
    tag = "Admin",
    request_body = BulkActionRequest,
    responses(
        (status = 200, description = "Number of affected users"),
        (status = 400, description = "No users selected or unknown action")
    ),
    security(("bearer_auth" = []))
)]
pub async fn bulk_action(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    request: web::Json<BulkActionRequest>,
) -> Result<HttpResponse, AppError> {
    admin(&state, &token).await?;
    log::info!(
        "🛠️ POST /admin/bulk-action - {:?} on {} users",
        request.action,
        request.usernames.as_ref().map(Vec::len).unwrap_or(0)
    );

    let affected = admin_service::bulk_action(state.store.as_ref(), &request).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "affected": affected })))
}

#[utoipa::path(
    post,
    path = "/api/admin/send-message",
    tag = "Admin",
    request_body = BroadcastRequest,
    responses(
        (status = 200, description = "Number of recipients"),
        (status = 400, description = "Message required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn send_message(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    request: web::Json<BroadcastRequest>,
) -> Result<HttpResponse, AppError> {
    admin(&state, &token).await?;

    match admin_service::broadcast(state.store.as_ref(), &request).await {
        Ok(count) => {
            log::info!("📣 Admin broadcast delivered to {} users", count);
            Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "count": count })))
        }
        Err(e) => {
            log::warn!("❌ Admin broadcast failed: {}", e);
            Err(e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard-stats",
    tag = "Admin",
    responses((status = 200, description = "User totals and newest sign-ups", body = DashboardResponse)),
    security(("bearer_auth" = []))
)]
pub async fn dashboard_stats(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
) -> Result<HttpResponse, AppError> {
    admin(&state, &token).await?;
    let stats = admin_service::dashboard_stats(state.store.as_ref()).await?;
    Ok(HttpResponse::Ok().json(DashboardResponse { success: true, stats }))
}

#[utoipa::path(
    post,
    path = "/api/admin/upgrade/{username}",
    tag = "Admin",
    params(("username" = String, Path, description = "Account to upgrade")),
    responses(
        (status = 200, description = "User is now member and verified"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upgrade(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    username: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    admin(&state, &token).await?;
    admin_service::upgrade(state.store.as_ref(), &username).await?;
    log::info!("💎 Admin upgraded {}", username);
    Ok(done(format!("User {} is now a VIP Member & Verified.", username)))
}

#[utoipa::path(
    post,
    path = "/api/admin/seed",
    tag = "Admin",
    responses((status = 200, description = "Bots regenerated")),
    security(("bearer_auth" = []))
)]
pub async fn seed_bots(state: web::Data<AppState>, token: web::ReqData<AuthToken>) -> Result<HttpResponse, AppError> {
    admin(&state, &token).await?;
    log::info!("🌱 POST /admin/seed");

    match admin_service::seed_bots(state.store.as_ref(), state.config.bcrypt_cost).await {
        Ok(count) => {
            log::info!("✅ Seeded {} bots", count);
            Ok(done(format!("Seeded {} bot users.", count)))
        }
        Err(e) => {
            log::error!("❌ Bot seeding failed: {}", e);
            Err(e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/clear-bots",
    tag = "Admin",
    responses((status = 200, description = "Bots deleted")),
    security(("bearer_auth" = []))
)]
pub async fn clear_bots(state: web::Data<AppState>, token: web::ReqData<AuthToken>) -> Result<HttpResponse, AppError> {
    admin(&state, &token).await?;
    let removed = admin_service::clear_bots(state.store.as_ref()).await?;
    log::info!("🧹 Cleared {} bots", removed);
    Ok(done(format!("Removed {} bot users.", removed)))
}

#[utoipa::path(
    post,
    path = "/api/admin/reset-all-interactions",
    tag = "Admin",
    responses((status = 200, description = "Seen and liked lists cleared for everyone")),
    security(("bearer_auth" = []))
)]
pub async fn reset_interactions(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
) -> Result<HttpResponse, AppError> {
    admin(&state, &token).await?;
    let reset = admin_service::reset_interactions(state.store.as_ref()).await?;
    log::warn!("🧹 Reset interactions for {} users", reset);
    Ok(done(format!("Interactions reset for {} users.", reset)))
}
