//! `/api/users`: profiles, discovery and the social graph.

use actix_web::{web, HttpRequest, HttpResponse};

use crate::api::caller;
use crate::middleware::auth::{bearer_token, AuthToken};
use crate::services::auth_service::{self, AccountEnvelope};
use crate::services::discovery_service::{self, FeedResponse, LikeResponse};
use crate::services::profile_service::{
    self, AddPhotoRequest, CardListResponse, DeletePhotoRequest, PhotosResponse, ProfileResponse,
    ProfileUpdate, SearchQuery, UserListResponse,
};
use crate::services::social_service::{self, FollowResponse, ReportRequest};
use crate::state::AppState;
use crate::utils::error::AppError;

fn done(message: String) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "success": true, "message": message }))
}

#[utoipa::path(
    put,
    path = "/api/users/profile",
    tag = "Profiles",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Updated account", body = AccountEnvelope),
        (status = 400, description = "Username taken")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    request: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    let username = me.username.clone();
    log::info!("✏️ PUT /users/profile - {}", username);

    match profile_service::update_profile(state.store.as_ref(), me, request.into_inner()).await {
        Ok(user) => {
            log::info!("✅ Profile updated: {}", user.username);
            Ok(HttpResponse::Ok().json(AccountEnvelope::new(&user)))
        }
        Err(e) => {
            log::warn!("❌ Profile update failed: {} - {}", username, e);
            Err(e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/users/photos",
    tag = "Profiles",
    request_body = AddPhotoRequest,
    responses(
        (status = 200, description = "Photo list after upload", body = PhotosResponse),
        (status = 400, description = "Photo required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_photo(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    request: web::Json<AddPhotoRequest>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    log::info!("📸 POST /users/photos - {}", me.username);

    let photos = profile_service::add_photo(state.store.as_ref(), me, &request).await?;
    Ok(HttpResponse::Ok().json(PhotosResponse { success: true, photos }))
}

#[utoipa::path(
    delete,
    path = "/api/users/photos",
    tag = "Profiles",
    request_body = DeletePhotoRequest,
    responses(
        (status = 200, description = "Photo list after removal", body = PhotosResponse),
        (status = 400, description = "Missing or out of range index")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_photo(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    request: web::Json<DeletePhotoRequest>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    let username = me.username.clone();
    log::info!("🗑️ DELETE /users/photos - {} index {:?}", username, request.photo_index);

    match profile_service::delete_photo(state.store.as_ref(), me, &request).await {
        Ok(photos) => Ok(HttpResponse::Ok().json(PhotosResponse { success: true, photos })),
        Err(e) => {
            log::warn!("❌ Photo delete failed: {} - {}", username, e);
            Err(e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/users/search",
    tag = "Profiles",
    params(SearchQuery),
    responses((status = 200, description = "Up to 20 verified users", body = UserListResponse))
)]
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔍 GET /users/search - q: {:?}", query.q);
    let users = profile_service::search(state.store.as_ref(), query.q.as_deref()).await?;
    Ok(HttpResponse::Ok().json(UserListResponse { success: true, users }))
}

#[utoipa::path(
    get,
    path = "/api/users/vip",
    tag = "Profiles",
    responses((status = 200, description = "Newest members", body = CardListResponse))
)]
pub async fn vip_members(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let users = profile_service::vip_members(state.store.as_ref()).await?;
    log::info!("💎 GET /users/vip - {} members", users.len());
    Ok(HttpResponse::Ok().json(CardListResponse { success: true, users }))
}

#[utoipa::path(
    get,
    path = "/api/users/{username}",
    tag = "Profiles",
    params(("username" = String, Path, description = "Profile owner")),
    responses(
        (status = 200, description = "Public or masked profile", body = ProfileResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn profile(
    req: HttpRequest,
    state: web::Data<AppState>,
    username: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(&req);
    let viewer = auth_service::optional_user(state.store.as_ref(), token.as_ref()).await?;
    log::info!(
        "👤 GET /users/{} - viewer: {}",
        username,
        viewer.as_ref().map(|v| v.username.as_str()).unwrap_or("anonymous")
    );

    let user = profile_service::public_profile(state.store.as_ref(), &username, viewer.as_ref()).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse { success: true, user }))
}

#[utoipa::path(
    get,
    path = "/api/users/{username}/followers",
    tag = "Social",
    params(("username" = String, Path, description = "Profile owner")),
    responses(
        (status = 200, description = "Followers", body = UserListResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn followers(
    state: web::Data<AppState>,
    username: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let users = profile_service::followers(state.store.as_ref(), &username).await?;
    Ok(HttpResponse::Ok().json(UserListResponse { success: true, users }))
}

#[utoipa::path(
    get,
    path = "/api/users/{username}/following",
    tag = "Social",
    params(("username" = String, Path, description = "Profile owner")),
    responses(
        (status = 200, description = "Followed users", body = UserListResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn following(
    state: web::Data<AppState>,
    username: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let users = profile_service::following(state.store.as_ref(), &username).await?;
    Ok(HttpResponse::Ok().json(UserListResponse { success: true, users }))
}

#[utoipa::path(
    get,
    path = "/api/users/photos/random",
    tag = "Discovery",
    responses((status = 200, description = "Ranked swipe feed, at most 50 items", body = FeedResponse))
)]
pub async fn random_feed(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let token = bearer_token(&req);
    let viewer = auth_service::optional_user(state.store.as_ref(), token.as_ref()).await?;

    match discovery_service::build_feed(state.store.as_ref(), viewer.as_ref()).await {
        Ok(photos) => {
            log::info!(
                "🎴 GET /users/photos/random - {} items for {}",
                photos.len(),
                viewer.as_ref().map(|v| v.username.as_str()).unwrap_or("anonymous")
            );
            Ok(HttpResponse::Ok().json(FeedResponse { success: true, photos }))
        }
        Err(e) => {
            log::error!("❌ Feed failed: {}", e);
            Err(e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/users/like/{username}",
    tag = "Discovery",
    params(("username" = String, Path, description = "Liked user")),
    responses(
        (status = 200, description = "Like stored; `match` tells whether it was mutual", body = LikeResponse),
        (status = 404, description = "Target user not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn like(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    target: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    log::info!("💘 POST /users/like/{} - from {}", target, me.username);

    match discovery_service::like(state.store.as_ref(), &me, &target).await {
        Ok(is_match) => {
            if is_match {
                log::info!("✅ It's a match: {} & {}", me.username, target);
            }
            Ok(HttpResponse::Ok().json(LikeResponse { success: true, is_match }))
        }
        Err(e) => {
            log::warn!("❌ Like failed: {} -> {} - {}", me.username, target, e);
            Err(e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/users/pass/{username}",
    tag = "Discovery",
    params(("username" = String, Path, description = "Skipped user")),
    responses((status = 200, description = "Marked as seen")),
    security(("bearer_auth" = []))
)]
pub async fn pass(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    target: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    log::info!("👋 POST /users/pass/{} - from {}", target, me.username);

    discovery_service::pass(state.store.as_ref(), &me, &target).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[utoipa::path(
    post,
    path = "/api/users/unlike/{username}",
    tag = "Discovery",
    params(("username" = String, Path, description = "Previously liked user")),
    responses((status = 200, description = "Like removed")),
    security(("bearer_auth" = []))
)]
pub async fn unlike(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    target: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    log::info!("💔 POST /users/unlike/{} - from {}", target, me.username);

    discovery_service::unlike(state.store.as_ref(), &me, &target).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[utoipa::path(
    post,
    path = "/api/users/discover/reset",
    tag = "Discovery",
    responses((status = 200, description = "Passed users will show up again")),
    security(("bearer_auth" = []))
)]
pub async fn reset_discovery(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    discovery_service::reset_seen(state.store.as_ref(), &me).await?;
    Ok(done("Discovery history reset.".to_string()))
}

#[utoipa::path(
    get,
    path = "/api/users/my-likes",
    tag = "Discovery",
    responses((status = 200, description = "Users the caller liked", body = CardListResponse)),
    security(("bearer_auth" = []))
)]
pub async fn my_likes(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    let users = discovery_service::my_likes(state.store.as_ref(), &me).await?;
    log::info!("💘 GET /users/my-likes - {}: {}", me.username, users.len());
    Ok(HttpResponse::Ok().json(CardListResponse { success: true, users }))
}

#[utoipa::path(
    get,
    path = "/api/users/liked-me",
    tag = "Discovery",
    responses((status = 200, description = "Users who liked the caller", body = CardListResponse)),
    security(("bearer_auth" = []))
)]
pub async fn liked_me(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    let users = discovery_service::liked_me(state.store.as_ref(), &me).await?;
    log::info!("💘 GET /users/liked-me - {}: {}", me.username, users.len());
    Ok(HttpResponse::Ok().json(CardListResponse { success: true, users }))
}

#[utoipa::path(
    post,
    path = "/api/users/follow/{username}",
    tag = "Social",
    params(("username" = String, Path, description = "User to follow")),
    responses(
        (status = 200, description = "Now following", body = FollowResponse),
        (status = 400, description = "Cannot follow self"),
        (status = 404, description = "Target user not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn follow(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    target: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    let username = me.username.clone();
    log::info!("➕ POST /users/follow/{} - from {}", target, username);

    match social_service::follow(state.store.as_ref(), &me, &target).await {
        Ok(()) => Ok(HttpResponse::Ok().json(FollowResponse {
            success: true,
            is_following: true,
        })),
        Err(e) => {
            log::warn!("❌ Follow failed: {} -> {} - {}", username, target, e);
            Err(e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/users/unfollow/{username}",
    tag = "Social",
    params(("username" = String, Path, description = "User to unfollow")),
    responses(
        (status = 200, description = "No longer following", body = FollowResponse),
        (status = 404, description = "Target user not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unfollow(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    target: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    log::info!("➖ POST /users/unfollow/{} - from {}", target, me.username);

    social_service::unfollow(state.store.as_ref(), &me, &target).await?;
    Ok(HttpResponse::Ok().json(FollowResponse {
        success: true,
        is_following: false,
    }))
}

#[utoipa::path(
    post,
    path = "/api/users/block/{username}",
    tag = "Social",
    params(("username" = String, Path, description = "User to block")),
    responses(
        (status = 200, description = "Blocked"),
        (status = 400, description = "Cannot block self")
    ),
    security(("bearer_auth" = []))
)]
pub async fn block(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    target: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    log::info!("🚫 POST /users/block/{} - from {}", target, me.username);

    social_service::block(state.store.as_ref(), &me, &target).await?;
    Ok(done(format!("User @{} blocked.", target)))
}

#[utoipa::path(
    post,
    path = "/api/users/unblock/{username}",
    tag = "Social",
    params(("username" = String, Path, description = "User to unblock")),
    responses((status = 200, description = "Unblocked")),
    security(("bearer_auth" = []))
)]
pub async fn unblock(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    target: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    log::info!("✅ POST /users/unblock/{} - from {}", target, me.username);

    social_service::unblock(state.store.as_ref(), &me, &target).await?;
    Ok(done(format!("User @{} unblocked.", target)))
}

#[utoipa::path(
    post,
    path = "/api/users/report/{username}",
    tag = "Social",
    params(("username" = String, Path, description = "Reported user")),
    request_body = ReportRequest,
    responses((status = 200, description = "Report logged")),
    security(("bearer_auth" = []))
)]
pub async fn report(
    state: web::Data<AppState>,
    token: web::ReqData<AuthToken>,
    target: web::Path<String>,
    request: web::Json<ReportRequest>,
) -> Result<HttpResponse, AppError> {
    let me = caller(&state, &token).await?;
    social_service::report(&me.username, &target, &request);
    Ok(done("Report submitted successfully.".to_string()))
}
