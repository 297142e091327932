pub mod admin;
pub mod auth;
pub mod health;
pub mod membership;
pub mod messages;
pub mod metrics;
pub mod notifications;
pub mod swagger;
pub mod users;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::middleware::auth::{AuthMiddleware, AuthToken};
use crate::models::User;
use crate::services::auth_service;
use crate::state::AppState;
use crate::utils::error::AppError;

/// Resolves the signed-in caller behind a validated token.
pub(crate) async fn caller(state: &AppState, token: &AuthToken) -> Result<User, AppError> {
    auth_service::current_user(state.store.as_ref(), token).await
}

/// JSON extractor settings: large bodies for base64 photos, and malformed
/// payloads rendered through [`AppError`].
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, req| {
            log::warn!("❌ Bad JSON body on {} {}: {}", req.method(), req.path(), err);
            AppError::InvalidRequest(err.to_string()).into()
        })
}

/// REST routes. Literal segments are registered before `{username}`
/// catch-alls; their names are in `RESERVED_USERNAMES`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/metrics", web::get().to(metrics::get_metrics))
        .service(
            web::scope("/api/auth")
                .route("/register", web::post().to(auth::register))
                .route("/login", web::post().to(auth::login))
                .service(
                    web::resource("/me")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(auth::me)),
                ),
        )
        .service(
            web::scope("/api/users")
                // Public or optional-auth
                .route("/search", web::get().to(users::search))
                .route("/vip", web::get().to(users::vip_members))
                .route("/photos/random", web::get().to(users::random_feed))
                // Signed-in only
                .service(
                    web::resource("/profile")
                        .wrap(AuthMiddleware)
                        .route(web::put().to(users::update_profile)),
                )
                .service(
                    web::resource("/photos")
                        .wrap(AuthMiddleware)
                        .route(web::post().to(users::add_photo))
                        .route(web::delete().to(users::delete_photo)),
                )
                .service(
                    web::resource("/my-likes")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(users::my_likes)),
                )
                .service(
                    web::resource("/liked-me")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(users::liked_me)),
                )
                .service(
                    web::resource("/discover/reset")
                        .wrap(AuthMiddleware)
                        .route(web::post().to(users::reset_discovery)),
                )
                .service(
                    web::resource("/like/{username}")
                        .wrap(AuthMiddleware)
                        .route(web::post().to(users::like)),
                )
                .service(
                    web::resource("/pass/{username}")
                        .wrap(AuthMiddleware)
                        .route(web::post().to(users::pass)),
                )
                .service(
                    web::resource("/unlike/{username}")
                        .wrap(AuthMiddleware)
                        .route(web::post().to(users::unlike)),
                )
                .service(
                    web::resource("/follow/{username}")
                        .wrap(AuthMiddleware)
                        .route(web::post().to(users::follow)),
                )
                .service(
                    web::resource("/unfollow/{username}")
                        .wrap(AuthMiddleware)
                        .route(web::post().to(users::unfollow)),
                )
                .service(
                    web::resource("/block/{username}")
                        .wrap(AuthMiddleware)
                        .route(web::post().to(users::block)),
                )
                .service(
                    web::resource("/unblock/{username}")
                        .wrap(AuthMiddleware)
                        .route(web::post().to(users::unblock)),
                )
                .service(
                    web::resource("/report/{username}")
                        .wrap(AuthMiddleware)
                        .route(web::post().to(users::report)),
                )
                .route("/{username}/followers", web::get().to(users::followers))
                .route("/{username}/following", web::get().to(users::following))
                .route("/{username}", web::get().to(users::profile)),
        )
        .service(
            web::scope("/api/messages")
                .wrap(AuthMiddleware)
                .route("", web::post().to(messages::send))
                .route("/conversations", web::get().to(messages::conversations))
                .route("/{other}", web::get().to(messages::history))
                .route("/{other}", web::delete().to(messages::delete)),
        )
        .service(
            web::scope("/api/notifications")
                .wrap(AuthMiddleware)
                .route("", web::get().to(notifications::list))
                .route("", web::delete().to(notifications::clear))
                .route("/read", web::put().to(notifications::mark_read))
                .route("/{id}", web::delete().to(notifications::delete)),
        )
        .route("/api/aesthetic/apply", web::post().to(membership::apply))
        .route("/api/vault/subscribe", web::post().to(membership::subscribe))
        .service(
            web::scope("/api/admin")
                .wrap(AuthMiddleware)
                .route("/users", web::get().to(admin::list_users))
                .route("/users", web::post().to(admin::create_user))
                .route("/create-user", web::post().to(admin::create_user))
                .route("/users/{username}", web::put().to(admin::update_user))
                .route("/users/{username}", web::delete().to(admin::delete_user))
                .route("/bulk-action", web::post().to(admin::bulk_action))
                .route("/send-message", web::post().to(admin::send_message))
                .route("/dashboard-stats", web::get().to(admin::dashboard_stats))
                .route("/upgrade/{username}", web::post().to(admin::upgrade))
                .route("/seed", web::post().to(admin::seed_bots))
                .route("/clear-bots", web::post().to(admin::clear_bots))
                .route("/reset-all-interactions", web::post().to(admin::reset_interactions)),
        );
}
