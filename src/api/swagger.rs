use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "The Vault API",
        version = "1.0.0",
        description = "REST API behind The Vault dating app.\n\n**Authentication:** signed-in endpoints expect `Authorization: Bearer mock-jwt-<userId>`, the token returned by register and login. Admin endpoints additionally require the configured admin account."
    ),
    paths(
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::me,

        crate::api::health::health_check,
        crate::api::metrics::get_metrics,

        crate::api::users::update_profile,
        crate::api::users::add_photo,
        crate::api::users::delete_photo,
        crate::api::users::search,
        crate::api::users::vip_members,
        crate::api::users::profile,
        crate::api::users::followers,
        crate::api::users::following,

        crate::api::users::random_feed,
        crate::api::users::like,
        crate::api::users::pass,
        crate::api::users::unlike,
        crate::api::users::reset_discovery,
        crate::api::users::my_likes,
        crate::api::users::liked_me,

        crate::api::users::follow,
        crate::api::users::unfollow,
        crate::api::users::block,
        crate::api::users::unblock,
        crate::api::users::report,

        crate::api::messages::conversations,
        crate::api::messages::history,
        crate::api::messages::send,
        crate::api::messages::delete,

        crate::api::notifications::list,
        crate::api::notifications::mark_read,
        crate::api::notifications::delete,
        crate::api::notifications::clear,

        crate::api::membership::apply,
        crate::api::membership::subscribe,

        crate::api::admin::list_users,
        crate::api::admin::create_user,
        crate::api::admin::update_user,
        crate::api::admin::delete_user,
        crate::api::admin::bulk_action,
        crate::api::admin::send_message,
        crate::api::admin::dashboard_stats,
        crate::api::admin::upgrade,
        crate::api::admin::seed_bots,
        crate::api::admin::clear_bots,
        crate::api::admin::reset_interactions,
    ),
    components(
        schemas(
            crate::services::auth_service::RegisterRequest,
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::AuthResponse,
            crate::services::auth_service::AccountEnvelope,

            crate::api::health::HealthResponse,

            crate::models::AccountResponse,
            crate::models::PublicProfile,
            crate::models::UserSummary,
            crate::models::ProfileCard,
            crate::models::AdminUserRow,
            crate::models::ProfileDetails,
            crate::models::Location,
            crate::models::ProfileStats,
            crate::models::MessageResponse,
            crate::models::ConversationSummary,
            crate::models::NotificationResponse,
            crate::models::NotificationKind,

            crate::services::profile_service::ProfileUpdate,
            crate::services::profile_service::AddPhotoRequest,
            crate::services::profile_service::DeletePhotoRequest,
            crate::services::profile_service::PhotosResponse,
            crate::services::profile_service::ProfileResponse,
            crate::services::profile_service::UserListResponse,
            crate::services::profile_service::CardListResponse,

            crate::services::discovery_service::FeedItem,
            crate::services::discovery_service::FeedResponse,
            crate::services::discovery_service::LikeResponse,

            crate::services::social_service::FollowResponse,
            crate::services::social_service::ReportRequest,

            crate::services::message_service::SendMessageRequest,
            crate::services::message_service::ConversationsResponse,
            crate::services::message_service::HistoryResponse,
            crate::services::message_service::SentMessageResponse,

            crate::services::notification_service::NotificationList,
            crate::services::notification_service::MarkReadRequest,

            crate::services::membership_service::ApplyRequest,
            crate::services::membership_service::ApplyResponse,
            crate::services::membership_service::SubscribeRequest,
            crate::services::membership_service::SubscribeResponse,

            crate::services::admin_service::AdminCreateUser,
            crate::services::admin_service::AdminUpdateUser,
            crate::services::admin_service::BulkAction,
            crate::services::admin_service::BulkActionRequest,
            crate::services::admin_service::Recipients,
            crate::services::admin_service::BroadcastRequest,
            crate::services::admin_service::DashboardStats,
            crate::services::admin_service::AdminUsersResponse,
            crate::services::admin_service::AdminUserResponse,
            crate::services::admin_service::DashboardResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login and the current account."),
        (name = "Profiles", description = "Own profile editing, photos, search and public profiles."),
        (name = "Discovery", description = "Swipe feed, likes, passes and matches."),
        (name = "Social", description = "Follow graph, blocking and reports."),
        (name = "Messages", description = "Direct messages between users."),
        (name = "Notifications", description = "In-app notifications of the signed-in user."),
        (name = "Membership", description = "Verification applications and VIP subscriptions."),
        (name = "Admin", description = "Admin console. Requires the configured admin account."),
        (name = "Health", description = "Health check and Prometheus metrics."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("mock-jwt-<userId>")
                        .description(Some("Token returned by /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes_and_security() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/auth/login"));
        assert!(doc.paths.paths.contains_key("/api/users/photos/random"));
        assert!(doc.paths.paths.contains_key("/api/admin/bulk-action"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
