use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::database::{Store, UserFlag, UserUpdate};
use crate::models::{Application, Member, User};
use crate::services::non_blank;
use crate::utils::error::AppError;
use crate::utils::time::now_millis;

/// Recorded on subscriptions that cannot be tied to any account
pub const ANONYMOUS_MEMBER_EMAIL: &str = "anonymous@vault.com";

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub username: Option<String>,
    pub dob: Option<String>,
    /// Selfie captured by the liveness check, usually a data URI
    pub liveness_image: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResponse {
    pub success: bool,
    pub message: String,
    pub application_id: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub payment_token: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    pub success: bool,
    pub message: String,
    pub transaction_id: String,
    pub member_id: String,
}

/// The liveness check itself runs client-side; every complete application
/// is accepted and verifies the account.
pub async fn apply(store: &dyn Store, request: &ApplyRequest) -> Result<ApplyResponse, AppError> {
    let (username, image) = match (non_blank(&request.username), non_blank(&request.liveness_image)) {
        (Some(u), Some(i)) => (u, i),
        _ => return Err(AppError::InvalidRequest("Missing required fields".to_string())),
    };

    let application = store
        .insert_application(Application::new(username, request.dob.clone(), image, now_millis()))
        .await?;
    store
        .set_flag(&[username.to_string()], UserFlag::Verified, true)
        .await?;

    log::info!("🪪 Verification application accepted for {}", username);

    Ok(ApplyResponse {
        success: true,
        message: "Application successful. Account Verified.".to_string(),
        application_id: application.id.map(|id| id.to_hex()).unwrap_or_default(),
    })
}

pub fn new_member_id() -> String {
    format!("VAULT-{}", rand::thread_rng().gen_range(0..10_000))
}

/// Records the subscription. No payment provider is contacted.
pub async fn subscribe(
    store: &dyn Store,
    caller: Option<User>,
    request: &SubscribeRequest,
) -> Result<SubscribeResponse, AppError> {
    let payment_token = non_blank(&request.payment_token)
        .ok_or_else(|| AppError::InvalidRequest("Invalid Payment Token".to_string()))?;
    let email = non_blank(&request.email);

    let user = match (caller, email) {
        (Some(user), _) => Some(user),
        (None, Some(email)) => store.find_user_by_email(email).await?,
        (None, None) => None,
    };

    let member_id = new_member_id();
    let now = now_millis();
    let member_email = email
        .map(str::to_string)
        .or_else(|| user.as_ref().map(|u| u.email.clone()))
        .unwrap_or_else(|| ANONYMOUS_MEMBER_EMAIL.to_string());

    store
        .insert_member(Member::new(member_id.clone(), member_email, payment_token, now))
        .await?;

    match user {
        Some(user) => {
            let id = user.id.ok_or_else(AppError::user_not_found)?;
            let update = UserUpdate {
                is_member: Some(true),
                is_verified: Some(true),
                ..Default::default()
            };
            store.update_user(&id, &update).await?;
            log::info!("💎 {} subscribed as {}", user.username, member_id);
        }
        None => log::warn!("💎 Subscription {} not linked to any account", member_id),
    }

    Ok(SubscribeResponse {
        success: true,
        message: "Subscription Active. Welcome to The Vault.".to_string(),
        transaction_id: format!("TXN-{}", now),
        member_id,
    })
}
