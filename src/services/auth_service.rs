use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::database::Store;
use crate::middleware::auth::{issue_token, AuthToken};
use crate::models::{is_reserved_username, AccountResponse, User};
use crate::services::non_blank;
use crate::utils::error::AppError;
use crate::utils::password::{hash_password, verify_password};
use crate::utils::time::now_millis;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Email or username
    pub identifier: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn handle(&self) -> Option<&str> {
        non_blank(&self.identifier).or_else(|| non_blank(&self.username))
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: AccountResponse,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AccountEnvelope {
    pub success: bool,
    pub user: AccountResponse,
}

impl AccountEnvelope {
    pub fn new(user: &User) -> Self {
        Self {
            success: true,
            user: AccountResponse::from(user),
        }
    }
}

pub async fn register(
    store: &dyn Store,
    bcrypt_cost: u32,
    request: &RegisterRequest,
) -> Result<AuthResponse, AppError> {
    let password = request.password.as_deref().filter(|p| !p.trim().is_empty());
    let (username, email, password) = match (non_blank(&request.username), non_blank(&request.email), password) {
        (Some(u), Some(e), Some(p)) => (u, e, p),
        _ => {
            return Err(AppError::InvalidRequest(
                "Please provide all required fields".to_string(),
            ))
        }
    };

    if is_reserved_username(username) {
        return Err(AppError::InvalidRequest("Username not available".to_string()));
    }
    if store.find_user_by_email(email).await?.is_some()
        || store.find_user_by_username(username).await?.is_some()
    {
        return Err(AppError::InvalidRequest("User already exists".to_string()));
    }

    let hash = hash_password(password, bcrypt_cost).await?;
    let full_name = request.full_name.as_deref().unwrap_or("").trim();
    let user = store
        .insert_user(User::new(username, email, hash, full_name, now_millis()))
        .await?;

    log::info!("👤 New account: {} ({})", user.username, user.id_hex());

    Ok(AuthResponse {
        success: true,
        token: issue_token(&user.id_hex()),
        user: AccountResponse::from(&user),
    })
}

pub async fn login(store: &dyn Store, request: &LoginRequest) -> Result<AuthResponse, AppError> {
    let password = request.password.as_deref().filter(|p| !p.is_empty());
    let (handle, password) = match (request.handle(), password) {
        (Some(h), Some(p)) => (h, p),
        _ => return Err(AppError::InvalidRequest("Please provide credentials".to_string())),
    };

    let invalid = || AppError::InvalidRequest("Invalid credentials".to_string());

    let user = store.find_user_by_login(handle).await?.ok_or_else(invalid)?;
    if !verify_password(password, &user.password).await? {
        return Err(invalid());
    }

    Ok(AuthResponse {
        success: true,
        token: issue_token(&user.id_hex()),
        user: AccountResponse::from(&user),
    })
}

/// Resolves the caller. An id that is not a valid ObjectId cannot name any
/// user, so it gets the same 404 as an unknown one.
pub async fn current_user(store: &dyn Store, token: &AuthToken) -> Result<User, AppError> {
    let id = ObjectId::parse_str(&token.user_id).map_err(|_| AppError::user_not_found())?;
    store
        .find_user_by_id(&id)
        .await?
        .ok_or_else(AppError::user_not_found)
}

/// Caller for endpoints where signing in is optional; any failure means anonymous.
pub async fn optional_user(store: &dyn Store, token: Option<&AuthToken>) -> Result<Option<User>, AppError> {
    let Some(token) = token else {
        return Ok(None);
    };
    match current_user(store, token).await {
        Ok(user) => Ok(Some(user)),
        Err(AppError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
