use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// `mongodb` or `memory`
    pub storage: String,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service and storage reachable", body = HealthResponse),
        (status = 503, description = "Storage backend not responding", body = HealthResponse)
    )
)]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let storage = state.store.backend().to_string();
    let mut response = HealthResponse {
        status: "healthy".to_string(),
        service: "the-vault".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage,
        timestamp: chrono::Utc::now().timestamp(),
    };

    match state.store.ping().await {
        Ok(()) => HttpResponse::Ok().json(response),
        Err(e) => {
            log::error!("❌ Health check: {} ping failed: {}", response.storage, e);
            response.status = "degraded".to_string();
            HttpResponse::ServiceUnavailable().json(response)
        }
    }
}
