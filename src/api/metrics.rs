use actix_web::{web, HttpResponse};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::state::AppState;

static REQUEST_COUNT: AtomicU64 = AtomicU64::new(0);
static ERROR_COUNT: AtomicU64 = AtomicU64::new(0);

pub fn increment_request_count() {
    REQUEST_COUNT.fetch_add(1, Ordering::Relaxed);
}

/// Counts 5xx responses only
pub fn increment_error_count() {
    ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn render(backend: &str) -> String {
    let requests = REQUEST_COUNT.load(Ordering::Relaxed);
    let errors = ERROR_COUNT.load(Ordering::Relaxed);

    format!(
        "# HELP vault_http_requests_total Total number of HTTP requests\n\
         # TYPE vault_http_requests_total counter\n\
         vault_http_requests_total{{storage=\"{backend}\"}} {requests}\n\
         \n\
         # HELP vault_http_errors_total Total number of HTTP 5xx responses\n\
         # TYPE vault_http_errors_total counter\n\
         vault_http_errors_total{{storage=\"{backend}\"}} {errors}\n"
    )
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses((status = 200, description = "Prometheus text exposition", content_type = "text/plain"))
)]
pub async fn get_metrics(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(render(state.store.backend()))
}
