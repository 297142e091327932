use actix_web::{
    dev::ServiceResponse,
    http::{header::CONTENT_TYPE, StatusCode},
    middleware::{ErrorHandlerResponse, ErrorHandlers},
    HttpResponse, Result,
};

/// Catch-all for 500 responses that did not come from [`AppError`], so
/// clients always receive the JSON error envelope.
///
/// [`AppError`]: crate::utils::error::AppError
pub fn json_error_pages<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().handler(StatusCode::INTERNAL_SERVER_ERROR, render_internal_error)
}

fn is_json(res: &ServiceResponse<impl Sized>) -> bool {
    res.response()
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

fn render_internal_error<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    if is_json(&res) {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    log::error!("💥 Unhandled 500 on {} {}", res.request().method(), res.request().path());
    let (req, _) = res.into_parts();
    let response = HttpResponse::InternalServerError().json(serde_json::json!({
        "success": false,
        "error": "Something broke!"
    }));

    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, response).map_into_right_body(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App};

    #[actix_web::test]
    async fn test_plain_500_is_rewritten() {
        let app = test::init_service(
            App::new()
                .wrap(json_error_pages())
                .route("/boom", web::get().to(|| async { HttpResponse::InternalServerError().body("stack trace") })),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/boom").to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Something broke!");
    }

    #[actix_web::test]
    async fn test_json_500_passes_through() {
        let app = test::init_service(App::new().wrap(json_error_pages()).route(
            "/db",
            web::get().to(|| async {
                HttpResponse::InternalServerError().json(serde_json::json!({ "success": false, "error": "Database error" }))
            }),
        ))
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/db").to_request()).await;
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Database error");
    }
}
