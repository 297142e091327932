use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    Error, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::utils::error::AppError;

/// Placeholder bearer scheme: the token is the user id behind this prefix.
pub const TOKEN_PREFIX: &str = "mock-jwt-";

/// Identity carried by a request, inserted into request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub user_id: String,
}

pub fn issue_token(user_id: &str) -> String {
    format!("{}{}", TOKEN_PREFIX, user_id)
}

/// Accepts `Bearer mock-jwt-<id>` or the bare `mock-jwt-<id>`.
pub fn parse_token(raw: &str) -> Result<AuthToken, AppError> {
    let token = raw.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();

    match token.strip_prefix(TOKEN_PREFIX) {
        Some(id) if !id.is_empty() => Ok(AuthToken {
            user_id: id.to_string(),
        }),
        _ => Err(AppError::Unauthorized("Invalid token format".to_string())),
    }
}

fn token_from_headers(headers: &HeaderMap) -> Result<AuthToken, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;
    let raw = value
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid token format".to_string()))?;
    parse_token(raw)
}

/// Token for endpoints where signing in is optional.
pub fn bearer_token(req: &HttpRequest) -> Option<AuthToken> {
    token_from_headers(req.headers()).ok()
}

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match token_from_headers(req.headers()) {
            Ok(token) => {
                req.extensions_mut().insert(token);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await })
            }
            Err(e) => {
                log::warn!("🔒 {} {} rejected: {}", req.method(), req.path(), e);
                Box::pin(async move { Err(Error::from(e)) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_variants() {
        let expected = AuthToken {
            user_id: "65a1b2c3d4e5f6a7b8c9d0e1".to_string(),
        };
        assert_eq!(parse_token("Bearer mock-jwt-65a1b2c3d4e5f6a7b8c9d0e1").unwrap(), expected);
        assert_eq!(parse_token("mock-jwt-65a1b2c3d4e5f6a7b8c9d0e1").unwrap(), expected);
    }

    #[test]
    fn test_parse_token_rejects_other_schemes() {
        assert!(parse_token("Bearer eyJhbGciOi.abc.def").is_err());
        assert!(parse_token("mock-jwt-").is_err());
        assert!(parse_token("").is_err());
    }

    #[test]
    fn test_issue_token_round_trips() {
        let token = issue_token("abc123");
        assert_eq!(token, "mock-jwt-abc123");
        assert_eq!(parse_token(&token).unwrap().user_id, "abc123");
    }
}
