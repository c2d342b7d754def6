//! Token gate: the guard that runs in front of every protected route

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use time::OffsetDateTime;

use bookshelf_http::error::AppError;

use crate::{error::AuthError, token::Claims, token::TokenService};

/// Authenticated caller, placed in request extensions by [`require_bearer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub issued_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl TryFrom<Claims> for Identity {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let issued_at =
            OffsetDateTime::from_unix_timestamp(claims.iat).map_err(|_| AuthError::InvalidToken)?;
        let expires_at =
            OffsetDateTime::from_unix_timestamp(claims.exp).map_err(|_| AuthError::InvalidToken)?;

        Ok(Self {
            subject: claims.sub,
            issued_at,
            expires_at,
        })
    }
}

/// Resolve the caller from the `Authorization: Bearer <token>` header
pub fn authenticate(tokens: &TokenService, headers: &HeaderMap) -> Result<Identity, AuthError> {
    let header = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;
    let token = bearer_value(header).ok_or(AuthError::MissingToken)?;
    let claims = tokens.verify(token)?;
    Identity::try_from(claims)
}

fn bearer_value(header: &HeaderValue) -> Option<&str> {
    let raw = header.to_str().ok()?.trim();
    let (scheme, value) = raw.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Middleware for `axum::middleware::from_fn_with_state`; rejects with 401
/// or forwards the request with an [`Identity`] extension
pub async fn require_bearer(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = match authenticate(&tokens, req.headers()) {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!(
                reason = err.code(),
                method = %req.method(),
                path = %req.uri().path(),
                "rejected unauthenticated request"
            );
            return Err(err.into());
        }
    };

    tracing::debug!(subject = %identity.subject, "request authenticated");
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::StatusCode,
        middleware,
        routing::get,
        Extension, Router,
    };
    use axum::http::Request as HttpRequest;
    use time::Duration;
    use tower::ServiceExt;

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new(b"gate-secret", Duration::minutes(30)))
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn app(tokens: Arc<TokenService>) -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|Extension(identity): Extension<Identity>| async move { identity.subject }),
            )
            .route_layer(middleware::from_fn_with_state(tokens, require_bearer))
    }

    async fn detail(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        body["detail"].as_str().unwrap().to_string()
    }

    #[test]
    fn missing_header() {
        assert!(matches!(
            authenticate(&tokens(), &HeaderMap::new()),
            Err(AuthError::MissingHeader)
        ));
    }

    #[test]
    fn header_without_bearer_value() {
        for value in ["Bearer", "Bearer    ", "Basic YWRtaW46YWRtaW4xMjM="] {
            assert!(
                matches!(
                    authenticate(&tokens(), &headers_with(value)),
                    Err(AuthError::MissingToken)
                ),
                "{value}"
            );
        }
    }

    #[test]
    fn valid_token_resolves_subject() {
        let tokens = tokens();
        let issued = tokens.issue("user").unwrap();
        let headers = headers_with(&format!("Bearer {}", issued.access_token));

        let identity = authenticate(&tokens, &headers).unwrap();
        assert_eq!(identity.subject, "user");
        assert_eq!(identity.expires_at.unix_timestamp(), issued.claims.exp);
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let tokens = tokens();
        let issued = tokens.issue("admin").unwrap();
        let headers = headers_with(&format!("bearer {}", issued.access_token));
        assert_eq!(authenticate(&tokens, &headers).unwrap().subject, "admin");
    }

    #[test]
    fn expired_token() {
        let tokens = tokens();
        let issued = tokens
            .issue_at("admin", OffsetDateTime::now_utc() - Duration::hours(1))
            .unwrap();
        let headers = headers_with(&format!("Bearer {}", issued.access_token));

        assert!(matches!(
            authenticate(&tokens, &headers),
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn middleware_forwards_identity() {
        let tokens = tokens();
        let issued = tokens.issue("admin").unwrap();

        let response = app(tokens)
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header(AUTHORIZATION, format!("Bearer {}", issued.access_token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"admin");
    }

    #[tokio::test]
    async fn middleware_rejects_with_detail() {
        let response = app(tokens())
            .oneshot(HttpRequest::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(detail(response).await, "Authorization header missing");

        let response = app(tokens())
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header(AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(detail(response).await, "Invalid token");
    }
}
