use bookshelf_http::error::AppError;
use thiserror::Error;

/// Failures of the credential issuer and the token gate
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Authorization header missing")]
    MissingHeader,

    #[error("Bearer token missing")]
    MissingToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Machine-readable code used in logs
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::MissingHeader => "missing_header",
            AuthError::MissingToken => "missing_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidToken => "invalid_token",
            AuthError::Signing(_) => "token_signing_failed",
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Signing(_) => AppError::Internal(anyhow::Error::new(err)),
            other => AppError::unauthorized(other.code(), other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};

    #[test]
    fn gate_failures_map_to_unauthorized() {
        for err in [
            AuthError::InvalidCredentials,
            AuthError::MissingHeader,
            AuthError::MissingToken,
            AuthError::TokenExpired,
            AuthError::InvalidToken,
        ] {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn messages_match_wire_contract() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Incorrect username or password"
        );
        assert_eq!(AuthError::MissingHeader.to_string(), "Authorization header missing");
        assert_eq!(AuthError::MissingToken.to_string(), "Bearer token missing");
        assert_eq!(AuthError::TokenExpired.to_string(), "Token has expired");
        assert_eq!(AuthError::InvalidToken.to_string(), "Invalid token");
    }
}
