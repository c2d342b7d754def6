pub mod credentials;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use bookshelf_authz::{require_bearer, Identity, TokenService};
use bookshelf_http::{error::AppError, extract::ApiJson};
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;
use time::format_description::well_known::Rfc3339;

use credentials::CredentialTable;
use models::{CurrentUser, LoginRequest, TokenResponse};

/// Credential issuer: exchanges a username/password for a bearer token
pub struct AuthModule {
    state: AuthState,
}

#[derive(Clone)]
struct AuthState {
    credentials: Arc<CredentialTable>,
    tokens: Arc<TokenService>,
}

impl AuthModule {
    pub fn new(credentials: Arc<CredentialTable>, tokens: Arc<TokenService>) -> Self {
        Self {
            state: AuthState {
                credentials,
                tokens,
            },
        }
    }
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            accounts = self.state.credentials.usernames().count(),
            token_ttl_minutes = ctx.settings.auth.token_ttl_minutes,
            "auth module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        let me = Router::new()
            .route("/me", get(current_user))
            .route_layer(middleware::from_fn_with_state(
                self.state.tokens.clone(),
                require_bearer,
            ));

        Router::new()
            .route("/login", post(login))
            .with_state(self.state.clone())
            .merge(me)
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/login": {
                    "post": {
                        "summary": "Exchange credentials for a bearer token",
                        "tags": ["Auth"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/LoginRequest" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Signed access token",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/TokenResponse" }
                                    }
                                }
                            },
                            "401": {
                                "description": "Incorrect username or password",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/me": {
                    "get": {
                        "summary": "Describe the caller's token",
                        "tags": ["Auth"],
                        "security": [{ "bearerAuth": [] }],
                        "responses": {
                            "200": {
                                "description": "Current user",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/CurrentUser" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "LoginRequest": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string" },
                            "password": { "type": "string" }
                        },
                        "required": ["username", "password"]
                    },
                    "TokenResponse": {
                        "type": "object",
                        "properties": {
                            "access_token": { "type": "string" },
                            "token_type": { "type": "string", "enum": ["bearer"] },
                            "expires_in": { "type": "integer" }
                        },
                        "required": ["access_token", "token_type", "expires_in"]
                    },
                    "CurrentUser": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string" },
                            "issued_at": { "type": "string", "format": "date-time" },
                            "expires_at": { "type": "string", "format": "date-time" }
                        },
                        "required": ["username", "issued_at", "expires_at"]
                    }
                }
            }
        }))
    }
}

async fn login(
    State(state): State<AuthState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let issued = credentials::issue_token(
        &state.credentials,
        &state.tokens,
        &request.username,
        &request.password,
    )?;

    Ok(Json(TokenResponse {
        access_token: issued.access_token,
        token_type: "bearer".to_string(),
        expires_in: issued.expires_in,
    }))
}

async fn current_user(
    Extension(identity): Extension<Identity>,
) -> Result<Json<CurrentUser>, AppError> {
    let issued_at = identity
        .issued_at
        .format(&Rfc3339)
        .map_err(|err| AppError::Internal(err.into()))?;
    let expires_at = identity
        .expires_at
        .format(&Rfc3339)
        .map_err(|err| AppError::Internal(err.into()))?;

    Ok(Json(CurrentUser {
        username: identity.subject,
        issued_at,
        expires_at,
    }))
}
