use async_trait::async_trait;
use axum::{routing::get, Json, Router};
use bookshelf_kernel::Module;
use serde::Serialize;
use serde_json::json;

/// Unauthenticated landing route describing the API
pub struct InfoModule;

impl InfoModule {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for InfoModule {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
struct ApiInfo {
    message: &'static str,
    login: &'static str,
    docs: &'static str,
    endpoints: Vec<&'static str>,
}

#[async_trait]
impl Module for InfoModule {
    fn name(&self) -> &'static str {
        "info"
    }

    fn routes(&self) -> Router {
        Router::new().route("/", get(api_info))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "API information",
                        "tags": ["Info"],
                        "responses": {
                            "200": { "description": "Service description" }
                        }
                    }
                }
            }
        }))
    }
}

async fn api_info() -> Json<ApiInfo> {
    Json(ApiInfo {
        message: "Book Management API with JWT",
        login: "POST /login with {username, password}",
        docs: "GET /docs/openapi.json",
        endpoints: vec![
            "GET /books",
            "GET /books/{id}",
            "POST /books",
            "PUT /books/{id}",
            "DELETE /books/{id}",
            "GET /me",
        ],
    })
}
