#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Request, StatusCode},
    response::Response,
    Router,
};
use bookshelf_app::{
    auth::credentials::CredentialTable, books::store::BookStore, build_app, Services,
};
use bookshelf_authz::TokenService;
use bookshelf_kernel::settings::Settings;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub services: Services,
}

impl TestApp {
    /// Fresh app over the seeded catalogue and default settings
    pub fn seeded() -> Self {
        Self::with_store(BookStore::seeded())
    }

    pub fn with_store(store: BookStore) -> Self {
        let settings = Settings::default();
        let services = Services {
            credentials: Arc::new(CredentialTable::builtin()),
            tokens: Arc::new(TokenService::from_settings(&settings.auth).expect("tokens")),
            books: Arc::new(store),
        };
        let router = build_app(&settings, &services).expect("app");
        Self { router, services }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.expect("response")
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .send(json_request(
                "POST",
                "/login",
                None,
                serde_json::json!({ "username": username, "password": password }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        read_json(response).await["access_token"]
            .as_str()
            .expect("access_token")
            .to_string()
    }
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

pub async fn read_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub async fn read_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}
