pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_authz::TokenService;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

use store::BookStore;

/// Book catalogue: CRUD over the in-memory store, guarded by bearer tokens
pub struct BooksModule {
    store: Arc<BookStore>,
    tokens: Arc<TokenService>,
}

impl BooksModule {
    pub fn new(store: Arc<BookStore>, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            books = self.store.len(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone(), self.tokens.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let book = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/Book" }
                    }
                }
            })
        };
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        }]);
        let secured = json!([{ "bearerAuth": [] }]);

        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "security": secured,
                        "responses": {
                            "200": {
                                "description": "All books in insertion order",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "401": error("Missing, invalid or expired token")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "security": secured,
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/NewBook" }
                                }
                            }
                        },
                        "responses": {
                            "201": book("Created book"),
                            "401": error("Missing, invalid or expired token"),
                            "422": error("Missing or malformed fields")
                        }
                    }
                },
                "/books/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "security": secured,
                        "parameters": id_param,
                        "responses": {
                            "200": book("The book"),
                            "401": error("Missing, invalid or expired token"),
                            "404": error("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Update supplied fields of a book",
                        "tags": ["Books"],
                        "security": secured,
                        "parameters": id_param,
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookPatch" }
                                }
                            }
                        },
                        "responses": {
                            "200": book("Updated book"),
                            "401": error("Missing, invalid or expired token"),
                            "404": error("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "security": secured,
                        "parameters": id_param,
                        "responses": {
                            "204": { "description": "Deleted" },
                            "401": error("Missing, invalid or expired token"),
                            "404": error("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "year": { "type": "integer", "format": "int32" },
                            "isbn": { "type": "string" }
                        },
                        "required": ["id", "title", "author", "year", "isbn"]
                    },
                    "NewBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "year": { "type": "integer", "format": "int32" },
                            "isbn": { "type": "string" }
                        },
                        "required": ["title", "author", "year", "isbn"]
                    },
                    "BookPatch": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "year": { "type": "integer", "format": "int32" },
                            "isbn": { "type": "string" }
                        }
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            books = self.store.len(),
            "books module stopped"
        );
        Ok(())
    }
}
