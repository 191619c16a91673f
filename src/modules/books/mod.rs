//! Book catalog: CRUD, patching and filtered listing over an in-memory store.

pub mod criteria;
pub mod models;
pub mod patch;
pub mod predicate;
pub mod routes;
pub mod seed;
pub mod service;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use catalog_kernel::{InitCtx, Module};
use serde_json::{json, Value};

use service::BookService;
use store::InMemoryBookStore;

pub struct BooksModule {
    service: BookService,
}

impl BooksModule {
    pub fn new(service: BookService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &BookService {
        &self.service
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
            "books module initialized"
        );

        match &ctx.settings.catalog.seed_file {
            Some(path) => {
                seed::seed_from_file(&self.service, path).await?;
            }
            None => tracing::debug!(module = self.name(), "no seed file configured"),
        }
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books, optionally filtered",
                        "tags": ["Books"],
                        "parameters": [
                            query_param("title", "string", "Substring of the title (case-sensitive)"),
                            query_param("language", "string", "Exact language"),
                            query_param("categoryId", "integer", "Exact category id"),
                            query_param("status", "boolean", "Exact status"),
                            query_param("stockMin", "integer", "Stock strictly greater than this")
                        ],
                        "responses": {
                            "200": json_response("Matching books", json!({
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Book" }
                            })),
                            "404": error_response("Catalog is empty")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": json_body("CreateBookRequest"),
                        "responses": {
                            "201": json_response("Created book", book_ref()),
                            "422": error_response("Required fields missing")
                        }
                    }
                },
                "/{id}": {
                    "parameters": [{
                        "name": "id",
                        "in": "path",
                        "required": true,
                        "schema": { "type": "string" }
                    }],
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "responses": {
                            "200": json_response("The book", book_ref()),
                            "404": error_response("Book not found")
                        }
                    },
                    "patch": {
                        "summary": "Apply a JSON merge patch",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/merge-patch+json": {
                                    "schema": { "type": "object" }
                                }
                            }
                        },
                        "responses": {
                            "200": json_response("Patched book", book_ref()),
                            "404": error_response("Book not found or patch rejected")
                        }
                    },
                    "put": {
                        "summary": "Overwrite the supplied fields",
                        "tags": ["Books"],
                        "requestBody": json_body("BookUpdate"),
                        "responses": {
                            "200": json_response("Updated book", book_ref()),
                            "404": error_response("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": error_response("Book not found")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Books health check",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": {
                                    "text/plain": { "schema": { "type": "string" } }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": book_schema(true),
                    "CreateBookRequest": book_schema(false),
                    "BookUpdate": {
                        "type": "object",
                        "description": "Fields to overwrite; blank strings are ignored",
                        "properties": book_properties()
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn query_param(name: &str, kind: &str, description: &str) -> Value {
    json!({
        "name": name,
        "in": "query",
        "required": false,
        "description": description,
        "schema": { "type": kind }
    })
}

fn book_ref() -> Value {
    json!({ "$ref": "#/components/schemas/Book" })
}

fn json_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{schema}") }
            }
        }
    })
}

fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn error_response(description: &str) -> Value {
    json_response(
        description,
        json!({ "$ref": "#/components/schemas/ErrorResponse" }),
    )
}

fn book_properties() -> Value {
    json!({
        "title": { "type": "string" },
        "description": { "type": "string", "nullable": true },
        "publicationDate": { "type": "string", "format": "date", "nullable": true },
        "language": { "type": "string" },
        "isbn": { "type": "string", "nullable": true },
        "numberPages": { "type": "integer", "nullable": true },
        "price": { "type": "number" },
        "categoryId": { "type": "integer", "format": "int64" },
        "authorId": { "type": "integer", "format": "int64" },
        "image": { "type": "string" },
        "reviewScore": { "type": "number", "nullable": true },
        "status": { "type": "boolean", "nullable": true },
        "stock": { "type": "integer", "nullable": true }
    })
}

fn book_schema(with_id: bool) -> Value {
    let mut properties = book_properties();
    let mut required = vec!["title", "language", "price", "categoryId", "authorId", "image"];
    if with_id {
        properties["id"] = json!({
            "type": "integer",
            "format": "int64",
            "description": "Assigned by the catalog"
        });
        required.insert(0, "id");
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

/// Create the books module backed by an empty in-memory store.
pub fn create_module() -> Arc<dyn Module> {
    let service = BookService::new(Arc::new(InMemoryBookStore::new()));
    Arc::new(BooksModule::new(service))
}
