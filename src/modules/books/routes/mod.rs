//! HTTP handlers for the books module.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use catalog_http::error::{AppError, AppResult};
use serde_json::json;

use super::models::{Book, BookFilters, BookUpdate, CreateBookRequest};
use super::patch::BookPatch;
use super::service::BookService;

/// Build the books router. Paths are relative to the module mount point.
pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_book)
                .patch(merge_patch_book)
                .put(update_book_fields)
                .delete(remove_book),
        )
        .with_state(service)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn list_books(
    State(service): State<BookService>,
    query: Result<Query<BookFilters>, QueryRejection>,
) -> AppResult<Json<Vec<Book>>> {
    let Query(filters) = query?;
    service
        .list_books(&filters)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found("no books found"))
}

async fn get_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    service
        .get_book(&id)
        .await
        .map(Json)
        .ok_or_else(|| book_not_found(&id))
}

async fn create_book(
    State(service): State<BookService>,
    body: Result<Json<CreateBookRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let Json(request) = body?;
    let missing = request.missing_required_fields();

    match service.create_book(request).await {
        Some(book) => Ok((StatusCode::CREATED, Json(book))),
        None if !missing.is_empty() => Err(AppError::validation(
            missing
                .into_iter()
                .map(|field| json!({"field": field, "error": "required"}))
                .collect(),
            "book was not created",
        )),
        // Complete request that the store failed to keep
        None => Err(anyhow::anyhow!("book could not be stored").into()),
    }
}

/// `PATCH` takes a raw JSON merge-patch document.
async fn merge_patch_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
    body: String,
) -> AppResult<Json<Book>> {
    service
        .update_book(&id, &BookPatch::Merge(body))
        .await
        .map(Json)
        .ok_or_else(|| book_not_found(&id))
}

/// `PUT` takes a field-level update object.
async fn update_book_fields(
    State(service): State<BookService>,
    Path(id): Path<String>,
    body: Result<Json<BookUpdate>, JsonRejection>,
) -> AppResult<Json<Book>> {
    let Json(update) = body?;
    service
        .update_book(&id, &BookPatch::Fields(update))
        .await
        .map(Json)
        .ok_or_else(|| book_not_found(&id))
}

async fn remove_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if service.remove_book(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(book_not_found(&id))
    }
}

fn book_not_found(id: &str) -> AppError {
    AppError::not_found(format!("book '{}' not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::criteria::SearchCriteria;
    use crate::modules::books::store::BookStore;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Store that accepts nothing.
    struct ReadOnlyStore;

    #[async_trait]
    impl BookStore for ReadOnlyStore {
        async fn list(&self) -> anyhow::Result<Vec<Book>> {
            Ok(Vec::new())
        }

        async fn get(&self, _id: i64) -> anyhow::Result<Option<Book>> {
            Ok(None)
        }

        async fn save(&self, _book: Book) -> anyhow::Result<Book> {
            anyhow::bail!("catalog is read-only")
        }

        async fn delete(&self, _book: &Book) -> anyhow::Result<()> {
            anyhow::bail!("catalog is read-only")
        }

        async fn query(&self, _criteria: &SearchCriteria) -> anyhow::Result<Vec<Book>> {
            Ok(Vec::new())
        }
    }

    fn read_only_router() -> Router {
        router(BookService::new(Arc::new(ReadOnlyStore)))
    }

    async fn call(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn store_failure_on_complete_request_is_internal() {
        let body = json!({
            "title": "Ficciones",
            "language": "es",
            "price": 12.5,
            "categoryId": 1,
            "authorId": 4,
            "image": "ficciones.jpg"
        });

        let (status, error) = call(read_only_router(), post_json("/", &body.to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error["error"]["code"], "internal_error");
    }

    #[tokio::test]
    async fn incomplete_request_is_still_a_validation_error() {
        let (status, error) =
            call(read_only_router(), post_json("/", r#"{"title": "Ficciones"}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error["error"]["code"], "validation_error");
        assert_eq!(error["error"]["details"][0]["field"], "language");
    }

    #[tokio::test]
    async fn unparsable_filter_is_a_bad_request() {
        let request = Request::get("/?stockMin=plenty").body(Body::empty()).unwrap();
        let (status, error) = call(read_only_router(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn malformed_json_body_is_a_bad_request() {
        let (status, error) = call(read_only_router(), post_json("/", r#"{"title": "#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"]["code"], "bad_request");
    }
}
