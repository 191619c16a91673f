use std::path::Path;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use catalog_app::modules::books;
use catalog_kernel::{settings::Settings, ModuleRegistry};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let settings = Settings::load_from(Path::new("/nonexistent/catalog-config"), "local").unwrap();
    let mut registry = ModuleRegistry::new();
    registry.register(books::create_module()).unwrap();
    catalog_http::build_router(&registry, &settings)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn book(title: &str, language: &str, category_id: i64, stock: i32) -> Value {
    json!({
        "title": title,
        "language": language,
        "price": 10.0,
        "categoryId": category_id,
        "authorId": 1,
        "image": format!("{title}.jpg"),
        "status": true,
        "stock": stock
    })
}

async fn seeded_app() -> Router {
    let app = app();
    for body in [
        book("Rayuela", "es", 1, 4),
        book("Hopscotch", "en", 1, 0),
        book("Bestiario", "es", 2, 9),
    ] {
        let (status, _) = send(&app, Method::POST, "/api/books", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    app
}

#[tokio::test]
async fn empty_catalog_is_not_found() {
    let (status, body) = send(&app(), Method::GET, "/api/books", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn create_trims_and_assigns_an_id() {
    let app = app();
    let mut body = book("  Rayuela ", "es", 1, 4);
    body["isbn"] = json!(" 978-84 ");

    let (status, created) = send(&app, Method::POST, "/api/books", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);
    assert_eq!(created["title"], "Rayuela");
    assert_eq!(created["isbn"], "978-84");

    let (status, fetched) = send(&app, Method::GET, "/api/books/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_with_missing_fields_is_rejected() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/books",
        Some(json!({"title": "Rayuela", "language": " "})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "validation_error");
    let fields: Vec<&str> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["field"].as_str())
        .collect();
    assert_eq!(fields, ["language", "price", "categoryId", "authorId", "image"]);

    let (status, _) = send(&app, Method::GET, "/api/books", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_combine() {
    let app = seeded_app().await;

    let (status, all) = send(&app, Method::GET, "/api/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (status, books) = send(
        &app,
        Method::GET,
        "/api/books?language=es&stockMin=4",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books, json!([all[2].clone()]));

    let (status, books) = send(&app, Method::GET, "/api/books?categoryId=1&title=o", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books.as_array().unwrap().len(), 1);
    assert_eq!(books[0]["title"], "Hopscotch");
}

#[tokio::test]
async fn empty_filter_values_list_every_book() {
    let app = seeded_app().await;
    let (_, all) = send(&app, Method::GET, "/api/books", None).await;

    for uri in [
        "/api/books?stockMin=",
        "/api/books?categoryId=&status=",
        "/api/books?title=&language=&stockMin=",
    ] {
        let (status, books) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(books, all, "{uri}");
    }
}

#[tokio::test]
async fn empty_filter_values_on_an_empty_catalog_are_not_found() {
    let (status, body) = send(&app(), Method::GET, "/api/books?stockMin=", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn filtered_list_without_matches_is_empty() {
    let app = seeded_app().await;
    let (status, books) = send(&app, Method::GET, "/api/books?title=rayuela", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books, json!([]));
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let app = seeded_app().await;
    for uri in ["/api/books/99", "/api/books/abc", "/api/books/0", "/api/books/-3"] {
        let (status, _) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn merge_patch_changes_only_the_given_fields() {
    let app = seeded_app().await;
    let (_, before) = send(&app, Method::GET, "/api/books/1", None).await;

    let (status, patched) = send(
        &app,
        Method::PATCH,
        "/api/books/1",
        Some(json!({"title": "Rayuela (2ª ed.)", "status": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mut expected = before.clone();
    expected["title"] = json!("Rayuela (2ª ed.)");
    expected["status"] = Value::Null;
    assert_eq!(patched, expected);
}

#[tokio::test]
async fn rejected_patch_leaves_the_book_unchanged() {
    let app = seeded_app().await;
    let (_, before) = send(&app, Method::GET, "/api/books/1", None).await;

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/books/1",
        Some(json!({"price": "free"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, after) = send(&app, Method::GET, "/api/books/1", None).await;
    assert_eq!(after, before);
}

#[tokio::test]
async fn field_update_overwrites_supplied_fields() {
    let app = seeded_app().await;
    let (_, before) = send(&app, Method::GET, "/api/books/2", None).await;

    let (status, updated) = send(
        &app,
        Method::PUT,
        "/api/books/2",
        Some(json!({"stock": 5, "title": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mut expected = before;
    expected["stock"] = json!(5);
    assert_eq!(updated, expected);

    let (status, _) = send(&app, Method::PUT, "/api/books/42", Some(json!({"stock": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_once() {
    let app = seeded_app().await;

    let (status, _) = send(&app, Method::DELETE, "/api/books/3", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/api/books/3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/api/books/3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, remaining) = send(&app, Method::GET, "/api/books", None).await;
    assert_eq!(remaining.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn openapi_document_lists_book_routes() {
    let (status, doc) = send(&app(), Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/books"]["get"].is_object());
    assert!(doc["paths"]["/api/books/{id}"]["patch"].is_object());
    assert!(doc["components"]["schemas"]["Book"].is_object());
}
