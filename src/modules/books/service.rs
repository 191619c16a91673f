//! Book use cases.
//!
//! Every failure is resolved here: validation problems, unknown or malformed
//! ids, failed patches and store errors are logged and come back as `None`
//! or `false`. Callers never see an error value.

use std::sync::Arc;

use super::criteria::SearchCriteria;
use super::models::{Book, BookFilters, CreateBookRequest};
use super::patch::{self, BookPatch};
use super::store::BookStore;

/// Orchestrates validation, lookups and patching on top of a [`BookStore`].
#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn BookStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// List books, filtered when any filter is supplied.
    ///
    /// The two paths differ on emptiness: the filtered path returns whatever
    /// matched, possibly an empty list, while the unfiltered path reports an
    /// empty catalog as `None`. See [`absent_when_empty`].
    pub async fn list_books(&self, filters: &BookFilters) -> Option<Vec<Book>> {
        if filters.has_any() {
            let criteria = SearchCriteria::from(filters);
            tracing::debug!(%criteria, "searching books");
            return recover("query", self.store.query(&criteria).await);
        }

        let all = recover("list", self.store.list().await)?;
        absent_when_empty(all)
    }

    /// Fetch a book by its textual id. Unparsable ids resolve as not found.
    pub async fn get_book(&self, id: &str) -> Option<Book> {
        let id = parse_book_id(id)?;
        recover("get", self.store.get(id).await).flatten()
    }

    /// Delete a book. Returns `false` when there was nothing to delete.
    pub async fn remove_book(&self, id: &str) -> bool {
        let Some(existing) = self.get_book(id).await else {
            tracing::debug!(book_id = id, "book to remove not found");
            return false;
        };

        if recover("delete", self.store.delete(&existing).await).is_none() {
            return false;
        }
        tracing::info!(book_id = ?existing.id, "book removed");
        true
    }

    /// Create a book from a request. Incomplete requests create nothing.
    pub async fn create_book(&self, request: CreateBookRequest) -> Option<Book> {
        let book = match request.into_book() {
            Ok(book) => book,
            Err(err) => {
                tracing::warn!(missing = ?err.missing, "book not created: {}", err);
                return None;
            }
        };

        let saved = recover("save", self.store.save(book).await)?;
        tracing::info!(book_id = ?saved.id, title = %saved.title, "book created");
        Some(saved)
    }

    /// Apply a merge patch or a field update to an existing book.
    pub async fn update_book(&self, id: &str, patch: &BookPatch) -> Option<Book> {
        let existing = self.get_book(id).await?;

        let patched = match patch::apply(&existing, patch) {
            Ok(book) => book,
            Err(err) => {
                tracing::error!(book_id = id, error = %err, "failed to patch book");
                return None;
            }
        };

        let saved = recover("save", self.store.save(patched).await)?;
        tracing::info!(book_id = ?saved.id, "book updated");
        Some(saved)
    }

    /// Load creation requests in bulk, returning how many books were created.
    pub async fn seed(&self, requests: Vec<CreateBookRequest>) -> usize {
        let mut created = 0;
        for request in requests {
            if self.create_book(request).await.is_some() {
                created += 1;
            }
        }
        created
    }
}

/// The unfiltered listing reports an empty catalog as absent rather than as
/// an empty list. Kept for compatibility with existing clients.
fn absent_when_empty(books: Vec<Book>) -> Option<Vec<Book>> {
    if books.is_empty() {
        None
    } else {
        Some(books)
    }
}

/// Parse a positive numeric book id.
fn parse_book_id(raw: &str) -> Option<i64> {
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Some(id),
        Ok(id) => {
            tracing::warn!(book_id = id, "book id must be positive");
            None
        }
        Err(err) => {
            tracing::error!(book_id = raw, error = %err, "invalid book id");
            None
        }
    }
}

/// Log a store failure and turn it into absence.
fn recover<T>(operation: &'static str, result: anyhow::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::error!(operation, error = ?err, "book store operation failed");
            None
        }
    }
}
