//! Partial updates of an existing book.
//!
//! Two modes are supported. A merge patch (RFC 7386) is merged onto the
//! book's JSON form and the result is read back as a book. A field update
//! overwrites exactly the fields it carries and cannot fail.
//!
//! Both return a new value; the book passed in is never modified, so a
//! failed patch leaves the stored record as it was.

use serde_json::Value;
use thiserror::Error;

use super::models::{Book, BookUpdate, ValidationError};

/// A partial update in one of the two supported modes.
#[derive(Debug, Clone, PartialEq)]
pub enum BookPatch {
    /// Raw merge-patch document
    Merge(String),
    Fields(BookUpdate),
}

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("malformed merge patch: {0}")]
    Malformed(String),

    #[error("patched document is not a valid book: {0}")]
    Invalid(#[source] serde_json::Error),

    #[error("patched book is incomplete: {0}")]
    Incomplete(#[from] ValidationError),

    #[error("book could not be serialized: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Apply either patch mode to `existing`.
pub fn apply(existing: &Book, patch: &BookPatch) -> Result<Book, PatchError> {
    match patch {
        BookPatch::Merge(document) => merge_patch(existing, document),
        BookPatch::Fields(update) => Ok(apply_update(existing, update)),
    }
}

/// Merge a JSON merge-patch document onto `existing`.
///
/// Keys with a value overwrite, keys set to `null` clear, absent keys are
/// kept. Nested objects merge recursively. The id is never changed by a patch.
pub fn merge_patch(existing: &Book, document: &str) -> Result<Book, PatchError> {
    let patch: Value =
        serde_json::from_str(document).map_err(|e| PatchError::Malformed(e.to_string()))?;
    if !patch.is_object() {
        return Err(PatchError::Malformed(
            "merge patch must be a JSON object".to_string(),
        ));
    }

    let mut target = serde_json::to_value(existing).map_err(PatchError::Serialize)?;
    json_patch::merge(&mut target, &patch);

    let mut patched: Book = serde_json::from_value(target).map_err(PatchError::Invalid)?;
    patched.id = existing.id;
    patched.trim_strings();

    let missing = patched.missing_required_fields();
    if !missing.is_empty() {
        return Err(ValidationError { missing }.into());
    }

    Ok(patched)
}

/// Overwrite the fields present in `update`.
///
/// Strings are trimmed and skipped when blank; other fields are taken when
/// present.
pub fn apply_update(existing: &Book, update: &BookUpdate) -> Book {
    let mut book = existing.clone();

    if let Some(title) = text(&update.title) {
        book.title = title;
    }
    if let Some(description) = text(&update.description) {
        book.description = Some(description);
    }
    if let Some(date) = update.publication_date {
        book.publication_date = Some(date);
    }
    if let Some(language) = text(&update.language) {
        book.language = language;
    }
    if let Some(isbn) = text(&update.isbn) {
        book.isbn = Some(isbn);
    }
    if let Some(pages) = update.number_pages {
        book.number_pages = Some(pages);
    }
    if let Some(price) = update.price {
        book.price = price;
    }
    if let Some(category_id) = update.category_id {
        book.category_id = category_id;
    }
    if let Some(author_id) = update.author_id {
        book.author_id = author_id;
    }
    if let Some(image) = text(&update.image) {
        book.image = image;
    }
    if let Some(score) = update.review_score {
        book.review_score = Some(score);
    }
    if let Some(status) = update.status {
        book.status = Some(status);
    }
    if let Some(stock) = update.stock {
        book.stock = Some(stock);
    }

    book
}

fn text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
