use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A book record in the catalog.
///
/// String fields are stored trimmed. `id` is assigned by the store on the
/// first save and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub publication_date: Option<NaiveDate>,
    pub language: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub number_pages: Option<i32>,
    pub price: f64,
    pub category_id: i64,
    pub author_id: i64,
    pub image: String,
    #[serde(default)]
    pub review_score: Option<f64>,
    /// Whether the book is active/available
    #[serde(default)]
    pub status: Option<bool>,
    #[serde(default)]
    pub stock: Option<i32>,
}

impl Book {
    /// Trim surrounding whitespace from every string field.
    pub fn trim_strings(&mut self) {
        trim_in_place(&mut self.title);
        trim_in_place(&mut self.language);
        trim_in_place(&mut self.image);
        self.description = self.description.take().map(trimmed);
        self.isbn = self.isbn.take().map(trimmed);
    }

    /// Required string fields that are empty.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.language.trim().is_empty() {
            missing.push("language");
        }
        if self.image.trim().is_empty() {
            missing.push("image");
        }
        missing
    }
}

impl catalog_db::Record for Book {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

/// A required field was absent or blank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {}", missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

/// Request model for creating a new book.
///
/// Every field is optional at the type level so that an incomplete request
/// can be reported as a validation failure instead of a parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBookRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub language: Option<String>,
    pub isbn: Option<String>,
    pub number_pages: Option<i32>,
    pub price: Option<f64>,
    pub category_id: Option<i64>,
    pub author_id: Option<i64>,
    pub image: Option<String>,
    pub review_score: Option<f64>,
    pub status: Option<bool>,
    pub stock: Option<i32>,
}

impl CreateBookRequest {
    /// Required fields that are absent, or blank for strings.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !has_text(&self.title) {
            missing.push("title");
        }
        if !has_text(&self.language) {
            missing.push("language");
        }
        if self.price.is_none() {
            missing.push("price");
        }
        if self.category_id.is_none() {
            missing.push("categoryId");
        }
        if self.author_id.is_none() {
            missing.push("authorId");
        }
        if !has_text(&self.image) {
            missing.push("image");
        }
        missing
    }

    /// Build a trimmed, unsaved book, or report what is missing.
    pub fn into_book(self) -> Result<Book, ValidationError> {
        let missing = self.missing_required_fields();
        let mut book = match (
            self.title,
            self.language,
            self.price,
            self.category_id,
            self.author_id,
            self.image,
        ) {
            (
                Some(title),
                Some(language),
                Some(price),
                Some(category_id),
                Some(author_id),
                Some(image),
            ) if missing.is_empty() => Book {
                id: None,
                title,
                description: self.description,
                publication_date: self.publication_date,
                language,
                isbn: self.isbn,
                number_pages: self.number_pages,
                price,
                category_id,
                author_id,
                image,
                review_score: self.review_score,
                status: self.status,
                stock: self.stock,
            },
            _ => return Err(ValidationError { missing }),
        };
        book.trim_strings();
        Ok(book)
    }
}

/// Field-level update. Absent fields, and strings that are blank, leave the
/// stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub language: Option<String>,
    pub isbn: Option<String>,
    pub number_pages: Option<i32>,
    pub price: Option<f64>,
    pub category_id: Option<i64>,
    pub author_id: Option<i64>,
    pub image: Option<String>,
    pub review_score: Option<f64>,
    pub status: Option<bool>,
    pub stock: Option<i32>,
}

/// Optional listing filters as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookFilters {
    /// Substring of the title
    pub title: Option<String>,
    pub language: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub category_id: Option<i64>,
    #[serde(deserialize_with = "empty_as_none")]
    pub status: Option<bool>,
    /// Stock must be strictly greater than this
    #[serde(deserialize_with = "empty_as_none")]
    pub stock_min: Option<i32>,
}

impl BookFilters {
    /// Whether at least one filter was supplied. Empty strings do not count.
    pub fn has_any(&self) -> bool {
        non_empty(&self.title).is_some()
            || non_empty(&self.language).is_some()
            || self.category_id.is_some()
            || self.status.is_some()
            || self.stock_min.is_some()
    }
}

/// Query-string scalar where an empty value, as in `?stockMin=`, means the
/// filter was not supplied.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

/// The value when it is present and non-empty.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn trimmed(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

fn trim_in_place(value: &mut String) {
    *value = trimmed(std::mem::take(value));
}
