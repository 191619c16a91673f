//! Compiles [`SearchCriteria`] into a predicate over [`Book`] records.
//!
//! The compiler knows nothing about which filters a caller supplied. Each
//! statement is turned into a sub-predicate by reading the field through the
//! accessor table and applying the statement's operator; the sub-predicates
//! are then AND-ed together. Supporting a new filterable field means adding a
//! [`SearchField`] variant and its accessor, nothing else.

use super::criteria::{SearchCriteria, SearchField, SearchOperation, SearchStatement, SearchValue};
use super::models::Book;

/// A compiled test over a book.
pub type Predicate = Box<dyn Fn(&Book) -> bool + Send + Sync>;

/// A field value read off a record for comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Integer(i64),
    Bool(bool),
    /// The record has no value for an optional field
    Missing,
}

type Accessor = for<'a> fn(&'a Book) -> FieldValue<'a>;

/// Accessor table: how to read each searchable field.
fn accessor(field: SearchField) -> Accessor {
    match field {
        SearchField::Title => read_title,
        SearchField::Language => read_language,
        SearchField::CategoryId => read_category_id,
        SearchField::Status => read_status,
        SearchField::Stock => read_stock,
    }
}

fn read_title(book: &Book) -> FieldValue<'_> {
    FieldValue::Text(&book.title)
}

fn read_language(book: &Book) -> FieldValue<'_> {
    FieldValue::Text(&book.language)
}

fn read_category_id(book: &Book) -> FieldValue<'_> {
    FieldValue::Integer(book.category_id)
}

fn read_status(book: &Book) -> FieldValue<'_> {
    book.status.map_or(FieldValue::Missing, FieldValue::Bool)
}

fn read_stock(book: &Book) -> FieldValue<'_> {
    book.stock
        .map_or(FieldValue::Missing, |stock| FieldValue::Integer(i64::from(stock)))
}

/// Compile criteria into a single predicate.
///
/// Empty criteria compile to a predicate that accepts every book.
pub fn compile(criteria: &SearchCriteria) -> Predicate {
    let clauses: Vec<Predicate> = criteria.iter().map(compile_statement).collect();
    Box::new(move |book: &Book| clauses.iter().all(|clause| clause(book)))
}

/// Compile one statement. Missing values and type mismatches never match.
pub fn compile_statement(statement: &SearchStatement) -> Predicate {
    let read = accessor(statement.field);
    let expected = statement.value.clone();

    match statement.operation {
        SearchOperation::Match => Box::new(move |book: &Book| contains(read(book), &expected)),
        SearchOperation::Equal => Box::new(move |book: &Book| equals(read(book), &expected)),
        SearchOperation::GreaterThan => {
            Box::new(move |book: &Book| greater_than(read(book), &expected))
        }
    }
}

fn contains(actual: FieldValue<'_>, expected: &SearchValue) -> bool {
    match (actual, expected) {
        (FieldValue::Text(actual), SearchValue::Text(needle)) => actual.contains(needle.as_str()),
        _ => false,
    }
}

fn equals(actual: FieldValue<'_>, expected: &SearchValue) -> bool {
    match (actual, expected) {
        (FieldValue::Text(actual), SearchValue::Text(expected)) => actual == expected,
        (FieldValue::Integer(actual), SearchValue::Integer(expected)) => actual == *expected,
        (FieldValue::Bool(actual), SearchValue::Bool(expected)) => actual == *expected,
        _ => false,
    }
}

fn greater_than(actual: FieldValue<'_>, expected: &SearchValue) -> bool {
    match (actual, expected) {
        (FieldValue::Integer(actual), SearchValue::Integer(bound)) => actual > *bound,
        _ => false,
    }
}
