//! Search criteria: which optional filters were supplied and how to test them.
//!
//! A [`SearchCriteria`] is an ordered list of [`SearchStatement`]s read as a
//! conjunction. Nothing here validates values; callers add a statement only
//! once they have decided the parameter is present.

use std::fmt;
use std::str::FromStr;

use super::models::{non_empty, BookFilters};

/// Book fields that can appear in a search statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    Title,
    Language,
    CategoryId,
    Status,
    Stock,
}

impl SearchField {
    pub const ALL: [SearchField; 5] = [
        SearchField::Title,
        SearchField::Language,
        SearchField::CategoryId,
        SearchField::Status,
        SearchField::Stock,
    ];

    /// Field name as it appears in the book's JSON form.
    pub fn as_str(self) -> &'static str {
        match self {
            SearchField::Title => "title",
            SearchField::Language => "language",
            SearchField::CategoryId => "categoryId",
            SearchField::Status => "status",
            SearchField::Stock => "stock",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown search field '{s}'"))
    }
}

/// How a statement compares the field with its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchOperation {
    /// Field contains the value as a substring
    Match,
    Equal,
    /// Field is strictly greater than the value
    GreaterThan,
}

impl fmt::Display for SearchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchOperation::Match => "MATCH",
            SearchOperation::Equal => "EQUAL",
            SearchOperation::GreaterThan => "GREATER_THAN",
        })
    }
}

/// Comparison value of a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchValue {
    Text(String),
    Integer(i64),
    Bool(bool),
}

impl fmt::Display for SearchValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchValue::Text(text) => write!(f, "{text:?}"),
            SearchValue::Integer(n) => write!(f, "{n}"),
            SearchValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for SearchValue {
    fn from(value: &str) -> Self {
        SearchValue::Text(value.to_string())
    }
}

impl From<String> for SearchValue {
    fn from(value: String) -> Self {
        SearchValue::Text(value)
    }
}

impl From<i64> for SearchValue {
    fn from(value: i64) -> Self {
        SearchValue::Integer(value)
    }
}

impl From<i32> for SearchValue {
    fn from(value: i32) -> Self {
        SearchValue::Integer(i64::from(value))
    }
}

impl From<bool> for SearchValue {
    fn from(value: bool) -> Self {
        SearchValue::Bool(value)
    }
}

/// One condition: `field operation value`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchStatement {
    pub field: SearchField,
    pub value: SearchValue,
    pub operation: SearchOperation,
}

impl SearchStatement {
    pub fn new(
        field: SearchField,
        value: impl Into<SearchValue>,
        operation: SearchOperation,
    ) -> Self {
        Self {
            field,
            value: value.into(),
            operation,
        }
    }
}

impl fmt::Display for SearchStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operation, self.value)
    }
}

/// Ordered conjunction of statements. Empty criteria match every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    statements: Vec<SearchStatement>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a statement.
    pub fn add(&mut self, statement: SearchStatement) {
        self.statements.push(statement);
    }

    pub fn statements(&self) -> &[SearchStatement] {
        &self.statements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchStatement> {
        self.statements.iter()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl<'a> IntoIterator for &'a SearchCriteria {
    type Item = &'a SearchStatement;
    type IntoIter = std::slice::Iter<'a, SearchStatement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

impl FromIterator<SearchStatement> for SearchCriteria {
    fn from_iter<I: IntoIterator<Item = SearchStatement>>(iter: I) -> Self {
        Self {
            statements: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for SearchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            return f.write_str("<all>");
        }
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}

/// Listing filters become one statement per supplied parameter: title
/// matches as a substring, stock is a strict lower bound, the rest are exact.
impl From<&BookFilters> for SearchCriteria {
    fn from(filters: &BookFilters) -> Self {
        let mut criteria = SearchCriteria::new();

        if let Some(title) = non_empty(&filters.title) {
            criteria.add(SearchStatement::new(
                SearchField::Title,
                title,
                SearchOperation::Match,
            ));
        }
        if let Some(language) = non_empty(&filters.language) {
            criteria.add(SearchStatement::new(
                SearchField::Language,
                language,
                SearchOperation::Equal,
            ));
        }
        if let Some(category_id) = filters.category_id {
            criteria.add(SearchStatement::new(
                SearchField::CategoryId,
                category_id,
                SearchOperation::Equal,
            ));
        }
        if let Some(status) = filters.status {
            criteria.add(SearchStatement::new(
                SearchField::Status,
                status,
                SearchOperation::Equal,
            ));
        }
        if let Some(stock_min) = filters.stock_min {
            criteria.add(SearchStatement::new(
                SearchField::Stock,
                stock_min,
                SearchOperation::GreaterThan,
            ));
        }

        criteria
    }
}
