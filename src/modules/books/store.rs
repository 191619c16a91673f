//! Persistence boundary for books.

use async_trait::async_trait;
use catalog_db::Table;

use super::criteria::SearchCriteria;
use super::models::Book;
use super::predicate;

/// Book persistence. Implementations validate nothing; that is the
/// service's job.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Every stored book.
    async fn list(&self) -> anyhow::Result<Vec<Book>>;

    /// One book, or `None` when no book has this id.
    async fn get(&self, id: i64) -> anyhow::Result<Option<Book>>;

    /// Insert or update, returning the stored record with its id assigned.
    async fn save(&self, book: Book) -> anyhow::Result<Book>;

    async fn delete(&self, book: &Book) -> anyhow::Result<()>;

    /// Books satisfying every statement of the criteria.
    async fn query(&self, criteria: &SearchCriteria) -> anyhow::Result<Vec<Book>>;
}

/// Store backed by an in-memory table.
pub struct InMemoryBookStore {
    table: Table<Book>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self {
            table: Table::new("book"),
        }
    }
}

impl Default for InMemoryBookStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn list(&self) -> anyhow::Result<Vec<Book>> {
        Ok(self.table.all().await)
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Book>> {
        Ok(self.table.get(id).await)
    }

    async fn save(&self, book: Book) -> anyhow::Result<Book> {
        Ok(self.table.save(book).await)
    }

    async fn delete(&self, book: &Book) -> anyhow::Result<()> {
        if let Some(id) = book.id {
            self.table.delete(id).await;
        }
        Ok(())
    }

    async fn query(&self, criteria: &SearchCriteria) -> anyhow::Result<Vec<Book>> {
        let predicate = predicate::compile(criteria);
        tracing::debug!(table = self.table.name(), %criteria, "querying books");
        Ok(self.table.find(|book| predicate(book)).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::criteria::{SearchField, SearchOperation, SearchStatement};

    fn unsaved(title: &str, stock: Option<i32>) -> Book {
        Book {
            id: None,
            title: title.to_string(),
            description: None,
            publication_date: None,
            language: "es".to_string(),
            isbn: None,
            number_pages: None,
            price: 12.0,
            category_id: 1,
            author_id: 1,
            image: "cover.jpg".to_string(),
            review_score: None,
            status: Some(true),
            stock,
        }
    }

    #[tokio::test]
    async fn save_assigns_ids_and_get_finds_them() {
        let store = InMemoryBookStore::new();
        let saved = store.save(unsaved("Ficciones", None)).await.unwrap();

        let id = saved.id.unwrap();
        assert_eq!(store.get(id).await.unwrap(), Some(saved));
        assert_eq!(store.get(id + 100).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let store = InMemoryBookStore::new();
        let saved = store.save(unsaved("Ficciones", None)).await.unwrap();

        store.delete(&saved).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn query_applies_compiled_criteria() {
        let store = InMemoryBookStore::new();
        store.save(unsaved("Ficciones", Some(1))).await.unwrap();
        store.save(unsaved("El Aleph", Some(9))).await.unwrap();
        store.save(unsaved("El hacedor", None)).await.unwrap();

        let mut criteria = SearchCriteria::new();
        criteria.add(SearchStatement::new(
            SearchField::Title,
            "El",
            SearchOperation::Match,
        ));
        criteria.add(SearchStatement::new(
            SearchField::Stock,
            2,
            SearchOperation::GreaterThan,
        ));

        let found = store.query(&criteria).await.unwrap();
        let titles: Vec<_> = found.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["El Aleph"]);

        let everything = store.query(&SearchCriteria::new()).await.unwrap();
        assert_eq!(everything.len(), 3);
    }
}
