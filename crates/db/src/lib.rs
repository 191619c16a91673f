//! In-memory storage for catalog records.
//!
//! A [`Table`] owns rows keyed by a store-assigned `i64` identifier. Writes
//! are serialized by an async read/write lock, which is the whole of the
//! consistency story: there is no revision check, so the last writer wins.
//! This includes deletes. A read-modify-write that saves after a concurrent
//! delete of the same id puts the row back, since `save` with an explicit id
//! upserts.

use std::collections::BTreeMap;

use tokio::sync::RwLock;

/// A row that can live in a [`Table`].
pub trait Record: Clone + Send + Sync + 'static {
    /// Identifier, `None` until the record is first saved
    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);
}

struct TableState<R> {
    rows: BTreeMap<i64, R>,
    next_id: i64,
}

/// Ordered in-memory table. Scans return rows in ascending id order.
pub struct Table<R> {
    name: &'static str,
    state: RwLock<TableState<R>>,
}

impl<R: Record> Table<R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: RwLock::new(TableState {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.rows.is_empty()
    }

    /// Every row.
    pub async fn all(&self) -> Vec<R> {
        self.state.read().await.rows.values().cloned().collect()
    }

    pub async fn get(&self, id: i64) -> Option<R> {
        self.state.read().await.rows.get(&id).cloned()
    }

    /// Insert or replace a row and return the stored copy.
    ///
    /// Rows without an id get the next free one. Saving a row with an
    /// explicit id upserts it and moves the id sequence past it.
    pub async fn save(&self, mut record: R) -> R {
        let mut state = self.state.write().await;

        let id = match record.id() {
            Some(id) => id,
            None => {
                let id = state.next_id;
                record.set_id(id);
                id
            }
        };
        if id >= state.next_id {
            state.next_id = id + 1;
        }

        let inserted = state.rows.insert(id, record.clone()).is_none();
        tracing::debug!(table = self.name, id, inserted, "row saved");
        record
    }

    /// Remove a row, returning whether it existed.
    pub async fn delete(&self, id: i64) -> bool {
        let removed = self.state.write().await.rows.remove(&id).is_some();
        tracing::debug!(table = self.name, id, removed, "row deleted");
        removed
    }

    /// Every row the predicate accepts.
    pub async fn find<F>(&self, predicate: F) -> Vec<R>
    where
        F: Fn(&R) -> bool,
    {
        self.state
            .read()
            .await
            .rows
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }
}
