//! # Store en Memoria
//! src/store/memory.rs
//!
//! Misma semántica que la tabla SQLite (ids crecientes desde 1, nunca
//! reutilizados) pero sin disco. Se pierde al reiniciar.

use super::{BookStore, StorageError};
use crate::books::model::{Book, NewBook};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Store thread-safe respaldado por un `BTreeMap`
#[derive(Debug)]
pub struct InMemoryBookStore {
    inner: Mutex<Rows>,
}

#[derive(Debug)]
struct Rows {
    books: BTreeMap<i64, Book>,
    next_id: i64,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Rows {
                books: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    fn rows(&self) -> Result<std::sync::MutexGuard<'_, Rows>, StorageError> {
        self.inner.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl Default for InMemoryBookStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BookStore for InMemoryBookStore {
    fn list_all(&self) -> Result<Vec<Book>, StorageError> {
        Ok(self.rows()?.books.values().cloned().collect())
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Book>, StorageError> {
        Ok(self.rows()?.books.get(&id).cloned())
    }

    fn insert(&self, book: &NewBook) -> Result<i64, StorageError> {
        let mut rows = self.rows()?;
        let id = rows.next_id;
        rows.next_id += 1;
        rows.books.insert(id, Book::with_id(id, book.clone()));
        Ok(id)
    }

    fn update_by_id(&self, id: i64, book: &NewBook) -> Result<usize, StorageError> {
        let mut rows = self.rows()?;
        match rows.books.get_mut(&id) {
            Some(existing) => {
                *existing = Book::with_id(id, book.clone());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete_by_id(&self, id: i64) -> Result<usize, StorageError> {
        Ok(self.rows()?.books.remove(&id).map_or(0, |_| 1))
    }
}
