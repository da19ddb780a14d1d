//! # Store SQLite
//! src/store/sqlite.rs
//!
//! Cada operación abre su propia conexión y la suelta al salir (por `Drop`),
//! tanto en éxito como en error. No hay pool ni transacciones que crucen
//! más de una sentencia.

use super::{BookStore, StorageError};
use crate::books::model::{Book, NewBook};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author TEXT NOT NULL,
    year INTEGER NOT NULL
)";

/// Store respaldado por un archivo SQLite
#[derive(Debug, Clone)]
pub struct SqliteBookStore {
    path: PathBuf,
}

impl SqliteBookStore {
    /// Abre (o crea) la base y asegura que exista la tabla `books`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };
        store.connect()?.execute_batch(SCHEMA)?;

        tracing::info!(path = %store.path.display(), "books table ready");
        Ok(store)
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        Ok(Connection::open(&self.path)?)
    }

    fn row_to_book(row: &Row<'_>) -> rusqlite::Result<Book> {
        Ok(Book {
            id: row.get("id")?,
            title: row.get("title")?,
            author: row.get("author")?,
            year: row.get("year")?,
        })
    }
}

impl BookStore for SqliteBookStore {
    fn list_all(&self) -> Result<Vec<Book>, StorageError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT id, title, author, year FROM books ORDER BY id")?;
        let books = stmt
            .query_map([], Self::row_to_book)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Book>, StorageError> {
        let conn = self.connect()?;
        let book = conn
            .query_row(
                "SELECT id, title, author, year FROM books WHERE id = ?1",
                params![id],
                Self::row_to_book,
            )
            .optional()?;
        Ok(book)
    }

    fn insert(&self, book: &NewBook) -> Result<i64, StorageError> {
        let conn = self.connect()?;
        let id: Option<i64> = conn
            .query_row(
                "INSERT INTO books (title, author, year) VALUES (?1, ?2, ?3) RETURNING id",
                params![book.title, book.author, book.year],
                |row| row.get(0),
            )
            .optional()?;
        id.ok_or(StorageError::MissingGeneratedId)
    }

    fn update_by_id(&self, id: i64, book: &NewBook) -> Result<usize, StorageError> {
        let conn = self.connect()?;
        let rows = conn.execute(
            "UPDATE books SET title = ?1, author = ?2, year = ?3 WHERE id = ?4",
            params![book.title, book.author, book.year, id],
        )?;
        Ok(rows)
    }

    fn delete_by_id(&self, id: i64) -> Result<usize, StorageError> {
        let conn = self.connect()?;
        let rows = conn.execute("DELETE FROM books WHERE id = ?1", params![id])?;
        Ok(rows)
    }
}
