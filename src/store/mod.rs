//! # Data Access Gateway
//! src/store/mod.rs
//!
//! Frontera con la persistencia. Los handlers sólo conocen el trait
//! [`BookStore`]; no saben si detrás hay SQLite o un mapa en memoria.
//!
//! - `sqlite`: tabla `books` en un archivo SQLite, una conexión por operación
//! - `memory`: mapa en memoria para `--in-memory` y para tests

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryBookStore;
pub use sqlite::SqliteBookStore;

use crate::books::model::{Book, NewBook};
use crate::config::Config;
use std::sync::Arc;
use thiserror::Error;

/// Construye el store que pide la configuración
pub fn open(config: &Config) -> Result<Arc<dyn BookStore>, StorageError> {
    if config.in_memory {
        tracing::warn!("using in-memory store, data is lost on restart");
        return Ok(Arc::new(InMemoryBookStore::new()));
    }

    Ok(Arc::new(SqliteBookStore::open(&config.database)?))
}

/// Fallas del store; todas terminan en un 500
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("store did not return a generated id")]
    MissingGeneratedId,
}

/// Operaciones que los handlers necesitan sobre la tabla de libros
pub trait BookStore: Send + Sync {
    /// Todos los libros, ordenados por id
    fn list_all(&self) -> Result<Vec<Book>, StorageError>;

    fn get_by_id(&self, id: i64) -> Result<Option<Book>, StorageError>;

    /// Inserta y retorna el id asignado
    fn insert(&self, book: &NewBook) -> Result<i64, StorageError>;

    /// Reemplaza title/author/year; retorna filas afectadas
    fn update_by_id(&self, id: i64, book: &NewBook) -> Result<usize, StorageError>;

    /// Retorna filas afectadas
    fn delete_by_id(&self, id: i64) -> Result<usize, StorageError>;
}
