//! # Recurso Libros
//!
//! - `model`: el registro `Book` y la validación de payloads
//! - `handlers`: un handler por operación CRUD

pub mod handlers;
pub mod model;

pub use model::{Book, NewBook, PayloadError};
