//! # Modelo de Libro
//! src/books/model.rs
//!
//! `Book` es el registro que viaja por el cable y el que devuelve el store.
//! `NewBook` son los campos que el cliente puede mandar; el `id` nunca lo
//! elige el cliente.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Campos obligatorios de un payload de Create/Update
const REQUIRED_FIELDS: [&str; 3] = ["title", "author", "year"];

/// Un libro persistido
///
/// El orden de los campos es el orden del JSON: `id, title, author, year`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub year: i32,
}

impl Book {
    /// Combina los campos enviados con el id asignado por el store
    pub fn with_id(id: i64, fields: NewBook) -> Self {
        Self {
            id,
            title: fields.title,
            author: fields.author,
            year: fields.year,
        }
    }

    /// Serializa el libro como objeto JSON
    pub fn to_json(&self) -> String {
        // Un struct con campos String/enteros siempre serializa
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Campos editables de un libro, ya validados
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub year: i32,
}

/// Errores de validación del body de Create/Update
///
/// El mensaje de cada variante es exactamente el que ve el cliente en
/// `{"error": ...}` con status 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("Empty JSON body")]
    EmptyBody,

    #[error("Invalid JSON format")]
    InvalidJson,

    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid field values")]
    InvalidFields,
}

impl NewBook {
    /// Valida un body en el orden fijo: vacío, JSON, campos, tipos
    ///
    /// Espera el body tal como lo deja `Request`, ya recortado.
    ///
    /// # Ejemplo
    /// ```
    /// use books_server::books::model::{NewBook, PayloadError};
    ///
    /// assert_eq!(NewBook::from_body(b""), Err(PayloadError::EmptyBody));
    /// assert_eq!(NewBook::from_body(b"{\"title\":\"X\"}"), Err(PayloadError::MissingFields));
    /// ```
    pub fn from_body(body: &[u8]) -> Result<Self, PayloadError> {
        if body.is_empty() {
            return Err(PayloadError::EmptyBody);
        }

        let object: Map<String, Value> =
            serde_json::from_slice(body).map_err(|_| PayloadError::InvalidJson)?;

        if !REQUIRED_FIELDS.iter().all(|field| object.contains_key(*field)) {
            return Err(PayloadError::MissingFields);
        }

        let title = non_empty_text(&object["title"])?;
        let author = non_empty_text(&object["author"])?;
        let year = object["year"]
            .as_i64()
            .and_then(|year| i32::try_from(year).ok())
            .ok_or(PayloadError::InvalidFields)?;

        Ok(Self {
            title,
            author,
            year,
        })
    }
}

fn non_empty_text(value: &Value) -> Result<String, PayloadError> {
    match value.as_str() {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(PayloadError::InvalidFields),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Request;

    #[test]
    fn test_valid_payload() {
        let book = NewBook::from_body(br#"{"title":"Dune","author":"Herbert","year":1965}"#).unwrap();

        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Herbert");
        assert_eq!(book.year, 1965);
    }

    #[test]
    fn test_client_id_is_ignored() {
        let book =
            NewBook::from_body(br#"{"id":77,"title":"Dune","author":"Herbert","year":1965}"#).unwrap();
        let stored = Book::with_id(1, book);

        assert_eq!(stored.id, 1);
    }

    #[test]
    fn test_whitespace_only_body_is_empty() {
        let request = Request::parse(b"POST /books HTTP/1.1\r\nContent-Length: 5\r\n\r\n  \r\n ").unwrap();
        assert_eq!(NewBook::from_body(request.body()), Err(PayloadError::EmptyBody));
    }

    #[test]
    fn test_invalid_json() {
        assert_eq!(NewBook::from_body(b"{title:"), Err(PayloadError::InvalidJson));
        assert_eq!(NewBook::from_body(b"[1,2,3]"), Err(PayloadError::InvalidJson));
        assert_eq!(NewBook::from_body(b"\"text\""), Err(PayloadError::InvalidJson));
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            NewBook::from_body(br#"{"title":"X"}"#),
            Err(PayloadError::MissingFields)
        );
        assert_eq!(
            NewBook::from_body(br#"{"title":"X","author":"Y"}"#),
            Err(PayloadError::MissingFields)
        );
    }

    #[test]
    fn test_missing_fields_checked_before_types() {
        // title tiene tipo incorrecto pero falta year: gana MissingFields
        assert_eq!(
            NewBook::from_body(br#"{"title":5,"author":"Y"}"#),
            Err(PayloadError::MissingFields)
        );
    }

    #[test]
    fn test_invalid_field_values() {
        assert_eq!(
            NewBook::from_body(br#"{"title":"","author":"Y","year":1}"#),
            Err(PayloadError::InvalidFields)
        );
        assert_eq!(
            NewBook::from_body(br#"{"title":"X","author":null,"year":1}"#),
            Err(PayloadError::InvalidFields)
        );
        assert_eq!(
            NewBook::from_body(br#"{"title":"X","author":"Y","year":"1965"}"#),
            Err(PayloadError::InvalidFields)
        );
        assert_eq!(
            NewBook::from_body(br#"{"title":"X","author":"Y","year":9999999999}"#),
            Err(PayloadError::InvalidFields)
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(PayloadError::EmptyBody.to_string(), "Empty JSON body");
        assert_eq!(PayloadError::InvalidJson.to_string(), "Invalid JSON format");
        assert_eq!(PayloadError::MissingFields.to_string(), "Missing required fields");
    }

    #[test]
    fn test_book_json_field_order() {
        let book = Book {
            id: 1,
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            year: 1965,
        };

        assert_eq!(
            book.to_json(),
            r#"{"id":1,"title":"Dune","author":"Herbert","year":1965}"#
        );
    }
}
