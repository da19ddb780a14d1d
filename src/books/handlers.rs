//! # Handlers HTTP para Libros
//! src/books/handlers.rs
//!
//! Un handler por operación CRUD:
//! - `GET /books` → [`list_books`]
//! - `GET /books/{id}` → [`get_book`]
//! - `POST /books` → [`create_book`]
//! - `PUT /books/{id}` → [`update_book`]
//! - `DELETE /books/{id}` → [`delete_book`]
//!
//! Ningún error sale de aquí: fallas de validación o del store se convierten
//! en una Response.

use crate::books::model::{Book, NewBook};
use crate::http::{Request, Response, StatusCode};
use crate::router::PathId;
use crate::store::{BookStore, StorageError};

const BOOK_NOT_FOUND: &str = "Book not found";
const DATABASE_ERROR: &str = "Database error occurred";
const MISSING_GENERATED_ID: &str = "Failed to retrieve generated ID";

/// Handler para `GET /books`
///
/// 200 con un arreglo de todos los libros; 500 con `{}` si falla el store.
pub fn list_books(_req: &Request, _id: PathId, store: &dyn BookStore) -> Response {
    match store.list_all() {
        Ok(books) => match serde_json::to_string(&books) {
            Ok(body) => Response::new(StatusCode::Ok, body),
            Err(err) => {
                tracing::error!(error = %err, "failed to encode book list");
                Response::empty(StatusCode::InternalServerError)
            }
        },
        Err(err) => {
            tracing::error!(error = %err, "list books failed");
            Response::empty(StatusCode::InternalServerError)
        }
    }
}

/// Handler para `GET /books/{id}`
///
/// Un id mal formado se responde igual que un libro inexistente.
pub fn get_book(_req: &Request, id: PathId, store: &dyn BookStore) -> Response {
    let Some(id) = id.valid() else {
        return Response::not_found();
    };

    match store.get_by_id(id) {
        Ok(Some(book)) => Response::new(StatusCode::Ok, book.to_json()),
        Ok(None) => Response::not_found(),
        Err(err) => {
            tracing::error!(error = %err, id, "get book failed");
            Response::empty(StatusCode::InternalServerError)
        }
    }
}

/// Handler para `POST /books`
///
/// Valida el body y responde 201 con el libro y el id que asignó el store.
///
/// # Ejemplo de response
/// ```json
/// {"id":1,"title":"Dune","author":"Herbert","year":1965}
/// ```
pub fn create_book(req: &Request, _id: PathId, store: &dyn BookStore) -> Response {
    let fields = match parse_payload(req) {
        Ok(fields) => fields,
        Err(response) => return response,
    };

    match store.insert(&fields) {
        Ok(id) => {
            tracing::info!(id, "book created");
            Response::new(StatusCode::Created, Book::with_id(id, fields).to_json())
        }
        Err(StorageError::MissingGeneratedId) => {
            tracing::error!("insert returned no generated id");
            Response::error(StatusCode::InternalServerError, MISSING_GENERATED_ID)
        }
        Err(err) => {
            tracing::error!(error = %err, "insert book failed");
            Response::error(StatusCode::InternalServerError, DATABASE_ERROR)
        }
    }
}

/// Handler para `PUT /books/{id}`
///
/// El body se valida antes de mirar el id, así un body inválido siempre da
/// 400 aunque el libro no exista.
pub fn update_book(req: &Request, id: PathId, store: &dyn BookStore) -> Response {
    let fields = match parse_payload(req) {
        Ok(fields) => fields,
        Err(response) => return response,
    };

    let Some(id) = id.valid() else {
        return Response::error(StatusCode::NotFound, BOOK_NOT_FOUND);
    };

    match store.update_by_id(id, &fields) {
        Ok(0) => Response::error(StatusCode::NotFound, BOOK_NOT_FOUND),
        Ok(_) => {
            tracing::info!(id, "book updated");
            Response::new(StatusCode::Ok, Book::with_id(id, fields).to_json())
        }
        Err(err) => {
            tracing::error!(error = %err, id, "update book failed");
            Response::error(StatusCode::InternalServerError, DATABASE_ERROR)
        }
    }
}

/// Handler para `DELETE /books/{id}`
pub fn delete_book(_req: &Request, id: PathId, store: &dyn BookStore) -> Response {
    let Some(id) = id.valid() else {
        return Response::not_found();
    };

    match store.delete_by_id(id) {
        Ok(0) => Response::not_found(),
        Ok(_) => {
            tracing::info!(id, "book deleted");
            Response::empty(StatusCode::Ok)
        }
        Err(err) => {
            tracing::error!(error = %err, id, "delete book failed");
            Response::empty(StatusCode::InternalServerError)
        }
    }
}

/// Valida el body de Create/Update; el error ya viene como 400
fn parse_payload(req: &Request) -> Result<NewBook, Response> {
    tracing::debug!(body = %String::from_utf8_lossy(req.body()), "received JSON");

    NewBook::from_body(req.body()).map_err(|err| {
        tracing::debug!(error = %err, "rejected payload");
        Response::error(StatusCode::BadRequest, &err.to_string())
    })
}
