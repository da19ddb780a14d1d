//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea (método, path) a un handler, en el orden en que se registraron.
//!
//! ```text
//! Request → Router → Handler → BookStore → Response
//! ```
//!
//! Hay dos tipos de patrón:
//! - exacto (`/books`): el path debe ser idéntico
//! - con parámetro (`/books/{id}`): el path empieza con el prefijo y lo que
//!   sigue se decodifica como [`PathId`]
//!
//! Si ninguna ruta coincide se responde 404 con `{}`. Un path conocido con
//! el método equivocado también es 404: no hay 405.

use crate::books::handlers;
use crate::http::{Method, Request, Response};
use crate::store::BookStore;

/// Tipo de función handler
///
/// Recibe el request, el id decodificado del path y el store.
pub type Handler = fn(&Request, PathId, &dyn BookStore) -> Response;

/// Segmento `{id}` de un path, ya decodificado
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathId {
    /// La ruta no tiene parámetro
    Absent,

    /// Vacío, no numérico o con más segmentos
    Malformed(String),

    /// Entero base 10
    Valid(i64),
}

impl PathId {
    /// Decodifica el texto que sigue al prefijo de la ruta
    ///
    /// # Ejemplo
    /// ```
    /// use books_server::router::PathId;
    ///
    /// assert_eq!(PathId::parse("42"), PathId::Valid(42));
    /// assert_eq!(PathId::parse("abc"), PathId::Malformed("abc".to_string()));
    /// ```
    pub fn parse(segment: &str) -> Self {
        match segment.parse::<i64>() {
            Ok(id) => PathId::Valid(id),
            Err(_) => PathId::Malformed(segment.to_string()),
        }
    }

    /// El id sólo si es válido; los demás casos se tratan como no encontrado
    pub fn valid(&self) -> Option<i64> {
        match self {
            PathId::Valid(id) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
enum Pattern {
    Exact(String),
    WithId(String),
}

impl Pattern {
    fn matches(&self, path: &str) -> Option<PathId> {
        match self {
            Pattern::Exact(expected) => (path == expected.as_str()).then_some(PathId::Absent),
            Pattern::WithId(prefix) => path.strip_prefix(prefix.as_str()).map(PathId::parse),
        }
    }
}

/// Router que mapea (método, patrón) a handlers
pub struct Router {
    routes: Vec<(Method, Pattern, Handler)>,
}

impl Router {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Router con la tabla fija de rutas de libros
    ///
    /// El orden importa: es el orden de evaluación.
    pub fn books() -> Self {
        let mut router = Self::new();
        router.register_exact(Method::GET, "/books", handlers::list_books);
        router.register_with_id(Method::GET, "/books/", handlers::get_book);
        router.register_exact(Method::POST, "/books", handlers::create_book);
        router.register_with_id(Method::PUT, "/books/", handlers::update_book);
        router.register_with_id(Method::DELETE, "/books/", handlers::delete_book);
        router
    }

    /// Registra una ruta que debe coincidir exactamente
    pub fn register_exact(&mut self, method: Method, path: &str, handler: Handler) {
        self.routes
            .push((method, Pattern::Exact(path.to_string()), handler));
    }

    /// Registra una ruta `prefix{id}`
    pub fn register_with_id(&mut self, method: Method, prefix: &str, handler: Handler) {
        self.routes
            .push((method, Pattern::WithId(prefix.to_string()), handler));
    }

    /// Busca el primer handler que coincide, sin ejecutarlo
    pub fn resolve(&self, method: Method, path: &str) -> Option<(Handler, PathId)> {
        self.routes
            .iter()
            .filter(|(route_method, _, _)| *route_method == method)
            .find_map(|(_, pattern, handler)| pattern.matches(path).map(|id| (*handler, id)))
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    ///
    /// Si no encuentra un handler retorna 404 con `{}`.
    pub fn route(&self, request: &Request, store: &dyn BookStore) -> Response {
        match self.resolve(request.method(), request.path()) {
            Some((handler, id)) => handler(request, id, store),
            None => Response::not_found(),
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::books()
    }
}
