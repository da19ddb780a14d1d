//! # Módulo HTTP
//!
//! Implementa, sin framework, la parte del protocolo que necesita el
//! servidor de libros:
//!
//! - Parsing de la request line, headers y body
//! - Construcción de responses con un único header fijo
//! - Códigos de estado
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: application/json\r\n
//! \r\n
//! []
//! ```
//!
//! No hay keep-alive ni chunked: un request por conexión.

pub mod request;
pub mod response;
pub mod status;

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{Method, ParseError, ParseLimits, Request};
pub use response::Response;
pub use status::StatusCode;
