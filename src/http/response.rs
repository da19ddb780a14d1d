//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Todas las respuestas del servidor tienen la misma forma fija:
//!
//! ```text
//! HTTP/1.1 201 Created\r\n
//! Content-Type: application/json\r\n
//! \r\n
//! {"id":1,"title":"Dune","author":"Herbert","year":1965}
//! ```
//!
//! No se agrega `Content-Length` ni `Connection`: el fin del body lo marca
//! el cierre de la conexión.

use super::StatusCode;
use std::io::{self, Write};

/// Body usado por las respuestas que no llevan datos
pub const EMPTY_OBJECT: &str = "{}";

/// Representa una respuesta HTTP completa
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,

    /// Cuerpo JSON, se escribe tal cual
    body: String,
}

impl Response {
    /// Crea una respuesta con el código y body dados
    ///
    /// # Ejemplo
    /// ```
    /// use books_server::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok, "[]");
    /// assert_eq!(response.body(), "[]");
    /// ```
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Respuesta con body `{}`
    pub fn empty(status: StatusCode) -> Self {
        Self::new(status, EMPTY_OBJECT)
    }

    /// 404 con body `{}`, la respuesta de toda ruta desconocida
    pub fn not_found() -> Self {
        Self::empty(StatusCode::NotFound)
    }

    /// Crea una respuesta de error con mensaje JSON
    ///
    /// Formato del JSON: `{"error":"mensaje"}`. El mensaje se serializa con
    /// `serde_json` para que comillas o barras queden escapadas.
    ///
    /// # Ejemplo
    /// ```
    /// use books_server::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::BadRequest, "Empty JSON body");
    /// assert_eq!(response.body(), r#"{"error":"Empty JSON body"}"#);
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self::new(status, body)
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// - Status line: `HTTP/1.1 200 OK\r\n`
    /// - Header único: `Content-Type: application/json\r\n`
    /// - Línea vacía: `\r\n`
    /// - Body sin modificar
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\n\r\n",
            self.status.as_u16(),
            self.status.reason_phrase()
        );

        let mut result = Vec::with_capacity(head.len() + self.body.len());
        result.extend_from_slice(head.as_bytes());
        result.extend_from_slice(self.body.as_bytes());
        result
    }

    /// Escribe la respuesta completa y hace flush
    ///
    /// No reintenta: si la escritura falla el error vuelve al llamador,
    /// que lo registra y cierra la conexión.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.to_bytes())?;
        out.flush()
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene el body
    pub fn body(&self) -> &str {
        &self.body
    }
}
