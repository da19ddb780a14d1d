//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Parser escrito a mano que lee exactamente un request desde el stream de
//! una conexión.
//!
//! ## Formato esperado
//!
//! ```text
//! POST /books HTTP/1.1\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 48\r\n
//! \r\n
//! {"title":"Dune","author":"Herbert","year":1965}
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: se parte en los dos primeros espacios para obtener
//!    método y path. Con menos de dos tokens el request es inválido y la
//!    conexión se cierra sin respuesta.
//! 2. **Headers**: sólo interesa `Content-Length`, el resto se guarda pero
//!    no se interpreta.
//! 3. **Body**: sólo para POST y PUT. Si hay `Content-Length` se leen
//!    exactamente esos bytes; si no, se lee lo que ya esté disponible en el
//!    socket sin bloquear (ver [`Nonblocking`]).

use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Cursor, ErrorKind, Read};
use std::net::TcpStream;
use thiserror::Error;

/// Largo máximo de una línea de request o de header
const MAX_LINE_BYTES: u64 = 8 * 1024;

/// Cantidad máxima de headers aceptados
const MAX_HEADERS: usize = 100;

/// Métodos HTTP que entiende el router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Listar o leer un libro
    GET,

    /// POST - Crear un libro
    POST,

    /// PUT - Reemplazar un libro
    PUT,

    /// DELETE - Borrar un libro
    DELETE,

    /// Cualquier otro método; siempre termina en 404
    Unsupported,
}

impl Method {
    /// La comparación es exacta y sensible a mayúsculas
    fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            _ => Method::Unsupported,
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::Unsupported => "UNSUPPORTED",
        }
    }

    /// Sólo los métodos de escritura llevan body
    pub fn has_body(&self) -> bool {
        matches!(self, Method::POST | Method::PUT)
    }
}

/// Errores que pueden ocurrir durante el parsing
///
/// Ninguno produce respuesta: la conexión simplemente se cierra.
#[derive(Debug, Error)]
pub enum ParseError {
    /// El peer cerró sin mandar nada
    #[error("connection closed before request line")]
    ConnectionClosed,

    /// Menos de dos tokens en la request line
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    /// Demasiados headers o una línea demasiado larga
    #[error("request head exceeds limits")]
    HeadTooLarge,

    /// El body declarado o leído supera el máximo configurado
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// Falla de lectura del socket (incluye timeouts)
    #[error("i/o error while reading request: {0}")]
    Io(#[from] io::Error),
}

/// Streams que pueden pasar a modo no bloqueante mientras se drena el body
///
/// Se usa cuando el cliente no manda `Content-Length`: se lee sólo lo que
/// ya llegó, y cualquier lectura que tendría que esperar termina el body.
pub trait Nonblocking {
    fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()>;
}

impl Nonblocking for TcpStream {
    fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        TcpStream::set_nonblocking(self, nonblocking)
    }
}

// Un buffer en memoria nunca bloquea: EOF marca el final del body.
impl<T> Nonblocking for Cursor<T> {
    fn set_nonblocking(&self, _nonblocking: bool) -> io::Result<()> {
        Ok(())
    }
}

/// Límites aplicados por el parser
#[derive(Debug, Clone, Copy)]
pub struct ParseLimits {
    /// Máximo de bytes de body aceptados
    pub max_body_bytes: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Representa un request parseado
///
/// Vive lo que dura la conexión y se descarta después de responder.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,

    /// Path tal como llegó (query string incluido)
    path: String,

    /// Body sin espacios alrededor; vacío para GET y DELETE
    body: Vec<u8>,
}

impl Request {
    /// Lee un request completo desde el stream de la conexión
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use books_server::http::request::{Method, ParseLimits, Request};
    /// use std::io::{BufReader, Cursor};
    ///
    /// let raw = "POST /books HTTP/1.1\r\n\r\n{\"title\":\"Dune\"}\r\n";
    /// let mut reader = BufReader::new(Cursor::new(raw.as_bytes().to_vec()));
    /// let request = Request::read_from(&mut reader, ParseLimits::default()).unwrap();
    ///
    /// assert_eq!(request.method(), Method::POST);
    /// assert_eq!(request.body(), br#"{"title":"Dune"}"#);
    /// ```
    pub fn read_from<R>(reader: &mut BufReader<R>, limits: ParseLimits) -> Result<Self, ParseError>
    where
        R: Read + Nonblocking,
    {
        // 1. Request line
        let line = read_line(reader)?.ok_or(ParseError::ConnectionClosed)?;
        let (method, path) = Self::parse_request_line(&line)?;

        // 2. Headers hasta la línea vacía (o EOF)
        let headers = Self::read_headers(reader)?;

        // 3. Body sólo para POST/PUT
        let body = if method.has_body() {
            let declared = headers
                .get("content-length")
                .and_then(|value| value.trim().parse::<usize>().ok());
            match declared {
                Some(length) => read_exact_body(reader, length, limits.max_body_bytes)?,
                None => read_available_body(reader, limits.max_body_bytes)?,
            }
        } else {
            Vec::new()
        };

        Ok(Request {
            method,
            path,
            body: body.trim_ascii().to_vec(),
        })
    }

    /// Parsea un request que ya está completo en memoria
    pub fn parse(raw: &[u8]) -> Result<Self, ParseError> {
        let mut reader = BufReader::new(Cursor::new(raw));
        Self::read_from(&mut reader, ParseLimits::default())
    }

    /// Formato: `METHOD PATH [resto]`, partido en los dos primeros espacios
    ///
    /// Con un espacio doble el path queda vacío y el router responde 404.
    /// Los espacios finales no cuentan como separador.
    fn parse_request_line(line: &str) -> Result<(Method, String), ParseError> {
        let mut parts = line.trim_end_matches(' ').splitn(3, ' ');
        let method = parts.next().unwrap_or_default();

        match parts.next() {
            Some(path) if !method.is_empty() => Ok((Method::parse(method), path.to_string())),
            _ => Err(ParseError::MalformedRequestLine(line.to_string())),
        }
    }

    /// Lee headers `Name: Value`; las líneas sin ':' se ignoran
    fn read_headers<R: Read>(reader: &mut BufReader<R>) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for _ in 0..=MAX_HEADERS {
            let line = match read_line(reader)? {
                Some(line) => line,
                None => return Ok(headers),
            };

            if line.is_empty() {
                return Ok(headers);
            }

            if let Some((name, value)) = line.split_once(':') {
                headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
            }
        }

        Err(ParseError::HeadTooLarge)
    }

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> Method {
        self.method
    }

    /// Obtiene el path del request
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Lee una línea sin su terminador. `None` si el stream ya terminó.
fn read_line<R: Read>(reader: &mut BufReader<R>) -> Result<Option<String>, ParseError> {
    let mut buf = Vec::new();
    let n = reader.by_ref().take(MAX_LINE_BYTES).read_until(b'\n', &mut buf)?;

    if n == 0 {
        return Ok(None);
    }
    if !buf.ends_with(b"\n") && n as u64 == MAX_LINE_BYTES {
        return Err(ParseError::HeadTooLarge);
    }

    strip_terminator(&mut buf);
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

fn strip_terminator(buf: &mut Vec<u8>) {
    if buf.ends_with(b"\n") {
        buf.pop();
    }
    if buf.ends_with(b"\r") {
        buf.pop();
    }
}

/// Body enmarcado por `Content-Length`
///
/// Si el peer cierra antes, se queda con lo que llegó.
fn read_exact_body<R: Read>(
    reader: &mut BufReader<R>,
    length: usize,
    limit: usize,
) -> Result<Vec<u8>, ParseError> {
    if length > limit {
        return Err(ParseError::BodyTooLarge { limit });
    }

    let mut body = Vec::with_capacity(length);
    reader.by_ref().take(length as u64).read_to_end(&mut body)?;
    Ok(body)
}

/// Body sin `Content-Length`: lee líneas mientras haya datos disponibles
///
/// Concatena las líneas sin sus terminadores. Sólo es correcto si el
/// cliente mandó todo el body antes de que empiece la lectura.
fn read_available_body<R>(reader: &mut BufReader<R>, limit: usize) -> Result<Vec<u8>, ParseError>
where
    R: Read + Nonblocking,
{
    reader.get_ref().set_nonblocking(true)?;
    let drained = drain_lines(reader, limit);
    reader.get_ref().set_nonblocking(false)?;
    drained
}

fn drain_lines<R: Read>(reader: &mut BufReader<R>, limit: usize) -> Result<Vec<u8>, ParseError> {
    let mut body = Vec::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        let remaining = (limit - body.len()) as u64 + 2;
        let outcome = reader.by_ref().take(remaining).read_until(b'\n', &mut line);

        let done = match outcome {
            Ok(0) => true,
            Ok(_) => false,
            Err(e) if e.kind() == ErrorKind::WouldBlock => true,
            Err(e) if e.kind() == ErrorKind::Interrupted => false,
            Err(e) => return Err(ParseError::Io(e)),
        };

        // read_until deja en `line` lo leído aunque termine con WouldBlock
        strip_terminator(&mut line);
        body.extend_from_slice(&line);
        if body.len() > limit {
            return Err(ParseError::BodyTooLarge { limit });
        }

        if done {
            return Ok(body);
        }
    }
}
