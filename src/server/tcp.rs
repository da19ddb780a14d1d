//! # Servidor TCP
//! src/server/tcp.rs
//!
//! Acepta conexiones y las entrega al pool de workers. Cada worker atiende
//! una conexión completa: parsea un request, lo enruta, escribe una
//! respuesta y cierra.

use crate::config::Config;
use crate::http::{ParseError, ParseLimits, Request};
use crate::router::Router;
use crate::server::pool::WorkerPool;
use crate::store::{self, BookStore, StorageError};
use std::io::{self, BufReader};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

/// Errores fatales de arranque
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to open store: {0}")]
    Store(#[from] StorageError),

    #[error("failed to start workers: {0}")]
    Workers(#[source] io::Error),
}

/// Lo que un worker necesita para atender una conexión
pub struct ConnectionContext {
    pub router: Router,
    pub store: Arc<dyn BookStore>,
    pub limits: ParseLimits,
    pub read_timeout: Duration,
}

/// Servidor HTTP de libros
pub struct Server {
    listener: TcpListener,
    context: ConnectionContext,
    workers: usize,
    queue_capacity: usize,
}

impl Server {
    /// Abre el store que pide la configuración y luego el socket
    ///
    /// Falla si la configuración es inválida, si el store no abre o si el
    /// puerto está ocupado.
    pub fn open(config: &Config) -> Result<Self, ServerError> {
        config.validate().map_err(ServerError::Config)?;
        let store = store::open(config)?;
        Self::bind(config, store)
    }

    /// Valida la configuración y abre el socket de escucha
    ///
    /// Un fallo de bind es fatal: se retorna y el llamador aborta.
    pub fn bind(config: &Config, store: Arc<dyn BookStore>) -> Result<Self, ServerError> {
        config.validate().map_err(ServerError::Config)?;

        let address = config.address();
        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

        tracing::info!(address = %address, "server listening");

        Ok(Self {
            listener,
            context: ConnectionContext {
                router: Router::books(),
                store,
                limits: config.parse_limits(),
                read_timeout: config.read_timeout(),
            },
            workers: config.workers,
            queue_capacity: config.queue_capacity,
        })
    }

    /// Dirección real del socket (útil con puerto 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Loop de aceptación; no retorna mientras el listener siga abierto
    ///
    /// Un error al aceptar una conexión se registra y el loop continúa.
    pub fn run(self) -> Result<(), ServerError> {
        let context = Arc::new(self.context);
        let pool = WorkerPool::spawn(self.workers, self.queue_capacity, move |stream: TcpStream| {
            handle_connection(stream, &context)
        })
        .map_err(ServerError::Workers)?;

        tracing::info!(
            workers = pool.workers(),
            queue_capacity = pool.queue().max_capacity(),
            "accepting connections"
        );

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    tracing::trace!(queued = pool.queue().len(), "connection accepted");
                    if pool.submit(stream).is_err() {
                        tracing::warn!("worker pool closed, dropping connection");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to accept connection");
                }
            }
        }

        pool.shutdown();
        Ok(())
    }
}

/// Atiende una conexión de principio a fin
///
/// Escribe exactamente una respuesta, salvo que la request line sea
/// inválida: en ese caso la conexión se cierra sin responder.
pub fn handle_connection(stream: TcpStream, context: &ConnectionContext) {
    let start = Instant::now();
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let span = tracing::info_span!("request", id = %Uuid::new_v4(), peer = %peer);
    let _guard = span.enter();

    if let Err(e) = stream.set_read_timeout(Some(context.read_timeout)) {
        tracing::warn!(error = %e, "failed to set read timeout");
    }

    let mut reader = BufReader::new(stream);
    let request = match Request::read_from(&mut reader, context.limits) {
        Ok(request) => request,
        Err(ParseError::ConnectionClosed) => {
            tracing::debug!("peer closed without sending a request");
            return;
        }
        Err(e) => {
            tracing::warn!(error = %e, "closing connection without response");
            return;
        }
    };

    tracing::info!(method = request.method().as_str(), path = request.path(), "request received");

    let response = context.router.route(&request, context.store.as_ref());

    let mut stream = reader.into_inner();
    if let Err(e) = response.write_to(&mut stream) {
        tracing::warn!(error = %e, "failed to write response");
        return;
    }
    let _ = stream.shutdown(Shutdown::Write);

    let status = response.status();
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    if status.is_server_error() {
        tracing::error!(status = %status, latency_ms, "response sent");
    } else {
        tracing::info!(status = %status, latency_ms, "response sent");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryBookStore;
    use std::io::{Read, Write};
    use std::thread;

    fn test_context() -> Arc<ConnectionContext> {
        Arc::new(ConnectionContext {
            router: Router::books(),
            store: Arc::new(InMemoryBookStore::new()),
            limits: ParseLimits::default(),
            read_timeout: Duration::from_secs(5),
        })
    }

    /// Acepta una conexión en un thread, manda `raw` y retorna lo recibido
    fn exchange(context: Arc<ConnectionContext>, raw: &[u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handle_connection(stream, &context);
        });

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(raw).unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        server.join().unwrap();

        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn test_handle_connection_list() {
        let text = exchange(test_context(), b"GET /books HTTP/1.1\r\n\r\n");

        assert_eq!(text, "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n[]");
    }

    #[test]
    fn test_handle_connection_create_without_length() {
        let raw = b"POST /books HTTP/1.1\r\n\r\n{\"title\":\"Dune\",\"author\":\"Herbert\",\"year\":1965}";
        let text = exchange(test_context(), raw);

        assert!(text.starts_with("HTTP/1.1 201 Created\r\n"));
        assert!(text.ends_with(r#"{"id":1,"title":"Dune","author":"Herbert","year":1965}"#));
    }

    #[test]
    fn test_handle_connection_malformed_line() {
        let text = exchange(test_context(), b"GARBAGE\r\n\r\n");
        assert!(text.is_empty());
    }

    #[test]
    fn test_handle_connection_double_space_is_not_found() {
        let text = exchange(test_context(), b"GET  /books HTTP/1.1\r\n\r\n");

        assert_eq!(text, "HTTP/1.1 404 Not Found\r\nContent-Type: application/json\r\n\r\n{}");
    }

    #[test]
    fn test_handle_connection_short_body() {
        let raw = b"POST /books HTTP/1.1\r\nContent-Length: 100\r\n\r\n{\"title\":\"A\",\"author\":\"B\",\"year\":1}";
        let text = exchange(test_context(), raw);

        assert!(text.starts_with("HTTP/1.1 201 Created\r\n"));
        assert!(text.ends_with(r#"{"id":1,"title":"A","author":"B","year":1}"#));
    }

    #[test]
    fn test_stalled_client_releases_worker() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 0;
        config.workers = 1;
        config.read_timeout_ms = 300;

        let server = Server::bind(&config, Arc::new(InMemoryBookStore::new())).expect("bind");
        let addr = server.local_addr().unwrap();
        thread::spawn(move || server.run());

        // Conecta y no manda nada: ocupa el único worker
        let stalled = TcpStream::connect(addr).unwrap();
        thread::sleep(Duration::from_millis(50));

        let mut client = TcpStream::connect(addr).unwrap();
        client.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        client.write_all(b"GET /books HTTP/1.1\r\n\r\n").unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        let started = Instant::now();
        let mut text = String::new();
        client.read_to_string(&mut text).unwrap();

        assert_eq!(text, "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n[]");
        assert!(started.elapsed() < Duration::from_secs(5));
        drop(stalled);
    }

    #[test]
    fn test_open_in_memory() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 0;
        config.in_memory = true;

        let server = Server::open(&config).expect("open");
        assert!(server.local_addr().unwrap().port() > 0);
    }

    #[test]
    fn test_open_store_failure_is_fatal() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 0;
        config.database = std::env::temp_dir()
            .join("books_server_missing_dir")
            .join("nested")
            .join("books.db")
            .to_string_lossy()
            .into_owned();

        let result = Server::open(&config);
        assert!(matches!(result, Err(ServerError::Store(_))));
    }

    #[test]
    fn test_handle_connection_peer_closed_immediately() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().unwrap();
        let context = test_context();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handle_connection(stream, &context);
        });

        drop(TcpStream::connect(addr).unwrap());
        server.join().unwrap();
    }

    #[test]
    fn test_bind_rejects_invalid_config() {
        let mut config = Config::default();
        config.workers = 0;

        let result = Server::bind(&config, Arc::new(InMemoryBookStore::new()));
        assert!(matches!(result, Err(ServerError::Config(_))));
    }

    #[test]
    fn test_bind_port_in_use_is_fatal() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = taken.local_addr().unwrap().port();

        let result = Server::bind(&config, Arc::new(InMemoryBookStore::new()));
        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }
}
