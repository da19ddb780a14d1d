//! # Books Server
//! src/lib.rs
//!
//! Servidor HTTP mínimo con operaciones CRUD sobre una tabla `books`,
//! implementado sin framework web: el parsing del request, el routing y
//! la escritura de la respuesta están hechos a mano.
//!
//! ## Arquitectura
//!
//! ```text
//! accept → cola → worker → Request → Router → handler → BookStore
//!                                                  ↓
//!                                   close ← Response
//! ```
//!
//! - `http`: Parsing de requests y construcción de responses
//! - `router`: Enrutamiento por método y path, decodifica `{id}`
//! - `books`: Modelo `Book`, validación de payloads y handlers CRUD
//! - `store`: Acceso a datos (SQLite o memoria)
//! - `server`: Listener TCP y pool de workers
//! - `config`: Argumentos CLI y variables de entorno
//! - `telemetry`: Logging estructurado
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use books_server::config::Config;
//! use books_server::server::Server;
//! use books_server::store::InMemoryBookStore;
//! use std::sync::Arc;
//!
//! let config = Config::default();
//! let server = Server::bind(&config, Arc::new(InMemoryBookStore::new())).unwrap();
//! server.run().unwrap();
//! ```

pub mod books;
pub mod config;
pub mod http;
pub mod router;
pub mod server;
pub mod store;
pub mod telemetry;
