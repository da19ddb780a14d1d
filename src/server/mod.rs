//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes y las encola
//! 3. Un worker por conexión lee, enruta y responde
//! 4. Cierra la conexión después de una respuesta

pub mod pool;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use tcp::{Server, ServerError};
