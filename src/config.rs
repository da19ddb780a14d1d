//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración por argumentos CLI con variables de entorno como respaldo.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./books_server --port 8070 \
//!   --database ./books.db \
//!   --workers 16 \
//!   --queue-capacity 128
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! BOOKS_PORT=9000 BOOKS_IN_MEMORY=true ./books_server
//! ```

use crate::http::ParseLimits;
use clap::Parser;
use std::time::Duration;

/// Configuración del servidor de libros
#[derive(Debug, Clone, Parser)]
#[command(name = "books_server")]
#[command(about = "Servidor HTTP minimo con CRUD de libros")]
#[command(version)]
pub struct Config {
    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "BOOKS_HOST")]
    pub host: String,

    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8070", env = "BOOKS_PORT")]
    pub port: u16,

    /// Archivo SQLite con la tabla `books`
    #[arg(long, default_value = "books.db", env = "BOOKS_DATABASE")]
    pub database: String,

    /// Usa un store en memoria en vez de SQLite (se pierde al reiniciar)
    #[arg(long, env = "BOOKS_IN_MEMORY")]
    pub in_memory: bool,

    // === Workers ===
    /// Threads que atienden conexiones
    #[arg(long, default_value = "16", env = "BOOKS_WORKERS")]
    pub workers: usize,

    /// Conexiones aceptadas que pueden esperar un worker
    #[arg(long = "queue-capacity", default_value = "128", env = "BOOKS_QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    // === Límites ===
    /// Tiempo máximo esperando la request line y headers (milisegundos)
    #[arg(long = "read-timeout-ms", default_value = "30000", env = "BOOKS_READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    /// Tamaño máximo del body
    #[arg(long = "max-body-bytes", default_value = "1048576", env = "BOOKS_MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    /// Nivel de log por defecto; `RUST_LOG` tiene prioridad
    #[arg(long = "log-level", default_value = "info", env = "BOOKS_LOG")]
    pub log_level: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use books_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8070");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn parse_limits(&self) -> ParseLimits {
        ParseLimits {
            max_body_bytes: self.max_body_bytes,
        }
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("Workers must be >= 1".to_string());
        }
        if self.queue_capacity == 0 {
            return Err("Queue capacity must be >= 1".to_string());
        }
        if self.read_timeout_ms == 0 {
            return Err("Read timeout must be > 0".to_string());
        }
        if self.max_body_bytes == 0 {
            return Err("Max body bytes must be >= 1".to_string());
        }
        if !self.in_memory && self.database.trim().is_empty() {
            return Err("Database path must not be empty".to_string());
        }

        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn log_summary(&self) {
        let store = if self.in_memory {
            "memory".to_string()
        } else {
            format!("sqlite:{}", self.database)
        };

        tracing::info!(
            address = %self.address(),
            store = %store,
            workers = self.workers,
            queue_capacity = self.queue_capacity,
            read_timeout_ms = self.read_timeout_ms,
            max_body_bytes = self.max_body_bytes,
            "configuration loaded"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8070,
            database: "books.db".to_string(),
            in_memory: false,
            workers: 16,
            queue_capacity: 128,
            read_timeout_ms: 30_000,
            max_body_bytes: 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8070);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.workers, 16);
        assert!(!config.in_memory);
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_parse_from_args() {
        let config = Config::try_parse_from([
            "books_server",
            "--port",
            "9000",
            "--in-memory",
            "--workers",
            "4",
            "--max-body-bytes",
            "512",
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert!(config.in_memory);
        assert_eq!(config.workers, 4);
        assert_eq!(config.parse_limits().max_body_bytes, 512);
    }

    #[test]
    fn test_validate_success() {
        assert!(Config::default().validate().is_ok());
    }

    // ==================== Validation ====================

    #[test]
    fn test_validate_invalid_workers() {
        let mut config = Config::default();
        config.workers = 0;
        let result = config.validate();
        assert!(result.unwrap_err().contains("Workers"));
    }

    #[test]
    fn test_validate_invalid_queue_capacity() {
        let mut config = Config::default();
        config.queue_capacity = 0;
        assert!(config.validate().unwrap_err().contains("Queue capacity"));
    }

    #[test]
    fn test_validate_invalid_timeout() {
        let mut config = Config::default();
        config.read_timeout_ms = 0;
        assert!(config.validate().unwrap_err().contains("Read timeout"));
    }

    #[test]
    fn test_validate_invalid_body_limit() {
        let mut config = Config::default();
        config.max_body_bytes = 0;
        assert!(config.validate().unwrap_err().contains("Max body"));
    }

    #[test]
    fn test_validate_empty_database_only_matters_for_sqlite() {
        let mut config = Config::default();
        config.database = "  ".to_string();
        assert!(config.validate().is_err());

        config.in_memory = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_read_timeout_duration() {
        let config = Config::default();
        assert_eq!(config.read_timeout(), Duration::from_secs(30));
    }
}
