//! Logging estructurado.
//!
//! `tracing` con un layer `fmt` y filtro por `EnvFilter`. `RUST_LOG` tiene
//! prioridad sobre el nivel configurado. Cada conexión abre su propio span
//! `request` con un id único, así todas las líneas de un request se pueden
//! correlacionar.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Inicializa el subscriber global
///
/// Llamarla más de una vez no falla: la segunda llamada se ignora.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_thread_names(true))
        .try_init();
}
