//! # Books Server - Entry Point
//! src/main.rs
//!
//! Lee la configuración, inicializa el logging, abre el store y arranca el
//! servidor. Cualquier error de arranque termina el proceso con código 1.

use books_server::config::Config;
use books_server::server::Server;
use books_server::telemetry;

fn main() {
    let config = Config::new();
    telemetry::init(&config.log_level);
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "invalid configuration");
        std::process::exit(1);
    }
    config.log_summary();

    let server = match Server::open(&config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "startup aborted");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
