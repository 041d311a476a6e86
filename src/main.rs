//! # corepool_http - Entry Point
//! src/main.rs
//!
//! Arranca el servidor y espera el comando `<die>` en la consola.

use anyhow::{Context, Result};
use corepool_http::config::Config;
use corepool_http::server::{console, Server};
use std::io;
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = Config::new();

    // RUST_LOG tiene prioridad sobre --log-level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("nivel de log inválido")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .init();

    info!("corepool_http v{}", env!("CARGO_PKG_VERSION"));
    config.print_summary();

    let server = Server::new(config).context("no se pudo construir el servidor")?;
    let handle = server.start().context("no se pudo iniciar el servidor")?;

    let context = handle.context().clone();
    let metrics = Arc::clone(&context.metrics);
    let console = thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            console::watch(io::stdin().lock(), move || {
                context.request_shutdown();
            })
        });
    if let Err(e) = console {
        warn!(error = %e, "no se pudo lanzar la consola; el servidor no podrá apagarse con <die>");
    }

    let snapshot = handle.join();
    info!(total_requests = snapshot.total_requests, "servidor apagado");
    match metrics.to_json() {
        Ok(json) => info!("métricas finales:\n{}", json),
        Err(e) => warn!(error = %e, "no se pudieron serializar las métricas"),
    }

    Ok(())
}
