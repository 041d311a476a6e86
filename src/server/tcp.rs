//! # Servidor TCP con Pool Fijo de Workers
//! src/server/tcp.rs
//!
//! Arma el pipeline completo:
//!
//! ```text
//! Acceptor ──push──▶ WorkQueue ──pop_timeout──▶ Worker 0..N
//! ```
//!
//! El tamaño del pool se fija al arrancar (por defecto, un worker por core)
//! y no cambia. El único error fatal es no poder hacer bind del puerto.

use super::acceptor::Acceptor;
use super::context::ServerContext;
use super::worker::Worker;
use crate::config::Config;
use crate::http::RequestReader;
use crate::metrics::MetricsSnapshot;
use crate::router::{Router, Site};
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};
use tracing::{error, info};

/// Errores al construir o arrancar el servidor
#[derive(Debug)]
pub enum ServerError {
    /// La configuración no pasó la validación
    InvalidConfig(String),

    /// El patrón de /multiply no compiló
    Router(regex::Error),

    /// No se pudo hacer bind del listener
    Bind { address: String, source: io::Error },

    /// No se pudo lanzar un thread
    Spawn(io::Error),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            ServerError::Router(e) => write!(f, "Could not build routes: {}", e),
            ServerError::Bind { address, source } => write!(f, "Error binding to {}: {}", address, source),
            ServerError::Spawn(e) => write!(f, "Could not spawn thread: {}", e),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::InvalidConfig(_) => None,
            ServerError::Router(e) => Some(e),
            ServerError::Bind { source, .. } => Some(source),
            ServerError::Spawn(e) => Some(e),
        }
    }
}

/// Servidor HTTP/1.1 listo para arrancar
pub struct Server {
    config: Config,
    context: ServerContext,
}

impl Server {
    /// Valida la configuración y construye la tabla de rutas estándar
    pub fn new(config: Config) -> Result<Self, ServerError> {
        config.validate().map_err(ServerError::InvalidConfig)?;
        let router = Router::standard(Site::from_config(&config)).map_err(ServerError::Router)?;
        Ok(Self::with_router(config, router))
    }

    /// Servidor con un router arbitrario
    pub fn with_router(config: Config, router: Router) -> Self {
        let reader = RequestReader::new(config.max_body_bytes);
        Self {
            context: ServerContext::new(router, reader),
            config,
        }
    }

    pub fn context(&self) -> &ServerContext {
        &self.context
    }

    /// Hace bind, lanza el acceptor y los N workers, y retorna sin bloquear
    pub fn start(self) -> Result<ServerHandle, ServerError> {
        let address = self.config.address();
        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

        let acceptor = Acceptor::new(
            listener,
            self.context.queue.clone(),
            self.context.shutdown.clone(),
            self.config.accept_timeout(),
            self.config.accept_poll(),
        )
        .map_err(|source| ServerError::Bind { address: address.clone(), source })?;
        let local_addr = acceptor
            .local_addr()
            .map_err(|source| ServerError::Bind { address, source })?;

        let pool_size = self.config.worker_count();
        info!(%local_addr, workers = pool_size, "servidor escuchando");

        let mut handle = ServerHandle {
            local_addr,
            context: self.context.clone(),
            acceptor: None,
            workers: Vec::with_capacity(pool_size),
            pool_size,
            dequeue_timeout: self.config.dequeue_timeout(),
        };

        for id in 0..pool_size {
            let worker = Worker::new(id, self.context.clone(), self.config.dequeue_timeout());
            match worker.spawn() {
                Ok(join) => handle.workers.push(join),
                Err(e) => {
                    handle.abort();
                    return Err(ServerError::Spawn(e));
                }
            }
        }

        let spawned = thread::Builder::new()
            .name("acceptor".to_string())
            .spawn(move || acceptor.run());
        match spawned {
            Ok(join) => handle.acceptor = Some(join),
            Err(e) => {
                handle.abort();
                return Err(ServerError::Spawn(e));
            }
        }

        Ok(handle)
    }
}

/// Servidor corriendo
pub struct ServerHandle {
    local_addr: SocketAddr,
    context: ServerContext,
    acceptor: Option<JoinHandle<()>>,
    workers: Vec<JoinHandle<()>>,
    pool_size: usize,
    dequeue_timeout: std::time::Duration,
}

impl ServerHandle {
    /// Dirección real del listener (útil con puerto 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn worker_count(&self) -> usize {
        self.pool_size
    }

    pub fn context(&self) -> &ServerContext {
        &self.context
    }

    /// Pide el apagado; no espera a que terminen los threads
    pub fn shutdown(&self) {
        self.context.request_shutdown();
    }

    /// Espera a que terminen el acceptor y todos los workers
    ///
    /// Bloquea hasta que alguien pida el apagado. Las conexiones que el
    /// acceptor alcanzó a encolar después de que los workers salieron se
    /// atienden aquí, con el índice N (uno más que el último worker).
    pub fn join(mut self) -> MetricsSnapshot {
        if let Some(acceptor) = self.acceptor.take() {
            if acceptor.join().is_err() {
                error!("el thread del acceptor terminó con panic");
            }
        }

        for (id, worker) in self.workers.drain(..).enumerate() {
            if worker.join().is_err() {
                error!(worker = id, "el thread del worker terminó con panic");
            }
        }

        let leftovers = Worker::new(self.pool_size, self.context.clone(), self.dequeue_timeout).drain();
        if leftovers > 0 {
            info!(leftovers, "conexiones rezagadas atendidas durante el apagado");
        }

        info!("servidor detenido");
        self.context.metrics.snapshot()
    }

    /// Apaga y espera
    pub fn stop(self) -> MetricsSnapshot {
        self.shutdown();
        self.join()
    }

    /// Arranque fallido: detiene lo que alcanzó a lanzarse
    fn abort(&mut self) {
        self.context.request_shutdown();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpStream;

    fn test_config() -> Config {
        Config {
            port: 0,
            workers: 2,
            accept_timeout_ms: 200,
            dequeue_timeout_ms: 100,
            accept_poll_ms: 5,
            root_dir: std::env::temp_dir().to_string_lossy().into_owned(),
            index_file: "corepool-missing-index.html".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = test_config();
        config.dequeue_timeout_ms = 0;
        assert!(matches!(Server::new(config), Err(ServerError::InvalidConfig(_))));
    }

    #[test]
    fn test_bind_failure_is_reported() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut config = test_config();
        config.port = taken.local_addr().unwrap().port();

        let result = Server::new(config).unwrap().start();
        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }

    #[test]
    fn test_start_and_stop() {
        let handle = Server::new(test_config()).unwrap().start().unwrap();
        assert_eq!(handle.worker_count(), 2);

        let mut client = TcpStream::connect(handle.local_addr()).unwrap();
        client.write_all(b"GET /google HTTP/1.1\r\n\r\n").unwrap();
        let mut text = String::new();
        client.read_to_string(&mut text).unwrap();
        assert!(text.starts_with("HTTP/1.1 301 Moved Permanently\r\n"));

        let snapshot = handle.stop();
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.status_codes.get(&301), Some(&1));
    }
}
