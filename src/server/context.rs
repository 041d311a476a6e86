//! # Contexto Compartido del Servidor
//! src/server/context.rs
//!
//! Todo el estado que comparten el acceptor, los workers y la consola. Se
//! construye una vez y cada thread recibe su propio clon (los `Arc` apuntan
//! a la misma señal, la misma cola, el mismo router).

use super::connection::Connection;
use super::queue::WorkQueue;
use super::shutdown::ShutdownSignal;
use crate::http::RequestReader;
use crate::metrics::MetricsCollector;
use crate::router::Router;
use std::sync::Arc;

#[derive(Clone)]
pub struct ServerContext {
    pub shutdown: Arc<ShutdownSignal>,
    pub queue: Arc<WorkQueue<Connection>>,
    pub router: Arc<Router>,
    pub metrics: Arc<MetricsCollector>,
    pub reader: RequestReader,
}

impl ServerContext {
    pub fn new(router: Router, reader: RequestReader) -> Self {
        Self {
            shutdown: Arc::new(ShutdownSignal::new()),
            queue: Arc::new(WorkQueue::new()),
            router: Arc::new(router),
            metrics: Arc::new(MetricsCollector::new()),
            reader,
        }
    }

    /// Activa la señal de apagado y despierta a los workers en espera.
    /// Retorna `true` sólo la primera vez.
    pub fn request_shutdown(&self) -> bool {
        let first = self.shutdown.trigger();
        self.queue.wake_all();
        first
    }
}
