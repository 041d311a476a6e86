//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Pipeline productor/consumidor:
//! 1. `acceptor`: acepta conexiones y las encola
//! 2. `queue`: cola FIFO sin límite, con dequeue bloqueante y timeout
//! 3. `worker`: pool fijo de threads que atienden una conexión a la vez
//! 4. `shutdown` / `console`: apagado cooperativo con `<die>`

pub mod acceptor;
pub mod connection;
pub mod console;
pub mod context;
pub mod queue;
pub mod shutdown;
pub mod tcp;
pub mod worker;

// Re-exportar para facilitar el uso
pub use connection::Connection;
pub use context::ServerContext;
pub use queue::WorkQueue;
pub use shutdown::ShutdownSignal;
pub use tcp::{Server, ServerError, ServerHandle};
pub use worker::Worker;
