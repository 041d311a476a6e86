//! # Conexión Aceptada
//! src/server/connection.rs
//!
//! Stream TCP más la dirección remota. Pertenece al acceptor hasta que se
//! encola y, desde el dequeue, a un único worker que la cierra.

use std::io;
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    accepted_at: Instant,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self {
            stream,
            peer,
            accepted_at: Instant::now(),
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Momento del accept; la latencia se mide desde aquí (incluye la cola)
    pub fn accepted_at(&self) -> Instant {
        self.accepted_at
    }

    /// Límite para cada lectura del request
    pub fn set_read_timeout(&self, timeout: Duration) -> io::Result<()> {
        self.stream.set_read_timeout(Some(timeout))
    }

    pub fn stream(&self) -> &TcpStream {
        &self.stream
    }

    /// Cierra la conexión consumiéndola; un error sólo se registra
    pub fn close(self) {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            debug!(peer = %self.peer, error = %e, "error al cerrar el socket");
        }
    }
}
