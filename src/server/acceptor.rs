//! # Acceptor de Conexiones
//! src/server/acceptor.rs
//!
//! Único productor de la cola. En cada iteración espera una conexión con un
//! timeout acotado y, si llega, la encola. Un timeout o un error de I/O sólo
//! se registran y se vuelve a intentar.
//!
//! `TcpListener` no tiene accept con timeout, así que el listener queda en
//! modo no bloqueante y se sondea cada `poll` hasta vencer el plazo. Así la
//! señal de apagado se observa a lo sumo un intervalo de sondeo después.

use super::connection::Connection;
use super::queue::WorkQueue;
use super::shutdown::ShutdownSignal;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Por qué una iteración del accept no produjo conexión
#[derive(Debug)]
pub enum AcceptError {
    /// Venció el timeout sin conexiones
    TimedOut,

    /// Se activó la señal de apagado mientras se esperaba
    ShuttingDown,

    /// Error de I/O del listener
    Io(io::Error),
}

impl std::fmt::Display for AcceptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcceptError::TimedOut => write!(f, "Accept timed out"),
            AcceptError::ShuttingDown => write!(f, "Shutdown requested"),
            AcceptError::Io(e) => write!(f, "Accept failed: {}", e),
        }
    }
}

impl std::error::Error for AcceptError {}

pub struct Acceptor {
    listener: TcpListener,
    queue: Arc<WorkQueue<Connection>>,
    shutdown: Arc<ShutdownSignal>,
    accept_timeout: Duration,
    poll: Duration,
}

impl Acceptor {
    /// Toma el listener y lo deja en modo no bloqueante
    pub fn new(
        listener: TcpListener,
        queue: Arc<WorkQueue<Connection>>,
        shutdown: Arc<ShutdownSignal>,
        accept_timeout: Duration,
        poll: Duration,
    ) -> io::Result<Self> {
        listener.set_nonblocking(true)?;
        Ok(Self {
            listener,
            queue,
            shutdown,
            accept_timeout,
            poll,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Loop principal: corre hasta que se active la señal de apagado.
    /// Al retornar se suelta el listener y el puerto queda cerrado.
    pub fn run(self) {
        info!(accept_timeout_ms = self.accept_timeout.as_millis() as u64, "acceptor iniciado");
        let mut last_peer: Option<SocketAddr> = None;

        while !self.shutdown.is_triggered() {
            match self.accept_within(self.accept_timeout) {
                Ok(connection) => {
                    debug!(peer = %connection.peer(), "nueva conexión");
                    last_peer = Some(connection.peer());
                    self.queue.push(connection);
                }
                Err(AcceptError::ShuttingDown) => break,
                Err(AcceptError::TimedOut) => {
                    debug!("accept sin conexiones dentro del timeout");
                }
                Err(AcceptError::Io(e)) => {
                    warn!(error = %e, last_peer = ?last_peer, "error al aceptar conexión");
                    thread::sleep(self.poll);
                }
            }
        }

        info!(pending = self.queue.len(), "acceptor terminado");
    }

    /// Espera una conexión como máximo `timeout`
    pub fn accept_within(&self, timeout: Duration) -> Result<Connection, AcceptError> {
        let deadline = Instant::now() + timeout;

        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    // En algunas plataformas el socket hereda O_NONBLOCK
                    if let Err(e) = stream.set_nonblocking(false) {
                        warn!(peer = %peer, error = %e, "no se pudo dejar el socket en modo bloqueante");
                    }
                    return Ok(Connection::new(stream, peer));
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if self.shutdown.is_triggered() {
                        return Err(AcceptError::ShuttingDown);
                    }
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(AcceptError::TimedOut);
                    }
                    thread::sleep(self.poll.min(deadline - now));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(AcceptError::Io(e)),
            }
        }
    }
}
