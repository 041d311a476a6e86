//! # Workers del Pool
//! src/server/worker.rs
//!
//! Cada worker es un thread que repite:
//!
//! ```text
//! dequeue (con timeout) → leer request → despachar → escribir → cerrar
//! ```
//!
//! Ningún error de una conexión termina el thread: las fallas de I/O se
//! registran y el worker vuelve a la cola. La conexión se cierra siempre,
//! incluso si el handler hace panic.

use super::connection::Connection;
use super::context::ServerContext;
use crate::http::{PartialRead, Response, StatusCode};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

pub struct Worker {
    id: usize,
    context: ServerContext,
    dequeue_timeout: Duration,
}

impl Worker {
    /// `id` lo asigna quien construye el pool (0..N)
    pub fn new(id: usize, context: ServerContext, dequeue_timeout: Duration) -> Self {
        Self {
            id,
            context,
            dequeue_timeout,
        }
    }

    /// Lanza el worker en su propio thread
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("worker-{}", self.id))
            .spawn(move || self.run())
    }

    /// Loop principal del worker
    pub fn run(&self) {
        info!(worker = self.id, "worker iniciado");

        while !self.context.shutdown.is_triggered() {
            match self.context.queue.pop_timeout(self.dequeue_timeout) {
                Some(connection) => {
                    self.service(connection);
                }
                None => trace!(worker = self.id, "sin conexiones en la cola"),
            }
        }

        // Lo que quedó encolado antes del apagado igual recibe respuesta
        self.drain();

        info!(worker = self.id, "worker terminado");
    }

    /// Atiende sin esperar todo lo que haya en la cola
    ///
    /// Cada lectura queda limitada por el timeout de dequeue: un cliente que
    /// no envía nada recibe 400 en vez de retener el apagado.
    pub fn drain(&self) -> usize {
        let mut served = 0;
        while let Some(connection) = self.context.queue.try_pop() {
            if let Err(e) = connection.set_read_timeout(self.dequeue_timeout) {
                warn!(worker = self.id, peer = %connection.peer(), error = %e, "no se pudo fijar el timeout de lectura");
            }
            self.service(connection);
            served += 1;
        }
        served
    }

    /// Atiende una conexión completa y la cierra. Retorna el status enviado.
    pub fn service(&self, connection: Connection) -> StatusCode {
        let accepted_at = connection.accepted_at();
        let peer = connection.peer();
        let metrics = &self.context.metrics;
        metrics.connection_started();

        let raw = match self.context.reader.read(connection.stream()) {
            Ok(raw) => raw,
            Err(PartialRead { partial, error }) => {
                warn!(worker = self.id, %peer, %error, "lectura del request abandonada");
                metrics.record_read_error();
                partial
            }
        };

        let request_line = raw.header_block.split("\r\n").next().unwrap_or_default().to_string();
        debug!(worker = self.id, %peer, request = %request_line, "request recibido");

        let router = &self.context.router;
        let response = match panic::catch_unwind(AssertUnwindSafe(|| router.dispatch(raw))) {
            Ok(response) => response,
            Err(_) => {
                error!(worker = self.id, %peer, request = %request_line, "el handler hizo panic");
                Response::new(StatusCode::InternalServerError)
            }
        };

        let mut writer = connection.stream();
        if let Err(e) = response.write_to(&mut writer) {
            warn!(worker = self.id, %peer, error = %e, "no se pudo enviar la respuesta");
            metrics.record_write_error();
        }

        connection.close();

        let status = response.status();
        let latency = accepted_at.elapsed();
        metrics.connection_finished(self.id, status.as_u16(), latency);

        info!(
            worker = self.id,
            %peer,
            request = %request_line,
            status = status.as_u16(),
            body_bytes = response.content_length(),
            latency_us = latency.as_micros() as u64,
            "respuesta enviada"
        );

        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Method, RequestReader};
    use crate::router::Router;
    use std::io::{Read, Write};
    use std::net::{Shutdown, TcpListener, TcpStream};
    use std::time::Instant;

    fn test_router() -> Router {
        let mut router = Router::new();
        router.register(Method::GET, "/hello", |_req| Response::new(StatusCode::Ok).with_body("hi"));
        router.register(Method::GET, "/boom", |_req| panic!("handler roto"));
        router
    }

    fn context() -> ServerContext {
        ServerContext::new(test_router(), RequestReader::new(1024))
    }

    /// Abre un par cliente/servidor sobre loopback
    fn connection_pair() -> (TcpStream, Connection) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (stream, peer) = listener.accept().unwrap();
        (client, Connection::new(stream, peer))
    }

    fn exchange(worker: &Worker, request: &[u8]) -> (StatusCode, String) {
        let (mut client, connection) = connection_pair();
        client.write_all(request).unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        let status = worker.service(connection);

        let mut buf = String::new();
        client.read_to_string(&mut buf).unwrap();
        (status, buf)
    }

    #[test]
    fn test_service_writes_response_and_closes() {
        let worker = Worker::new(0, context(), Duration::from_millis(50));
        let (status, text) = exchange(&worker, b"GET /hello HTTP/1.1\r\n\r\n");

        assert_eq!(status, StatusCode::Ok);
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.ends_with("\r\n\r\nhi"));
    }

    #[test]
    fn test_service_empty_request_gets_400() {
        let worker = Worker::new(0, context(), Duration::from_millis(50));
        let (status, text) = exchange(&worker, b"");

        assert_eq!(status, StatusCode::BadRequest);
        assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[test]
    fn test_service_survives_handler_panic() {
        let context = context();
        let worker = Worker::new(2, context.clone(), Duration::from_millis(50));

        let (status, text) = exchange(&worker, b"GET /boom HTTP/1.1\r\n\r\n");
        assert_eq!(status, StatusCode::InternalServerError);
        assert!(text.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));

        // El mismo worker sigue atendiendo
        let (status, _) = exchange(&worker, b"GET /hello HTTP/1.1\r\n\r\n");
        assert_eq!(status, StatusCode::Ok);
        assert_eq!(context.metrics.snapshot().per_worker.get(&2), Some(&2));
    }

    #[test]
    fn test_service_client_gone_does_not_panic() {
        let worker = Worker::new(0, context(), Duration::from_millis(50));
        let (client, connection) = connection_pair();
        drop(client);

        worker.service(connection);
        assert_eq!(worker.context.metrics.snapshot().total_requests, 1);
    }

    #[test]
    fn test_run_exits_after_shutdown() {
        let context = context();
        let handle = Worker::new(0, context.clone(), Duration::from_secs(10)).spawn().unwrap();

        thread::sleep(Duration::from_millis(50));
        let start = Instant::now();
        assert!(context.request_shutdown());
        handle.join().unwrap();

        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_run_services_queued_connections() {
        let context = context();
        let handle = Worker::new(0, context.clone(), Duration::from_millis(20)).spawn().unwrap();

        let (mut client, connection) = connection_pair();
        client.write_all(b"GET /missing HTTP/1.1\r\n\r\n").unwrap();
        context.queue.push(connection);

        let mut buf = String::new();
        client.read_to_string(&mut buf).unwrap();
        assert!(buf.starts_with("HTTP/1.1 404 Not Found\r\n"));

        context.request_shutdown();
        handle.join().unwrap();
    }

    #[test]
    fn test_drain_serves_leftovers() {
        let context = context();
        let worker = Worker::new(0, context.clone(), Duration::from_millis(20));

        let mut clients = Vec::new();
        for _ in 0..3 {
            let (mut client, connection) = connection_pair();
            client.write_all(b"GET /hello HTTP/1.1\r\n\r\n").unwrap();
            context.queue.push(connection);
            clients.push(client);
        }

        assert_eq!(worker.drain(), 3);
        for mut client in clients {
            let mut buf = String::new();
            client.read_to_string(&mut buf).unwrap();
            assert!(buf.ends_with("hi"));
        }
        assert!(context.queue.is_empty());
    }

    #[test]
    fn test_drain_does_not_hang_on_silent_client() {
        let context = context();
        let worker = Worker::new(0, context.clone(), Duration::from_millis(100));

        let (mut silent, connection) = connection_pair();
        context.queue.push(connection);

        let start = Instant::now();
        assert_eq!(worker.drain(), 1);
        assert!(start.elapsed() < Duration::from_secs(5));

        let mut buf = String::new();
        silent.read_to_string(&mut buf).unwrap();
        assert!(buf.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert_eq!(context.metrics.snapshot().read_errors, 1);
    }
}
