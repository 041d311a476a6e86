//! # corepool_http
//! src/lib.rs
//!
//! Servidor HTTP/1.1 concurrente con un pool fijo de workers (uno por core
//! por defecto) que consumen conexiones de una cola FIFO compartida.
//!
//! ## Arquitectura
//!
//! - `http`: lectura de requests, códigos de estado y escritura de responses
//! - `router`: tabla `(método, path) → handler` con fallbacks 404/405
//! - `commands`: handlers de cada ruta (índice, redirección, multiply, 403)
//! - `server`: acceptor, cola de trabajo, workers y apagado
//! - `config`: argumentos CLI y variables de entorno
//! - `metrics`: contadores y latencias por worker
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use corepool_http::config::Config;
//! use corepool_http::server::Server;
//!
//! let server = Server::new(Config::default()).expect("configuración inválida");
//! let handle = server.start().expect("no se pudo abrir el puerto");
//! handle.shutdown();
//! let metrics = handle.join();
//! println!("{} requests", metrics.total_requests);
//! ```

pub mod commands;
pub mod config;
pub mod http;
pub mod metrics;
pub mod router;
pub mod server;
