//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración con soporte para argumentos CLI y variables de entorno.
//! Los valores por defecto reproducen el comportamiento de referencia:
//! puerto 8080, accept con timeout de 30 s y dequeue con timeout de 10 s.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./corepool_http --port 8080 \
//!   --workers 4 \
//!   --accept-timeout-ms 30000 \
//!   --dequeue-timeout-ms 10000
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 ROOT_DIR=./public ./corepool_http
//! ```

use clap::Parser;
use std::time::Duration;

/// Puerto por defecto
pub const DEFAULT_PORT: u16 = 8080;

/// Timeout del accept en el listener
pub const DEFAULT_ACCEPT_TIMEOUT_MS: u64 = 30_000;

/// Timeout de cada intento de dequeue en los workers
pub const DEFAULT_DEQUEUE_TIMEOUT_MS: u64 = 10_000;

/// Intervalo de sondeo del listener no bloqueante
pub const DEFAULT_ACCEPT_POLL_MS: u64 = 25;

/// Archivo servido en `/` e `/index.html`
pub const DEFAULT_INDEX_FILE: &str = "cool.html";

/// Destino de `/google`
pub const DEFAULT_REDIRECT_TARGET: &str = "https://google.com";

/// Máximo `Content-Length` aceptado (1 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Configuración del servidor HTTP
#[derive(Debug, Clone, Parser)]
#[command(name = "corepool_http")]
#[command(about = "Servidor HTTP/1.1 con un worker por core y cola FIFO de conexiones")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Número de workers (0 = un worker por core disponible)
    #[arg(short, long, default_value_t = 0, env = "WORKERS")]
    pub workers: usize,

    // === Timeouts ===

    /// Timeout del accept en milisegundos
    #[arg(long = "accept-timeout-ms", default_value_t = DEFAULT_ACCEPT_TIMEOUT_MS, env = "ACCEPT_TIMEOUT_MS")]
    pub accept_timeout_ms: u64,

    /// Timeout de espera en la cola, por worker, en milisegundos
    #[arg(long = "dequeue-timeout-ms", default_value_t = DEFAULT_DEQUEUE_TIMEOUT_MS, env = "DEQUEUE_TIMEOUT_MS")]
    pub dequeue_timeout_ms: u64,

    /// Cada cuánto se sondea el listener mientras espera conexiones
    #[arg(long = "accept-poll-ms", default_value_t = DEFAULT_ACCEPT_POLL_MS, env = "ACCEPT_POLL_MS")]
    pub accept_poll_ms: u64,

    // === Contenido ===

    /// Directorio raíz de los archivos estáticos
    #[arg(long = "root-dir", default_value = ".", env = "ROOT_DIR")]
    pub root_dir: String,

    /// Archivo servido en / e /index.html (relativo a root-dir)
    #[arg(long = "index-file", default_value = DEFAULT_INDEX_FILE, env = "INDEX_FILE")]
    pub index_file: String,

    /// Destino de la redirección de /google
    #[arg(long = "redirect-target", default_value = DEFAULT_REDIRECT_TARGET, env = "REDIRECT_TARGET")]
    pub redirect_target: String,

    /// Content-Length máximo aceptado en bytes
    #[arg(long = "max-body-bytes", default_value_t = DEFAULT_MAX_BODY_BYTES, env = "MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    // === Logging ===

    /// Nivel de log si RUST_LOG no está definido (error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use corepool_http::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Tamaño del pool: el valor configurado o los cores disponibles
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    pub fn accept_timeout(&self) -> Duration {
        Duration::from_millis(self.accept_timeout_ms)
    }

    pub fn dequeue_timeout(&self) -> Duration {
        Duration::from_millis(self.dequeue_timeout_ms)
    }

    pub fn accept_poll(&self) -> Duration {
        Duration::from_millis(self.accept_poll_ms)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.accept_timeout_ms == 0 {
            return Err("Accept timeout must be > 0".to_string());
        }
        if self.dequeue_timeout_ms == 0 {
            return Err("Dequeue timeout must be > 0".to_string());
        }
        if self.accept_poll_ms == 0 {
            return Err("Accept poll interval must be > 0".to_string());
        }
        if self.accept_poll_ms > self.accept_timeout_ms {
            return Err("Accept poll interval must be <= accept timeout".to_string());
        }
        if self.index_file.trim().is_empty() {
            return Err("Index file must not be empty".to_string());
        }

        Ok(())
    }

    /// Imprime un resumen de la configuración en el log
    pub fn print_summary(&self) {
        tracing::info!(
            address = %self.address(),
            workers = self.worker_count(),
            accept_timeout_ms = self.accept_timeout_ms,
            dequeue_timeout_ms = self.dequeue_timeout_ms,
            accept_poll_ms = self.accept_poll_ms,
            root_dir = %self.root_dir,
            index_file = %self.index_file,
            redirect_target = %self.redirect_target,
            max_body_bytes = self.max_body_bytes,
            "configuración"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: "127.0.0.1".to_string(),
            workers: 0,
            accept_timeout_ms: DEFAULT_ACCEPT_TIMEOUT_MS,
            dequeue_timeout_ms: DEFAULT_DEQUEUE_TIMEOUT_MS,
            accept_poll_ms: DEFAULT_ACCEPT_POLL_MS,
            root_dir: ".".to_string(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
            redirect_target: DEFAULT_REDIRECT_TARGET.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_level: "info".to_string(),
        }
    }
}
