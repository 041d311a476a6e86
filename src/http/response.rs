//! # Construcción y Escritura de Respuestas HTTP
//! src/http/response.rs
//!
//! Una [`Response`] se arma con un builder y se serializa siempre en el
//! mismo orden:
//!
//! ```text
//! HTTP/1.1 301 Moved Permanently\r\n
//! Date: Sat, 17 Oct 2026 12:00:00 GMT\r\n
//! Server: corepool-http/0.1\r\n
//! Connection: close\r\n
//! Content-Type: text/html\r\n
//! location: https://google.com\r\n
//! \r\n
//! ```
//!
//! No se envía `Content-Length`: el body termina cuando se cierra la
//! conexión (nunca se ofrecen conexiones persistentes).
//!
//! ## Ejemplo de uso
//!
//! ```
//! use corepool_http::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok).with_body("42");
//!
//! let mut out = Vec::new();
//! response.write_to(&mut out).unwrap();
//! assert!(out.ends_with(b"\r\n\r\n42"));
//! ```

use super::request::CRLF;
use super::StatusCode;
use chrono::{DateTime, Utc};
use std::io::{self, Write};

/// Identificación fija del header `Server`
pub const SERVER_NAME: &str = "corepool-http/0.1";

/// Content type de todas las rutas
pub const TEXT_HTML: &str = "text/html";

/// Formato RFC 1123; chrono no depende del locale
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Formatea una fecha para el header `Date`
///
/// # Ejemplo
/// ```
/// use chrono::{TimeZone, Utc};
/// use corepool_http::http::response::http_date;
///
/// let date = Utc.with_ymd_and_hms(2023, 11, 9, 8, 5, 3).unwrap();
/// assert_eq!(http_date(date), "Thu, 09 Nov 2023 08:05:03 GMT");
/// ```
pub fn http_date(date: DateTime<Utc>) -> String {
    date.format(HTTP_DATE_FORMAT).to_string()
}

/// Error al escribir la respuesta en el socket
#[derive(Debug)]
pub enum WriteError {
    /// Falló la escritura del status line o de los headers
    Head(io::Error),

    /// Falló la escritura del body
    Body(io::Error),

    /// Falló el flush final
    Flush(io::Error),
}

impl std::fmt::Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteError::Head(e) => write!(f, "Error writing response header: {}", e),
            WriteError::Body(e) => write!(f, "Error writing response body: {}", e),
            WriteError::Flush(e) => write!(f, "Error flushing response: {}", e),
        }
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WriteError::Head(e) | WriteError::Body(e) | WriteError::Flush(e) => Some(e),
        }
    }
}

/// Respuesta HTTP de escritura única
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,

    /// Valor del header `Content-Type`
    content_type: String,

    /// Headers adicionales de la ruta, en el orden en que se agregaron
    extra_headers: Vec<String>,

    /// Cuerpo de la respuesta (puede no existir)
    body: Option<Vec<u8>>,
}

impl Response {
    /// Crea una respuesta `text/html` sin body ni headers extra
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: TEXT_HTML.to_string(),
            extra_headers: Vec::new(),
            body: None,
        }
    }

    /// Agrega un header extra; se escribe como `name: value` respetando el
    /// nombre tal cual se recibe (ej. `location` en minúsculas)
    ///
    /// # Ejemplo
    /// ```
    /// use corepool_http::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::MovedPermanently)
    ///     .with_header("location", "https://google.com");
    /// assert_eq!(response.extra_headers(), ["location: https://google.com"]);
    /// ```
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.extra_headers.push(format!("{}: {}", name, value));
        self
    }

    /// Establece el body desde un string
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el body desde bytes
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Longitud del body en bytes (0 si no hay body)
    pub fn content_length(&self) -> usize {
        self.body.as_ref().map_or(0, Vec::len)
    }

    pub fn extra_headers(&self) -> &[String] {
        &self.extra_headers
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Serializa el status line y los headers con la fecha dada
    pub fn head(&self, date: DateTime<Utc>) -> String {
        let mut head = String::with_capacity(160);
        head.push_str(&format!("HTTP/1.1 {}{}", self.status, CRLF));
        head.push_str(&format!("Date: {}{}", http_date(date), CRLF));
        head.push_str(&format!("Server: {}{}", SERVER_NAME, CRLF));
        head.push_str(&format!("Connection: close{}", CRLF));
        head.push_str(&format!("Content-Type: {}{}", self.content_type, CRLF));
        for header in &self.extra_headers {
            head.push_str(header);
            head.push_str(CRLF);
        }
        head.push_str(CRLF);
        head
    }

    /// Escribe la respuesta completa con la hora actual y hace un único flush
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), WriteError> {
        self.write_at(writer, Utc::now())
    }

    /// Igual que [`Response::write_to`] pero con una fecha fija
    pub fn write_at<W: Write>(&self, writer: &mut W, date: DateTime<Utc>) -> Result<(), WriteError> {
        writer
            .write_all(self.head(date).as_bytes())
            .map_err(WriteError::Head)?;

        if let Some(body) = &self.body {
            writer.write_all(body).map_err(WriteError::Body)?;
        }

        writer.flush().map_err(WriteError::Flush)
    }
}
