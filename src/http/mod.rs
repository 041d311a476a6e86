//! # Módulo HTTP
//!
//! Implementa desde cero la parte del protocolo HTTP/1.1 que necesita el
//! servidor:
//!
//! - Lectura del header block y del body de largo fijo (`Content-Length`)
//! - Separación de la request line en método, path y versión
//! - Serialización de respuestas en un orden fijo de headers
//! - Códigos de estado
//!
//! No hay keep-alive ni chunked encoding: cada conexión lleva exactamente
//! un request y una respuesta, y se cierra.
//!
//! ### Formato de Request
//!
//! ```text
//! GET /index.html HTTP/1.1\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```

pub mod request;   // Lectura y parsing de requests
pub mod response;  // Construcción y escritura de responses
pub mod status;    // Códigos de estado HTTP

pub use request::{Method, ParseError, ParsedRequest, PartialRead, RawRequest, ReadError, RequestReader};
pub use response::{Response, WriteError};
pub use status::StatusCode;
