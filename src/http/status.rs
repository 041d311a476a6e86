//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Conjunto cerrado de códigos que el servidor puede devolver. Cada ruta
//! del router termina en exactamente uno de estos:
//!
//! - **2xx**: Éxito (200 OK)
//! - **3xx**: Redirección (301 para `/google`)
//! - **4xx**: Error del cliente (400, 403, 404, 405)
//! - **5xx**: Sólo si un handler hace panic (500)

/// Representa los códigos de estado HTTP que soporta nuestro servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok = 200,

    /// 301 Moved Permanently - Redirección con header `location`
    MovedPermanently = 301,

    /// 400 Bad Request - Request line o body malformado
    BadRequest = 400,

    /// 403 Forbidden - El recurso existe pero no se permite la operación
    Forbidden = 403,

    /// 404 Not Found - Ruta desconocida
    NotFound = 404,

    /// 405 Method Not Allowed - Ruta conocida con el método equivocado,
    /// o método no soportado
    MethodNotAllowed = 405,

    /// 500 Internal Server Error - Un handler hizo panic
    InternalServerError = 500,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use corepool_http::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use corepool_http::http::StatusCode;
    /// assert_eq!(StatusCode::MethodNotAllowed.reason_phrase(), "Method Not Allowed");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
