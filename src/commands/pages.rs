//! # Rutas de Páginas
//! src/commands/pages.rs
//!
//! - `GET /` y `GET /index.html`: sirven el archivo índice (`cool.html`)
//! - `GET /google`: redirección permanente
//! - `DELETE /database.php[?data=all]`: siempre prohibido

use super::files::FileStore;
use crate::http::{Response, StatusCode};
use tracing::warn;

/// Handler para `/` e `/index.html`
///
/// Si el archivo no se puede leer igual se responde 200 con body vacío;
/// el error sólo queda en el log.
pub fn index_handler(files: &dyn FileStore, index_file: &str) -> Response {
    let body = match files.read(index_file) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(file = index_file, error = %e, "no se pudo leer el archivo índice");
            Vec::new()
        }
    };

    Response::new(StatusCode::Ok).with_body_bytes(body)
}

/// Handler para `/google`: 301 con header `location`, sin body
pub fn redirect_handler(target: &str) -> Response {
    Response::new(StatusCode::MovedPermanently).with_header("location", target)
}

/// Handler para DELETE sobre `/database.php`
pub fn forbidden_handler() -> Response {
    Response::new(StatusCode::Forbidden)
}
