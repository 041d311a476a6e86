//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Tabla declarativa `(método, path exacto) → handler` que se consulta una
//! vez por request.
//!
//! ```text
//! RawRequest → ParsedRequest → Router → Handler → Response
//! ```
//!
//! Reglas de fallback, en orden:
//!
//! 1. Request line ilegible → 400 Bad Request
//! 2. Método fuera de GET/POST/DELETE → 405 Method Not Allowed
//! 3. Sin ruta para `(método, path)` pero el path existe para otro método
//!    → 405 Method Not Allowed
//! 4. Path desconocido → 404 Not Found

use crate::commands::{self, FileStore, MultiplyHandler};
use crate::config::Config;
use crate::http::{Method, ParsedRequest, RawRequest, Response, StatusCode};
use std::sync::Arc;
use tracing::debug;

/// Un handler recibe el request parseado y retorna la respuesta completa
pub type Handler = Box<dyn Fn(&ParsedRequest) -> Response + Send + Sync>;

struct Route {
    method: Method,
    path: String,
    handler: Handler,
}

/// Recursos que necesitan las rutas estándar
#[derive(Clone)]
pub struct Site {
    /// De dónde se lee el archivo índice
    pub files: Arc<dyn FileStore>,

    /// Path relativo del índice (`cool.html`)
    pub index_file: String,

    /// Destino de `/google`
    pub redirect_target: String,
}

impl Site {
    pub fn from_config(config: &Config) -> Self {
        Self {
            files: Arc::new(commands::DiskFileStore::new(&config.root_dir)),
            index_file: config.index_file.clone(),
            redirect_target: config.redirect_target.clone(),
        }
    }
}

/// Router que mapea `(método, path)` a handlers
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Construye la tabla fija de rutas del servidor
    ///
    /// | Método | Path | Respuesta |
    /// |---|---|---|
    /// | GET | `/`, `/index.html` | 200 con el archivo índice |
    /// | GET | `/google` | 301 + `location` |
    /// | POST | `/multiply` | 200 con el producto, o 400 |
    /// | DELETE | `/database.php`, `/database.php?data=all` | 403 |
    pub fn standard(site: Site) -> Result<Self, regex::Error> {
        let mut router = Router::new();

        for path in ["/", "/index.html"] {
            let files = Arc::clone(&site.files);
            let index_file = site.index_file.clone();
            router.register(Method::GET, path, move |_req| {
                commands::index_handler(files.as_ref(), &index_file)
            });
        }

        let target = site.redirect_target.clone();
        router.register(Method::GET, "/google", move |_req| commands::redirect_handler(&target));

        let multiply = MultiplyHandler::new()?;
        router.register(Method::POST, "/multiply", move |req| multiply.handle(req));

        for path in ["/database.php", "/database.php?data=all"] {
            router.register(Method::DELETE, path, |_req| commands::forbidden_handler());
        }

        Ok(router)
    }

    /// Registra una ruta con su handler
    ///
    /// # Ejemplo
    /// ```
    /// use corepool_http::router::Router;
    /// use corepool_http::http::{Method, Response, StatusCode};
    ///
    /// let mut router = Router::new();
    /// router.register(Method::GET, "/hello", |_req| Response::new(StatusCode::Ok).with_body("hi"));
    /// assert!(router.is_known_path("/hello"));
    /// ```
    pub fn register<F>(&mut self, method: Method, path: &str, handler: F)
    where
        F: Fn(&ParsedRequest) -> Response + Send + Sync + 'static,
    {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            handler: Box::new(handler),
        });
    }

    /// ¿Aparece el path en la tabla para algún método?
    pub fn is_known_path(&self, path: &str) -> bool {
        self.routes.iter().any(|route| route.path == path)
    }

    /// Parsea el request crudo y lo despacha
    pub fn dispatch(&self, raw: RawRequest) -> Response {
        match ParsedRequest::from_raw(raw) {
            Ok(request) => self.route(&request),
            Err(e) => {
                debug!(error = %e, "request line inválida");
                Response::new(StatusCode::BadRequest)
            }
        }
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    pub fn route(&self, request: &ParsedRequest) -> Response {
        if let Method::Other(token) = request.method() {
            debug!(method = %token, "método no soportado");
            return Response::new(StatusCode::MethodNotAllowed);
        }

        let path = request.path();
        debug!(
            method = request.method().as_str(),
            path,
            headers = request.header_lines().len(),
            "despachando request"
        );
        let found = self
            .routes
            .iter()
            .find(|route| &route.method == request.method() && route.path == path);

        match found {
            Some(route) => (route.handler)(request),
            None => self.fallback(path),
        }
    }

    /// Path conocido con el método equivocado → 405; si no, 404
    fn fallback(&self, path: &str) -> Response {
        if self.is_known_path(path) {
            Response::new(StatusCode::MethodNotAllowed)
        } else {
            Response::new(StatusCode::NotFound)
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct FixedStore;

    impl FileStore for FixedStore {
        fn read(&self, relative: &str) -> io::Result<Vec<u8>> {
            match relative {
                "cool.html" => Ok(b"<p>cool</p>".to_vec()),
                _ => Err(io::Error::new(io::ErrorKind::NotFound, relative.to_string())),
            }
        }
    }

    fn router() -> Router {
        Router::standard(Site {
            files: Arc::new(FixedStore),
            index_file: "cool.html".to_string(),
            redirect_target: "https://google.com".to_string(),
        })
        .unwrap()
    }

    fn send(router: &Router, head: &str, body: Option<&str>) -> Response {
        router.dispatch(RawRequest {
            header_block: format!("{}\r\n", head),
            body: body.map(|b| b.as_bytes().to_vec()),
        })
    }

    #[test]
    fn test_router_creation() {
        let router = Router::new();
        assert_eq!(router.routes.len(), 0);
    }

    #[test]
    fn test_standard_table_size() {
        assert_eq!(router().routes.len(), 6);
    }

    #[test]
    fn test_index_and_root_are_equivalent() {
        let router = router();
        let root = send(&router, "GET / HTTP/1.1", None);
        let index = send(&router, "GET /index.html HTTP/1.1", None);

        assert_eq!(root.status(), StatusCode::Ok);
        assert_eq!(root.body(), Some(&b"<p>cool</p>"[..]));
        assert_eq!(root, index);
    }

    #[test]
    fn test_missing_index_is_empty_ok() {
        let router = Router::standard(Site {
            files: Arc::new(FixedStore),
            index_file: "missing.html".to_string(),
            redirect_target: "https://google.com".to_string(),
        })
        .unwrap();

        let response = send(&router, "GET / HTTP/1.1", None);
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), Some(&b""[..]));
    }

    #[test]
    fn test_google_redirect() {
        let response = send(&router(), "GET /google HTTP/1.1", None);
        assert_eq!(response.status(), StatusCode::MovedPermanently);
        assert_eq!(response.extra_headers(), ["location: https://google.com"]);
        assert!(response.body().is_none());
    }

    #[test]
    fn test_multiply_routes() {
        let router = router();
        assert_eq!(send(&router, "POST /multiply HTTP/1.1", Some("a=6&b=7")).body(), Some(&b"42"[..]));
        assert_eq!(send(&router, "POST /multiply HTTP/1.1", Some("a=-3&b=5")).body(), Some(&b"-15"[..]));
        assert_eq!(send(&router, "POST /multiply HTTP/1.1", Some("a=6&b=")).status(), StatusCode::BadRequest);
        assert_eq!(send(&router, "POST /multiply HTTP/1.1", None).status(), StatusCode::BadRequest);
    }

    #[test]
    fn test_delete_database_forbidden() {
        let router = router();
        assert_eq!(send(&router, "DELETE /database.php HTTP/1.1", None).status(), StatusCode::Forbidden);
        assert_eq!(
            send(&router, "DELETE /database.php?data=all HTTP/1.1", None).status(),
            StatusCode::Forbidden
        );
        assert_eq!(send(&router, "DELETE /database.php?data=some HTTP/1.1", None).status(), StatusCode::NotFound);
    }

    #[test]
    fn test_known_path_wrong_method() {
        let router = router();
        for head in [
            "GET /database.php HTTP/1.1",
            "GET /multiply HTTP/1.1",
            "POST / HTTP/1.1",
            "DELETE /google HTTP/1.1",
            "POST /database.php?data=all HTTP/1.1",
        ] {
            assert_eq!(send(&router, head, None).status(), StatusCode::MethodNotAllowed, "{}", head);
        }
    }

    #[test]
    fn test_unknown_path() {
        let router = router();
        for head in ["GET /nonexistent HTTP/1.1", "POST /add HTTP/1.1", "DELETE /index.htm HTTP/1.1"] {
            let response = send(&router, head, None);
            assert_eq!(response.status(), StatusCode::NotFound, "{}", head);
            assert_eq!(response.content_type(), "text/html");
            assert!(response.body().is_none());
        }
    }

    #[test]
    fn test_unsupported_method() {
        let router = router();
        assert_eq!(send(&router, "PUT / HTTP/1.1", None).status(), StatusCode::MethodNotAllowed);
        assert_eq!(send(&router, "HEAD /nonexistent HTTP/1.1", None).status(), StatusCode::MethodNotAllowed);
        assert_eq!(send(&router, "get / HTTP/1.1", None).status(), StatusCode::MethodNotAllowed);
    }

    #[test]
    fn test_malformed_request_line() {
        let router = router();
        assert_eq!(router.dispatch(RawRequest::default()).status(), StatusCode::BadRequest);
        assert_eq!(send(&router, "GET", None).status(), StatusCode::BadRequest);
    }
}
