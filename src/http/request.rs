//! # Lectura y Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! La lectura se hace en dos fases:
//!
//! 1. [`RequestReader`] consume el stream línea por línea hasta la línea
//!    vacía y arma el *header block*. Si encontró un `Content-Length`
//!    positivo lee hasta esa cantidad de bytes como body, sin esperar al
//!    peer más allá de la primera lectura.
//! 2. [`ParsedRequest::from_raw`] separa la request line en
//!    `(método, path, versión)` y guarda el resto de líneas tal cual.
//!
//! ## Formato
//!
//! ```text
//! POST /multiply HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! Content-Length: 7\r\n
//! \r\n
//! a=6&b=7
//! ```
//!
//! No se parsea la query string: `/database.php?data=all` es un path literal.

use std::io::{self, BufRead, BufReader, Read};
use tracing::{debug, warn};

/// Terminador de línea del protocolo
pub const CRLF: &str = "\r\n";

/// Métodos HTTP que distingue el dispatcher
///
/// Cualquier otro token queda en `Other` y se responde con 405.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    GET,
    POST,
    DELETE,
    Other(String),
}

impl Method {
    /// Clasifica el token de método de la request line (sensible a mayúsculas)
    pub fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "DELETE" => Method::DELETE,
            other => Method::Other(other.to_string()),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::DELETE => "DELETE",
            Method::Other(token) => token,
        }
    }
}

/// Resultado crudo de leer una conexión: header block + body opcional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRequest {
    /// Líneas del header (request line incluida), cada una terminada en CRLF
    pub header_block: String,

    /// Body de tamaño fijo; `Some` sólo si hubo `Content-Length > 0`
    pub body: Option<Vec<u8>>,
}

/// Errores de transporte durante la lectura
#[derive(Debug)]
pub enum ReadError {
    /// Falló la lectura de una línea del header
    Header(io::Error),

    /// Falló la lectura del body
    Body(io::Error),
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::Header(e) => write!(f, "Error reading request header: {}", e),
            ReadError::Body(e) => write!(f, "Error reading request body: {}", e),
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReadError::Header(e) | ReadError::Body(e) => Some(e),
        }
    }
}

/// Lectura abandonada a mitad de camino
///
/// Conserva lo que se alcanzó a leer: el worker igual despacha y responde.
#[derive(Debug)]
pub struct PartialRead {
    pub partial: RawRequest,
    pub error: ReadError,
}

/// Lector de requests con límite de tamaño de body
#[derive(Debug, Clone, Copy)]
pub struct RequestReader {
    max_body_bytes: usize,
}

impl RequestReader {
    pub fn new(max_body_bytes: usize) -> Self {
        Self { max_body_bytes }
    }

    /// Lee el header block y, si corresponde, el body
    ///
    /// El body se lee con una sola lectura del stream más lo que ya esté en
    /// el buffer. Un cliente que declara más bytes de los que envía y deja
    /// la conexión abierta recibe un body rellenado con ceros.
    ///
    /// # Retorna
    ///
    /// * `Ok(RawRequest)` - Lectura completa (o EOF antes de la línea vacía)
    /// * `Err(PartialRead)` - Error de I/O; incluye lo leído hasta ese punto
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use corepool_http::http::RequestReader;
    ///
    /// let raw = b"POST /multiply HTTP/1.1\r\nContent-Length: 7\r\n\r\na=6&b=7";
    /// let request = RequestReader::new(1024).read(&raw[..]).unwrap();
    ///
    /// assert_eq!(request.header_block, "POST /multiply HTTP/1.1\r\nContent-Length: 7\r\n");
    /// assert_eq!(request.body.as_deref(), Some(&b"a=6&b=7"[..]));
    /// ```
    pub fn read<R: Read>(&self, stream: R) -> Result<RawRequest, PartialRead> {
        let mut reader = BufReader::new(stream);
        let mut raw = RawRequest::default();
        let mut content_length: Option<usize> = None;
        let mut line = Vec::new();

        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(PartialRead { partial: raw, error: ReadError::Header(e) });
                }
            }

            let text = String::from_utf8_lossy(&line);
            let text = text.trim_end_matches(['\r', '\n']);
            if text.is_empty() {
                break;
            }

            if let Some(length) = Self::content_length(text) {
                content_length = Some(length);
            }

            raw.header_block.push_str(text);
            raw.header_block.push_str(CRLF);
        }

        let length = match content_length {
            Some(length) if length > self.max_body_bytes => {
                warn!(length, max = self.max_body_bytes, "Content-Length excede el máximo, se ignora el body");
                return Ok(raw);
            }
            Some(length) if length > 0 => length,
            _ => return Ok(raw),
        };

        // Buffer de tamaño fijo; si llegan menos bytes el resto queda en cero
        let mut body = vec![0u8; length];
        let result = Self::fill_best_effort(&mut reader, &mut body);
        raw.body = Some(body);

        match result {
            Ok(read) => {
                if read < length {
                    debug!(read, expected = length, "body más corto que Content-Length");
                }
                Ok(raw)
            }
            Err(e) => Err(PartialRead { partial: raw, error: ReadError::Body(e) }),
        }
    }

    /// Detecta un header `Content-Length` y parsea su valor
    ///
    /// Un valor no numérico cuenta como "sin body".
    fn content_length(line: &str) -> Option<usize> {
        let (name, value) = line.split_once(':')?;
        if !name.trim().eq_ignore_ascii_case("content-length") {
            return None;
        }

        match value.trim().parse::<usize>() {
            Ok(length) => Some(length),
            Err(e) => {
                debug!(value = value.trim(), error = %e, "Content-Length no numérico");
                None
            }
        }
    }

    /// Una lectura (la única que puede bloquear) y luego sólo lo que quedó
    /// en el buffer. Retorna los bytes leídos.
    fn fill_best_effort<R: Read>(reader: &mut BufReader<R>, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = loop {
            match reader.read(buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };

        while filled < buf.len() && !reader.buffer().is_empty() {
            filled += reader.read(&mut buf[filled..])?;
        }
        Ok(filled)
    }
}

/// Errores de la request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No llegó ninguna línea (el peer cerró sin enviar nada)
    EmptyRequest,

    /// La request line no trae path
    InvalidRequestLine(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyRequest => write!(f, "Empty request"),
            ParseError::InvalidRequestLine(line) => write!(f, "Invalid request line: {:?}", line),
        }
    }
}

impl std::error::Error for ParseError {}

/// Request ya separado en sus componentes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    method: Method,
    path: String,
    header_lines: Vec<String>,
    body: Option<Vec<u8>>,
}

impl ParsedRequest {
    /// Separa la request line y conserva el resto de líneas en orden
    ///
    /// El método se clasifica antes de validar el path: `FOO` sin path es
    /// igualmente un método no soportado.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use corepool_http::http::{Method, ParsedRequest, RawRequest};
    ///
    /// let raw = RawRequest {
    ///     header_block: "GET /database.php?data=all HTTP/1.1\r\nHost: x\r\n".to_string(),
    ///     body: None,
    /// };
    /// let request = ParsedRequest::from_raw(raw).unwrap();
    ///
    /// assert_eq!(request.method(), &Method::GET);
    /// assert_eq!(request.path(), "/database.php?data=all");
    /// assert_eq!(request.header_lines(), ["Host: x"]);
    /// ```
    pub fn from_raw(raw: RawRequest) -> Result<Self, ParseError> {
        let mut lines = raw.header_block.split(CRLF).filter(|line| !line.is_empty());
        let request_line = lines.next().ok_or(ParseError::EmptyRequest)?;

        let mut parts = request_line.split_whitespace();
        let method = match parts.next() {
            Some(token) => Method::parse(token),
            None => return Err(ParseError::EmptyRequest),
        };
        let path = match (&method, parts.next()) {
            (_, Some(path)) => path.to_string(),
            (Method::Other(_), None) => String::new(),
            (_, None) => return Err(ParseError::InvalidRequestLine(request_line.to_string())),
        };

        Ok(ParsedRequest {
            method,
            path,
            header_lines: lines.map(str::to_string).collect(),
            body: raw.body,
        })
    }

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Obtiene el path literal (query string incluida)
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn header_lines(&self) -> &[String] {
        &self.header_lines
    }

    /// Body del request, si hubo `Content-Length > 0`
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}
