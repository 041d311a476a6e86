//! # Comando /multiply
//! src/commands/multiply.rs
//!
//! Multiplica dos enteros enviados en el body de un POST:
//!
//! ```text
//! POST /multiply HTTP/1.1\r\n
//! Content-Length: 7\r\n
//! \r\n
//! a=6&b=7
//! ```
//!
//! El body debe calzar completo con `a=<int>&b=<int>` (signo `-` opcional).
//! Los operandos son `i32` y el producto se envuelve en overflow, igual que
//! la multiplicación nativa de 32 bits.

use crate::http::{ParsedRequest, Response, StatusCode};
use regex::Regex;
use tracing::debug;

/// Patrón anclado en ambos extremos
const BODY_PATTERN: &str = r"^a=(-?[0-9]+)&b=(-?[0-9]+)$";

/// Motivo por el que un body no es multiplicable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultiplyError {
    /// El POST no trae body
    MissingBody,

    /// El body no es UTF-8
    NotText,

    /// El body no calza con `a=<int>&b=<int>`
    PatternMismatch(String),

    /// Un operando no cabe en 32 bits
    OperandOutOfRange(String),
}

impl std::fmt::Display for MultiplyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MultiplyError::MissingBody => write!(f, "Missing request body"),
            MultiplyError::NotText => write!(f, "Request body is not valid UTF-8"),
            MultiplyError::PatternMismatch(body) => write!(f, "Body does not match a=<int>&b=<int>: {:?}", body),
            MultiplyError::OperandOutOfRange(operand) => write!(f, "Operand out of range: {}", operand),
        }
    }
}

impl std::error::Error for MultiplyError {}

/// Handler de /multiply con el patrón ya compilado
#[derive(Debug, Clone)]
pub struct MultiplyHandler {
    pattern: Regex,
}

impl MultiplyHandler {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self { pattern: Regex::new(BODY_PATTERN)? })
    }

    /// Valida el body y calcula el producto
    ///
    /// # Ejemplo
    /// ```
    /// use corepool_http::commands::MultiplyHandler;
    ///
    /// let handler = MultiplyHandler::new().unwrap();
    /// assert_eq!(handler.evaluate(Some("a=-3&b=5".as_bytes())), Ok(-15));
    /// assert!(handler.evaluate(Some("a=6&b=".as_bytes())).is_err());
    /// ```
    pub fn evaluate(&self, body: Option<&[u8]>) -> Result<i32, MultiplyError> {
        let body = body.ok_or(MultiplyError::MissingBody)?;
        let text = std::str::from_utf8(body).map_err(|_| MultiplyError::NotText)?;

        let captures = self
            .pattern
            .captures(text)
            .ok_or_else(|| MultiplyError::PatternMismatch(text.to_string()))?;

        let a = Self::operand(&captures[1])?;
        let b = Self::operand(&captures[2])?;

        Ok(a.wrapping_mul(b))
    }

    fn operand(digits: &str) -> Result<i32, MultiplyError> {
        digits
            .parse::<i32>()
            .map_err(|_| MultiplyError::OperandOutOfRange(digits.to_string()))
    }

    /// Handler para POST /multiply
    ///
    /// - 200 OK con el producto en decimal
    /// - 400 Bad Request si falta el body o no es válido
    pub fn handle(&self, req: &ParsedRequest) -> Response {
        match self.evaluate(req.body()) {
            Ok(product) => Response::new(StatusCode::Ok).with_body(&product.to_string()),
            Err(e) => {
                debug!(error = %e, "multiply rechazado");
                Response::new(StatusCode::BadRequest)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RawRequest;

    fn eval(body: &str) -> Result<i32, MultiplyError> {
        MultiplyHandler::new().unwrap().evaluate(Some(body.as_bytes()))
    }

    fn post(body: Option<&str>) -> ParsedRequest {
        ParsedRequest::from_raw(RawRequest {
            header_block: "POST /multiply HTTP/1.1\r\n".to_string(),
            body: body.map(|b| b.as_bytes().to_vec()),
        })
        .unwrap()
    }

    #[test]
    fn test_multiply_positive() {
        assert_eq!(eval("a=6&b=7"), Ok(42));
    }

    #[test]
    fn test_multiply_negative() {
        assert_eq!(eval("a=-3&b=5"), Ok(-15));
        assert_eq!(eval("a=-4&b=-4"), Ok(16));
    }

    #[test]
    fn test_multiply_wraps_on_overflow() {
        assert_eq!(eval("a=2147483647&b=2"), Ok(-2));
        assert_eq!(eval("a=65536&b=65536"), Ok(0));
    }

    #[test]
    fn test_missing_body() {
        let handler = MultiplyHandler::new().unwrap();
        assert_eq!(handler.evaluate(None), Err(MultiplyError::MissingBody));
    }

    #[test]
    fn test_pattern_must_match_whole_body() {
        for body in ["a=6&b=", "a=6&b=7&c=1", " a=6&b=7", "b=6&a=7", "a=+6&b=7", "a=6.0&b=7", "a=6&b=7\0\0"] {
            assert!(matches!(eval(body), Err(MultiplyError::PatternMismatch(_))), "{:?}", body);
        }
    }

    #[test]
    fn test_operand_out_of_range() {
        assert_eq!(
            eval("a=99999999999&b=1"),
            Err(MultiplyError::OperandOutOfRange("99999999999".to_string()))
        );
    }

    #[test]
    fn test_non_utf8_body() {
        let handler = MultiplyHandler::new().unwrap();
        assert_eq!(handler.evaluate(Some(&[0xff, 0xfe][..])), Err(MultiplyError::NotText));
    }

    #[test]
    fn test_handle_responses() {
        let handler = MultiplyHandler::new().unwrap();

        let ok = handler.handle(&post(Some("a=6&b=7")));
        assert_eq!(ok.status(), StatusCode::Ok);
        assert_eq!(ok.body(), Some(&b"42"[..]));

        let bad = handler.handle(&post(None));
        assert_eq!(bad.status(), StatusCode::BadRequest);
        assert!(bad.body().is_none());
    }
}
