//! # Consola de Apagado
//! src/server/console.rs
//!
//! Lee líneas de la entrada estándar; el comando literal `<die>` apaga el
//! servidor. Si la entrada se cierra (EOF) el servidor sigue corriendo.

use std::io::BufRead;
use tracing::{info, warn};

/// Comando que apaga el servidor
pub const DIE_COMMAND: &str = "<die>";

/// Espera el comando de apagado y ejecuta `on_die` una vez
///
/// Retorna `true` si se recibió `<die>`, `false` si la entrada terminó.
///
/// # Ejemplo
/// ```
/// use corepool_http::server::console;
///
/// let mut stopped = false;
/// let input = "status\n<die>\n".as_bytes();
/// assert!(console::watch(input, || stopped = true));
/// assert!(stopped);
/// ```
pub fn watch<R: BufRead>(input: R, on_die: impl FnOnce()) -> bool {
    info!("escriba {} para apagar el servidor", DIE_COMMAND);

    for line in input.lines() {
        match line {
            Ok(line) if line.trim() == DIE_COMMAND => {
                info!("apagado solicitado desde la consola");
                on_die();
                return true;
            }
            Ok(line) => info!(input = %line.trim(), "comando desconocido, escriba {}", DIE_COMMAND),
            Err(e) => {
                warn!(error = %e, "error leyendo la consola");
                return false;
            }
        }
    }

    info!("entrada estándar cerrada; el servidor sigue corriendo");
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_die_triggers_callback() {
        let mut calls = 0;
        assert!(watch("<die>\n".as_bytes(), || calls += 1));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_ignores_other_commands() {
        let mut called = false;
        assert!(!watch("die\nexit\n<DIE>\n".as_bytes(), || called = true));
        assert!(!called);
    }

    #[test]
    fn test_stops_reading_after_die() {
        let mut calls = 0;
        assert!(watch("hello\n  <die>  \n<die>\n".as_bytes(), || calls += 1));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_eof_keeps_running() {
        assert!(!watch("".as_bytes(), || panic!("no debería apagar")));
    }
}
