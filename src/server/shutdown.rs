//! # Señal de Apagado
//! src/server/shutdown.rs
//!
//! Bandera compartida por el acceptor, los workers y la consola. Pasa de
//! `false` a `true` una sola vez y nunca vuelve atrás.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct ShutdownSignal {
    triggered: AtomicBool,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activa la señal. Retorna `true` sólo para la primera llamada.
    pub fn trigger(&self) -> bool {
        !self.triggered.swap(true, Ordering::AcqRel)
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_starts_untriggered() {
        assert!(!ShutdownSignal::new().is_triggered());
    }

    #[test]
    fn test_trigger_is_monotonic() {
        let signal = ShutdownSignal::new();
        assert!(signal.trigger());
        assert!(!signal.trigger());
        assert!(signal.is_triggered());
    }

    #[test]
    fn test_visible_across_threads() {
        let signal = Arc::new(ShutdownSignal::new());
        let remote = Arc::clone(&signal);

        thread::spawn(move || remote.trigger()).join().unwrap();
        assert!(signal.is_triggered());
    }
}
