//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Recolección de métricas del pool de workers:
//! - Contadores de conexiones atendidas (totales, por status, por worker)
//! - Latencias de servicio (p50, p95, p99)
//! - Conexiones en servicio y pico de concurrencia
//! - Errores de lectura/escritura

pub mod collector;

pub use collector::{MetricsCollector, MetricsSnapshot};
