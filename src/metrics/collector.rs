//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Recolecta y agrega métricas del servidor en tiempo real. Lo comparten
//! todos los workers; cada conexión atendida se registra una sola vez.

use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Máximo de latencias a guardar para calcular percentiles
const LATENCY_WINDOW: usize = 10_000;

/// Collector de métricas thread-safe
pub struct MetricsCollector {
    inner: Mutex<MetricsData>,
    start_time: Instant,
}

/// Datos internos de métricas
#[derive(Default)]
struct MetricsData {
    /// Conexiones atendidas (una respuesta cada una)
    total_requests: u64,

    /// Respuestas por código de estado
    status_codes: BTreeMap<u16, u64>,

    /// Conexiones atendidas por cada worker
    per_worker: BTreeMap<usize, u64>,

    /// Últimas latencias registradas, del accept al cierre (en microsegundos)
    latencies: VecDeque<u64>,

    /// Conexiones en servicio en este instante
    in_flight: u64,

    /// Máximo de conexiones en servicio simultáneo
    peak_in_flight: u64,

    read_errors: u64,
    write_errors: u64,
}

/// Snapshot de métricas (para uso externo)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub total_requests: u64,
    pub status_codes: BTreeMap<u16, u64>,
    pub per_worker: BTreeMap<usize, u64>,
    pub in_flight: u64,
    pub peak_in_flight: u64,
    pub read_errors: u64,
    pub write_errors: u64,
    pub latency_p50_us: u64,
    pub latency_p95_us: u64,
    pub latency_p99_us: u64,
    pub latency_avg_us: u64,
}

impl MetricsCollector {
    /// Crea un nuevo collector de métricas
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsData::default()),
            start_time: Instant::now(),
        }
    }

    /// Un worker poisoned no debe dejar sin métricas al resto
    fn data(&self) -> MutexGuard<'_, MetricsData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marca el inicio del servicio de una conexión
    pub fn connection_started(&self) {
        let mut data = self.data();
        data.in_flight += 1;
        data.peak_in_flight = data.peak_in_flight.max(data.in_flight);
    }

    /// Registra una conexión terminada (respuesta enviada o intentada)
    pub fn connection_finished(&self, worker: usize, status_code: u16, latency: Duration) {
        let mut data = self.data();

        data.in_flight = data.in_flight.saturating_sub(1);
        data.total_requests += 1;
        *data.status_codes.entry(status_code).or_insert(0) += 1;
        *data.per_worker.entry(worker).or_insert(0) += 1;

        if data.latencies.len() >= LATENCY_WINDOW {
            data.latencies.pop_front();
        }
        data.latencies.push_back(latency.as_micros() as u64);
    }

    pub fn record_read_error(&self) {
        self.data().read_errors += 1;
    }

    pub fn record_write_error(&self) {
        self.data().write_errors += 1;
    }

    /// Obtiene un snapshot de las métricas
    pub fn snapshot(&self) -> MetricsSnapshot {
        let data = self.data();
        let (p50, p95, p99, avg) = calculate_percentiles(&data.latencies);

        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            total_requests: data.total_requests,
            status_codes: data.status_codes.clone(),
            per_worker: data.per_worker.clone(),
            in_flight: data.in_flight,
            peak_in_flight: data.peak_in_flight,
            read_errors: data.read_errors,
            write_errors: data.write_errors,
            latency_p50_us: p50,
            latency_p95_us: p95,
            latency_p99_us: p99,
            latency_avg_us: avg,
        }
    }

    /// Obtiene las métricas actuales en formato JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Calcula percentiles de latencia: (p50, p95, p99, promedio)
fn calculate_percentiles(latencies: &VecDeque<u64>) -> (u64, u64, u64, u64) {
    if latencies.is_empty() {
        return (0, 0, 0, 0);
    }

    let mut sorted: Vec<u64> = latencies.iter().copied().collect();
    sorted.sort_unstable();

    let len = sorted.len();
    let p50 = sorted[len * 50 / 100];
    let p95 = sorted[len * 95 / 100];
    let p99 = sorted[len * 99 / 100];
    let avg = sorted.iter().sum::<u64>() / len as u64;

    (p50, p95, p99, avg)
}
