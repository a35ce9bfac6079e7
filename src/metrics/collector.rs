//! Metrics collection and registry.

use crate::replica::{ReplicaTarget, ReplicaWriter};
use crate::simulation::{CycleCounter, CycleReport};
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of loop state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Completed cycles.
    pub cycles: u64,
    /// Completed stomp cycles.
    pub stomp_cycles: u64,
    /// Completed append cycles.
    pub append_cycles: u64,
    /// Total chunks committed.
    pub chunks_written: u64,
    /// Total bytes written, counting overwrites.
    pub bytes_written: u64,
    /// Replica length after the latest cycle.
    pub file_length_bytes: u64,
    /// Chunks in the latest mixed batch.
    pub last_batch_chunks: usize,
}

/// Prometheus metrics registry for the replica loop.
///
/// Cloning shares the underlying collectors.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,

    // Cycle metrics
    cycles_total: IntCounter,
    stomp_cycles_total: IntCounter,
    append_cycles_total: IntCounter,

    // Write metrics
    chunks_written_total: IntCounter,
    bytes_written_total: IntCounter,
    file_length_bytes: IntGauge,
    last_batch_chunks: IntGauge,
}

impl MetricsRegistry {
    /// Creates a new registry with all replica metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let cycles_total = IntCounter::new("replica_cycles_total", "Total completed cycles")?;
        let stomp_cycles_total = IntCounter::new(
            "replica_stomp_cycles_total",
            "Completed cycles that rewrote offset 0",
        )?;
        let append_cycles_total = IntCounter::new(
            "replica_append_cycles_total",
            "Completed cycles that wrote from the current position",
        )?;

        let chunks_written_total = IntCounter::new(
            "replica_chunks_written_total",
            "Total chunks committed to the replica",
        )?;
        let bytes_written_total = IntCounter::new(
            "replica_bytes_written_total",
            "Total bytes written to the replica, including overwrites",
        )?;
        let file_length_bytes = IntGauge::new(
            "replica_file_length_bytes",
            "Replica file length after the latest cycle",
        )?;
        let last_batch_chunks = IntGauge::new(
            "replica_last_batch_chunks",
            "Chunks in the latest mixed batch",
        )?;

        registry.register(Box::new(cycles_total.clone()))?;
        registry.register(Box::new(stomp_cycles_total.clone()))?;
        registry.register(Box::new(append_cycles_total.clone()))?;
        registry.register(Box::new(chunks_written_total.clone()))?;
        registry.register(Box::new(bytes_written_total.clone()))?;
        registry.register(Box::new(file_length_bytes.clone()))?;
        registry.register(Box::new(last_batch_chunks.clone()))?;

        Ok(Self {
            registry,
            cycles_total,
            stomp_cycles_total,
            append_cycles_total,
            chunks_written_total,
            bytes_written_total,
            file_length_bytes,
            last_batch_chunks,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        // Counters only move forward by the difference
        advance(&self.cycles_total, snapshot.cycles);
        advance(&self.stomp_cycles_total, snapshot.stomp_cycles);
        advance(&self.append_cycles_total, snapshot.append_cycles);
        advance(&self.chunks_written_total, snapshot.chunks_written);
        advance(&self.bytes_written_total, snapshot.bytes_written);

        self.file_length_bytes.set(snapshot.file_length_bytes as i64);
        self.last_batch_chunks.set(snapshot.last_batch_chunks as i64);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}

impl MetricsSnapshot {
    /// Creates a snapshot from the loop's counter, writer and latest cycle.
    pub fn from_components<T: ReplicaTarget>(
        counter: &CycleCounter,
        writer: &ReplicaWriter<T>,
        report: &CycleReport,
    ) -> Self {
        let cycles = counter.value();
        Self {
            cycles,
            stomp_cycles: cycles.div_ceil(2),
            append_cycles: cycles / 2,
            chunks_written: writer.chunks_committed(),
            bytes_written: writer.bytes_written(),
            file_length_bytes: report.replica_len,
            last_batch_chunks: report.chunks,
        }
    }
}
