//! Loop driver.

use super::{CycleCounter, CycleReport, ShutdownToken, SimulatorConfig};
use crate::error::SimulatorError;
use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use crate::mixing::EntropyPool;
use crate::replica::{ReplicaTarget, ReplicaWriter};
use crate::source::{EntropySource, SeedStrategy};
use rand_core::{OsRng, RngCore};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Lifecycle of a [`SimulationLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Cycles may still run.
    Running,
    /// Stopped by shutdown, cycle limit or failure.
    Terminated,
}

/// Repeats generate/mix/commit cycles until shutdown or failure.
///
/// Any generation or write error terminates the loop; there is no retry.
/// Generation for a cycle completes before its first write, so a seed
/// failure never leaves a partially committed cycle behind.
pub struct SimulationLoop<T = File, R = OsRng> {
    config: SimulatorConfig,
    source: EntropySource<R>,
    pool: EntropyPool,
    writer: ReplicaWriter<T>,
    counter: CycleCounter,
    state: LoopState,
    shutdown: ShutdownToken,
    metrics: Option<MetricsRegistry>,
    /// Cleared after the first failed progress write.
    progress_enabled: bool,
}

impl SimulationLoop<File, OsRng> {
    /// Opens `<dir>/<file_name>` and prepares a loop with OS-backed sources.
    pub fn open(config: SimulatorConfig, dir: impl AsRef<Path>) -> Result<Self, SimulatorError> {
        config.validate()?;
        let writer = ReplicaWriter::open_in_dir(dir, &config.file_name)?;
        let source = EntropySource::new(config.chunk_width);
        Ok(Self::new(config, source, EntropyPool::from_os_entropy(), writer))
    }
}

impl<T: ReplicaTarget, R: RngCore> SimulationLoop<T, R> {
    /// Assembles a loop from its parts.
    pub fn new(
        config: SimulatorConfig,
        source: EntropySource<R>,
        pool: EntropyPool,
        writer: ReplicaWriter<T>,
    ) -> Self {
        let progress_enabled = config.print_progress;
        Self {
            config,
            source,
            pool,
            writer,
            counter: CycleCounter::new(),
            state: LoopState::Running,
            shutdown: ShutdownToken::new(),
            metrics: None,
            progress_enabled,
        }
    }

    /// Publishes per-cycle metrics to `registry`.
    pub fn with_metrics(mut self, registry: MetricsRegistry) -> Self {
        self.metrics = Some(registry);
        self
    }

    /// Token that stops the loop at the next cycle boundary.
    pub fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.clone()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn counter(&self) -> CycleCounter {
        self.counter
    }

    pub fn writer(&self) -> &ReplicaWriter<T> {
        &self.writer
    }

    /// Runs one full cycle, writing the progress line to `progress`.
    pub fn run_cycle(&mut self, progress: &mut impl Write) -> Result<CycleReport, SimulatorError> {
        if self.state == LoopState::Terminated {
            return Err(SimulatorError::Terminated);
        }

        self.try_cycle(progress).map_err(|e| {
            error!(cycle = self.counter.value(), error = %e, "Cycle failed");
            self.state = LoopState::Terminated;
            e
        })
    }

    fn try_cycle(&mut self, progress: &mut impl Write) -> Result<CycleReport, SimulatorError> {
        let policy = self.counter.policy();
        let min_pool_size = self.config.min_pool_size;

        let time = self.source.generate(min_pool_size, SeedStrategy::TimeBased)?;
        let secure = self.source.generate(min_pool_size, SeedStrategy::SecureSeeded)?;
        let ident = self
            .source
            .generate(min_pool_size, SeedStrategy::IdentifierBased)?;
        let mixed = self.pool.combine(time, secure, ident);

        for chunk in mixed.iter() {
            self.writer.commit(chunk, policy.is_stomp())?;
            self.emit(progress, format_args!("{} ", chunk.to_base64()));
        }

        let delay = self.config.cycle_delay();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        self.emit(progress, format_args!("\n"));

        let report = CycleReport {
            cycle: self.counter.value(),
            policy,
            chunks: mixed.len(),
            bytes_written: mixed.byte_len(),
            replica_len: self.writer.replica_len()?,
        };
        self.counter.advance();

        if let Some(registry) = &self.metrics {
            registry.update(&MetricsSnapshot::from_components(
                &self.counter,
                &self.writer,
                &report,
            ));
        }

        debug!(
            cycle = report.cycle,
            policy = %report.policy,
            chunks = report.chunks,
            bytes = report.bytes_written,
            replica_len = report.replica_len,
            "Cycle committed"
        );

        Ok(report)
    }

    fn emit(&mut self, progress: &mut impl Write, args: fmt::Arguments<'_>) {
        if !self.progress_enabled {
            return;
        }
        if let Err(e) = progress.write_fmt(args).and_then(|()| progress.flush()) {
            warn!(error = %e, "Progress output failed; disabling");
            self.progress_enabled = false;
        }
    }

    /// Runs cycles until shutdown is requested, `max_cycles` is reached or
    /// a cycle fails. Returns the number of cycles completed by this call.
    pub fn run(&mut self, progress: &mut impl Write) -> Result<u64, SimulatorError> {
        let start = self.counter.value();

        while self.state == LoopState::Running {
            if self.shutdown.is_requested() {
                info!(cycles = self.counter.value(), "Shutdown requested");
                break;
            }
            if let Some(max) = self.config.max_cycles {
                if self.counter.value() >= max {
                    info!(cycles = max, "Cycle limit reached");
                    break;
                }
            }
            self.run_cycle(progress)?;
        }

        self.state = LoopState::Terminated;
        Ok(self.counter.value() - start)
    }

    /// Releases the replica handle.
    pub fn close(self) -> Result<(), SimulatorError> {
        self.writer.close().map_err(SimulatorError::from)
    }

    /// Consumes the loop, returning its writer.
    pub fn into_writer(self) -> ReplicaWriter<T> {
        self.writer
    }
}
