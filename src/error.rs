//! Crate-level error type.

use crate::metrics::MetricsError;
use crate::replica::WriterError;
use crate::simulation::ConfigError;
use crate::source::SourceError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that terminate the simulation.
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("entropy generation failed: {0}")]
    SeedUnavailable(#[source] SourceError),
    #[error("replica I/O failure: {0}")]
    IoFailure(#[source] WriterError),
    #[error("replica location not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("failed to read replica directory from input: {0}")]
    StartupInput(#[source] io::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("metrics registry: {0}")]
    Metrics(#[from] MetricsError),
    #[error("simulation already terminated")]
    Terminated,
}

impl From<SourceError> for SimulatorError {
    fn from(e: SourceError) -> Self {
        SimulatorError::SeedUnavailable(e)
    }
}

impl From<WriterError> for SimulatorError {
    fn from(e: WriterError) -> Self {
        match e {
            WriterError::FileNotFound { path } => SimulatorError::FileNotFound(path),
            other => SimulatorError::IoFailure(other),
        }
    }
}
