//! The generation/commit loop.
//!
//! Each cycle generates one batch per [`SeedStrategy`](crate::source::SeedStrategy),
//! mixes them, commits every chunk under the current cycle parity, pauses
//! and then advances the [`CycleCounter`].

mod config;
mod cycle;
mod runner;
mod shutdown;

pub use config::{ConfigError, FileConfig, MetricsConfig, SimulatorConfig, MAX_CHUNK_WIDTH};
pub use cycle::{CycleCounter, CycleReport, WritePolicy};
pub use runner::{LoopState, SimulationLoop};
pub use shutdown::ShutdownToken;
