//! /dev/random replica generator.
//!
//! Continuously regenerates a `dev_random_replica` file with pseudo-random
//! bytes, imitating a readable entropy device.
//!
//! # Architecture
//!
//! ```text
//! source (time | secure | uuid) → mixing → replica
//!                  ↑                          ↓
//!                  └──────── simulation ──────┘
//! ```
//!
//! Each cycle draws one batch per seeding strategy, shuffles the combined
//! chunks and commits them to the replica. Even cycles seek to offset 0
//! before every chunk (only the last chunk survives at the start of the
//! file); odd cycles append from wherever the previous write ended.
//!
//! # Design Principles
//!
//! - **No cryptographic claims**: only the secure strategy's seed is secure
//! - **Stateless chunks**: every chunk is a pure function of its seed
//! - **Fail-stop**: any seed or I/O failure terminates the loop
//!
//! # Example
//!
//! ```no_run
//! use dev_random_replica::{SimulationLoop, SimulatorConfig};
//!
//! let config = SimulatorConfig {
//!     max_cycles: Some(4),
//!     ..Default::default()
//! };
//! let mut sim = SimulationLoop::open(config, "/tmp").unwrap();
//! sim.run(&mut std::io::stdout()).unwrap();
//! sim.close().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod metrics;
pub mod mixing;
pub mod replica;
pub mod simulation;
pub mod source;

// Re-export commonly used types at crate root
pub use error::SimulatorError;
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use mixing::{EntropyPool, MixedBatch};
pub use replica::{ReplicaTarget, ReplicaWriter, REPLICA_FILE_NAME};
pub use simulation::{
    CycleCounter, CycleReport, FileConfig, LoopState, ShutdownToken, SimulationLoop,
    SimulatorConfig, WritePolicy,
};
pub use source::{Chunk, ChunkBatch, EntropySource, SeedStrategy};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
