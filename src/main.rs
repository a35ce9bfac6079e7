//! /dev/random replica CLI.
//!
//! Prompts for (or takes) a target directory and keeps regenerating
//! `<dir>/dev_random_replica` until interrupted.

use clap::Parser;
use dev_random_replica::{FileConfig, SimulationLoop, SimulatorConfig, SimulatorError};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "dev-random-replica", version, about)]
struct Cli {
    /// Directory in which to create the replica (prompted for if omitted).
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Batch-size threshold in bytes.
    #[arg(long)]
    min_pool_size: Option<usize>,

    /// Bytes drawn per reseed.
    #[arg(long)]
    chunk_width: Option<usize>,

    /// Pause between cycles in milliseconds.
    #[arg(long)]
    cycle_delay_ms: Option<u64>,

    /// Stop after this many cycles.
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Suppress the per-cycle base64 line.
    #[arg(short, long)]
    quiet: bool,

    /// Serve Prometheus metrics on this port.
    #[cfg(feature = "metrics")]
    #[arg(long)]
    metrics_port: Option<u16>,
}

fn main() {
    // Logs go to stderr; stdout carries the progress line
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), SimulatorError> {
    let file_config = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let config = merge(file_config.simulator.clone(), &cli);

    let dir = match cli.dir {
        Some(dir) => dir,
        None => read_target_dir(&mut io::stdin().lock(), &mut io::stdout())?,
    };

    info!("dev-random-replica v{}", dev_random_replica::VERSION);

    let mut sim = SimulationLoop::open(config, &dir)?;

    #[cfg(feature = "metrics")]
    {
        let port = cli.metrics_port.unwrap_or(file_config.metrics.port);
        if port != 0 {
            use dev_random_replica::metrics::{MetricsServer, MetricsServerConfig};
            let registry = dev_random_replica::MetricsRegistry::new()?;
            MetricsServer::new(MetricsServerConfig::with_port(port), registry.clone()).spawn();
            sim = sim.with_metrics(registry);
        }
    }

    let token = sim.shutdown_token();
    if let Err(e) = ctrlc::set_handler(move || token.request()) {
        warn!(error = %e, "Failed to install signal handler");
    }

    let result = sim.run(&mut io::stdout().lock());

    // Release the handle on every exit path without masking a loop error
    match (result, sim.close()) {
        (Ok(cycles), Ok(())) => {
            info!(cycles, "Simulation finished");
            Ok(())
        }
        (Ok(_), Err(e)) => Err(e),
        (Err(e), close) => {
            if let Err(close_err) = close {
                warn!(error = %close_err, "Error while closing replica");
            }
            Err(e)
        }
    }
}

fn merge(mut config: SimulatorConfig, cli: &Cli) -> SimulatorConfig {
    if let Some(v) = cli.min_pool_size {
        config.min_pool_size = v;
    }
    if let Some(v) = cli.chunk_width {
        config.chunk_width = v;
    }
    if let Some(v) = cli.cycle_delay_ms {
        config.cycle_delay_ms = v;
    }
    if cli.max_cycles.is_some() {
        config.max_cycles = cli.max_cycles;
    }
    if cli.quiet {
        config.print_progress = false;
    }
    config
}

/// Prompts on `prompt` and reads one directory line from `input`.
fn read_target_dir(
    input: &mut impl BufRead,
    prompt: &mut impl Write,
) -> Result<PathBuf, SimulatorError> {
    let mut line = String::new();
    writeln!(
        prompt,
        "Please input directory location for the [dev_random_replica] file creation"
    )
    .and_then(|()| prompt.flush())
    .and_then(|()| input.read_line(&mut line))
    .map_err(SimulatorError::StartupInput)?;

    Ok(PathBuf::from(line.trim_end_matches(['\r', '\n'])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    /// Input that fails every read.
    struct BrokenInput;

    impl Read for BrokenInput {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdin closed"))
        }
    }

    #[test]
    fn test_reads_directory_line() {
        let mut prompt = Vec::new();
        let dir = read_target_dir(&mut Cursor::new("/tmp/replica\r\n"), &mut prompt).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/replica"));
        assert!(String::from_utf8(prompt).unwrap().contains("[dev_random_replica]"));
    }

    #[test]
    fn test_input_failure_keeps_cause() {
        let err = read_target_dir(&mut BufReader::new(BrokenInput), &mut io::sink()).unwrap_err();
        assert!(err.to_string().contains("stdin closed"));
        assert!(matches!(
            err,
            SimulatorError::StartupInput(ref cause) if cause.kind() == io::ErrorKind::BrokenPipe
        ));
    }
}
