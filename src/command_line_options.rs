//! CLI surface (spec.md §6), grounded on the teacher's
//! `command_line_options.rs`: a `clap::Parser` derive struct matching the
//! original `getopt`-based `-i`/`-c`/`-r` flags, plus a verbosity counter.

use std::path::PathBuf;

use clap::Parser;

use crate::config;
use crate::error::ConfigError;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about = "Distributed weakly-compressible SPH dam-break solver", long_about = None)]
pub struct CommandLineOptions {
    /// Maximum iteration to run to (`-i` in the original source).
    #[clap(short = 'i', long = "max-iteration", default_value_t = config::DEFAULT_MAX_ITERATION)]
    pub max_iteration: u64,

    /// Checkpoint write frequency in iterations (`-c`).
    #[clap(short = 'c', long = "checkpoint-frequency", default_value_t = config::DEFAULT_CHECKPOINT_FREQUENCY)]
    pub checkpoint_frequency: u64,

    /// Iteration to restart from; presence of this flag enables restart
    /// mode (`-r`).
    #[clap(short = 'r', long = "restart-iteration")]
    pub restart_iteration: Option<u64>,

    /// Directory holding (and to write) checkpoint files.
    #[clap(long = "checkpoint-dir", default_value = "plot")]
    pub checkpoint_dir: PathBuf,

    /// Repeatable `-v` flag selecting the log level (info / debug / trace).
    #[clap(short = 'v', parse(from_occurrences))]
    pub verbosity: usize,
}

impl CommandLineOptions {
    pub fn min_iteration(&self) -> u64 {
        self.restart_iteration.unwrap_or(config::DEFAULT_MIN_ITERATION)
    }

    pub fn is_restart(&self) -> bool {
        self.restart_iteration.is_some()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let min = self.min_iteration();
        if min > self.max_iteration {
            return Err(ConfigError::IterationRangeInverted { min, max: self.max_iteration });
        }
        if self.is_restart() && self.checkpoint_frequency == 0 {
            return Err(ConfigError::ZeroCheckpointFrequency);
        }
        Ok(())
    }
}
