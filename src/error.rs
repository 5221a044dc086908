//! Error taxonomy (spec.md §7). Configuration errors are logged and
//! non-fatal; checkpoint I/O failures propagate to the caller; allocation
//! failures and communication faults are treated as unrecoverable and abort
//! the process, matching the original source's `exit(1)` on a failed
//! `realloc`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("minimum iteration {min} must not exceed maximum iteration {max}")]
    IterationRangeInverted { min: u64, max: u64 },
    #[error("checkpoint frequency must be nonzero when restarting")]
    ZeroCheckpointFrequency,
    #[error("restart requested but no checkpoint found at {0}")]
    MissingRestartCheckpoint(PathBuf),
}

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("failed to create checkpoint directory {path}: {source}")]
    CreateDir { path: PathBuf, source: std::io::Error },
    #[error("failed to write checkpoint {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("failed to read checkpoint {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("checkpoint {path} is corrupt: {source}")]
    Decode {
        path: PathBuf,
        source: Box<bincode::ErrorKind>,
    },
    #[error("checkpoint {path} could not be encoded: {source}")]
    Encode {
        path: PathBuf,
        source: Box<bincode::ErrorKind>,
    },
}
