//! Per-rank leveled logging (grounded on the teacher's `log_setup` in
//! `simulation_builder.rs`): rank 0 logs to the terminal and to a file,
//! every other rank logs to its own file only, at a level derived from the
//! `-v` occurrence count.

use std::fs::{self, File};

use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, LevelPadding, TermLogger, TerminalMode, WriteLogger};

fn level_for_verbosity(verbosity: usize) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initialize the global logger for this rank. `log_dir` is created if
/// missing; each rank writes to `log_dir/rank_<rank>.log`.
pub fn init(log_dir: &std::path::Path, rank: i32, verbosity: usize) {
    fs::create_dir_all(log_dir).unwrap_or_else(|e| panic!("failed to create log directory {log_dir:?}: {e}"));
    let level = level_for_verbosity(verbosity);
    let local = chrono::Local::now();
    let offset = local.offset();
    let config = ConfigBuilder::default()
        .set_level_padding(LevelPadding::Right)
        .set_time_offset(time::UtcOffset::from_whole_seconds(offset.local_minus_utc()).unwrap_or(time::UtcOffset::UTC))
        .set_thread_level(LevelFilter::Off)
        .build();
    let output_file = log_dir.join(format!("rank_{rank}.log"));
    let file = File::create(&output_file).unwrap_or_else(|e| panic!("failed to create log file {output_file:?}: {e}"));

    if rank == 0 {
        CombinedLogger::init(vec![
            TermLogger::new(level, config.clone(), TerminalMode::Mixed, ColorChoice::Auto),
            WriteLogger::new(level, config, file),
        ])
        .expect("logger already initialized");
    } else {
        WriteLogger::init(level, config, file).expect("logger already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_increasing_levels() {
        assert_eq!(level_for_verbosity(0), LevelFilter::Info);
        assert_eq!(level_for_verbosity(1), LevelFilter::Debug);
        assert_eq!(level_for_verbosity(2), LevelFilter::Trace);
        assert_eq!(level_for_verbosity(99), LevelFilter::Trace);
    }
}
