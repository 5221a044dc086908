//! Binary entry point (spec.md §6): parse the CLI, set up logging and the
//! communicator, build this rank's domain strip, seed or restore the field
//! particle population, and run the step loop, reporting phase timers and
//! the worker thread count at exit.

use std::path::PathBuf;

use clap::Parser;
use log::info;

use sph_solver::command_line_options::CommandLineOptions;
use sph_solver::communication::{CollectiveCommunicator, SizedCommunicator};
use sph_solver::config;
use sph_solver::domain::Domain;
use sph_solver::driver::Driver;
use sph_solver::initial_conditions::generate_dam_break_column;
use sph_solver::logging;
use sph_solver::particle::HashMapParticleStore;

#[cfg(feature = "mpi")]
fn build_communicator() -> sph_solver::communication::MpiWorld<sph_solver::particle::Particle> {
    sph_solver::communication::MpiWorld::new()
}

#[cfg(all(not(feature = "mpi"), feature = "local"))]
fn build_communicator() -> sph_solver::communication::LocalCommunicator<sph_solver::particle::Particle> {
    sph_solver::communication::get_local_communicators::<sph_solver::particle::Particle>(1)
        .pop()
        .expect("a single-rank local communicator always builds")
}

/// Read `SPH_NUM_THREADS` (ambient, SPEC_FULL.md §6) and size rayon's global
/// pool accordingly, playing the role of `OMP_NUM_THREADS` in the original
/// source. Absent or unparsable, rayon's own default (one thread per core)
/// is left untouched.
fn configure_thread_pool() -> Option<usize> {
    let threads: usize = std::env::var("SPH_NUM_THREADS").ok()?.parse().ok()?;
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .unwrap_or_else(|e| log::warn!("failed to size the rayon thread pool to {threads}: {e}"));
    Some(threads)
}

fn main() {
    let opts = CommandLineOptions::parse();

    let mut comm = build_communicator();
    let rank = comm.rank();
    let size = comm.size();
    let domain = Domain::new(rank as usize, size);

    logging::init(&PathBuf::from("logs"), rank, opts.verbosity);
    // Configuration errors are non-fatal (spec.md §7): every downstream use
    // of `opts` already tolerates the inverted-range and zero-frequency
    // cases safely, so this rank just keeps running with what it was given.
    if let Err(err) = opts.validate() {
        log::warn!("rank {rank}: {err}");
    }
    if let Some(threads) = configure_thread_pool() {
        info!("rank {rank}: rayon thread pool sized to {threads} (SPH_NUM_THREADS)");
    }
    info!(
        "rank {rank}/{size}: owns x in [{:.4}, {:.4}), running iterations {} to {}",
        domain.lo,
        domain.hi,
        opts.min_iteration(),
        opts.max_iteration
    );

    let store = HashMapParticleStore::default();
    let mut driver = Driver::new(domain, comm, store, config::DT, opts.checkpoint_dir.clone(), opts.checkpoint_frequency);

    let start_iteration = if opts.is_restart() {
        let checkpoint_index = opts.min_iteration();
        let checkpoint = driver.restart_from(checkpoint_index);
        info!("rank {rank}: restarted from checkpoint {checkpoint_index:04} at iteration {}", checkpoint.iteration);
        checkpoint.iteration
    } else {
        let column = generate_dam_break_column(&driver.domain);
        info!("rank {rank}: seeded {} field particles", column.len());
        for p in column {
            driver.store.insert(p);
        }
        opts.min_iteration()
    };

    for iteration in start_iteration..opts.max_iteration {
        driver.step(iteration);
    }

    driver.comm.barrier();
    for (phase, duration) in driver.timers().phases() {
        info!("rank {rank}: phase {phase} total {:.3}s", duration.as_secs_f64());
    }
}
