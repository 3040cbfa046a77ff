//! Ccsort computes the connected components of very large implicit graphs
//! (k-mer/read datasets or synthetic Kronecker graphs) on a bulk-synchronous
//! group of equal peers. Component labels converge in `O(log D_max)`
//! supersteps, each one a global sort by label followed by a boundary-aware
//! bucket scan that merges partitions onto their minimum label. Converged
//! partitions can retire out of the sorted region, and the remaining active
//! region can be rebalanced across peers every superstep.

// Enable warnings for all clippy lints. This automatically enables new lints
// shipped with new rust versions.
#![warn(clippy::correctness, clippy::style, clippy::complexity, clippy::perf, clippy::pedantic)]
// Now selectively disable unneeded lints.
#![allow(
    clippy::indexing_slicing,               // Allow `vec[i]` indexing.
    clippy::module_name_repetitions,        // Allow.
    clippy::missing_errors_doc,             // Disabled.
    clippy::missing_panics_doc,             // Disabled.
    clippy::must_use_candidate,             // Allow.
    clippy::cast_possible_truncation,       // Allow but only when absolutely necessary.
    clippy::cast_precision_loss             // Allow.
)]
// Do not allow print statements. Use `log::info!()` or equivalent instead.
#![deny(clippy::print_stdout)]

pub mod compare;
pub mod error;
pub mod input;
pub mod partition;
pub mod peer;
pub mod tuples;
pub mod util;

#[macro_use]
extern crate derive_new;

use crate::error::CcError;
use crate::input::InputConfig;
use crate::partition::{seeds, Method};
use crate::peer::PeerGroup;
use crate::util::io::CcWriter;
use crate::util::memory_usage::print_memory_usage;
use crate::util::timer::CcTimer;
use log::info;

/// Everything one job needs: the peer-group size fixed at start, the
/// partitioner variant, the input producer, and the output prefix.
#[derive(Clone, Debug)]
pub struct JobConfig {
    pub peers: usize,
    pub method: Method,
    pub input: InputConfig,
    pub seed_file: String,
}

pub struct JobSummary {
    pub seed_count: usize,
    pub supersteps: usize,
}

/// Runs a full job: spawns the peer group; inside it produces the input,
/// reduces by key, iterates the selected variant to convergence, and extracts
/// the component seeds; then writes one label per line on the coordinator.
pub fn run_job(config: &JobConfig) -> Result<JobSummary, CcError> {
    info!("Running with {} peers, method '{}'", config.peers, config.method);
    print_memory_usage(format_args!("starting peer group"));
    let timer = CcTimer::now();

    let input = config.input.clone();
    let method = config.method;
    let results = PeerGroup::execute(config.peers, move |peer| {
        let tuples = input
            .produce(&peer)
            .unwrap_or_else(|e| panic!("peer {} aborting: {}", peer.rank(), e));
        let (converged, supersteps) = partition::run(&peer, tuples, method);
        let uniques = seeds::extract(&peer, converged);
        (seeds::gather(&peer, uniques), supersteps)
    })?;

    let (gathered, supersteps) =
        results.into_iter().next().expect("peer group returned no results");
    let seeds = gathered.expect("coordinator did not gather seeds");

    let seed_path = format!("{}.{}", config.seed_file, config.method.suffix());
    let mut writer = CcWriter::new(seed_path.clone())?;
    writer.write_file_lines(seeds.iter().map(|tuple| tuple.current.to_string()))?;

    info!("Algorithm took {} supersteps in {}", supersteps, timer.elapsed().to_seconds_string());
    info!("partition count = {}, seeds written to {}", seeds.len(), seed_path);
    print_memory_usage(format_args!("job complete"));
    Ok(JobSummary { seed_count: seeds.len(), supersteps })
}
