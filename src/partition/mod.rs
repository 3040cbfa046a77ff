use crate::error::{config_error, CcError};
use crate::peer::{Group, Peer};
use crate::tuples::{max_current_min_next, min_current_max_next, Tuple};
use log::debug;

pub mod inactive;
pub mod key_phase;
pub mod seeds;
pub mod standard;

/// Variant of the iterative partitioner.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Method {
    /// Every tuple stays in the active region for the whole run.
    Standard,
    /// Converged partitions retire out of the sorted region.
    Inactive,
    /// As `Inactive`, plus per-superstep rebalancing of the active region.
    LoadBalance,
}

impl Method {
    /// The method name as it appears on the CLI and in output file suffixes.
    pub fn suffix(self) -> &'static str {
        match self {
            Method::Standard => "standard",
            Method::Inactive => "inactive",
            Method::LoadBalance => "loadbalance",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.suffix())
    }
}

impl std::str::FromStr for Method {
    type Err = CcError;

    fn from_str(value: &str) -> Result<Self, CcError> {
        match value.to_ascii_lowercase().as_str() {
            "standard" => Ok(Method::Standard),
            "inactive" => Ok(Method::Inactive),
            "loadbalance" => Ok(Method::LoadBalance),
            other => Err(config_error(format!("Unknown method '{}'", other))),
        }
    }
}

/// Runs the one-shot key phase followed by the selected variant of the
/// iterative partitioner. Returns the converged tuples and the number of
/// supersteps the main loop took.
pub fn run(peer: &Peer, tuples: Vec<Tuple>, method: Method) -> (Vec<Tuple>, usize) {
    let reduced = key_phase::reduce(peer, tuples);
    match method {
        Method::Standard => standard::run(peer, reduced),
        Method::Inactive => inactive::run(peer, reduced, false),
        Method::LoadBalance => inactive::run(peer, reduced, true),
    }
}

/// End of the maximal equal-`current` run starting at `begin`. Buckets are
/// found linearly; the scan visits each element once overall.
pub(crate) fn bucket_end(data: &[Tuple], begin: usize) -> usize {
    let label = data[begin].current;
    let mut end = begin + 1;
    while end < data.len() && data[end].current == label {
        end += 1;
    }
    end
}

/// Witnesses exchanged with neighbouring group members before the bucket
/// scan. `prev_min` is the first element of the bucket straddling in from the
/// left, `next_max` the last element of the bucket straddling in from the
/// right, `prev_el` the immediately preceding tuple. Each is `None` on the
/// group member that has no neighbour on that side.
pub(crate) struct Boundary {
    pub prev_min: Option<Tuple>,
    pub next_max: Option<Tuple>,
    pub prev_el: Option<Tuple>,
}

/// Collective over `group`; `active` must be non-empty and sorted by
/// `(current, next)` on every member.
pub(crate) fn boundary_witnesses(peer: &Peer, group: &Group, active: &[Tuple]) -> Boundary {
    let first = active[0];
    let last = active[active.len() - 1];

    let last_bucket_first = active[active.partition_point(|t| t.current < last.current)];
    let prev_min = peer.exscan(group, last_bucket_first, max_current_min_next);
    let prev_el = peer.right_shift(group, last);

    let first_bucket_last = active[active.partition_point(|t| t.current <= first.current) - 1];
    let next_max = peer.reverse_exscan(group, first_bucket_last, min_current_max_next);

    Boundary { prev_min, next_max, prev_el }
}

/// Per-superstep diagnostic of how evenly tuples are spread. Collective.
pub(crate) fn log_distribution(peer: &Peer, local_size: usize) {
    let sizes = peer.allgather_size(local_size);
    if peer.is_coordinator() {
        let max = sizes.iter().max().expect("empty peer group");
        let min = sizes.iter().min().expect("empty peer group");
        let sum: usize = sizes.iter().sum();
        debug!("local sizes: [max: {}, min: {}, sum: {}]", max, min, sum);
    }
}
