//! Post-convergence seed extraction: exactly one representative tuple per
//! component label, collected on the coordinator.

use crate::peer::sort::parallel_sort;
use crate::peer::Peer;
use crate::tuples::{by_current, Tuple};

/// Reduces the converged tuple sequence to one tuple per distinct label,
/// co-locating equal labels with an all-to-all so the local unique pass is
/// globally exact. Collective.
pub fn extract(peer: &Peer, mut tuples: Vec<Tuple>) -> Vec<Tuple> {
    // residual candidate labels were consumed during convergence
    for tuple in &mut tuples {
        tuple.next = tuple.current;
    }

    let sorted = parallel_sort(peer, tuples, by_current);

    // local unique, keeping the first of each equal-label run
    let mut seeds: Vec<Tuple> = Vec::new();
    for tuple in &sorted {
        if seeds.last().map_or(true, |seed| seed.current < tuple.current) {
            seeds.push(*tuple);
        }
    }
    if peer.peers() == 1 {
        return seeds;
    }

    // tentative splitters: the first unique of every peer except the first
    let contribution = if peer.rank() > 0 { seeds.first().copied() } else { None };
    let splitters = peer.allgather_tuples(contribution.into_iter().collect());

    // duplicates can only sit at peer boundaries; partitioning the uniques
    // against the splitters moves every equal-label range onto one peer
    let mut send_counts = vec![0_usize; peer.peers()];
    let mut begin = 0;
    for (to, splitter) in splitters.iter().enumerate() {
        let end = begin + seeds[begin..].partition_point(|t| t.current < splitter.current);
        send_counts[to] = end - begin;
        begin = end;
    }
    send_counts[splitters.len()] = seeds.len() - begin;
    let mut seeds = peer.all_to_all(seeds, &send_counts);

    seeds.sort_unstable_by(by_current);
    seeds.dedup_by(|a, b| a.current == b.current);
    seeds
}

/// Gathers the per-peer uniques on the coordinator. Only rank 0 gets `Some`.
pub fn gather(peer: &Peer, seeds: Vec<Tuple>) -> Option<Vec<Tuple>> {
    peer.gatherv(seeds, 0)
}
