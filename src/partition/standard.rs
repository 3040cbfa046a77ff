//! Naive variant of the iterative partitioner: the whole tuple sequence is
//! re-sorted and re-scanned every superstep.

use crate::partition::{boundary_witnesses, bucket_end, log_distribution, Boundary};
use crate::peer::sort::parallel_sort;
use crate::peer::Peer;
use crate::tuples::{by_current_next, Tuple};
use crate::util::timer::CcTimer;
use log::{debug, info};

pub fn run(peer: &Peer, mut local: Vec<Tuple>) -> (Vec<Tuple>, usize) {
    let mut supersteps = 0;
    let mut keep_going = true;
    while keep_going {
        let timer = CcTimer::now();
        local = parallel_sort(peer, local, by_current_next);
        assert!(!local.is_empty(), "peer {} ran out of tuples mid-run", peer.rank());
        let sorted_at = timer.elapsed();
        log_distribution(peer, local.len());

        let group = peer.world_group();
        let boundary = boundary_witnesses(peer, &group, &local);

        let mut fresh = Vec::new();
        let mut done = true;
        scan_buckets(&mut local, &boundary, &mut fresh, &mut done);
        local.extend(fresh);

        keep_going = !peer.test_all(done);
        supersteps += 1;
        if peer.is_coordinator() {
            info!("Superstep #{} [{}]", supersteps, timer.elapsed().to_millis_string());
            debug!("superstep sort took {}", sorted_at.to_millis_string());
        }
    }
    (local, supersteps)
}

fn scan_buckets(local: &mut [Tuple], boundary: &Boundary, fresh: &mut Vec<Tuple>, done: &mut bool) {
    let mut begin = 0;
    while begin < local.len() {
        let end = bucket_end(local, begin);
        let bucket_label = local[begin].current;

        let mut min_next = local[begin].next;
        if let Some(witness) = boundary.prev_min {
            if witness.current == bucket_label {
                // the bucket starts on a peer to the left
                min_next = witness.next;
            }
        }
        let mut max_next = local[end - 1].next;
        if let Some(witness) = boundary.next_max {
            if witness.current == bucket_label {
                max_next = witness.next;
            }
        }
        let straddles_left = boundary.prev_el.map_or(false, |t| t.current == bucket_label);

        if end - begin == 1 && !straddles_left {
            // lone tuple: adopt the proposal and move on
            local[begin].current = local[begin].next;
            begin = end;
            continue;
        }

        if min_next == max_next {
            // the whole bucket agrees on one proposal
            for tuple in &mut local[begin..end] {
                tuple.current = tuple.next;
            }
            begin = end;
            continue;
        }

        *done = false;

        let mut found_flip = false;
        let mut cursor = begin;
        let mut prev_next;
        if straddles_left {
            prev_next = boundary.prev_el.expect("straddling bucket without a left witness").next;
        } else {
            // the first entry already carries the bucket minimum
            prev_next = min_next;
            cursor += 1;
        }
        for i in cursor..end {
            let entry_next = local[i].next;
            if entry_next == prev_next || entry_next == local[i].current {
                if found_flip {
                    // duplicate candidate: merge straight into the minimum
                    local[i].next = min_next;
                    local[i].current = min_next;
                } else {
                    // keep one flipped link from the old label to the minimum
                    found_flip = true;
                    local[i].next = local[i].current;
                    local[i].current = min_next;
                }
            } else {
                // forward the old label and stamp the new minimum
                local[i] = local[i].flipped();
                local[i].next = min_next;
            }
            prev_next = entry_next;
        }

        if !found_flip {
            // carry the bucket's label across the next sort
            fresh.push(local[begin].flipped());
        }
        begin = end;
    }
}
