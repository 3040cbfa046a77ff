//! Pruning variant: partitions that have converged retire out of the sorted
//! region, so later supersteps sort and scan ever smaller active segments.
//! With `load_balance` the active region is additionally rebalanced across
//! peers every superstep.

use crate::partition::{boundary_witnesses, bucket_end, log_distribution, Boundary};
use crate::peer::distribution::block_decompose;
use crate::peer::sort::parallel_sort;
use crate::peer::Peer;
use crate::tuples::{by_current_next, Tuple, INACTIVE, SETTLING};
use crate::util::timer::CcTimer;
use log::info;

pub fn run(peer: &Peer, tuples: Vec<Tuple>, load_balance: bool) -> (Vec<Tuple>, usize) {
    let mut active = tuples;
    let mut retired: Vec<Tuple> = Vec::new();
    let mut supersteps = 0;
    let mut keep_going = true;
    while keep_going {
        let timer = CcTimer::now();
        active = parallel_sort(peer, active, by_current_next);
        log_distribution(peer, active.len());

        // peers whose active region emptied skip boundary exchange and scan
        let group = peer.split(!active.is_empty());

        let mut fresh = Vec::new();
        let mut done = true;
        if group.index().is_some() {
            let boundary = boundary_witnesses(peer, &group, &active);
            scan_buckets(&mut active, &boundary, &mut fresh, &mut done);
        }

        // fresh tuples join the active region; fully retired ones leave it
        active.extend(fresh);
        let split = itertools::partition(&mut active, |t| t.next != INACTIVE);
        retired.extend(active.drain(split..));

        if load_balance {
            active = block_decompose(peer, active);
        }

        keep_going = !peer.test_all(done);
        supersteps += 1;
        if peer.is_coordinator() {
            info!(
                "Superstep #{} [{}] ({} retired here)",
                supersteps,
                timer.elapsed().to_millis_string(),
                retired.len()
            );
        }
    }
    active.extend(retired);
    (active, supersteps)
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
            let tuple = &mut local[begin];
            if tuple.next == SETTLING {
                tuple.next = INACTIVE;
            } else {
                tuple.current = tuple.next;
            }
            begin = end;
            continue;
        }

        if min_next == max_next {
            if max_next == SETTLING {
                // settled last superstep; retire for good
                for tuple in &mut local[begin..end] {
                    tuple.next = INACTIVE;
                }
            } else if max_next == bucket_label {
                // converged onto its own label, but neighbours must still see
                // a stable bucket for one more round
                for tuple in &mut local[begin..end] {
                    tuple.next = SETTLING;
                }
            } else {
                for tuple in &mut local[begin..end] {
                    tuple.current = tuple.next;
                }
            }
            begin = end;
            continue;
        }

        if min_next > bucket_label {
            min_next = bucket_label;
        }

        *done = false;

        let mut found_flip = false;
        let mut cursor = begin;
        let mut prev_next;
        if straddles_left {
            prev_next = boundary.prev_el.expect("straddling bucket without a left witness").next;
        } else {
            // the first entry keeps the bucket minimum
            if local[begin].next > min_next {
                local[begin].next = min_next;
            }
            prev_next = min_next;
            cursor += 1;
        }
        for i in cursor..end {
            if local[i].next == SETTLING {
                local[i].next = local[i].current;
            }
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
