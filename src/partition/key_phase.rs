//! One-shot key phase: tuples sharing a graph edge key collapse onto the
//! smallest component label seen in the group, priming the main loop.

use crate::peer::sort::parallel_sort;
use crate::peer::Peer;
use crate::tuples::{by_key, Tuple};

/// Chains per-peer run summaries across peers: equal keys fold their minimum
/// label, a different key supersedes the accumulator.
fn chain_min(acc: &Tuple, own: &Tuple) -> Tuple {
    if acc.key == own.key {
        Tuple::new(own.key, own.next, acc.current.min(own.current))
    } else {
        *own
    }
}

fn run_end(data: &[Tuple], begin: usize) -> usize {
    let key = data[begin].key;
    let mut end = begin + 1;
    while end < data.len() && data[end].key == key {
        end += 1;
    }
    end
}

/// A `(key, minimum current)` summary of one equal-key run, carried in the
/// `current` slot so it can travel through the scan collectives.
fn summary(run: &[Tuple]) -> Tuple {
    let min = run.iter().map(|t| t.current).min().expect("empty key run");
    Tuple::new(run[0].key, 0, min)
}

/// Globally sorts by key and stamps each maximal equal-key run's minimum
/// `current` into every member's `next`. Runs straddling peer boundaries are
/// resolved with one scan in each direction.
pub fn reduce(peer: &Peer, tuples: Vec<Tuple>) -> Vec<Tuple> {
    let mut local = parallel_sort(peer, tuples, by_key);
    assert!(!local.is_empty(), "peer {} has no tuples after the key sort", peer.rank());
    let group = peer.world_group();

    let last = local[local.len() - 1];
    let last_run_begin = local.partition_point(|t| t.key < last.key);
    let before = peer.exscan(&group, summary(&local[last_run_begin..]), chain_min);

    let first = local[0];
    let first_run_end = local.partition_point(|t| t.key <= first.key);
    let after = peer.reverse_exscan(&group, summary(&local[..first_run_end]), chain_min);

    let mut begin = 0;
    while begin < local.len() {
        let end = run_end(&local, begin);
        let mut label =
            local[begin..end].iter().map(|t| t.current).min().expect("empty key run");
        if begin == 0 {
            if let Some(prev) = before {
                if prev.key == first.key {
                    label = label.min(prev.current);
                }
            }
        }
        if end == local.len() {
            if let Some(next) = after {
                if next.key == last.key {
                    label = label.min(next.current);
                }
            }
        }
        for tuple in &mut local[begin..end] {
            tuple.next = label;
        }
        begin = end;
    }
    local
}

#[cfg(test)]
mod tests {
    use super::reduce;
    use crate::peer::PeerGroup;
    use crate::tuples::Tuple;
    use hashbrown::HashMap;

    fn minimum_by_key(tuples: &[Tuple]) -> HashMap<u64, u32> {
        let mut mins = HashMap::new();
        for tuple in tuples {
            let entry = mins.entry(tuple.key).or_insert(tuple.current);
            *entry = (*entry).min(tuple.current);
        }
        mins
    }

    fn assert_reduced(peers: usize, input: Vec<Vec<Tuple>>) {
        let expected = minimum_by_key(&input.concat());
        let results = PeerGroup::execute(peers, move |peer| {
            reduce(&peer, input[peer.rank()].clone())
        })
        .expect("peer group failed");
        let reduced: Vec<Tuple> = results.into_iter().flatten().collect();
        for tuple in &reduced {
            assert_eq!(tuple.next, expected[&tuple.key], "wrong minimum for key {}", tuple.key);
        }
    }

    #[test]
    fn stamps_run_minimum_into_every_member() {
        assert_reduced(
            1,
            vec![vec![
                Tuple::new(10, 5, 5),
                Tuple::new(10, 3, 3),
                Tuple::new(20, 8, 8),
                Tuple::new(10, 7, 7),
            ]],
        );
    }

    #[test]
    fn resolves_runs_straddling_peers() {
        assert_reduced(
            2,
            vec![
                vec![Tuple::new(1, 5, 5), Tuple::new(1, 9, 9), Tuple::new(2, 4, 4)],
                vec![Tuple::new(2, 1, 1), Tuple::new(3, 7, 7)],
            ],
        );
    }

    #[test]
    fn resolves_a_run_spanning_every_peer() {
        assert_reduced(
            4,
            vec![
                vec![Tuple::new(9, 6, 6), Tuple::new(9, 8, 8)],
                vec![Tuple::new(9, 2, 2), Tuple::new(9, 7, 7)],
                vec![Tuple::new(9, 5, 5), Tuple::new(9, 9, 9)],
                vec![Tuple::new(9, 4, 4), Tuple::new(9, 3, 3)],
            ],
        );
    }
}
