//! Distributed sample sort. Local sort, regular-sample splitter selection,
//! splitter partition, all-to-all, local re-sort, then block redistribution so
//! every peer ends with a near-equal share of the global order.

use crate::peer::distribution::block_decompose;
use crate::peer::Peer;
use crate::tuples::Tuple;
use std::cmp::Ordering;

pub fn parallel_sort<F>(peer: &Peer, mut data: Vec<Tuple>, cmp: F) -> Vec<Tuple>
where
    F: Fn(&Tuple, &Tuple) -> Ordering + Copy,
{
    data.sort_unstable_by(cmp);
    if peer.peers() == 1 {
        return data;
    }

    let peers = peer.peers();
    let samples: Vec<Tuple> = if data.is_empty() {
        Vec::new()
    } else {
        (1..peers).map(|i| data[i * data.len() / peers]).collect()
    };
    let mut all_samples = peer.allgather_tuples(samples);
    all_samples.sort_unstable_by(cmp);

    let splitters: Vec<Tuple> = if all_samples.is_empty() {
        Vec::new()
    } else {
        (1..peers).map(|i| all_samples[i * all_samples.len() / peers]).collect()
    };

    // bucket i takes everything strictly below splitter i; equal elements all
    // land in the same bucket, which keeps the concatenation globally sorted
    let mut send_counts = vec![0_usize; peers];
    let mut begin = 0;
    for (to, splitter) in splitters.iter().enumerate() {
        let end =
            begin + data[begin..].partition_point(|tuple| cmp(tuple, splitter) == Ordering::Less);
        send_counts[to] = end - begin;
        begin = end;
    }
    send_counts[splitters.len()] = data.len() - begin;

    let mut merged = peer.all_to_all(data, &send_counts);
    merged.sort_unstable_by(cmp);
    block_decompose(peer, merged)
}

#[cfg(test)]
mod tests {
    use super::parallel_sort;
    use crate::peer::PeerGroup;
    use crate::tuples::{by_current_next, by_key, Tuple};

    fn scrambled(rank: usize) -> Vec<Tuple> {
        // deterministic but thoroughly unordered per-peer data
        (0..50_u64)
            .map(|i| {
                let value = (i * 2_654_435_761 + rank as u64 * 97) % 1_000;
                Tuple::new(value, (value % 13) as u32, (value % 7) as u32)
            })
            .collect()
    }

    #[test]
    fn sorts_globally_and_balances() {
        let peers = 4;
        let results =
            PeerGroup::execute(peers, |peer| parallel_sort(&peer, scrambled(peer.rank()), by_key))
                .expect("group failed");

        let mut input: Vec<u64> =
            (0..peers).flat_map(|rank| scrambled(rank).into_iter().map(|t| t.key)).collect();
        input.sort_unstable();

        let total = input.len();
        let mut output = Vec::new();
        for local in &results {
            assert!(local.len() >= total / peers);
            assert!(local.len() <= total / peers + 1);
            output.extend(local.iter().map(|t| t.key));
        }
        assert!(output.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(output, input);
    }

    #[test]
    fn lexicographic_comparator_orders_ties() {
        let results = PeerGroup::execute(2, |peer| {
            let data = vec![
                Tuple::new(0, 9 - peer.rank() as u32, 5),
                Tuple::new(0, 4, 5),
                Tuple::new(0, 2, 1),
            ];
            parallel_sort(&peer, data, by_current_next)
        })
        .expect("group failed");
        let flat: Vec<(u32, u32)> =
            results.iter().flatten().map(|t| (t.current, t.next)).collect();
        assert_eq!(flat, vec![(1, 2), (1, 2), (5, 4), (5, 4), (5, 8), (5, 9)]);
    }

    #[test]
    fn tolerates_empty_contributions() {
        let results = PeerGroup::execute(3, |peer| {
            let data = if peer.rank() == 0 {
                vec![Tuple::new(3, 0, 0), Tuple::new(1, 0, 0)]
            } else {
                Vec::new()
            };
            parallel_sort(&peer, data, by_key)
        })
        .expect("group failed");
        let flat: Vec<u64> = results.iter().flatten().map(|t| t.key).collect();
        assert_eq!(flat, vec![1, 3]);
    }
}
