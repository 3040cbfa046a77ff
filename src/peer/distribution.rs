//! Block redistribution: even out a globally ordered sequence so each peer
//! holds `floor(N/p)` or `ceil(N/p)` elements, preserving global rank order.

use crate::peer::Peer;
use crate::tuples::Tuple;

/// The half-open slice of a length-`total` range owned by `index` out of
/// `parts` owners; the first `total % parts` owners hold one extra element.
pub fn block_range(total: usize, parts: usize, index: usize) -> (usize, usize) {
    (block_start(total, parts, index), block_start(total, parts, index + 1))
}

fn block_start(total: usize, parts: usize, index: usize) -> usize {
    (total / parts) * index + index.min(total % parts)
}

/// Redistributes `data` so every peer ends with its block of the global
/// sequence. Collective; the concatenation in rank order is unchanged.
pub fn block_decompose(peer: &Peer, data: Vec<Tuple>) -> Vec<Tuple> {
    if peer.peers() == 1 {
        return data;
    }
    let sizes = peer.allgather_size(data.len());
    let total: usize = sizes.iter().sum();
    let my_start: usize = sizes[..peer.rank()].iter().sum();
    let mut send_counts = vec![0_usize; peer.peers()];
    for (to, count) in send_counts.iter_mut().enumerate() {
        let (target_start, target_end) = block_range(total, peer.peers(), to);
        let lo = target_start.max(my_start);
        let hi = target_end.min(my_start + data.len());
        if hi > lo {
            *count = hi - lo;
        }
    }
    peer.all_to_all(data, &send_counts)
}
