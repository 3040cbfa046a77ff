//! Synthetic Kronecker (R-MAT) edge generator. Every edge index owns its own
//! seeded generator, so the global edge multiset is a pure function of
//! `(scale, edgefactor, seed)` and identical for every peer count.

use crate::error::{input_error, CcError};
use crate::peer::distribution::block_range;
use crate::peer::Peer;
use crate::tuples::{Label, Tuple};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Edge-distribution probabilities for the four quadrants of the initiator
/// matrix, as cumulative thresholds for (0,0), (0,1) and (1,0).
const QUADRANT_A: f64 = 0.57;
const QUADRANT_AB: f64 = 0.57 + 0.19;
const QUADRANT_ABC: f64 = 0.57 + 0.19 + 0.19;

const INDEX_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

/// Generates this peer's block of the `edgefactor << scale` global edges.
/// Self-loops are dropped; a kept edge `(u, v)` becomes the tuple
/// `(key: u, next: u, current: v)`.
pub fn generate(
    peer: &Peer,
    scale: u32,
    edgefactor: usize,
    seed: u64,
) -> Result<Vec<Tuple>, CcError> {
    assert!(scale >= 1 && scale <= 30, "scale must keep vertex ids inside the label domain");
    assert!(edgefactor >= 1, "edgefactor must be positive");

    let total_edges = edgefactor << scale;
    let (begin, end) = block_range(total_edges, peer.peers(), peer.rank());
    let mut tuples = Vec::with_capacity(end - begin);
    for index in begin..end {
        let mut rng = SmallRng::seed_from_u64(seed ^ (index as u64).wrapping_mul(INDEX_STRIDE));
        let mut src: u64 = 0;
        let mut dst: u64 = 0;
        for _ in 0..scale {
            let draw: f64 = rng.gen();
            let (src_bit, dst_bit) = if draw < QUADRANT_A {
                (0, 0)
            } else if draw < QUADRANT_AB {
                (0, 1)
            } else if draw < QUADRANT_ABC {
                (1, 0)
            } else {
                (1, 1)
            };
            src = (src << 1) | src_bit;
            dst = (dst << 1) | dst_bit;
        }
        if src == dst {
            continue;
        }
        tuples.push(Tuple::new(src, src as Label, dst as Label));
    }

    if tuples.is_empty() {
        return Err(input_error(format!(
            "peer {} generated no edges (scale {}, edgefactor {})",
            peer.rank(),
            scale,
            edgefactor
        )));
    }
    Ok(tuples)
}
