use crate::error::{peer_error, CcError};
use crate::tuples::Tuple;
use crossbeam_channel::{unbounded, Receiver, Sender};
use crossbeam_utils::thread;
use itertools::izip;

pub mod collectives;
pub mod distribution;
pub mod sort;

/// Point-to-point mesh for one payload type. The channel for an ordered pair
/// of peers is FIFO and unbounded, so collectives never need message tags as
/// long as every peer enters them in the same order.
pub struct Channels<T> {
    txs: Vec<Sender<T>>,
    rxs: Vec<Receiver<T>>,
}

impl<T: Send> Channels<T> {
    pub(crate) fn send(&self, to: usize, value: T) {
        self.txs[to].send(value).expect("peer group lost a member");
    }

    pub(crate) fn recv(&self, from: usize) -> T {
        self.rxs[from].recv().expect("peer group lost a member")
    }
}

fn full_mesh<T: Send>(peers: usize) -> Vec<Channels<T>> {
    let mut txs: Vec<Vec<Sender<T>>> = (0..peers).map(|_| Vec::with_capacity(peers)).collect();
    let mut rxs: Vec<Vec<Receiver<T>>> = (0..peers).map(|_| Vec::with_capacity(peers)).collect();
    for src in 0..peers {
        for dst in 0..peers {
            let (tx, rx) = unbounded();
            txs[src].push(tx);
            rxs[dst].push(rx);
        }
    }
    txs.into_iter().zip(rxs).map(|(txs, rxs)| Channels { txs, rxs }).collect()
}

/// One peer's handle onto the group: its identity plus the channel meshes the
/// collectives run over. Each peer owns its handle exclusively; no state is
/// shared between peers except through collectives.
pub struct Peer {
    rank: usize,
    peers: usize,
    pub(crate) data: Channels<Vec<Tuple>>,
    pub(crate) item: Channels<Tuple>,
    pub(crate) size: Channels<usize>,
    pub(crate) vote: Channels<bool>,
}

impl Peer {
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn peers(&self) -> usize {
        self.peers
    }

    pub fn is_coordinator(&self) -> bool {
        self.rank == 0
    }
}

/// The subset of peers entering the neighbour collectives. `index` is the
/// caller's position among the members, `None` for non-members. Groups are
/// rebuilt whenever the membership predicate may have changed and are never
/// cached across supersteps.
pub struct Group {
    members: Vec<usize>,
    index: Option<usize>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    fn member(&self, index: usize) -> usize {
        self.members[index]
    }
}

pub struct PeerGroup;

impl PeerGroup {
    /// Runs `f` once per peer on its own thread and returns the per-peer
    /// results in rank order. A panicking peer drops its channel endpoints,
    /// which aborts every peer blocked on a collective; the whole job then
    /// surfaces as a single error.
    pub fn execute<T, F>(peers: usize, f: F) -> Result<Vec<T>, CcError>
    where
        T: Send,
        F: Fn(Peer) -> T + Send + Sync,
    {
        assert!(peers > 0, "peer group must have at least one member");
        let handles = build_peers(peers);
        let outcome = thread::scope(|s| {
            let joins: Vec<_> = handles
                .into_iter()
                .map(|peer| {
                    let f = &f;
                    s.spawn(move |_| f(peer))
                })
                .collect();
            joins.into_iter().map(|join| join.join()).collect::<Result<Vec<_>, _>>()
        });
        match outcome {
            Ok(Ok(results)) => Ok(results),
            Ok(Err(_)) | Err(_) => Err(peer_error("a peer aborted the job".to_owned())),
        }
    }
}

fn build_peers(peers: usize) -> Vec<Peer> {
    izip!(
        full_mesh::<Vec<Tuple>>(peers),
        full_mesh::<Tuple>(peers),
        full_mesh::<usize>(peers),
        full_mesh::<bool>(peers)
    )
    .enumerate()
    .map(|(rank, (data, item, size, vote))| Peer { rank, peers, data, item, size, vote })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::PeerGroup;

    #[test]
    fn execute_returns_results_in_rank_order() {
        let results = PeerGroup::execute(4, |peer| peer.rank() * 10).expect("peer group failed");
        assert_eq!(results, vec![0, 10, 20, 30]);
    }

    #[test]
    fn single_peer_group() {
        let results = PeerGroup::execute(1, |peer| peer.peers()).expect("peer group failed");
        assert_eq!(results, vec![1]);
    }
}
