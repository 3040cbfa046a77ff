//! Collective operations over the peer group. Every operation here must be
//! entered by all peers of the group (or all members of the same `Group`) in
//! the same order; the channel meshes are FIFO and carry no tags.

use crate::peer::{Group, Peer};
use crate::tuples::Tuple;

impl Peer {
    /// The trivial group containing every peer.
    pub fn world_group(&self) -> Group {
        Group { members: (0..self.peers).collect(), index: Some(self.rank) }
    }

    /// Collectively splits the group on a predicate. Members learn their
    /// position among the participating ranks; non-members get `index: None`
    /// and must not enter the group's neighbour collectives.
    pub fn split(&self, participating: bool) -> Group {
        let flags = self.allgather_flag(participating);
        let members: Vec<usize> =
            flags.iter().enumerate().filter(|(_, &flag)| flag).map(|(rank, _)| rank).collect();
        let index = if participating { members.binary_search(&self.rank).ok() } else { None };
        Group { members, index }
    }

    pub fn allgather_size(&self, value: usize) -> Vec<usize> {
        for to in 0..self.peers {
            self.size.send(to, value);
        }
        (0..self.peers).map(|from| self.size.recv(from)).collect()
    }

    pub fn allgather_flag(&self, value: bool) -> Vec<bool> {
        for to in 0..self.peers {
            self.vote.send(to, value);
        }
        (0..self.peers).map(|from| self.vote.recv(from)).collect()
    }

    /// Global AND over one boolean per peer.
    pub fn test_all(&self, value: bool) -> bool {
        self.allgather_flag(value).into_iter().all(|flag| flag)
    }

    /// Gathers every peer's (variable-length) contribution on every peer,
    /// concatenated in rank order.
    pub fn allgather_tuples(&self, buf: Vec<Tuple>) -> Vec<Tuple> {
        for to in 0..self.peers {
            self.data.send(to, buf.clone());
        }
        let mut out = Vec::new();
        for from in 0..self.peers {
            out.extend(self.data.recv(from));
        }
        out
    }

    /// Redistributes a local sequence by explicit per-destination counts,
    /// which must sum to the sequence length. Received chunks are
    /// concatenated in rank order.
    pub fn all_to_all(&self, buf: Vec<Tuple>, send_counts: &[usize]) -> Vec<Tuple> {
        debug_assert_eq!(send_counts.len(), self.peers);
        debug_assert_eq!(send_counts.iter().sum::<usize>(), buf.len());
        let mut begin = 0;
        for (to, &count) in send_counts.iter().enumerate() {
            self.data.send(to, buf[begin..begin + count].to_vec());
            begin += count;
        }
        let mut out = Vec::new();
        for from in 0..self.peers {
            out.extend(self.data.recv(from));
        }
        out
    }

    /// Gathers every peer's contribution on `root`, in rank order. Only the
    /// root receives `Some`.
    pub fn gatherv(&self, buf: Vec<Tuple>, root: usize) -> Option<Vec<Tuple>> {
        self.data.send(root, buf);
        if self.rank == root {
            let mut out = Vec::new();
            for from in 0..self.peers {
                out.extend(self.data.recv(from));
            }
            Some(out)
        } else {
            None
        }
    }

    /// Exclusive prefix fold over the group: member `i` receives
    /// `op(x_0, …, x_{i-1})`. The first member receives `None` and callers
    /// must guard on it.
    pub fn exscan(
        &self,
        group: &Group,
        value: Tuple,
        op: impl Fn(&Tuple, &Tuple) -> Tuple,
    ) -> Option<Tuple> {
        let index = group.index().expect("collective entered by a non-member");
        if index == 0 {
            if group.len() > 1 {
                self.item.send(group.member(1), value);
            }
            None
        } else {
            let acc = self.item.recv(group.member(index - 1));
            if index + 1 < group.len() {
                self.item.send(group.member(index + 1), op(&acc, &value));
            }
            Some(acc)
        }
    }

    /// Mirror of `exscan`: member `i` receives `op(x_{i+1}, …, x_{p-1})`.
    pub fn reverse_exscan(
        &self,
        group: &Group,
        value: Tuple,
        op: impl Fn(&Tuple, &Tuple) -> Tuple,
    ) -> Option<Tuple> {
        let index = group.index().expect("collective entered by a non-member");
        let last = group.len() - 1;
        if index == last {
            if index > 0 {
                self.item.send(group.member(index - 1), value);
            }
            None
        } else {
            let acc = self.item.recv(group.member(index + 1));
            if index > 0 {
                self.item.send(group.member(index - 1), op(&acc, &value));
            }
            Some(acc)
        }
    }

    /// Member `i` receives member `i-1`'s value; the first member receives
    /// `None`.
    pub fn right_shift(&self, group: &Group, value: Tuple) -> Option<Tuple> {
        let index = group.index().expect("collective entered by a non-member");
        if index + 1 < group.len() {
            self.item.send(group.member(index + 1), value);
        }
        if index > 0 {
            Some(self.item.recv(group.member(index - 1)))
        } else {
            None
        }
    }

    /// Member `i` receives member `i+1`'s value; the last member receives
    /// `None`.
    pub fn left_shift(&self, group: &Group, value: Tuple) -> Option<Tuple> {
        let index = group.index().expect("collective entered by a non-member");
        if index > 0 {
            self.item.send(group.member(index - 1), value);
        }
        if index + 1 < group.len() {
            Some(self.item.recv(group.member(index + 1)))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::peer::PeerGroup;
    use crate::tuples::{max_current_min_next, min_current_max_next, Tuple};

    #[test]
    fn test_all_is_a_global_and() {
        let results =
            PeerGroup::execute(4, |peer| peer.test_all(peer.rank() != 2)).expect("group failed");
        assert_eq!(results, vec![false; 4]);
        let results = PeerGroup::execute(4, |peer| peer.test_all(true)).expect("group failed");
        assert_eq!(results, vec![true; 4]);
    }

    #[test]
    fn exscan_folds_previous_members() {
        let results = PeerGroup::execute(4, |peer| {
            let group = peer.world_group();
            let mine = Tuple::new(0, peer.rank() as u32, peer.rank() as u32);
            peer.exscan(&group, mine, max_current_min_next)
        })
        .expect("group failed");
        assert_eq!(results[0], None);
        for (rank, result) in results.into_iter().enumerate().skip(1) {
            // max `current` among ranks 0..rank is rank-1
            assert_eq!(result.expect("missing scan value").current, (rank - 1) as u32);
        }
    }

    #[test]
    fn reverse_exscan_folds_following_members() {
        let results = PeerGroup::execute(4, |peer| {
            let group = peer.world_group();
            let mine = Tuple::new(0, peer.rank() as u32, peer.rank() as u32);
            peer.reverse_exscan(&group, mine, min_current_max_next)
        })
        .expect("group failed");
        assert_eq!(results[3], None);
        for (rank, result) in results.into_iter().enumerate().take(3) {
            // min `current` among ranks rank+1..4 is rank+1
            assert_eq!(result.expect("missing scan value").current, (rank + 1) as u32);
        }
    }

    #[test]
    fn shifts_move_one_element_across_neighbours() {
        let results = PeerGroup::execute(3, |peer| {
            let group = peer.world_group();
            let mine = Tuple::new(peer.rank() as u64, 0, 0);
            let from_left = peer.right_shift(&group, mine);
            let from_right = peer.left_shift(&group, mine);
            (from_left.map(|t| t.key), from_right.map(|t| t.key))
        })
        .expect("group failed");
        assert_eq!(results, vec![(None, Some(1)), (Some(0), Some(2)), (Some(1), None)]);
    }

    #[test]
    fn subgroup_collectives_skip_non_members() {
        let results = PeerGroup::execute(4, |peer| {
            let group = peer.split(peer.rank() % 2 == 0);
            if group.index().is_some() {
                let mine = Tuple::new(peer.rank() as u64, 0, 0);
                peer.right_shift(&group, mine).map(|t| t.key)
            } else {
                None
            }
        })
        .expect("group failed");
        // members are ranks 0 and 2; rank 2's left neighbour in the group is 0
        assert_eq!(results, vec![None, None, Some(0), None]);
    }

    #[test]
    fn all_to_all_inverse_restores_distribution() {
        // peer i sends i tuples to every peer; the inverse pattern sends back
        let results = PeerGroup::execute(3, |peer| {
            let rank = peer.rank();
            let outgoing: Vec<Tuple> =
                (0..rank * 3).map(|i| Tuple::new(rank as u64, i as u32, 0)).collect();
            let send_counts = vec![rank; 3];
            let received = peer.all_to_all(outgoing.clone(), &send_counts);
            // every peer now holds one chunk of size j from each peer j
            let inverse_counts = vec![0, 1, 2];
            let restored = peer.all_to_all(received, &inverse_counts);
            restored == outgoing
        })
        .expect("group failed");
        assert_eq!(results, vec![true; 3]);
    }

    #[test]
    fn gatherv_collects_on_root_only() {
        let results = PeerGroup::execute(3, |peer| {
            let buf = vec![Tuple::new(peer.rank() as u64, 0, 0)];
            peer.gatherv(buf, 0).map(|all| all.iter().map(|t| t.key).collect::<Vec<_>>())
        })
        .expect("group failed");
        assert_eq!(results[0], Some(vec![0, 1, 2]));
        assert_eq!(results[1], None);
        assert_eq!(results[2], None);
    }
}
