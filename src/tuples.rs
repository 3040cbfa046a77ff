use std::cmp::Ordering;

/// Identifier of a graph edge or hyperedge endpoint: a packed k-mer for read
/// datasets, a source vertex id for generated graphs. Only its total order is
/// used.
pub type Key = u64;

/// A component label. The two largest representable values are reserved as
/// sentinels and never appear as real labels.
pub type Label = u32;

/// Marks a tuple that has finalised and left the active region for good.
pub const INACTIVE: Label = Label::MAX;

/// Marks a tuple that has finalised but participates in exactly one more
/// superstep so that neighbouring peers observe a stable bucket.
pub const SETTLING: Label = Label::MAX - 1;

/// One unit of the distributed tuple sequence. `current` is the component
/// label assigned so far; `next` is the candidate label proposed in the most
/// recent superstep.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Tuple {
    pub key: Key,
    pub next: Label,
    pub current: Label,
}

impl Tuple {
    pub fn new(key: Key, next: Label, current: Label) -> Self {
        Self { key, next, current }
    }

    /// Swaps the candidate and current labels, turning the tuple into a
    /// forwarding pointer from its old label into a new label space.
    pub fn flipped(mut self) -> Self {
        std::mem::swap(&mut self.next, &mut self.current);
        self
    }
}

pub fn by_key(a: &Tuple, b: &Tuple) -> Ordering {
    a.key.cmp(&b.key)
}

pub fn by_current(a: &Tuple, b: &Tuple) -> Ordering {
    a.current.cmp(&b.current)
}

pub fn by_current_next(a: &Tuple, b: &Tuple) -> Ordering {
    a.current.cmp(&b.current).then(a.next.cmp(&b.next))
}

/// Folds to the element with the smaller `current`; on a tie, the larger
/// `next`. Combined with a reverse exclusive scan this surfaces the last
/// element of the bucket straddling in from the right.
pub fn min_current_max_next(x: &Tuple, y: &Tuple) -> Tuple {
    if y.current < x.current || (y.current == x.current && y.next > x.next) {
        *y
    } else {
        *x
    }
}

/// Folds to the element with the larger `current`; on a tie, the smaller
/// `next`. Combined with an exclusive scan this surfaces the first element of
/// the bucket straddling in from the left.
pub fn max_current_min_next(x: &Tuple, y: &Tuple) -> Tuple {
    if y.current > x.current || (y.current == x.current && y.next < x.next) {
        *y
    } else {
        *x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orderings() {
        let a = Tuple::new(3, 7, 1);
        let b = Tuple::new(5, 2, 1);
        let c = Tuple::new(1, 2, 4);
        assert_eq!(by_key(&a, &b), Ordering::Less);
        assert_eq!(by_key(&b, &c), Ordering::Greater);
        assert_eq!(by_current(&a, &b), Ordering::Equal);
        assert_eq!(by_current(&a, &c), Ordering::Less);
        assert_eq!(by_current_next(&b, &a), Ordering::Less);
        assert_eq!(by_current_next(&a, &a), Ordering::Equal);
    }

    #[test]
    fn fold_operators() {
        let low = Tuple::new(0, 9, 2);
        let high = Tuple::new(0, 1, 5);
        assert_eq!(min_current_max_next(&low, &high), low);
        assert_eq!(max_current_min_next(&low, &high), high);

        // Ties on `current` resolve through `next`.
        let tie_a = Tuple::new(0, 1, 3);
        let tie_b = Tuple::new(0, 8, 3);
        assert_eq!(min_current_max_next(&tie_a, &tie_b), tie_b);
        assert_eq!(max_current_min_next(&tie_a, &tie_b), tie_a);
    }

    #[test]
    fn flip_swaps_labels() {
        let t = Tuple::new(42, 7, 3).flipped();
        assert_eq!(t, Tuple::new(42, 3, 7));
    }

    #[test]
    fn sentinels_are_top_of_domain() {
        assert_eq!(INACTIVE, u32::MAX);
        assert_eq!(SETTLING + 1, INACTIVE);
    }
}
