use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::r#type::CoordNum;

/// A fixed-capacity collection of the best (closest) candidates seen so far during a nearest
/// neighbor search.
///
/// Backed by a max-heap on distance, so the worst tracked candidate is always at the top and can
/// be evicted in `O(log n)` when a strictly closer one arrives.
#[derive(Debug, Clone)]
pub struct NeighborList<T, N: CoordNum> {
    capacity: usize,
    heap: BinaryHeap<NeighborNode<T, N>>,
    // Breaks distance ties by arrival order: of two equally distant candidates the later one
    // counts as worse.
    seq: usize,
}

impl<T, N: CoordNum> NeighborList<T, N> {
    /// Create an empty list that holds at most `capacity` candidates.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.min(1024) + 1),
            seq: 0,
        }
    }

    /// Offer a candidate at (squared) distance `dist`.
    ///
    /// Returns `true` if the candidate was kept. Once at capacity, a candidate is only kept when
    /// it is strictly closer than the current worst, which is then evicted.
    pub fn insert(&mut self, item: T, dist: N) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.is_capacity_reached() {
            if dist >= self.max_dist() {
                return false;
            }
            self.heap.pop();
        }
        self.heap.push(NeighborNode {
            item,
            dist,
            seq: self.seq,
        });
        self.seq += 1;
        true
    }

    /// The distance of the worst candidate currently tracked, or infinity if the list is empty.
    pub fn max_dist(&self) -> N {
        self.heap
            .peek()
            .map(|node| node.dist)
            .unwrap_or_else(N::infinity)
    }

    /// Returns `true` once the list holds `capacity` candidates.
    #[inline]
    pub fn is_capacity_reached(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// Remove and return the worst candidate.
    pub fn remove_highest(&mut self) -> Option<(T, N)> {
        self.heap.pop().map(|node| (node.item, node.dist))
    }

    /// The number of candidates currently tracked.
    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` if no candidate is tracked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The maximum number of candidates this list holds.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drain the list into a vector ordered from closest to farthest.
    pub fn into_sorted_vec(mut self) -> Vec<(T, N)> {
        let mut sorted = Vec::with_capacity(self.len());
        while let Some(entry) = self.remove_highest() {
            sorted.push(entry);
        }
        sorted.reverse();
        sorted
    }
}

/// A wrapper around a candidate and its distance for use in the priority queue.
#[derive(Debug, Clone)]
struct NeighborNode<T, N: CoordNum> {
    item: T,
    dist: N,
    seq: usize,
}

impl<T, N: CoordNum> PartialEq for NeighborNode<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T, N: CoordNum> Eq for NeighborNode<T, N> {}

impl<T, N: CoordNum> Ord for NeighborNode<T, N> {
    fn cmp(&self, other: &Self) -> Ordering {
        // NaN distances compare as equal rather than poisoning the heap
        self.dist
            .partial_cmp(&other.dist)
            .unwrap_or(Ordering::Equal)
            .then(self.seq.cmp(&other.seq))
    }
}

impl<T, N: CoordNum> PartialOrd for NeighborNode<T, N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keeps_best_candidates() {
        let mut list = NeighborList::new(3);
        for (item, dist) in [("a", 5.0f64), ("b", 1.0), ("c", 9.0), ("d", 3.0), ("e", 7.0)] {
            list.insert(item, dist);
        }
        assert!(list.is_capacity_reached());
        assert_eq!(list.max_dist(), 5.0);
        let items: Vec<_> = list.into_sorted_vec().into_iter().map(|(i, _)| i).collect();
        assert_eq!(items, vec!["b", "d", "a"]);
    }

    #[test]
    fn only_evicts_for_strictly_better() {
        let mut list = NeighborList::new(1);
        assert!(list.insert("first", 2.0f64));
        assert!(!list.insert("tie", 2.0));
        assert!(list.insert("better", 1.0));
        assert_eq!(list.remove_highest(), Some(("better", 1.0)));
        assert!(list.is_empty());
    }

    #[test]
    fn empty_list_bound_is_infinite() {
        let list: NeighborList<(), f32> = NeighborList::new(4);
        assert_eq!(list.max_dist(), f32::INFINITY);
        assert!(!list.is_capacity_reached());
    }

    #[test]
    fn zero_capacity_rejects_everything() {
        let mut list = NeighborList::new(0);
        assert!(!list.insert(1, 0.0f64));
        assert!(list.is_empty());
    }

    #[test]
    fn ties_keep_arrival_order() {
        let mut list = NeighborList::new(4);
        list.insert("x", 1.0f64);
        list.insert("y", 1.0);
        list.insert("z", 0.5);
        let items: Vec<_> = list.into_sorted_vec().into_iter().map(|(i, _)| i).collect();
        assert_eq!(items, vec!["z", "x", "y"]);
    }
}
