use std::fmt;
use std::time::{Duration, Instant};

use geo_traits::{CoordTrait, RectTrait};

use crate::error::{KDTreeError, Result};
use crate::kdtree::checker::{AcceptAll, Checker};
use crate::kdtree::distance::{DistanceMetric, EuclideanDistance, HammingDistance};
use crate::kdtree::editor::{Editor, Inserter};
use crate::kdtree::neighbors::NeighborList;
use crate::kdtree::node::{self, Link, NearestSearch, Node};
use crate::r#type::CoordNum;

/// A mutable K-dimensional tree mapping keys of `K` coordinates to values of type `T`.
///
/// Splitting is naive (axis `depth % K`) and the tree is never rebalanced. Deletion is lazy: a
/// deleted key stays in the tree as a tombstone, so the tree only grows until the caller rebuilds
/// it.
///
/// ```
/// use kd_index::kdtree::KDTree;
///
/// let mut tree = KDTree::new(2);
/// tree.insert(&[2., 3.], "a").unwrap();
/// tree.insert(&[5., 4.], "b").unwrap();
/// tree.insert(&[9., 6.], "c").unwrap();
///
/// assert_eq!(tree.nearest(&[8., 5.], 2).unwrap(), vec![&"c", &"b"]);
/// assert_eq!(tree.range(&[0., 0.], &[6., 6.]).unwrap().len(), 2);
/// ```
pub struct KDTree<N: CoordNum, T> {
    root: Link<N, T>,
    dims: usize,
    count: usize,
    timeout: Option<Duration>,
}

impl<N: CoordNum, T> KDTree<N, T> {
    /// Create an empty tree over keys with `dims` coordinates and no search time limit.
    pub fn new(dims: usize) -> Self {
        assert!(dims > 0, "A KDTree needs at least one dimension.");
        Self {
            root: None,
            dims,
            count: 0,
            timeout: None,
        }
    }

    /// Create an empty tree over keys with `dims` coordinates.
    ///
    /// When `timeout` is set, every nearest neighbor search stops exploring once it has run for
    /// that long and returns the best candidates found so far.
    pub fn new_with_timeout(dims: usize, timeout: Duration) -> Self {
        let mut tree = Self::new(dims);
        tree.set_timeout(Some(timeout));
        tree
    }

    /// The number of coordinates in every key.
    #[inline]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// The number of live (not deleted) keys.
    #[inline]
    pub fn size(&self) -> usize {
        self.count
    }

    /// Returns `true` if the tree holds no live key.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The time budget of nearest neighbor searches.
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Change the time budget of nearest neighbor searches. `None` or a zero duration means
    /// unbounded.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout.filter(|t| !t.is_zero());
    }

    fn check_key(&self, key: &[N]) -> Result<()> {
        if key.len() != self.dims {
            return Err(KDTreeError::DimensionMismatch {
                expected: self.dims,
                found: key.len(),
            });
        }
        Ok(())
    }

    /// Insert `value` at `key`.
    ///
    /// Fails with [`KDTreeError::DuplicateKey`] if `key` already holds a live value. A deleted key
    /// is revived.
    pub fn insert(&mut self, key: &[N], value: T) -> Result<()> {
        self.edit(key, Inserter(value))
    }

    /// Apply `editor` to the value slot at `key`, creating the key if it is not in the tree.
    ///
    /// See [`Editor`] for the available editors. The tree is left unchanged if the editor fails.
    pub fn edit<E: Editor<T>>(&mut self, key: &[N], editor: E) -> Result<()> {
        self.check_key(key)?;

        let delta = node::edit(&mut self.root, key, editor, self.dims)?;
        self.count = self.count.saturating_add_signed(delta);
        if delta != 0 {
            log::trace!("edited {:?}, size {}", key, self.count);
        }
        Ok(())
    }

    /// The value at `key`, or `None` if the key is absent or deleted.
    pub fn search(&self, key: &[N]) -> Result<Option<&T>> {
        self.check_key(key)?;
        Ok(node::search(&self.root, key, self.dims).and_then(|node| node.value.as_ref()))
    }

    /// A mutable reference to the value at `key`, or `None` if the key is absent or deleted.
    pub fn search_mut(&mut self, key: &[N]) -> Result<Option<&mut T>> {
        self.check_key(key)?;
        Ok(node::search_mut(&mut self.root, key, self.dims).and_then(|node| node.value.as_mut()))
    }

    /// Delete the value at `key`.
    ///
    /// Fails with [`KDTreeError::MissingKey`] if the key is absent or already deleted.
    pub fn delete(&mut self, key: &[N]) -> Result<()> {
        if self.delete_optional(key)? {
            Ok(())
        } else {
            Err(KDTreeError::MissingKey)
        }
    }

    /// Delete the value at `key` if there is one.
    ///
    /// Returns `true` if a live key was deleted; deleting an absent or already deleted key is a
    /// no-op.
    pub fn delete_optional(&mut self, key: &[N]) -> Result<bool> {
        self.check_key(key)?;
        let deleted = node::delete(&mut self.root, key, self.dims);
        if deleted {
            self.count -= 1;
            log::trace!("deleted {:?}, size {}", key, self.count);
        }
        Ok(deleted)
    }

    /// The value whose key is nearest to `key`, or `None` if the tree is empty.
    pub fn nearest_one(&self, key: &[N]) -> Result<Option<&T>> {
        Ok(self.nearest(key, 1)?.into_iter().next())
    }

    /// The values at the `n` keys nearest to `key` in squared Euclidean distance, closest first.
    ///
    /// Returns fewer than `n` values if the tree holds fewer live keys, or if the search ran out
    /// of time. Equally distant keys are returned in traversal order, which may change as the tree
    /// is mutated.
    pub fn nearest(&self, key: &[N], n: usize) -> Result<Vec<&T>> {
        self.nearest_with_checker(key, n, &AcceptAll)
    }

    /// Like [`nearest`][Self::nearest], but only values accepted by `checker` are returned.
    ///
    /// ```
    /// use kd_index::kdtree::KDTree;
    ///
    /// let mut tree = KDTree::new(1);
    /// for i in 0..10 {
    ///     tree.insert(&[i as f64], i).unwrap();
    /// }
    /// let odd = tree.nearest_with_checker(&[4.2], 2, &|v: &i32| v % 2 == 1).unwrap();
    /// assert_eq!(odd, vec![&5, &3]);
    /// ```
    pub fn nearest_with_checker<C: Checker<T>>(
        &self,
        key: &[N],
        n: usize,
        checker: &C,
    ) -> Result<Vec<&T>> {
        self.check_key(key)?;
        if n == 0 {
            return Ok(vec![]);
        }
        Ok(self
            .neighbors(key, n, checker)
            .into_sorted_vec()
            .into_iter()
            .filter_map(|(node, _)| node.value.as_ref())
            .collect())
    }

    /// The values whose keys are within Euclidean distance `radius` of `key` (exclusive).
    pub fn nearest_euclidean(&self, key: &[N], radius: N) -> Result<Vec<&T>> {
        self.nearest_within(key, radius, &EuclideanDistance)
    }

    /// The values whose keys differ from `key` in fewer than `radius` coordinates.
    pub fn nearest_hamming(&self, key: &[N], radius: N) -> Result<Vec<&T>> {
        self.nearest_within(key, radius, &HammingDistance)
    }

    /// The values whose keys are within `radius` of `key` (exclusive) under `metric`.
    ///
    /// The metric is only used to filter; every live key is visited. Results are ordered by
    /// decreasing squared Euclidean distance to `key`.
    pub fn nearest_within<M: DistanceMetric<N>>(
        &self,
        key: &[N],
        radius: N,
        metric: &M,
    ) -> Result<Vec<&T>> {
        self.check_key(key)?;
        if self.count == 0 {
            return Ok(vec![]);
        }

        let mut neighbors = self.neighbors(key, self.count, &AcceptAll);
        let mut found = Vec::new();
        while let Some((node, _)) = neighbors.remove_highest() {
            if metric.distance(node.key.coords(), key) < radius {
                found.extend(node.value.as_ref());
            }
        }
        Ok(found)
    }

    /// The values whose keys lie in the closed box `[min, max]`, in no particular order.
    ///
    /// Fails with [`KDTreeError::InvalidRange`] if `min` exceeds `max` on any axis. An inverted box
    /// gets this error, not [`KDTreeError::DimensionMismatch`].
    pub fn range(&self, min: &[N], max: &[N]) -> Result<Vec<&T>> {
        self.check_key(min)?;
        self.check_key(max)?;
        if let Some(axis) = (0..self.dims).find(|&i| min[i] > max[i]) {
            return Err(KDTreeError::InvalidRange { axis });
        }

        let mut found = Vec::new();
        node::range(&self.root, min, max, self.dims, &mut found);
        Ok(found
            .into_iter()
            .filter_map(|node| node.value.as_ref())
            .collect())
    }

    /// Like [`range`][Self::range], for a tree whose keys have the dimension of `rect`.
    pub fn range_rect(&self, rect: &impl RectTrait<T = N>) -> Result<Vec<&T>> {
        let min = coords_of(&rect.min());
        let max = coords_of(&rect.max());
        self.range(&min, &max)
    }

    /// Like [`nearest`][Self::nearest], for a tree whose keys have the dimension of `coord`.
    pub fn nearest_coord(&self, coord: &impl CoordTrait<T = N>, n: usize) -> Result<Vec<&T>> {
        self.nearest(&coords_of(coord), n)
    }

    /// Run the branch-and-bound search, keeping the `n` best candidates.
    fn neighbors<C: Checker<T>>(
        &self,
        key: &[N],
        n: usize,
        checker: &C,
    ) -> NeighborList<&Node<N, T>, N> {
        let mut neighbors = NeighborList::new(n);
        if self.count == 0 {
            return neighbors;
        }

        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let mut search = NearestSearch::new(key, self.dims, checker, deadline);
        search.search(&self.root, &mut neighbors);
        if search.timed_out() {
            log::debug!(
                "nearest neighbor search timed out after {:?} with {} of {} candidates",
                self.timeout.unwrap_or_default(),
                neighbors.len(),
                n
            );
        }
        neighbors
    }
}

fn coords_of<N: CoordNum>(coord: &impl CoordTrait<T = N>) -> Vec<N> {
    (0..coord.dim().size())
        .map(|i| coord.nth_or_panic(i))
        .collect()
}

impl<N: CoordNum, T: fmt::Display> fmt::Display for KDTree<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        node::fmt_tree(&self.root, f)
    }
}

impl<N: CoordNum, T> fmt::Debug for KDTree<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KDTree")
            .field("dims", &self.dims)
            .field("size", &self.count)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl<N: CoordNum, T: Clone> Clone for KDTree<N, T> {
    fn clone(&self) -> Self {
        Self {
            root: node::clone_tree(&self.root),
            dims: self.dims,
            count: self.count,
            timeout: self.timeout,
        }
    }
}

impl<N: CoordNum, T> Drop for KDTree<N, T> {
    fn drop(&mut self) {
        node::drop_tree(&mut self.root);
    }
}

#[cfg(test)]
impl<N: CoordNum, T> KDTree<N, T> {
    /// A one-dimensional tree holding `values[i]` at key `i`, shaped as if the keys had been
    /// inserted in increasing order.
    pub(crate) fn sorted_chain(values: Vec<T>) -> Self {
        let count = values.len();
        Self {
            root: Node::sorted_chain(values),
            dims: 1,
            count,
            timeout: None,
        }
    }
}
