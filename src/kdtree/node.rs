//! Tree vertices and the algorithms that walk them.
//!
//! Keys are split naively on axis `depth % K`. A key goes to the left subtree when its coordinate
//! on the splitting axis is strictly less than the node's, and to the right subtree otherwise, so
//! ties always descend right.

use std::fmt;
use std::time::Instant;

use tinyvec::TinyVec;

use crate::error::Result;
use crate::kdtree::checker::Checker;
use crate::kdtree::editor::Editor;
use crate::kdtree::neighbors::NeighborList;
use crate::kdtree::point::Point;
use crate::kdtree::rect::HyperRect;
use crate::r#type::CoordNum;

/// An owned link to a subtree.
pub(crate) type Link<N, T> = Option<Box<Node<N, T>>>;

/// A vertex of the tree.
///
/// A node whose value slot is empty is a tombstone: it stays in place to keep the structure
/// intact and can be revived by a later edit at the same key.
pub(crate) struct Node<N: CoordNum, T> {
    pub(crate) key: Point<N>,
    pub(crate) value: Option<T>,
    pub(crate) left: Link<N, T>,
    pub(crate) right: Link<N, T>,
}

impl<N: CoordNum, T> Node<N, T> {
    /// Create a node at a fresh position by applying `editor` to an empty slot.
    ///
    /// If the editor leaves the slot empty the node is created as a tombstone.
    pub(crate) fn create<E: Editor<T>>(key: Point<N>, editor: E) -> Result<Box<Self>> {
        let mut value = None;
        editor.edit(&mut value)?;
        Ok(Box::new(Self {
            key,
            value,
            left: None,
            right: None,
        }))
    }

    #[inline]
    pub(crate) fn is_deleted(&self) -> bool {
        self.value.is_none()
    }

    /// Apply `editor` to this node's slot, returning the change in live keys.
    fn apply<E: Editor<T>>(&mut self, editor: E) -> Result<isize> {
        let was_live = self.value.is_some();
        editor.edit(&mut self.value)?;
        Ok(match (was_live, self.value.is_some()) {
            (false, true) => 1,
            (true, false) => -1,
            _ => 0,
        })
    }

    #[inline]
    fn goes_left(&self, key: &[N], axis: usize) -> bool {
        key[axis] < self.key[axis]
    }
}

/// Insert-or-update `key` below `link`, creating a node at the first empty position on its
/// descent path when the key is not found.
///
/// Returns the change in live keys: `1` when a key becomes live, `-1` when the editor empties a
/// live slot, `0` otherwise.
pub(crate) fn edit<N: CoordNum, T, E: Editor<T>>(
    link: &mut Link<N, T>,
    key: &[N],
    editor: E,
    dims: usize,
) -> Result<isize> {
    let mut current = link;
    let mut depth = 0;
    while let Some(node) = current {
        if node.key.coords() == key {
            return node.apply(editor);
        }
        let axis = depth % dims;
        current = if node.goes_left(key, axis) {
            &mut node.left
        } else {
            &mut node.right
        };
        depth += 1;
    }

    let node = Node::create(Point::new(key), editor)?;
    let delta = if node.is_deleted() { 0 } else { 1 };
    *current = Some(node);
    Ok(delta)
}

/// Find the node whose key equals `key`, whether or not it has been deleted.
pub(crate) fn search<'a, N: CoordNum, T>(
    link: &'a Link<N, T>,
    key: &[N],
    dims: usize,
) -> Option<&'a Node<N, T>> {
    let mut current = link.as_deref();
    let mut depth = 0;
    while let Some(node) = current {
        if node.key.coords() == key {
            return Some(node);
        }
        let axis = depth % dims;
        current = if node.goes_left(key, axis) {
            node.left.as_deref()
        } else {
            node.right.as_deref()
        };
        depth += 1;
    }
    None
}

/// Mutable counterpart of [`search`].
pub(crate) fn search_mut<'a, N: CoordNum, T>(
    link: &'a mut Link<N, T>,
    key: &[N],
    dims: usize,
) -> Option<&'a mut Node<N, T>> {
    let mut current = link.as_deref_mut();
    let mut depth = 0;
    while let Some(node) = current {
        if node.key.coords() == key {
            return Some(node);
        }
        let axis = depth % dims;
        current = if node.goes_left(key, axis) {
            node.left.as_deref_mut()
        } else {
            node.right.as_deref_mut()
        };
        depth += 1;
    }
    None
}

/// Mark the node at `key` as deleted.
///
/// Returns `true` only if a live key was turned into a tombstone. The node itself is never
/// detached.
pub(crate) fn delete<N: CoordNum, T>(link: &mut Link<N, T>, key: &[N], dims: usize) -> bool {
    search_mut(link, key, dims)
        .and_then(|node| node.value.take())
        .is_some()
}

/// Collect every live node whose key lies in the closed box `[min, max]`.
pub(crate) fn range<'a, N: CoordNum, T>(
    link: &'a Link<N, T>,
    min: &[N],
    max: &[N],
    dims: usize,
    found: &mut Vec<&'a Node<N, T>>,
) {
    // Use TinyVec to avoid heap allocations
    let mut stack: TinyVec<[(Option<&'a Node<N, T>>, usize); 32]> = TinyVec::new();
    stack.push((link.as_deref(), 0));

    while let Some((current, depth)) = stack.pop() {
        let Some(node) = current else {
            continue;
        };

        if !node.is_deleted() && contains(min, max, node.key.coords()) {
            found.push(node);
        }

        // Left keys are strictly below the split value, right keys at or above it.
        let axis = depth % dims;
        if min[axis] < node.key[axis] {
            stack.push((node.left.as_deref(), depth + 1));
        }
        if max[axis] >= node.key[axis] {
            stack.push((node.right.as_deref(), depth + 1));
        }
    }
}

#[inline]
fn contains<N: CoordNum>(min: &[N], max: &[N], key: &[N]) -> bool {
    key.iter()
        .zip(min.iter().zip(max))
        .all(|(k, (lo, hi))| lo <= k && k <= hi)
}

/// Pending work of a nearest neighbor search.
enum Step<'a, N: CoordNum, T> {
    /// Explore the subtree at `link`, whose keys all lie in `rect`.
    Visit {
        link: &'a Link<N, T>,
        rect: HyperRect<N>,
        depth: usize,
    },
    /// Offer `node` once its near subtree is exhausted, then decide whether `far` can still hold
    /// a closer key.
    Offer {
        node: &'a Node<N, T>,
        far: &'a Link<N, T>,
        far_rect: HyperRect<N>,
        depth: usize,
    },
}

/// State of one nearest neighbor search.
pub(crate) struct NearestSearch<'q, N: CoordNum, C> {
    target: &'q [N],
    dims: usize,
    checker: &'q C,
    deadline: Option<Instant>,
    timed_out: bool,
}

impl<'q, N: CoordNum, C> NearestSearch<'q, N, C> {
    pub(crate) fn new(
        target: &'q [N],
        dims: usize,
        checker: &'q C,
        deadline: Option<Instant>,
    ) -> Self {
        Self {
            target,
            dims,
            checker,
            deadline,
            timed_out: false,
        }
    }

    /// Whether the search stopped early because the deadline passed.
    pub(crate) fn timed_out(&self) -> bool {
        self.timed_out
    }

    fn expired(&mut self) -> bool {
        if !self.timed_out {
            self.timed_out = self.deadline.is_some_and(|deadline| Instant::now() >= deadline);
        }
        self.timed_out
    }

    /// Branch-and-bound nearest neighbor search (Moore, "An introductory tutorial on kd-trees").
    ///
    /// Each subtree is explored near side first. The far side is only entered if the list of
    /// `neighbors` is not full yet, or if the far half-space comes strictly closer to the target
    /// than the worst candidate kept so far. Candidates are offered with their squared Euclidean
    /// distance to the target.
    pub(crate) fn search<'a, T>(
        &mut self,
        root: &'a Link<N, T>,
        neighbors: &mut NeighborList<&'a Node<N, T>, N>,
    ) where
        C: Checker<T>,
    {
        // An explicit stack keeps degenerate (sorted-input) trees off the call stack.
        let mut stack = vec![Step::Visit {
            link: root,
            rect: HyperRect::infinite(self.dims),
            depth: 0,
        }];

        while let Some(step) = stack.pop() {
            if self.expired() {
                break;
            }

            match step {
                Step::Visit { link, rect, depth } => {
                    let Some(node) = link.as_deref() else {
                        continue;
                    };
                    let axis = depth % self.dims;
                    let (left_rect, right_rect) = rect.split(axis, node.key[axis]);
                    let (near, near_rect, far, far_rect) = if node.goes_left(self.target, axis) {
                        (&node.left, left_rect, &node.right, right_rect)
                    } else {
                        (&node.right, right_rect, &node.left, left_rect)
                    };

                    stack.push(Step::Offer {
                        node,
                        far,
                        far_rect,
                        depth: depth + 1,
                    });
                    if near.is_some() {
                        stack.push(Step::Visit {
                            link: near,
                            rect: near_rect,
                            depth: depth + 1,
                        });
                    }
                }
                Step::Offer {
                    node,
                    far,
                    far_rect,
                    depth,
                } => {
                    if let Some(value) = node.value.as_ref() {
                        if self.checker.usable(value) {
                            neighbors.insert(node, node.key.sq_dist(self.target));
                        }
                    }

                    if far.is_none()
                        || (neighbors.is_capacity_reached()
                            && far_rect.sq_dist_to(self.target) >= neighbors.max_dist())
                    {
                        continue;
                    }
                    stack.push(Step::Visit {
                        link: far,
                        rect: far_rect,
                        depth,
                    });
                }
            }
        }
    }
}

/// Write the tree as one node per line in pre-order, indented by depth, with tombstones marked
/// `*`.
pub(crate) fn fmt_tree<N: CoordNum, T: fmt::Display>(
    link: &Link<N, T>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let mut stack: Vec<(&Node<N, T>, usize, &str)> = Vec::new();
    stack.extend(link.as_deref().map(|root| (root, 0, "")));

    while let Some((node, depth, side)) = stack.pop() {
        if depth > 0 {
            write!(f, "{:indent$}{} ", "", side, indent = 2 * depth)?;
        }
        match &node.value {
            Some(value) => writeln!(f, "{}  {}", node.key, value)?,
            None => writeln!(f, "{}*", node.key)?,
        }
        // Right first so that the left subtree is written first.
        if let Some(right) = node.right.as_deref() {
            stack.push((right, depth + 1, "R"));
        }
        if let Some(left) = node.left.as_deref() {
            stack.push((left, depth + 1, "L"));
        }
    }
    Ok(())
}

/// Deep copy of the tree below `link`, with the same shape.
pub(crate) fn clone_tree<N: CoordNum, T: Clone>(link: &Link<N, T>) -> Link<N, T> {
    let mut root: Link<N, T> = None;
    {
        let mut stack = Vec::new();
        if let Some(node) = link.as_deref() {
            stack.push((node, &mut root));
        }
        while let Some((source, slot)) = stack.pop() {
            let copy = slot.insert(Box::new(Node {
                key: source.key.clone(),
                value: source.value.clone(),
                left: None,
                right: None,
            }));
            let Node { left, right, .. } = &mut **copy;
            if let Some(child) = source.left.as_deref() {
                stack.push((child, left));
            }
            if let Some(child) = source.right.as_deref() {
                stack.push((child, right));
            }
        }
    }
    root
}

/// Free the tree below `link` one node at a time.
pub(crate) fn drop_tree<N: CoordNum, T>(link: &mut Link<N, T>) {
    let mut stack: Vec<Box<Node<N, T>>> = link.take().into_iter().collect();
    while let Some(mut node) = stack.pop() {
        stack.extend(node.left.take());
        stack.extend(node.right.take());
    }
}

#[cfg(test)]
impl<N: CoordNum, T> Node<N, T> {
    /// The chain that inserting `values` at one-dimensional keys `0, 1, 2, ...` in order builds:
    /// every node hangs off the right of the previous one.
    pub(crate) fn sorted_chain(values: Vec<T>) -> Link<N, T> {
        let mut link = None;
        for (i, value) in values.into_iter().enumerate().rev() {
            link = Some(Box::new(Node {
                key: Point::new(&[N::from(i).unwrap()]),
                value: Some(value),
                left: None,
                right: link,
            }));
        }
        link
    }
}
