use crate::kdtree::point::Point;
use crate::r#type::CoordNum;

/// An axis-aligned box in K dimensions, described by its low and high corners.
///
/// Used during nearest neighbor search to bound the region that a subtree can contain.
#[derive(Debug, Clone, PartialEq)]
pub struct HyperRect<N: CoordNum> {
    min: Point<N>,
    max: Point<N>,
}

impl<N: CoordNum> HyperRect<N> {
    /// Create a box from its two corners.
    pub fn new(min: Point<N>, max: Point<N>) -> Self {
        debug_assert_eq!(min.dims(), max.dims());
        Self { min, max }
    }

    /// The box that covers all of K-dimensional space.
    pub fn infinite(dims: usize) -> Self {
        Self {
            min: Point::new(&vec![N::neg_infinity(); dims]),
            max: Point::new(&vec![N::infinity(); dims]),
        }
    }

    /// The low corner.
    pub fn min(&self) -> &Point<N> {
        &self.min
    }

    /// The high corner.
    pub fn max(&self) -> &Point<N> {
        &self.max
    }

    /// The point on or inside this box that is closest to `target`.
    pub fn closest(&self, target: &[N]) -> Point<N> {
        let coords: Vec<N> = target
            .iter()
            .enumerate()
            .map(|(i, &t)| clamp(t, self.min[i], self.max[i]))
            .collect();
        Point::new(&coords)
    }

    /// Squared Euclidean distance from `target` to the closest point of this box.
    pub fn sq_dist_to(&self, target: &[N]) -> N {
        target
            .iter()
            .enumerate()
            .fold(N::zero(), |acc, (i, &t)| {
                let d = axis_dist(t, self.min[i], self.max[i]);
                acc + d * d
            })
    }

    /// Split this box on `axis` at `value`, returning the `(lower, upper)` halves.
    pub fn split(mut self, axis: usize, value: N) -> (Self, Self) {
        let mut upper = self.clone();
        self.max[axis] = value;
        upper.min[axis] = value;
        (self, upper)
    }
}

#[inline]
fn clamp<N: CoordNum>(k: N, min: N, max: N) -> N {
    if k < min {
        min
    } else if k > max {
        max
    } else {
        k
    }
}

/// 1D distance from a value to a range.
#[inline]
fn axis_dist<N: CoordNum>(k: N, min: N, max: N) -> N {
    if k < min {
        min - k
    } else if k <= max {
        N::zero()
    } else {
        k - max
    }
}
