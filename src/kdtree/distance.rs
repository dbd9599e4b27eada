//! Distance metrics for radius queries.
//!
//! These metrics are only used to filter the candidates of a radius query. The tree itself always
//! prunes with squared Euclidean distance over the splitting coordinates.

use crate::kdtree::point::sq_dist;
use crate::r#type::CoordNum;

/// A trait for calculating distances between two raw coordinate vectors.
pub trait DistanceMetric<N: CoordNum> {
    /// Calculate the distance between `a` and `b`, which must have the same length.
    fn distance(&self, a: &[N], b: &[N]) -> N;
}

/// Euclidean distance metric.
///
/// This is the standard straight-line distance, `sqrt(sum((a_i - b_i)^2))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl<N: CoordNum> DistanceMetric<N> for EuclideanDistance {
    #[inline]
    fn distance(&self, a: &[N], b: &[N]) -> N {
        sq_dist(a, b).sqrt()
    }
}

/// Hamming distance metric.
///
/// The number of coordinates at which the two vectors differ.
#[derive(Debug, Clone, Copy, Default)]
pub struct HammingDistance;

impl<N: CoordNum> DistanceMetric<N> for HammingDistance {
    #[inline]
    fn distance(&self, a: &[N], b: &[N]) -> N {
        a.iter()
            .zip(b)
            .filter(|(x, y)| x != y)
            .fold(N::zero(), |acc, _| acc + N::one())
    }
}

impl<N: CoordNum, F> DistanceMetric<N> for F
where
    F: Fn(&[N], &[N]) -> N,
{
    #[inline]
    fn distance(&self, a: &[N], b: &[N]) -> N {
        self(a, b)
    }
}
