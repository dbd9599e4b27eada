use std::fmt;
use std::ops::{Index, IndexMut};

use tinyvec::TinyVec;

use crate::r#type::CoordNum;

/// A K-dimensional key.
///
/// A `Point` always owns a copy of the coordinates it was built from, so a caller mutating its
/// own buffer after an insert cannot corrupt the tree. Keys of up to four dimensions are stored
/// inline.
#[derive(Debug, Clone, PartialEq)]
pub struct Point<N: CoordNum> {
    coords: TinyVec<[N; 4]>,
}

impl<N: CoordNum> Point<N> {
    /// Copy the provided coordinates into a new point.
    pub fn new(coords: &[N]) -> Self {
        Self {
            coords: coords.iter().copied().collect(),
        }
    }

    /// The number of dimensions of this point.
    #[inline]
    pub fn dims(&self) -> usize {
        self.coords.len()
    }

    /// The raw coordinates of this point.
    #[inline]
    pub fn coords(&self) -> &[N] {
        &self.coords
    }

    /// Squared Euclidean distance between this point and `other`.
    #[inline]
    pub fn sq_dist(&self, other: &[N]) -> N {
        sq_dist(&self.coords, other)
    }
}

impl<N: CoordNum> Index<usize> for Point<N> {
    type Output = N;

    #[inline]
    fn index(&self, index: usize) -> &N {
        &self.coords[index]
    }
}

impl<N: CoordNum> IndexMut<usize> for Point<N> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut N {
        &mut self.coords[index]
    }
}

impl<N: CoordNum> fmt::Display for Point<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}

#[inline]
pub(crate) fn sq_dist<N: CoordNum>(a: &[N], b: &[N]) -> N {
    a.iter().zip(b).fold(N::zero(), |acc, (&x, &y)| {
        let d = x - y;
        acc + d * d
    })
}
