//! A mutable, in-memory K-D Tree with lazy deletion.

#![warn(missing_docs)]

mod checker;
mod distance;
mod editor;
mod index;
mod neighbors;
mod node;
mod point;
mod rect;

pub use checker::{AcceptAll, Checker};
pub use distance::{DistanceMetric, EuclideanDistance, HammingDistance};
pub use editor::{Editor, Inserter, OptionalInserter, Replacer, Resurrector, Updater};
pub use index::KDTree;
pub use neighbors::NeighborList;
pub use point::Point;
pub use rect::HyperRect;
