use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KDTreeError {
    /// A key or box corner did not have the tree's number of dimensions.
    #[error("Key size mismatch: expected {expected} dimensions, got {found}")]
    DimensionMismatch {
        /// The number of dimensions of the tree
        expected: usize,
        /// The number of dimensions of the offending key
        found: usize,
    },

    /// Insert into a key that already holds a live value.
    #[error("Key already in tree")]
    DuplicateKey,

    /// Non-optional delete of a key with no live value.
    #[error("Key not found in tree")]
    MissingKey,

    /// A range query whose low corner exceeds its high corner on `axis`.
    #[error("Invalid range: min exceeds max on axis {axis}")]
    InvalidRange {
        /// The first offending axis
        axis: usize,
    },

    /// Contract failure raised by a caller-supplied [`Editor`][crate::kdtree::Editor].
    #[error("Editor error: {0}")]
    Editor(String),
}

pub type Result<T> = std::result::Result<T, KDTreeError>;
