use std::fmt::{Debug, Display};

use num_traits::Float;

/// A trait for types that can be used as key coordinates.
///
/// This trait is sealed and cannot be implemented for external types. The nearest neighbor search
/// relies on IEEE semantics (infinite bounds for the initial search region), so only the floating
/// point primitives are supported.
pub trait CoordNum:
    private::Sealed + Float + Default + Debug + Display + Send + Sync + 'static
{
}

impl CoordNum for f32 {}

impl CoordNum for f64 {}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}
