/// A predicate that rejects otherwise eligible nearest neighbor candidates.
///
/// Any `Fn(&T) -> bool` closure is a checker.
pub trait Checker<T> {
    /// Returns `true` if `value` may appear in the results.
    fn usable(&self, value: &T) -> bool;
}

impl<T, F> Checker<T> for F
where
    F: Fn(&T) -> bool,
{
    #[inline]
    fn usable(&self, value: &T) -> bool {
        self(value)
    }
}

/// The checker that accepts every candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<T> Checker<T> for AcceptAll {
    #[inline]
    fn usable(&self, _value: &T) -> bool {
        true
    }
}
