//! Editors applied to the value slot of a key during an insert-or-update descent.
//!
//! A slot holds `Some(value)` for a live key and `None` for a key that is absent or has been
//! deleted. The tree compares the slot before and after the edit to keep its live count.

use crate::error::{KDTreeError, Result};

/// A callback applied to the value slot found (or created) at a key.
///
/// An editor that returns an error must leave the slot untouched.
pub trait Editor<T> {
    /// Edit the slot in place.
    fn edit(self, slot: &mut Option<T>) -> Result<()>;
}

/// Stores a value at a key that has no live value, and fails with
/// [`KDTreeError::DuplicateKey`] otherwise.
#[derive(Debug, Clone)]
pub struct Inserter<T>(pub T);

impl<T> Editor<T> for Inserter<T> {
    fn edit(self, slot: &mut Option<T>) -> Result<()> {
        if slot.is_some() {
            return Err(KDTreeError::DuplicateKey);
        }
        *slot = Some(self.0);
        Ok(())
    }
}

/// Stores a value at a key that has no live value, and keeps the current one otherwise.
#[derive(Debug, Clone)]
pub struct OptionalInserter<T>(pub T);

impl<T> Editor<T> for OptionalInserter<T> {
    fn edit(self, slot: &mut Option<T>) -> Result<()> {
        if slot.is_none() {
            *slot = Some(self.0);
        }
        Ok(())
    }
}

/// Replaces the value at a live key. Absent and deleted keys stay that way.
#[derive(Debug, Clone)]
pub struct Replacer<T>(pub T);

impl<T> Editor<T> for Replacer<T> {
    fn edit(self, slot: &mut Option<T>) -> Result<()> {
        if let Some(current) = slot.as_mut() {
            *current = self.0;
        }
        Ok(())
    }
}

/// Stores a value at a key unconditionally, reviving it if it was deleted.
#[derive(Debug, Clone)]
pub struct Resurrector<T>(pub T);

impl<T> Editor<T> for Resurrector<T> {
    fn edit(self, slot: &mut Option<T>) -> Result<()> {
        *slot = Some(self.0);
        Ok(())
    }
}

/// Applies an arbitrary closure to the slot.
///
/// The closure may replace the value, revive the key by filling an empty slot, or delete the key
/// by emptying it.
///
/// ```
/// use kd_index::kdtree::{KDTree, Updater};
///
/// let mut tree = KDTree::new(2);
/// tree.insert(&[1., 1.], 10).unwrap();
/// tree.edit(&[1., 1.], Updater(|slot: &mut Option<i32>| -> kd_index::Result<()> {
///     if let Some(v) = slot.as_mut() {
///         *v += 1;
///     }
///     Ok(())
/// }))
/// .unwrap();
/// assert_eq!(tree.search(&[1., 1.]).unwrap(), Some(&11));
/// ```
pub struct Updater<F>(pub F);

impl<T, F> Editor<T> for Updater<F>
where
    F: FnOnce(&mut Option<T>) -> Result<()>,
{
    fn edit(self, slot: &mut Option<T>) -> Result<()> {
        (self.0)(slot)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn inserter_refuses_live_slot() {
        let mut slot = Some(1);
        assert_eq!(Inserter(2).edit(&mut slot), Err(KDTreeError::DuplicateKey));
        assert_eq!(slot, Some(1));

        let mut slot = None;
        Inserter(2).edit(&mut slot).unwrap();
        assert_eq!(slot, Some(2));
    }

    #[test]
    fn optional_inserter_keeps_current() {
        let mut slot = Some(1);
        OptionalInserter(2).edit(&mut slot).unwrap();
        assert_eq!(slot, Some(1));
    }

    #[test]
    fn replacer_ignores_empty_slot() {
        let mut slot: Option<i32> = None;
        Replacer(2).edit(&mut slot).unwrap();
        assert_eq!(slot, None);

        let mut slot = Some(1);
        Replacer(2).edit(&mut slot).unwrap();
        assert_eq!(slot, Some(2));
    }

    #[test]
    fn resurrector_always_stores() {
        let mut slot = None;
        Resurrector("back").edit(&mut slot).unwrap();
        assert_eq!(slot, Some("back"));
    }

    #[test]
    fn updater_can_fail() {
        let mut slot = Some(1);
        let result = Updater(|_: &mut Option<i32>| -> Result<()> {
            Err(KDTreeError::Editor("nope".to_string()))
        })
        .edit(&mut slot);
        assert!(matches!(result, Err(KDTreeError::Editor(_))));
        assert_eq!(slot, Some(1));
    }
}
