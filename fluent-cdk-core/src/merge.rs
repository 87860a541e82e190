//! Merge - Combining configuration fragments
//!
//! `a.merge(b)` treats `a` as the fragment written first. Optional values keep
//! the first value that was set; list-valued fields append `b` after `a`.
//! The `Default` (all-unset) value is the identity on both sides.

use crate::tag::Tags;

/// A configuration fragment that can absorb a fragment written after it
pub trait Merge: Sized {
    /// Combine `self` (written first) with `later`
    fn merge(self, later: Self) -> Self;
}

impl<T> Merge for Option<T> {
    fn merge(self, later: Self) -> Self {
        self.or(later)
    }
}

impl Merge for Tags {
    fn merge(mut self, later: Self) -> Self {
        self.extend(later);
        self
    }
}

/// Merge a whole sequence of fragments in the order they were written
pub fn merge_all<T, I>(fragments: I) -> T
where
    T: Merge + Default,
    I: IntoIterator<Item = T>,
{
    fragments
        .into_iter()
        .fold(T::default(), |acc, fragment| acc.merge(fragment))
}

/// Implement [`Merge`] field by field for a configuration struct.
///
/// Every listed field must itself implement `Merge` (`Option<_>` or `Tags`).
#[macro_export]
macro_rules! impl_merge {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        impl $crate::merge::Merge for $ty {
            fn merge(self, later: Self) -> Self {
                Self {
                    $($field: $crate::merge::Merge::merge(self.$field, later.$field),)*
                }
            }
        }
    };
}
