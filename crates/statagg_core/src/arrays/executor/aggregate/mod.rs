//! Vectorized aggregate executors.

mod traversal;
pub use traversal::*;

use std::fmt::Debug;

/// State for a single group that folds in values one at a time using an
/// online (single pass) update rule.
///
/// The split between `update` and `update_after_first` lets traversals peel
/// the first iteration of dense loops: once one value has been folded in,
/// every following value can skip first-value handling.
pub trait OnlineState: Debug {
    /// Transition the state out of empty if it's not already.
    ///
    /// Must be idempotent.
    fn begin(&mut self);

    /// Fold in a value. `begin` must have been called.
    fn update(&mut self, value: f64);

    /// Fold in a value when at least one value has already been folded in
    /// since the state last became non-empty.
    ///
    /// Must produce the same result as `update` under that precondition.
    fn update_after_first(&mut self, value: f64);
}
