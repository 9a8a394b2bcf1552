use tracing::trace;

use super::OnlineState;
use crate::arrays::batch::Batch;
use crate::arrays::bitmap::Bitmap;
use crate::arrays::physical_type::ScalarStorage;

/// Properties of a batch that determine how it's traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchShape {
    pub is_repeating: bool,
    pub has_selection: bool,
    pub has_nulls: bool,
}

impl BatchShape {
    pub fn of<T>(batch: &Batch<T>) -> Self {
        BatchShape {
            is_repeating: batch.is_repeating(),
            has_selection: batch.has_selection(),
            has_nulls: batch.has_nulls(),
        }
    }
}

/// The loop used to fold a batch into a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalStrategy {
    /// Single value standing in for every row.
    RepeatingNoNulls,
    /// Every physical value in order.
    NoSelectionNoNulls,
    /// Every valid physical value in order.
    NoSelectionHasNulls,
    /// Selected values in selection order.
    SelectionNoNulls,
    /// Valid selected values in selection order.
    SelectionHasNulls,
}

impl TraversalStrategy {
    /// Pick a strategy for a batch shape.
    ///
    /// Repeating takes precedence over selection. Nulls in a repeating batch
    /// are resolved by the updater before traversal (a NULL repeated value
    /// has no rows to fold in), so they don't pick a different loop.
    pub const fn for_shape(shape: BatchShape) -> Self {
        match (shape.is_repeating, shape.has_selection, shape.has_nulls) {
            (true, _, _) => Self::RepeatingNoNulls,
            (false, false, false) => Self::NoSelectionNoNulls,
            (false, false, true) => Self::NoSelectionHasNulls,
            (false, true, false) => Self::SelectionNoNulls,
            (false, true, true) => Self::SelectionHasNulls,
        }
    }
}

/// Folds batches into a single online state.
#[derive(Debug, Clone, Copy)]
pub struct OnlineUpdater;

impl OnlineUpdater {
    /// Fold all valid logical rows of `batch` into `state`.
    ///
    /// Returns the strategy that was used, or None if there was nothing to
    /// fold in (empty batch, or a repeating NULL). In the None case the
    /// state is left untouched.
    pub fn update<S, State>(
        batch: &Batch<S::StorageType>,
        state: &mut State,
    ) -> Option<TraversalStrategy>
    where
        S: ScalarStorage,
        State: OnlineState,
    {
        let size = batch.size();
        if size == 0 {
            return None;
        }

        // A repeating NULL stands in for `size` NULL rows.
        if batch.is_repeating() && !batch.is_valid(0) {
            return None;
        }

        let values = batch.values();
        let strategy = TraversalStrategy::for_shape(BatchShape::of(batch));

        match strategy {
            TraversalStrategy::RepeatingNoNulls => {
                iterate_repeating_no_nulls::<S, _>(state, values[0], size);
            }
            TraversalStrategy::NoSelectionNoNulls => {
                iterate_no_selection_no_nulls::<S, _>(state, &values[..size]);
            }
            TraversalStrategy::NoSelectionHasNulls => {
                let Some(validity) = batch.validity() else {
                    unreachable!("batch with nulls should have validity")
                };
                iterate_no_selection_has_nulls::<S, _>(state, &values[..size], validity);
            }
            TraversalStrategy::SelectionNoNulls => {
                let Some(selection) = batch.selection() else {
                    unreachable!("batch with selection should have a selection vector")
                };
                iterate_selection_no_nulls::<S, _>(state, values, selection.as_slice());
            }
            TraversalStrategy::SelectionHasNulls => {
                let (Some(selection), Some(validity)) = (batch.selection(), batch.validity())
                else {
                    unreachable!("selected batch with nulls should have selection and validity")
                };
                iterate_selection_has_nulls::<S, _>(state, values, validity, selection.as_slice());
            }
        }

        trace!(?strategy, size, "folded batch into online state");

        Some(strategy)
    }
}

/// Fold `value` in `count` times.
pub fn iterate_repeating_no_nulls<S, State>(state: &mut State, value: S::StorageType, count: usize)
where
    S: ScalarStorage,
    State: OnlineState,
{
    if count == 0 {
        return;
    }

    let value = S::to_f64(value);

    state.begin();
    state.update(value);
    for _ in 1..count {
        state.update_after_first(value);
    }
}

/// Fold in every value in order.
pub fn iterate_no_selection_no_nulls<S, State>(state: &mut State, values: &[S::StorageType])
where
    S: ScalarStorage,
    State: OnlineState,
{
    let Some((&first, rest)) = values.split_first() else {
        return;
    };

    state.begin();
    state.update(S::to_f64(first));
    for &v in rest {
        state.update_after_first(S::to_f64(v));
    }
}

/// Fold in every valid value in order.
///
/// `validity` is indexed the same as `values`.
pub fn iterate_no_selection_has_nulls<S, State>(
    state: &mut State,
    values: &[S::StorageType],
    validity: &Bitmap,
) where
    S: ScalarStorage,
    State: OnlineState,
{
    for (idx, &v) in values.iter().enumerate() {
        if !validity.value(idx) {
            continue;
        }
        state.begin();
        state.update(S::to_f64(v));
    }
}

/// Fold in `values[selection[i]]` for each `i` in order.
pub fn iterate_selection_no_nulls<S, State>(
    state: &mut State,
    values: &[S::StorageType],
    selection: &[usize],
) where
    S: ScalarStorage,
    State: OnlineState,
{
    let Some((&first, rest)) = selection.split_first() else {
        return;
    };

    state.begin();
    state.update(S::to_f64(values[first]));
    for &loc in rest {
        state.update_after_first(S::to_f64(values[loc]));
    }
}

/// Fold in `values[selection[i]]` for each `i` in order, skipping invalid
/// locations.
///
/// `validity` is indexed by physical location.
pub fn iterate_selection_has_nulls<S, State>(
    state: &mut State,
    values: &[S::StorageType],
    validity: &Bitmap,
    selection: &[usize],
) where
    S: ScalarStorage,
    State: OnlineState,
{
    for &loc in selection {
        if !validity.value(loc) {
            continue;
        }
        state.begin();
        state.update(S::to_f64(values[loc]));
    }
}
