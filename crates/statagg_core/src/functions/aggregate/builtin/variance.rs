use std::fmt::Debug;
use std::marker::PhantomData;

use crate::arrays::batch::Batch;
use crate::arrays::datatype::DataType;
use crate::arrays::executor::aggregate::{OnlineState, OnlineUpdater};
use crate::arrays::physical_type::ScalarStorage;
use crate::functions::aggregate::AggregateFunction;
use crate::functions::aggregate::partial::PartialResult;

/// Variance kernel producing the partial `(count, sum, sum_sq_dev)` tuple.
pub type VariancePartial<S> = Variance<S, PartialFinalize>;
pub type VarPop<S> = Variance<S, VarPopFinalize>;
pub type VarSamp<S> = Variance<S, VarSampFinalize>;
pub type StddevPop<S> = Variance<S, StddevPopFinalize>;
pub type StddevSamp<S> = Variance<S, StddevSampFinalize>;

/// Variance family aggregate over input storage `S`.
///
/// Every member shares the same buffer and traversal, and only differ in the
/// finalizer `F` applied to the accumulated partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variance<S, F> {
    _s: PhantomData<S>,
    _f: PhantomData<F>,
}

impl<S, F> Variance<S, F> {
    pub const fn new() -> Self {
        Variance {
            _s: PhantomData,
            _f: PhantomData,
        }
    }
}

impl<S, F> Default for Variance<S, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, F> AggregateFunction for Variance<S, F>
where
    S: ScalarStorage,
    F: VarianceFinalize,
{
    type Input = S;
    type Buffer = VarianceBuffer;
    type Output = F::Output;

    fn allocate(&self) -> VarianceBuffer {
        VarianceBuffer::default()
    }

    fn reset(&self, buffer: &mut VarianceBuffer) {
        buffer.reset()
    }

    fn ingest(&self, buffer: &mut VarianceBuffer, batch: &Batch<S::StorageType>) {
        OnlineUpdater::update::<S, _>(batch, buffer);
    }

    fn finalize(&self, buffer: &VarianceBuffer) -> Option<F::Output> {
        let partial = buffer.partial_result()?;
        F::finalize(&partial)
    }

    fn describe_output_shape(&self) -> DataType {
        F::output_type()
    }
}

/// Turns an accumulated partial into an output value.
pub trait VarianceFinalize: Sync + Send + Copy + Debug + Default + 'static {
    type Output: Debug;

    fn output_type() -> DataType;

    /// Produce the output, or None for SQL NULL.
    fn finalize(partial: &PartialResult) -> Option<Self::Output>;
}

/// Emits the partial tuple as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartialFinalize;

impl VarianceFinalize for PartialFinalize {
    type Output = PartialResult;

    fn output_type() -> DataType {
        PartialResult::output_type()
    }

    fn finalize(partial: &PartialResult) -> Option<PartialResult> {
        Some(*partial)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VarPopFinalize;

impl VarianceFinalize for VarPopFinalize {
    type Output = f64;

    fn output_type() -> DataType {
        DataType::Float64
    }

    fn finalize(partial: &PartialResult) -> Option<f64> {
        match partial.count {
            0 => None,
            1 => Some(0.0),
            count => Some(partial.sum_sq_dev / count as f64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VarSampFinalize;

impl VarianceFinalize for VarSampFinalize {
    type Output = f64;

    fn output_type() -> DataType {
        DataType::Float64
    }

    fn finalize(partial: &PartialResult) -> Option<f64> {
        match partial.count {
            0 | 1 => None,
            count => Some(partial.sum_sq_dev / (count - 1) as f64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StddevPopFinalize;

impl VarianceFinalize for StddevPopFinalize {
    type Output = f64;

    fn output_type() -> DataType {
        DataType::Float64
    }

    fn finalize(partial: &PartialResult) -> Option<f64> {
        VarPopFinalize::finalize(partial).map(f64::sqrt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StddevSampFinalize;

impl VarianceFinalize for StddevSampFinalize {
    type Output = f64;

    fn output_type() -> DataType {
        DataType::Float64
    }

    fn finalize(partial: &PartialResult) -> Option<f64> {
        VarSampFinalize::finalize(partial).map(f64::sqrt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferState {
    /// Nothing folded in. Numeric fields are stale and must not be read.
    #[default]
    Empty,
    /// At least one value folded in.
    Accumulating,
}

/// Per-group accumulator for the variance family.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VarianceBuffer {
    state: BufferState,
    count: i64,
    sum: f64,
    /// Sum of squared deviations from the running mean (M2).
    sum_sq_dev: f64,
}

impl VarianceBuffer {
    pub fn state(&self) -> BufferState {
        self.state
    }

    pub fn is_empty(&self) -> bool {
        self.state == BufferState::Empty
    }

    /// Move back to empty. Numeric fields are left as is and get overwritten
    /// on the next value.
    pub fn reset(&mut self) {
        self.state = BufferState::Empty;
    }

    /// Get the partial result, or None if nothing has been folded in.
    pub fn partial_result(&self) -> Option<PartialResult> {
        match self.state {
            BufferState::Empty => None,
            BufferState::Accumulating => {
                assert!(
                    self.count > 0,
                    "non-empty variance buffer with zero count: {self:?}"
                );
                Some(PartialResult {
                    count: self.count,
                    sum: self.sum,
                    sum_sq_dev: self.sum_sq_dev,
                })
            }
        }
    }

    /// Fold the deviation term for `value` into M2.
    ///
    /// `value` must already be included in `count` and `sum`, and `count`
    /// must be at least 2.
    #[inline]
    fn fold_deviation(&mut self, value: f64) {
        let n = self.count as f64;
        let t = n * value - self.sum;
        self.sum_sq_dev += (t * t) / (n * (n - 1.0));
    }
}

impl OnlineState for VarianceBuffer {
    #[inline]
    fn begin(&mut self) {
        if self.state == BufferState::Empty {
            self.count = 0;
            self.sum = 0.0;
            self.sum_sq_dev = 0.0;
            self.state = BufferState::Accumulating;
        }
    }

    #[inline]
    fn update(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        if self.count > 1 {
            self.fold_deviation(value);
        }
    }

    #[inline]
    fn update_after_first(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.fold_deviation(value);
    }
}
