use statagg_error::{DbError, Result};
use tracing::debug;

use crate::arrays::batch::Batch;
use crate::arrays::datatype::DataType;
use crate::arrays::physical_type::ScalarStorage;
use crate::config::kernel::KernelConfig;
use crate::functions::aggregate::AggregateFunction;

/// Drives a single aggregate buffer over a stream of batches, producing one
/// output for all rows.
///
/// Each execution fragment gets its own operator. Outputs from multiple
/// fragments are combined outside of this operator.
#[derive(Debug)]
pub struct UngroupedAggregate<A: AggregateFunction> {
    function: A,
    config: KernelConfig,
    buffer: A::Buffer,
    /// Logical rows pushed since the last reset, including NULLs.
    rows_pushed: usize,
}

impl<A> UngroupedAggregate<A>
where
    A: AggregateFunction,
{
    pub fn try_new(function: A, config: KernelConfig) -> Result<Self> {
        config.validate()?;
        let buffer = function.allocate();

        Ok(UngroupedAggregate {
            function,
            config,
            buffer,
            rows_pushed: 0,
        })
    }

    /// Push a batch through the aggregate.
    ///
    /// Errors if the batch is larger than the configured batch size. The
    /// buffer is untouched in that case.
    pub fn push(&mut self, batch: &Batch<<A::Input as ScalarStorage>::StorageType>) -> Result<()> {
        if batch.size() > self.config.batch_size {
            return Err(DbError::new("Batch exceeds configured batch size")
                .with_field("size", batch.size())
                .with_field("batch_size", self.config.batch_size));
        }

        self.function.ingest(&mut self.buffer, batch);
        self.rows_pushed += batch.size();

        Ok(())
    }

    /// Produce the output for all pushed rows.
    ///
    /// May be called multiple times, and more batches may be pushed after.
    pub fn finish(&self) -> Option<A::Output> {
        debug!(rows_pushed = self.rows_pushed, "finalizing ungrouped aggregate");
        self.function.finalize(&self.buffer)
    }

    /// Reset the operator so it can be reused for a new set of rows.
    pub fn reset(&mut self) {
        debug!(rows_pushed = self.rows_pushed, "resetting ungrouped aggregate");
        self.function.reset(&mut self.buffer);
        self.rows_pushed = 0;
    }

    pub fn rows_pushed(&self) -> usize {
        self.rows_pushed
    }

    pub fn output_type(&self) -> DataType {
        self.function.describe_output_shape()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::physical_type::PhysicalF64;
    use crate::arrays::selection::SelectionVector;
    use crate::functions::aggregate::builtin::variance::{VarSamp, VariancePartial};
    use crate::functions::aggregate::partial::{PartialResult, combine_partials};
    use crate::functions::function_set::find_variance_function;
    use crate::testutil::{assert_close, partial_from_values};

    #[test]
    fn push_mixed_batches() {
        logutil::init_test();

        let function = VariancePartial::<PhysicalF64>::new();
        let mut op = UngroupedAggregate::try_new(function, KernelConfig::default()).unwrap();
        assert_eq!(PartialResult::output_type(), op.output_type());
        assert_eq!(None, op.finish());

        let selection = SelectionVector::from_iter([2, 0]);
        let batches = [
            Batch::try_new(vec![2.0, 4.0], None, None).unwrap(),
            Batch::new_repeating(4.0, 2),
            Batch::try_from_iter([Some(5.0), None, Some(5.0)]).unwrap(),
            Batch::try_new(vec![9.0, -1.0, 7.0], None, Some(selection)).unwrap(),
        ];
        for batch in &batches {
            op.push(batch).unwrap();
        }

        assert_eq!(9, op.rows_pushed());
        let out = op.finish().unwrap();
        assert_eq!(8, out.count);
        assert_close(40.0, out.sum);
        assert_close(32.0, out.sum_sq_dev);

        op.reset();
        assert_eq!(0, op.rows_pushed());
        assert_eq!(None, op.finish());
    }

    #[test]
    fn reject_oversized_batch() {
        let config = KernelConfig { batch_size: 2 };
        let mut op = UngroupedAggregate::try_new(VarSamp::<PhysicalF64>::new(), config).unwrap();

        let err = op
            .push(&Batch::try_new(vec![1.0, 2.0, 3.0], None, None).unwrap())
            .unwrap_err();
        assert_eq!(Some("3"), err.get_field("size"));
        assert_eq!(None, op.finish());

        // Repeating batches are checked against their logical size.
        op.push(&Batch::new_repeating(1.0, 3)).unwrap_err();

        op.push(&Batch::new_repeating(1.0, 2)).unwrap();
        op.push(&Batch::try_new(vec![3.0], None, None).unwrap()).unwrap();
        assert_close(4.0 / 3.0, op.finish().unwrap());
    }

    #[test]
    fn invalid_config() {
        let config = KernelConfig { batch_size: 0 };
        UngroupedAggregate::try_new(VarSamp::<PhysicalF64>::new(), config).unwrap_err();
    }

    #[test]
    fn fragments_on_threads_combine() {
        logutil::init_test();

        let values: Vec<f64> = (0..1000).map(|v| (v as f64 * 0.37).sin() * 50.0).collect();

        let partials: Vec<Option<PartialResult>> = std::thread::scope(|s| {
            let handles: Vec<_> = values
                .chunks(250)
                .map(|chunk| {
                    s.spawn(move || {
                        let mut op = UngroupedAggregate::try_new(
                            VariancePartial::<PhysicalF64>::new(),
                            KernelConfig::default(),
                        )
                        .unwrap();
                        for piece in chunk.chunks(64) {
                            let batch = Batch::try_new(piece.to_vec(), None, None).unwrap();
                            op.push(&batch).unwrap();
                        }
                        op.finish()
                    })
                })
                .collect();

            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let combined = partials
            .into_iter()
            .fold(None, combine_partials)
            .unwrap();
        let expected = partial_from_values(&values);

        assert_eq!(expected.count, combined.count);
        assert_close(expected.sum, combined.sum);
        assert_close(expected.sum_sq_dev, combined.sum_sq_dev);

        let stddev = find_variance_function("stddev").unwrap();
        assert_close(
            (expected.sum_sq_dev / 999.0).sqrt(),
            stddev.statistic.finalize(&combined).unwrap(),
        );
    }
}
