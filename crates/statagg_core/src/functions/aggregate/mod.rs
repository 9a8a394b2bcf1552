pub mod builtin;
pub mod partial;

use std::fmt::Debug;

use crate::arrays::batch::Batch;
use crate::arrays::datatype::DataType;
use crate::arrays::physical_type::ScalarStorage;

/// Contract between an aggregate and the operator driving it.
///
/// Buffers are owned by the caller, one per group, and passed explicitly to
/// every call. Nothing here is fallible: batches are validated when they're
/// built.
pub trait AggregateFunction: Debug + Sync + Send {
    /// Physical input the aggregate reads.
    type Input: ScalarStorage;
    /// Per-group state.
    type Buffer: Debug + Send;
    /// Finalized value for a group.
    type Output: Debug;

    /// Create a new empty buffer.
    fn allocate(&self) -> Self::Buffer;

    /// Return a buffer to the empty state so it can be reused for another
    /// group.
    fn reset(&self, buffer: &mut Self::Buffer);

    /// Fold a batch into the buffer.
    fn ingest(
        &self,
        buffer: &mut Self::Buffer,
        batch: &Batch<<Self::Input as ScalarStorage>::StorageType>,
    );

    /// Produce the output for a buffer, or None if no values were folded in
    /// (SQL NULL).
    fn finalize(&self, buffer: &Self::Buffer) -> Option<Self::Output>;

    /// Describe the type of values produced by `finalize`.
    fn describe_output_shape(&self) -> DataType;
}
