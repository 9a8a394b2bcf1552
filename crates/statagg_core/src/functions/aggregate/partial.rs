//! Mergeable partial state produced by the variance kernel.

use crate::arrays::datatype::{DataType, Field, StructTypeMeta};

/// Partial aggregate for the variance family.
///
/// `sum_sq_dev` is the sum of squared deviations from the mean (M2), not a
/// variance. Consumers divide by `count` (population) or `count - 1`
/// (sample).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartialResult {
    pub count: i64,
    pub sum: f64,
    pub sum_sq_dev: f64,
}

impl PartialResult {
    /// Field names of the output struct, in order.
    ///
    /// The third field carries M2 but keeps the name "variance" for
    /// compatibility with existing consumers of the struct.
    pub const FIELD_NAMES: [&'static str; 3] = ["count", "sum", "variance"];

    /// Structural description of the partial result.
    pub fn output_type() -> DataType {
        let [count, sum, sum_sq_dev] = Self::FIELD_NAMES;
        DataType::Struct(StructTypeMeta {
            fields: vec![
                Field::new(count, DataType::Int64, false),
                Field::new(sum, DataType::Float64, false),
                Field::new(sum_sq_dev, DataType::Float64, false),
            ],
        })
    }

    pub fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }

    /// Merge another partial into this one using the parallel variance
    /// formula.
    pub fn combine(&mut self, other: &PartialResult) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }

        let self_count = self.count as f64;
        let other_count = other.count as f64;
        let total_count = self_count + other_count;

        let delta = other.mean() - self.mean();

        self.sum_sq_dev = self.sum_sq_dev
            + other.sum_sq_dev
            + delta * delta * self_count * other_count / total_count;
        self.sum += other.sum;
        self.count += other.count;
    }
}

/// Combine two possibly-NULL partials. NULL is the identity.
pub fn combine_partials(
    left: Option<PartialResult>,
    right: Option<PartialResult>,
) -> Option<PartialResult> {
    match (left, right) {
        (Some(mut left), Some(right)) => {
            left.combine(&right);
            Some(left)
        }
        (Some(p), None) | (None, Some(p)) => Some(p),
        (None, None) => None,
    }
}
