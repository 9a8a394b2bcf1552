use statagg_error::{DbError, Result};

use super::bitmap::Bitmap;
use super::selection::SelectionVector;

/// A single column of values processed together.
///
/// A batch is read only to the aggregate kernels. Construction validates that
/// the validity mask and selection line up with the values, so traversals can
/// index without bounds concerns beyond the usual slice checks.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    /// Physical values.
    values: Vec<T>,
    /// Validity indexed by physical location. None if all values are valid.
    validity: Option<Bitmap>,
    /// Logical to physical mapping. None if every physical value is active.
    selection: Option<SelectionVector>,
    /// If set, `values[0]` stands in for every logical row.
    is_repeating: bool,
    /// Number of logical rows.
    size: usize,
}

impl<T> Batch<T>
where
    T: Copy + Default,
{
    /// Create a batch with no rows.
    pub fn empty() -> Self {
        Batch {
            values: Vec::new(),
            validity: None,
            selection: None,
            is_repeating: false,
            size: 0,
        }
    }

    /// Create a new batch from values, an optional validity mask, and an
    /// optional selection.
    ///
    /// The logical size is the selection length if provided, otherwise the
    /// number of values. A validity mask with no invalid bits is dropped.
    pub fn try_new(
        values: Vec<T>,
        validity: Option<Bitmap>,
        selection: Option<SelectionVector>,
    ) -> Result<Self> {
        let validity = Self::normalize_validity(values.len(), validity)?;

        let size = match &selection {
            Some(sel) => {
                if let Some(max) = sel.max_location() {
                    if max >= values.len() {
                        return Err(DbError::new("Selection references a value out of bounds")
                            .with_field("location", max)
                            .with_field("num_values", values.len()));
                    }
                }
                sel.num_rows()
            }
            None => values.len(),
        };

        Ok(Batch {
            values,
            validity,
            selection,
            is_repeating: false,
            size,
        })
    }

    /// Create a batch from an iterator of optional values. None values are
    /// marked invalid.
    pub fn try_from_iter(iter: impl IntoIterator<Item = Option<T>>) -> Result<Self> {
        let iter = iter.into_iter();
        let mut values = Vec::with_capacity(iter.size_hint().0);
        let mut validity = Bitmap::default();

        for v in iter {
            match v {
                Some(v) => {
                    values.push(v);
                    validity.push(true);
                }
                None => {
                    values.push(T::default());
                    validity.push(false);
                }
            }
        }

        Self::try_new(values, Some(validity), None)
    }

    /// Create a repeating batch where a single value represents `len` rows.
    pub fn new_repeating(value: T, len: usize) -> Self {
        Batch {
            values: vec![value],
            validity: None,
            selection: None,
            is_repeating: true,
            size: len,
        }
    }

    /// Create a repeating batch of `len` NULLs.
    pub fn new_repeating_null(len: usize) -> Self {
        Batch {
            values: vec![T::default()],
            validity: Some(Bitmap::new_with_all_false(1)),
            selection: None,
            is_repeating: true,
            size: len,
        }
    }

    /// Apply a selection to this batch, replacing any existing selection.
    ///
    /// For repeating batches the selection only changes the logical size since
    /// every location resolves to the same value.
    pub fn with_selection(mut self, selection: SelectionVector) -> Result<Self> {
        if !self.is_repeating {
            if let Some(max) = selection.max_location() {
                if max >= self.values.len() {
                    return Err(DbError::new("Selection references a value out of bounds")
                        .with_field("location", max)
                        .with_field("num_values", self.values.len()));
                }
            }
        }

        self.size = selection.num_rows();
        self.selection = Some(selection);

        Ok(self)
    }

    fn normalize_validity(num_values: usize, validity: Option<Bitmap>) -> Result<Option<Bitmap>> {
        match validity {
            Some(validity) => {
                if validity.len() != num_values {
                    return Err(DbError::new("Validity length does not match number of values")
                        .with_field("validity_len", validity.len())
                        .with_field("num_values", num_values));
                }
                if validity.is_all_true() {
                    Ok(None)
                } else {
                    Ok(Some(validity))
                }
            }
            None => Ok(None),
        }
    }
}

impl<T> Batch<T> {
    /// Number of logical rows.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn validity(&self) -> Option<&Bitmap> {
        self.validity.as_ref()
    }

    pub fn selection(&self) -> Option<&SelectionVector> {
        self.selection.as_ref()
    }

    pub fn is_repeating(&self) -> bool {
        self.is_repeating
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    /// If any physical value in this batch may be NULL.
    pub fn has_nulls(&self) -> bool {
        self.validity.is_some()
    }

    /// Check if the value at a physical location is valid.
    #[inline]
    pub fn is_valid(&self, location: usize) -> bool {
        match &self.validity {
            Some(validity) => validity.value(location),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_batch() {
        let batch = Batch::try_new(vec![1.0, 2.0, 3.0], None, None).unwrap();
        assert_eq!(3, batch.size());
        assert!(!batch.has_nulls());
        assert!(!batch.has_selection());
        assert!(!batch.is_repeating());
    }

    #[test]
    fn all_valid_mask_dropped() {
        let batch = Batch::try_new(vec![1, 2], Some(Bitmap::new_with_all_true(2)), None).unwrap();
        assert!(!batch.has_nulls());
        assert!(batch.validity().is_none());
    }

    #[test]
    fn from_iter_marks_nulls() {
        let batch = Batch::try_from_iter([Some(3.0), None, Some(5.0)]).unwrap();
        assert_eq!(3, batch.size());
        assert!(batch.has_nulls());
        assert!(batch.is_valid(0));
        assert!(!batch.is_valid(1));
        assert!(batch.is_valid(2));
    }

    #[test]
    fn validity_len_mismatch() {
        let err = Batch::try_new(vec![1.0, 2.0], Some(Bitmap::from_iter([true])), None)
            .unwrap_err();
        assert_eq!(Some("1"), err.get_field("validity_len"));
    }

    #[test]
    fn selection_sets_size() {
        let batch = Batch::try_new(
            vec![1.0, 9.0, 2.0, 9.0, 3.0],
            None,
            Some(SelectionVector::from_iter([0, 2, 4])),
        )
        .unwrap();
        assert_eq!(3, batch.size());
        assert!(batch.has_selection());
    }

    #[test]
    fn selection_out_of_bounds() {
        let err = Batch::try_new(vec![1.0, 2.0], None, Some(SelectionVector::from_iter([0, 2])))
            .unwrap_err();
        assert_eq!(Some("2"), err.get_field("location"));

        let err = Batch::try_new(vec![1.0], None, None)
            .unwrap()
            .with_selection(SelectionVector::from_iter([1]))
            .unwrap_err();
        assert_eq!(Some("1"), err.get_field("num_values"));
    }

    #[test]
    fn repeating_with_selection_only_changes_size() {
        let batch = Batch::new_repeating(6.0, 5)
            .with_selection(SelectionVector::from_iter([1, 3]))
            .unwrap();
        assert!(batch.is_repeating());
        assert_eq!(2, batch.size());
    }

    #[test]
    fn repeating_null() {
        let batch = Batch::<f64>::new_repeating_null(4);
        assert!(batch.is_repeating());
        assert!(batch.has_nulls());
        assert!(!batch.is_valid(0));
        assert_eq!(4, batch.size());
    }
}
