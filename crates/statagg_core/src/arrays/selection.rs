/// Maps logical row indices in a batch to physical indices in the value
/// buffer.
///
/// Produced by upstream filters that drop rows without compacting the
/// underlying values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionVector {
    indices: Vec<usize>,
}

impl SelectionVector {
    /// Create an empty selection vector. A batch with an empty selection has
    /// no active rows even if values are physically present.
    pub const fn empty() -> Self {
        SelectionVector {
            indices: Vec::new(),
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        SelectionVector {
            indices: Vec::with_capacity(cap),
        }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    pub fn num_rows(&self) -> usize {
        self.indices.len()
    }

    /// Returns the largest physical location referenced, if any.
    pub fn max_location(&self) -> Option<usize> {
        self.indices.iter().copied().max()
    }

    pub fn push_location(&mut self, location: usize) {
        self.indices.push(location)
    }
}

impl FromIterator<usize> for SelectionVector {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        SelectionVector {
            indices: iter.into_iter().collect(),
        }
    }
}
