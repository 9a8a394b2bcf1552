/// A compact, bit-packed vector of booleans.
///
/// Used for validity masks where a set bit means the value at that index is
/// valid (not NULL).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bitmap {
    len: usize,
    data: Vec<u8>,
}

impl Bitmap {
    /// Create a bitmap of length `len` with all bits set.
    pub fn new_with_all_true(len: usize) -> Self {
        let mut data = vec![u8::MAX; len.div_ceil(8)];
        // Keep trailing bits zeroed so equality only depends on logical bits.
        if len % 8 != 0 {
            if let Some(last) = data.last_mut() {
                *last = (1 << (len % 8)) - 1;
            }
        }
        Bitmap { len, data }
    }

    /// Create a bitmap of length `len` with all bits unset.
    pub fn new_with_all_false(len: usize) -> Self {
        Bitmap {
            len,
            data: vec![0; len.div_ceil(8)],
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the value at `idx`.
    ///
    /// Panics if `idx` is out of bounds.
    #[inline]
    pub fn value(&self, idx: usize) -> bool {
        assert!(idx < self.len, "bitmap index {idx} out of bounds ({})", self.len);
        self.data[idx >> 3] & (1 << (idx & 7)) != 0
    }

    /// Set the bit at `idx`.
    ///
    /// Panics if `idx` is out of bounds.
    #[inline]
    pub fn set_unchecked(&mut self, idx: usize, val: bool) {
        assert!(idx < self.len, "bitmap index {idx} out of bounds ({})", self.len);
        if val {
            self.data[idx >> 3] |= 1 << (idx & 7);
        } else {
            self.data[idx >> 3] &= !(1 << (idx & 7));
        }
    }

    pub fn push(&mut self, val: bool) {
        if self.len % 8 == 0 {
            self.data.push(0);
        }
        self.len += 1;
        self.set_unchecked(self.len - 1, val);
    }

    pub fn count_trues(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    pub fn is_all_true(&self) -> bool {
        self.count_trues() == self.len
    }
}

impl FromIterator<bool> for Bitmap {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let mut bitmap = Bitmap {
            len: 0,
            data: Vec::with_capacity(iter.size_hint().0.div_ceil(8)),
        };
        for val in iter {
            bitmap.push(val);
        }
        bitmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_true_trailing_bits() {
        let a = Bitmap::new_with_all_true(10);
        let b = Bitmap::from_iter([true; 10]);
        assert_eq!(a, b);
        assert!(a.is_all_true());
        assert_eq!(10, a.count_trues());
    }

    #[test]
    fn set_and_get() {
        let mut bm = Bitmap::new_with_all_true(9);
        bm.set_unchecked(3, false);
        bm.set_unchecked(8, false);

        let got: Vec<_> = (0..bm.len()).map(|idx| bm.value(idx)).collect();
        assert_eq!(vec![true, true, true, false, true, true, true, true, false], got);
        assert!(!bm.is_all_true());
        assert_eq!(7, bm.count_trues());
    }

    #[test]
    fn from_iter_push() {
        let bm = Bitmap::from_iter([false, true, false]);
        assert_eq!(3, bm.len());
        assert!(!bm.value(0));
        assert!(bm.value(1));
        assert!(!bm.value(2));

        let empty = Bitmap::new_with_all_false(0);
        assert!(empty.is_empty());
        assert!(empty.is_all_true());
    }
}
