pub mod aggregate;
pub mod function_set;

use std::fmt;

use crate::arrays::datatype::DataTypeId;

/// Input and return types for a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub positional_args: &'static [DataTypeId],
    pub return_type: DataTypeId,
}

impl Signature {
    pub const fn new(positional_args: &'static [DataTypeId], return_type: DataTypeId) -> Self {
        Signature {
            positional_args,
            return_type,
        }
    }

    /// Check if the given input types exactly match this signature.
    pub fn exact_match(&self, inputs: &[DataTypeId]) -> bool {
        self.positional_args == inputs
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (idx, arg) in self.positional_args.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}
