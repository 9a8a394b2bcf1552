//! Named entry points for the variance family.

use crate::arrays::datatype::DataTypeId;
use crate::arrays::physical_type::{
    PhysicalF32, PhysicalF64, PhysicalI32, PhysicalI64, ScalarStorage,
};
use crate::functions::Signature;
use crate::functions::aggregate::builtin::variance::{
    StddevPopFinalize, StddevSampFinalize, VarPopFinalize, VarSampFinalize, VarianceFinalize,
};
use crate::functions::aggregate::partial::PartialResult;

/// Which statistic a function set finalizes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarianceStatistic {
    VarPop,
    VarSamp,
    StddevPop,
    StddevSamp,
}

impl VarianceStatistic {
    /// Finalize a (possibly combined) partial result.
    pub fn finalize(&self, partial: &PartialResult) -> Option<f64> {
        match self {
            Self::VarPop => VarPopFinalize::finalize(partial),
            Self::VarSamp => VarSampFinalize::finalize(partial),
            Self::StddevPop => StddevPopFinalize::finalize(partial),
            Self::StddevSamp => StddevSampFinalize::finalize(partial),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VarianceFunctionSet {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub statistic: VarianceStatistic,
    pub signatures: &'static [Signature],
}

impl VarianceFunctionSet {
    /// Find the signature accepting the given input, if any.
    pub fn find_exact(&self, inputs: &[DataTypeId]) -> Option<&'static Signature> {
        self.signatures.iter().find(|sig| sig.exact_match(inputs))
    }
}

/// Every set accepts one numeric input and returns a double.
const SIGNATURES: &[Signature] = &[
    Signature::new(&[PhysicalF64::DATATYPE_ID], DataTypeId::Float64),
    Signature::new(&[PhysicalF32::DATATYPE_ID], DataTypeId::Float64),
    Signature::new(&[PhysicalI64::DATATYPE_ID], DataTypeId::Float64),
    Signature::new(&[PhysicalI32::DATATYPE_ID], DataTypeId::Float64),
];

pub const FUNCTION_SET_VAR_POP: VarianceFunctionSet = VarianceFunctionSet {
    name: "var_pop",
    aliases: &[],
    statistic: VarianceStatistic::VarPop,
    signatures: SIGNATURES,
};

pub const FUNCTION_SET_VAR_SAMP: VarianceFunctionSet = VarianceFunctionSet {
    name: "var_samp",
    aliases: &[],
    statistic: VarianceStatistic::VarSamp,
    signatures: SIGNATURES,
};

pub const FUNCTION_SET_STDDEV_POP: VarianceFunctionSet = VarianceFunctionSet {
    name: "stddev_pop",
    aliases: &[],
    statistic: VarianceStatistic::StddevPop,
    signatures: SIGNATURES,
};

pub const FUNCTION_SET_STDDEV_SAMP: VarianceFunctionSet = VarianceFunctionSet {
    name: "stddev_samp",
    aliases: &["stddev"],
    statistic: VarianceStatistic::StddevSamp,
    signatures: SIGNATURES,
};

pub const BUILTIN_VARIANCE_FUNCTION_SETS: &[VarianceFunctionSet] = &[
    FUNCTION_SET_VAR_POP,
    FUNCTION_SET_VAR_SAMP,
    FUNCTION_SET_STDDEV_POP,
    FUNCTION_SET_STDDEV_SAMP,
];

/// Look up a function set by name or alias, ignoring case.
pub fn find_variance_function(name: &str) -> Option<&'static VarianceFunctionSet> {
    BUILTIN_VARIANCE_FUNCTION_SETS.iter().find(|set| {
        set.name.eq_ignore_ascii_case(name)
            || set.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    })
}
