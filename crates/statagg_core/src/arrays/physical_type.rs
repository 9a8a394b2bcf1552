use std::fmt::Debug;

use num_traits::AsPrimitive;

use super::datatype::DataTypeId;

/// Describes how values of a numeric type are stored, and how they widen into
/// the `f64` domain the statistical kernels operate in.
pub trait ScalarStorage: Debug + Sync + Send + Clone + Copy + 'static {
    /// Logical type id this storage backs.
    const DATATYPE_ID: DataTypeId;

    type StorageType: Debug + Default + Copy + PartialEq + Sync + Send + AsPrimitive<f64>;

    /// Widen a stored value to `f64`.
    #[inline]
    fn to_f64(v: Self::StorageType) -> f64 {
        v.as_()
    }
}

macro_rules! generate_primitive {
    ($prim:ty, $name:ident, $id_variant:ident) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl ScalarStorage for $name {
            const DATATYPE_ID: DataTypeId = DataTypeId::$id_variant;

            type StorageType = $prim;
        }
    };
}

generate_primitive!(i32, PhysicalI32, Int32);
generate_primitive!(i64, PhysicalI64, Int64);
generate_primitive!(f32, PhysicalF32, Float32);
generate_primitive!(f64, PhysicalF64, Float64);
