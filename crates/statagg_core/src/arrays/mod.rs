pub mod batch;
pub mod bitmap;
pub mod datatype;
pub mod executor;
pub mod physical_type;
pub mod selection;
