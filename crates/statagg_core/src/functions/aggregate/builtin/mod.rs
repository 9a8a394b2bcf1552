pub mod variance;
