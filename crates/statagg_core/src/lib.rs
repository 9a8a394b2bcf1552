//! Vectorized single-pass statistical aggregates.
//!
//! The core of this crate is the variance kernel: a per-group buffer holding
//! count, sum, and the sum of squared deviations (M2), and a set of batch
//! traversals that fold column values into that buffer.
pub mod arrays;
pub mod config;
pub mod execution;
pub mod functions;

#[cfg(test)]
pub(crate) mod testutil;
