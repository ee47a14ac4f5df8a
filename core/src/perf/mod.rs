//! Benchmark kernels and the registry that names them.
//!
//! Criterion benches, the `rtbench` CLI and the dashboard reporter all run
//! cases out of [`scenarios`], so every tool measures the same loops under
//! the same names.

pub mod addressing;
pub mod arith;
pub mod calls;
pub mod format;
pub mod scenarios;

#[cfg(test)]
mod arith_test;
#[cfg(test)]
mod format_test;
