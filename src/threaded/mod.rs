//! Multi-threaded kernels.
//!
//! Both split C into blocks and hand the elements of each block to the
//! rayon pool that is current when they are called; the registry installs a
//! fixed-size pool when `KernelConfig::threads` is set.
//!
//! Available implementations:
//! - `matmul_parallel`: scalar reduction, natural B
//! - `matmul_parallel_transposed_simd`: vectorized dot product, transposed B

pub mod parallel;
