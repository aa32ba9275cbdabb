//! Square matrix multiplication in Rust, one optimization at a time.
//!
//! Every kernel here computes `C += A · B` for N×N `f32` matrices. They go
//! from the naive triple loop, through transposed access, register blocking
//! and packing, to explicit SIMD with FMA and a parallel vectorized version.
//! Each one is checked against the naive kernel.
//!
//! ## Usage
//!
//! ```
//! use matmul_kernels::{multiply, Matrix};
//!
//! let a = Matrix::identity(64);
//! let b = Matrix::filled(64, 2.0);
//! let mut c = Matrix::zeros(64);
//!
//! multiply(&a, &b, &mut c).unwrap();
//! assert_eq!(c, b);
//! ```
//!
//! Kernels are also available by name, with their preconditions checked:
//!
//! ```
//! use matmul_kernels::{find, KernelConfig, Matrix};
//!
//! let a = Matrix::identity(32);
//! let mut b = Matrix::filled(32, 1.0);
//! let mut c = Matrix::zeros(32);
//!
//! let kernel = find("parallel_transposed_simd").unwrap();
//! b.transpose_in_place();
//! kernel.run(&a, &b, &mut c, &KernelConfig::default()).unwrap();
//! assert_eq!(c, Matrix::filled(32, 1.0));
//! ```
//!
//! ## What's inside
//!
//! - Naive, tiled and transposed-access scalar kernels
//! - Register-blocked kernel with 2 to 32 wide tiles
//! - Packed micro-kernels, scalar and SIMD (8 or 4 lanes)
//! - Raw AVX2 + FMA versions, picked at run time
//! - Parallel kernels on rayon

pub mod blocked;
pub mod config;
pub mod error;
pub mod harness;
pub mod kernels;
pub mod matrix;
pub mod registry;
pub mod threaded;

pub use config::{BenchConfig, KernelConfig, RegisterTile};
pub use error::{ConfigError, Error, Mismatch, Result};
pub use matrix::{Matrix, Tile};
pub use registry::{Kernel, find, kernels};

pub use blocked::packed::matmul_packed_simd;
pub use blocked::packed_scalar::matmul_packed_scalar;
pub use blocked::register::matmul_register_blocked;
pub use kernels::avx2::{matmul_packed_simd_avx2, matmul_transposed_simd_avx2};
pub use kernels::dot::matmul_transposed_simd;
pub use matrix::naive::matmul_baseline;
pub use matrix::tiled::matmul_tiled;
pub use matrix::transposed::matmul_transposed;
pub use threaded::parallel::{matmul_parallel, matmul_parallel_transposed_simd};

/// Matrix multiply: C += A * B, with B in natural layout.
///
/// Picks the fastest kernel that fits: AVX2 packed when the CPU has it and
/// N is a multiple of 8, the portable packed kernel for other multiples of
/// 8, the baseline otherwise.
pub fn multiply(a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()> {
    let cfg = KernelConfig::default();
    let name = if a.n() % 8 == 0 {
        if kernels::avx2::avx2_fma_available() {
            "packed_simd_avx2"
        } else {
            "packed_simd"
        }
    } else {
        "baseline"
    };
    find(name)?.run(a, b, c, &cfg)
}
