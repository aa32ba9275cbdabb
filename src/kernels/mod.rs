//! SIMD building blocks and the vectorized dot-product kernels.
//!
//! - `lanes`: the vector-width strategy every SIMD kernel is generic over
//! - `dot`: row·row dot product with FMA and a horizontal sum, on a
//!   pre-transposed B
//! - `avx2`: the same dot-product kernel and the packed 8×8 micro-kernel
//!   written with raw AVX2/FMA intrinsics

pub mod avx2;
pub mod dot;
pub mod lanes;
