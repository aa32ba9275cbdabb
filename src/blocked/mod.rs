//! Blocked kernels: the output is computed one tile at a time, with the
//! tile's partial sums held in registers or stack scratch for the whole
//! reduction.
//!
//! Available implementations:
//! - `register`: B×B scalar accumulators, outer-product updates
//! - `packed_scalar`: A packed natural, B packed transposed, scalar dot products
//! - `packed`: packed SIMD micro-kernel, one vector accumulator per tile row

pub mod packed;
pub mod packed_scalar;
pub mod register;
