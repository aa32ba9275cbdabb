//! SIMD width strategy.
//!
//! The vectorized kernels are generic over [`Lanes`], so the vector width is
//! picked by the type the kernel is instantiated with. The implementations
//! use `wide`, which lowers to SSE/AVX/NEON according to the target features
//! enabled at build time and to scalar code otherwise.

use wide::{f32x4, f32x8};

/// Widest lane count any implementation uses. The packed micro-kernel sizes
/// its stack accumulators with it.
pub const MAX_LANES: usize = 16;

/// A vector of `LANES` `f32` values.
pub trait Lanes: Copy + Send + Sync + 'static {
    const LANES: usize;

    fn zero() -> Self;

    /// Every lane set to `x`.
    fn splat(x: f32) -> Self;

    /// Load the first `LANES` elements of `src`.
    fn load(src: &[f32]) -> Self;

    /// Store into the first `LANES` elements of `dst`.
    fn store(self, dst: &mut [f32]);

    /// `self * m + acc`, fused where the target has FMA.
    fn mul_add(self, m: Self, acc: Self) -> Self;

    fn add(self, other: Self) -> Self;

    /// Horizontal sum of all lanes.
    fn reduce_sum(self) -> f32;
}

impl Lanes for f32x8 {
    const LANES: usize = 8;

    #[inline(always)]
    fn zero() -> Self {
        f32x8::splat(0.0)
    }

    #[inline(always)]
    fn splat(x: f32) -> Self {
        f32x8::splat(x)
    }

    #[inline(always)]
    fn load(src: &[f32]) -> Self {
        let mut lanes = [0.0f32; 8];
        lanes.copy_from_slice(&src[..8]);
        f32x8::from(lanes)
    }

    #[inline(always)]
    fn store(self, dst: &mut [f32]) {
        dst[..8].copy_from_slice(&self.to_array());
    }

    #[inline(always)]
    fn mul_add(self, m: Self, acc: Self) -> Self {
        f32x8::mul_add(self, m, acc)
    }

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        self + other
    }

    #[inline(always)]
    fn reduce_sum(self) -> f32 {
        self.to_array().iter().sum()
    }
}

impl Lanes for f32x4 {
    const LANES: usize = 4;

    #[inline(always)]
    fn zero() -> Self {
        f32x4::splat(0.0)
    }

    #[inline(always)]
    fn splat(x: f32) -> Self {
        f32x4::splat(x)
    }

    #[inline(always)]
    fn load(src: &[f32]) -> Self {
        let mut lanes = [0.0f32; 4];
        lanes.copy_from_slice(&src[..4]);
        f32x4::from(lanes)
    }

    #[inline(always)]
    fn store(self, dst: &mut [f32]) {
        dst[..4].copy_from_slice(&self.to_array());
    }

    #[inline(always)]
    fn mul_add(self, m: Self, acc: Self) -> Self {
        f32x4::mul_add(self, m, acc)
    }

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        self + other
    }

    #[inline(always)]
    fn reduce_sum(self) -> f32 {
        self.to_array().iter().sum()
    }
}

/// The width the default kernels are built with.
pub type NativeLanes = f32x8;
