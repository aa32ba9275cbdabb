//! Kernel and benchmark configuration.
//!
//! Tile, pack and block widths are passed into every kernel call instead of
//! being baked in as globals, so a caller can check them against N first.

use crate::error::{ConfigError, Error, Result};

/// Largest pack width the packed kernels keep in stack scratch.
pub const MAX_PACK_WIDTH: usize = 32;

/// Side of the output tiles the parallel kernels hand out, unless configured.
pub const DEFAULT_BLOCK_SIZE: usize = 32;

/// Register tile widths the register-blocked kernel is instantiated for.
///
/// Each variant is a separate monomorphization, so the accumulators are a
/// fixed-size local array the compiler can keep in registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterTile {
    W2,
    W4,
    #[default]
    W8,
    W16,
    W32,
}

impl RegisterTile {
    pub fn width(self) -> usize {
        match self {
            RegisterTile::W2 => 2,
            RegisterTile::W4 => 4,
            RegisterTile::W8 => 8,
            RegisterTile::W16 => 16,
            RegisterTile::W32 => 32,
        }
    }
}

/// A width a kernel depends on. Kernels list the ones they use so only the
/// relevant ones are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// SIMD lane count of the kernel's vector type.
    Lanes(usize),
    RegisterTile,
    Pack,
    Block,
}

/// Per-call kernel parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelConfig {
    /// Output tile side of the register-blocked kernel.
    pub register_tile: RegisterTile,
    /// Reduction chunk of the packed kernels (also the tile side of the
    /// packed scalar kernel).
    pub pack_width: usize,
    /// Output tile side of the tiled and parallel kernels.
    pub block_size: usize,
    /// Worker count for parallel kernels. `None` uses rayon's global pool.
    pub threads: Option<usize>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            register_tile: RegisterTile::default(),
            pack_width: 8,
            block_size: DEFAULT_BLOCK_SIZE,
            threads: None,
        }
    }
}

impl KernelConfig {
    /// Same widths everywhere, handy for small matrices.
    pub fn uniform(width: usize) -> Self {
        let register_tile = match width {
            2 => RegisterTile::W2,
            4 => RegisterTile::W4,
            16 => RegisterTile::W16,
            32 => RegisterTile::W32,
            _ => RegisterTile::W8,
        };
        Self {
            register_tile,
            pack_width: width,
            block_size: width,
            threads: None,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Checks that every width in `widths` divides `n`.
    pub fn check(&self, n: usize, widths: &[Width]) -> std::result::Result<(), ConfigError> {
        if self.threads == Some(0) {
            return Err(ConfigError::ZeroThreads);
        }
        for &width in widths {
            let (what, w) = match width {
                Width::Lanes(lanes) => ("vector", lanes),
                Width::RegisterTile => ("register tile", self.register_tile.width()),
                Width::Pack => {
                    if self.pack_width > MAX_PACK_WIDTH {
                        return Err(ConfigError::PackWidthTooLarge {
                            width: self.pack_width,
                            max: MAX_PACK_WIDTH,
                        });
                    }
                    ("pack", self.pack_width)
                }
                Width::Block => ("block", self.block_size),
            };
            if w == 0 {
                return Err(ConfigError::ZeroWidth { what });
            }
            if n % w != 0 {
                return Err(ConfigError::NotDivisible { n, what, width: w });
            }
        }
        Ok(())
    }
}

/// Benchmark run parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchConfig {
    /// Matrix side.
    pub n: usize,
    /// Seed for the random A and B.
    pub seed: u64,
    /// Absolute tolerance when comparing against the reference.
    pub epsilon: f32,
    pub kernel: KernelConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            n: 1024,
            seed: 0x5EED_0F_1024,
            // f32 sums of 1024 products in [0, 1) land around 256, where
            // reordering the reduction moves the result by a few 1e-3.
            epsilon: 1e-2,
            kernel: KernelConfig::default(),
        }
    }
}

impl BenchConfig {
    /// Defaults overridden by `MATMUL_N`, `MATMUL_SEED`, `MATMUL_EPSILON`
    /// and `MATMUL_THREADS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(n) = parse_var(&lookup, "MATMUL_N")? {
            config.n = n;
        }
        if let Some(seed) = parse_var(&lookup, "MATMUL_SEED")? {
            config.seed = seed;
        }
        if let Some(epsilon) = parse_var(&lookup, "MATMUL_EPSILON")? {
            config.epsilon = epsilon;
        }
        if let Some(threads) = parse_var(&lookup, "MATMUL_THREADS")? {
            config.kernel.threads = Some(threads);
        }
        Ok(config)
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Env { var, value }),
    }
}
