//! Named kernels behind one calling convention.
//!
//! Every kernel reads A and B and adds A·B into C. The registry records,
//! per kernel, which layout of B it expects, which widths must divide N and
//! which instruction set it needs, and checks all of that in
//! [`Kernel::run`] before calling it.

use std::fmt;

use rayon::ThreadPoolBuilder;
use tracing::debug;
use wide::f32x4;

use crate::blocked::packed::{matmul_packed_simd, matmul_packed_simd_with};
use crate::blocked::packed_scalar::matmul_packed_scalar;
use crate::blocked::register::matmul_register_blocked;
use crate::config::{KernelConfig, Width};
use crate::error::{Error, Result};
use crate::kernels::avx2::{avx2_fma_available, matmul_packed_simd_avx2, matmul_transposed_simd_avx2};
use crate::kernels::dot::matmul_transposed_simd;
use crate::matrix::naive::matmul_baseline;
use crate::matrix::tiled::matmul_tiled;
use crate::matrix::transposed::matmul_transposed;
use crate::matrix::Matrix;
use crate::threaded::parallel::{matmul_parallel, matmul_parallel_transposed_simd};

/// The common kernel signature: `C += A · B`.
pub type KernelFn = fn(&Matrix, &Matrix, &mut Matrix, &KernelConfig);

/// Layout of B a kernel expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Natural,
    /// B must have been transposed in place before the call.
    Transposed,
}

impl Operand {
    pub fn is_transposed(self) -> bool {
        self == Operand::Transposed
    }

    fn describe(self) -> &'static str {
        match self {
            Operand::Natural => "in natural layout",
            Operand::Transposed => "transposed",
        }
    }
}

/// Instruction set a kernel is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Isa {
    /// Runs everywhere (`wide` picks the best build-time SIMD).
    Portable,
    /// Raw AVX2 + FMA intrinsics, x86-64 only.
    Avx2Fma,
}

impl Isa {
    pub fn is_available(self) -> bool {
        match self {
            Isa::Portable => true,
            Isa::Avx2Fma => avx2_fma_available(),
        }
    }
}

/// A registered kernel.
#[derive(Clone, Copy)]
pub struct Kernel {
    pub name: &'static str,
    pub operand: Operand,
    pub isa: Isa,
    /// Runs on a worker pool.
    pub parallel: bool,
    widths: &'static [Width],
    func: KernelFn,
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("name", &self.name)
            .field("operand", &self.operand)
            .field("isa", &self.isa)
            .field("parallel", &self.parallel)
            .finish()
    }
}

impl Kernel {
    /// Widths that must divide N for this kernel.
    pub fn widths(&self) -> &'static [Width] {
        self.widths
    }

    /// Whether the running CPU can execute this kernel natively.
    pub fn is_supported(&self) -> bool {
        self.isa.is_available()
    }

    /// Check the kernel's preconditions and add A·B into C.
    ///
    /// Fails without touching C if the sides differ, a width does not divide
    /// N, B's layout is not the one the kernel expects, or the CPU lacks the
    /// kernel's instruction set. When `cfg.threads` is set, parallel kernels
    /// run on a pool of exactly that many workers.
    pub fn run(&self, a: &Matrix, b: &Matrix, c: &mut Matrix, cfg: &KernelConfig) -> Result<()> {
        let n = a.n();
        if b.n() != n || c.n() != n {
            return Err(Error::SizeMismatch {
                a: n,
                b: b.n(),
                c: c.n(),
            });
        }
        cfg.check(n, self.widths)?;
        if b.is_transposed() != self.operand.is_transposed() {
            return Err(Error::OperandLayout {
                kernel: self.name,
                expected: self.operand.describe(),
            });
        }
        if !self.is_supported() {
            return Err(Error::UnsupportedCpu {
                kernel: self.name,
                feature: "avx2+fma",
            });
        }

        debug!(
            kernel = self.name,
            n,
            operand = ?self.operand,
            threads = ?cfg.threads,
            "running kernel"
        );

        match cfg.threads {
            Some(threads) if self.parallel => {
                let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
                pool.install(|| (self.func)(a, b, c, cfg));
            }
            _ => (self.func)(a, b, c, cfg),
        }
        Ok(())
    }
}

const fn kernel(
    name: &'static str,
    operand: Operand,
    widths: &'static [Width],
    func: KernelFn,
) -> Kernel {
    Kernel {
        name,
        operand,
        isa: Isa::Portable,
        parallel: false,
        widths,
        func,
    }
}

const fn avx2(mut k: Kernel) -> Kernel {
    k.isa = Isa::Avx2Fma;
    k
}

const fn parallel(mut k: Kernel) -> Kernel {
    k.parallel = true;
    k
}

use Operand::{Natural, Transposed};

static KERNELS: [Kernel; 12] = [
    kernel("baseline", Natural, &[], matmul_baseline),
    kernel("tiled", Natural, &[Width::Block], matmul_tiled),
    kernel("transposed", Transposed, &[], matmul_transposed),
    kernel(
        "transposed_simd",
        Transposed,
        &[Width::Lanes(8)],
        matmul_transposed_simd,
    ),
    avx2(kernel(
        "transposed_simd_avx2",
        Transposed,
        &[Width::Lanes(8)],
        matmul_transposed_simd_avx2,
    )),
    kernel(
        "register_blocked",
        Natural,
        &[Width::RegisterTile],
        matmul_register_blocked,
    ),
    kernel("packed_scalar", Natural, &[Width::Pack], matmul_packed_scalar),
    kernel(
        "packed_simd",
        Natural,
        &[Width::Lanes(8), Width::Pack],
        matmul_packed_simd,
    ),
    kernel(
        "packed_simd_x4",
        Natural,
        &[Width::Lanes(4), Width::Pack],
        matmul_packed_simd_with::<f32x4>,
    ),
    avx2(kernel(
        "packed_simd_avx2",
        Natural,
        &[Width::Lanes(8), Width::Pack],
        matmul_packed_simd_avx2,
    )),
    parallel(kernel("parallel", Natural, &[Width::Block], matmul_parallel)),
    parallel(kernel(
        "parallel_transposed_simd",
        Transposed,
        &[Width::Lanes(8), Width::Block],
        matmul_parallel_transposed_simd,
    )),
];

/// Every kernel, in benchmark order. The first one is the reference.
pub fn kernels() -> &'static [Kernel] {
    &KERNELS
}

/// Look a kernel up by name.
pub fn find(name: &str) -> Result<&'static Kernel> {
    KERNELS
        .iter()
        .find(|k| k.name == name)
        .ok_or_else(|| Error::UnknownKernel(name.to_string()))
}
