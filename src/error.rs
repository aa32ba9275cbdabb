//! Error types for kernel selection, configuration and validation.
//!
//! The kernels themselves never fail. Everything here is raised before a
//! kernel runs (bad widths, wrong operand layout, unknown name) or after it
//! returns (the validator found a mismatch).

use thiserror::Error;

/// A kernel width that does not fit the matrix it is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A width of zero was configured.
    #[error("{what} width must be non-zero")]
    ZeroWidth { what: &'static str },

    /// N is not an exact multiple of one of the widths the kernel uses.
    #[error("matrix side {n} is not a multiple of the {what} width {width}")]
    NotDivisible {
        n: usize,
        what: &'static str,
        width: usize,
    },

    /// The pack width does not fit the stack scratch of the packed kernels.
    #[error("pack width {width} exceeds the maximum of {max}")]
    PackWidthTooLarge { width: usize, max: usize },

    /// A worker count of zero was configured.
    #[error("thread count must be non-zero")]
    ZeroThreads,
}

/// First element where a kernel's output differs from the reference.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("answer does not match: difference {diff:.6} at ({row}, {col}), expected {expected}, got {actual}")]
pub struct Mismatch {
    pub row: usize,
    pub col: usize,
    pub expected: f32,
    pub actual: f32,
    pub diff: f32,
}

/// Errors surfaced by the registry and the benchmark harness.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid kernel configuration for this matrix size.
    #[error("invalid kernel configuration: {0}")]
    Config(#[from] ConfigError),

    /// No kernel is registered under this name.
    #[error("unknown kernel: {0}")]
    UnknownKernel(String),

    /// A, B and C do not share the same side length.
    #[error("matrix sides differ: a={a}, b={b}, c={c}")]
    SizeMismatch { a: usize, b: usize, c: usize },

    /// B is (or is not) transposed, contrary to what the kernel expects.
    #[error("kernel {kernel} expects B {expected}")]
    OperandLayout {
        kernel: &'static str,
        expected: &'static str,
    },

    /// The CPU lacks the instruction set a kernel was compiled for.
    #[error("kernel {kernel} needs {feature}, which this CPU does not support")]
    UnsupportedCpu {
        kernel: &'static str,
        feature: &'static str,
    },

    /// The worker pool for a parallel kernel could not be built.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// An environment override could not be parsed.
    #[error("invalid value {value:?} for {var}")]
    Env { var: &'static str, value: String },

    /// A kernel produced a wrong answer.
    #[error("kernel {kernel} failed validation: {mismatch}")]
    Validation {
        kernel: &'static str,
        #[source]
        mismatch: Mismatch,
    },
}

/// Result type for registry and harness operations.
pub type Result<T> = std::result::Result<T, Error>;
