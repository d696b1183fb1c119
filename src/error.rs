use thiserror::Error;

/// Errors raised while building or configuring a polar encoder.
///
/// Every construction-time check maps to one variant carrying the offending
/// parameter together with the expected and actual values. Once an encoder
/// has been built, encoding a correctly sized buffer cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolarError {
    #[error("length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("frozen bits leave {actual} information positions, expected K = {expected}")]
    InfoCountMismatch { expected: usize, actual: usize },
    #[error("N = {n} is not a power of the kernel size {kernel_size}")]
    NotAPowerOfKernelSize { n: usize, kernel_size: usize },
    #[error("kernel row {row} has {actual} entries, expected {expected}")]
    NonSquareKernel {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("kernel size must be at least 2, got {size}")]
    KernelTooSmall { size: usize },
    #[error("invalid bit in {what} at index {index}: {value:?}")]
    InvalidBit {
        what: &'static str,
        index: usize,
        value: char,
    },
    #[error("{name} must be greater than 0")]
    ZeroParameter { name: &'static str },
    #[error("information position {position} is out of range for N = {n}")]
    PositionOutOfRange { position: usize, n: usize },
    #[error("kernel matrix has no inverse over GF(2)")]
    SingularKernel,
    #[error("config error: {0}")]
    Config(String),
}

pub type PolarResult<T> = Result<T, PolarError>;

impl From<&'static str> for PolarError {
    fn from(s: &'static str) -> Self {
        PolarError::Config(s.to_string())
    }
}

impl From<String> for PolarError {
    fn from(s: String) -> Self {
        PolarError::Config(s)
    }
}
