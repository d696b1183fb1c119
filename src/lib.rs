// polar_mk Core Library
//
// This library contains a generalized (multi-kernel) polar-code encoder,
// its GF(2) matrix utilities and frozen-bit bookkeeping, plus configuration
// loading and command line options, consolidated into a single crate.

pub mod app_config;
pub mod cli;
pub mod error;
pub mod polar;

pub use app_config::PolarConfig;
pub use error::{PolarError, PolarResult};
pub use polar::{BitMatrix, Encoder, FrozenBitObserver, FrozenBits, PolarMkEncoder};
