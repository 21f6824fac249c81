//! Error taxonomy for the stencil kernel.

use thiserror::Error;

pub type Result<T> = ::std::result::Result<T, Error>;

/// Master error type of this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Shape mismatch between coefficient arrays, or between an apply/solve
    /// input and output field.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },

    /// The input and output buffer passed to an apply/solve operation alias
    /// each other; the contract requires distinct buffers.
    #[error("input and output buffers must be distinct")]
    AliasedBuffers,

    /// A bias was supplied or computed as negative.
    #[error("bias must be non-negative, got {bias}")]
    NegativeBias { bias: f64 },

    /// IC(0) could not be completed for any bias in the retry range.
    /// Non-recoverable for the current coefficients: the caller may retry
    /// with a larger initial bias, modified coefficients, or a different
    /// preconditioner.
    #[error("IC(0) factorization failed for every bias up to {max_bias}")]
    FactorizationFailure { max_bias: f64 },
}
