//! A symmetric, locally-varying 19-point stencil operator on regular 3-D
//! grids, with an IC(0) (incomplete Cholesky, zero fill-in) preconditioner
//! and its triangular solver.
//!
//! The public surface is [`Filter`]: build one from a [`CoefficientStore`],
//! then call [`Filter::apply`] for the direct operator or
//! [`Filter::apply_approximate_inverse`] for the preconditioner solve. The
//! IC(0) factor is computed lazily on first use and cached for the
//! filter's lifetime.

pub mod apply;
pub mod coeffs;
pub mod error;
pub mod factor;
pub mod filter;
pub mod grid;
pub mod solve;
pub mod stencil;
pub mod trace;

pub use coeffs::CoefficientStore;
pub use error::{Error, Result};
pub use factor::Factors;
pub use filter::Filter;
pub use grid::GridShape;
pub use stencil::{Offset, OFFSETS, OFFSET_COUNT};
