//! The public entry point: a locally-varying 19-point operator bundled
//! with its lazily-factored IC(0) preconditioner.

use std::cell::OnceCell;

use ndarray::{Array2, Array3};

use crate::coeffs::CoefficientStore;
use crate::error::Result;
use crate::factor::Factors;
use crate::grid::GridShape;
use crate::trace::TraceSink;

/// A symmetric 19-point stencil operator on a regular 3-D grid, together
/// with an IC(0) preconditioner factored on first use and cached for the
/// lifetime of the filter.
///
/// The factor is never recomputed: a [`Filter`] is immutable once built, so
/// [`Filter::ensure_factors`] only ever runs the factorization once.
pub struct Filter {
    store: CoefficientStore,
    factors: OnceCell<Factors>,
    sink: TraceSink,
}

impl Filter {
    /// Takes ownership of a coefficient store. `trace` enables the
    /// factorizer's per-bias-attempt log lines.
    pub fn new(store: CoefficientStore, trace: bool) -> Self {
        Filter {
            store,
            factors: OnceCell::new(),
            sink: TraceSink::new(trace),
        }
    }

    pub fn shape(&self) -> GridShape {
        self.store.shape()
    }

    /// Direct application of the 19-point operator: `y = A*x`.
    pub fn apply(&self, x: &Array3<f64>, y: &mut Array3<f64>) -> Result<()> {
        crate::apply::apply(&self.store, x, y)
    }

    /// Runs the IC(0) factorization on first call and returns the cached
    /// factor on every subsequent call.
    pub fn ensure_factors(&self) -> Result<&Factors> {
        if let Some(f) = self.factors.get() {
            return Ok(f);
        }
        let f = crate::factor::factorize(&self.store, &self.sink)?;
        // OnceCell::set fails only if another call already populated it;
        // since `Filter` is not `Sync`-shared-then-mutated from here, that
        // cannot happen and the value we just computed is simply dropped.
        let _ = self.factors.set(f);
        Ok(self.factors.get().expect("just set"))
    }

    /// `y = L*D*L^T * x` from the cached factor, for verifying the
    /// factorization against the true operator.
    pub fn apply_approximate(&self, x: &Array3<f64>, y: &mut Array3<f64>) -> Result<()> {
        let factors = self.ensure_factors()?;
        crate::solve::apply_approximate(self.shape(), factors, x, y)
    }

    /// `x = (L*D*L^T)^-1 * b`, the preconditioner solve.
    pub fn apply_approximate_inverse(&self, b: &Array3<f64>, x: &mut Array3<f64>) -> Result<()> {
        let factors = self.ensure_factors()?;
        crate::solve::apply_approximate_inverse(self.shape(), factors, b, x)
    }

    /// The dense `n x n` matrix of the operator, for small grids.
    pub fn get_matrix(&self) -> Array2<f64> {
        crate::solve::get_matrix(&self.store)
    }
}
