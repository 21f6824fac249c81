//! IC(0) factorization: an in-place, no-fill incomplete Cholesky factor
//! sharing the 19-point stencil's footprint, with an adaptive diagonal-bias
//! retry loop for coefficients that are not diagonally dominant enough for
//! a bias of zero to succeed.

use ndarray::Array3;

use crate::coeffs::CoefficientStore;
use crate::error::{Error, Result};
use crate::grid::GridShape;
use crate::stencil::{compose, Offset, OFFSETS, OFFSET_COUNT};
use crate::trace::{trace, TraceSink};

/// A unit-lower-triangular factor `L` (diagonal implicit) and its
/// companion diagonal `D`, stored inverted as `d000 = 1/D`, sharing the
/// stencil's footprint: `off[d.index()][p]` is the entry `L(p + d, p)`.
#[derive(Debug, Clone)]
pub struct Factors {
    d000: Array3<f64>,
    off: [Array3<f64>; OFFSET_COUNT],
}

impl Factors {
    pub fn inverse_diag(&self) -> &Array3<f64> {
        &self.d000
    }

    pub fn off_diag(&self, offset: Offset) -> &Array3<f64> {
        &self.off[offset.index()]
    }
}

/// Runs the adaptive outer loop described in the factorizer contract:
/// starting from the coefficient store's own bias, doubles the bias
/// (floored at 0.001, or at the stored bias if it was already positive)
/// until an attempt succeeds or the bias reaches 1000, at which point
/// factorization is declared to have failed.
pub fn factorize(store: &CoefficientStore, sink: &TraceSink) -> Result<Factors> {
    let b0 = store.bias().max(0.0);
    let b_min = if store.bias() > 0.0 { store.bias() } else { 0.001 };

    let mut b = b0;
    loop {
        match attempt(store, b) {
            Some(factors) => {
                trace!(sink, "IC(0) factorization succeeded for bias={}", b);
                return Ok(factors);
            }
            None => {
                trace!(sink, "IC(0) factorization failed for bias={}", b);
            }
        }
        if b >= 1000.0 {
            return Err(Error::FactorizationFailure { max_bias: b });
        }
        b = (2.0 * b).max(b_min);
    }
}

/// A single IC(0) attempt at a fixed bias. Returns `None` (a "numeric
/// underflow") as soon as a non-positive pivot is produced; the caller
/// (the adaptive loop above) is responsible for retrying with a larger
/// bias.
fn attempt(store: &CoefficientStore, bias: f64) -> Option<Factors> {
    let shape = store.shape();

    let mut d000 = store.diag().clone();
    crate::grid::array::scale(&mut d000, 1.0 + bias);
    let mut off: [Array3<f64>; OFFSET_COUNT] = store.off_array().clone();

    for (i3, i2, i1) in shape.iter_lex() {
        let interior = shape.is_interior(i3, i2, i1);

        let mut l000 = d000[[i3, i2, i1]];
        for o1 in OFFSETS {
            let Some((q3, q2, q1)) = predecessor(shape, (i3, i2, i1), o1, interior) else {
                continue;
            };
            let l_o1 = off[o1.index()][[q3, q2, q1]];
            l000 -= d000[[q3, q2, q1]] * l_o1 * l_o1;
        }
        if l000 <= 0.0 {
            return None;
        }
        // Store the inverse pivot immediately: later points in this same
        // ascending sweep need d000[q] = 1/D[q] for q = this point, and the
        // final elementwise normalization pass reads d000 again too.
        d000[[i3, i2, i1]] = 1.0 / l000;

        for d in OFFSETS {
            let mut l_d = off[d.index()][[i3, i2, i1]];
            for o1 in OFFSETS {
                let Some(o2) = compose(o1, d) else { continue };
                let Some((q3, q2, q1)) = predecessor(shape, (i3, i2, i1), o1, interior) else {
                    continue;
                };
                let l_o1 = off[o1.index()][[q3, q2, q1]];
                let l_o2 = off[o2.index()][[q3, q2, q1]];
                l_d -= d000[[q3, q2, q1]] * l_o1 * l_o2;
            }
            off[d.index()][[i3, i2, i1]] = l_d;
        }
    }

    for a in off.iter_mut() {
        *a *= &d000;
    }

    Some(Factors { d000, off })
}

/// The predecessor point `p - offset`, if it lies in the grid. `interior`
/// lets the caller skip the bounds test on the fast path.
#[inline]
fn predecessor(
    shape: GridShape,
    (i3, i2, i1): (usize, usize, usize),
    offset: Offset,
    interior: bool,
) -> Option<(usize, usize, usize)> {
    let (d3, d2, d1) = offset.delta();
    if interior {
        return Some(((i3 as isize - d3) as usize, (i2 as isize - d2) as usize, (i1 as isize - d1) as usize));
    }
    let (q3, q2, q1) = (i3 as isize - d3, i2 as isize - d2, i1 as isize - d1);
    if shape.in_bounds(q3, q2, q1) {
        Some((q3 as usize, q2 as usize, q1 as usize))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridShape;

    fn laplacian_like(shape: GridShape, diag: f64) -> CoefficientStore {
        let mut s000 = shape.zeros();
        s000.fill(diag);
        let off = std::array::from_fn(|_| {
            let mut a = shape.zeros();
            a.fill(-1.0);
            a
        });
        CoefficientStore::new(shape, s000, off, 0.0).unwrap()
    }

    #[test]
    fn diagonally_dominant_succeeds_at_zero_bias() {
        let shape = GridShape::new(5, 4, 3);
        let store = laplacian_like(shape, 19.0);
        let sink = TraceSink::new(false);
        let factors = factorize(&store, &sink).unwrap();
        for (i3, i2, i1) in shape.iter_lex() {
            assert!(factors.inverse_diag()[[i3, i2, i1]] > 0.0);
        }
    }

    #[test]
    fn bias_monotonicity() {
        // S3: near-singular matrix whose bias-0 attempt fails but which
        // succeeds once the bias is raised enough; any larger bias must
        // also succeed (property 7 in the testable-properties list).
        let shape = GridShape::new(3, 3, 3);
        let store = laplacian_like(shape, 6.01);
        assert!(attempt(&store, 0.0).is_none());
        let mut b = 0.001;
        while attempt(&store, b).is_none() {
            b *= 2.0;
            assert!(b < 1000.0, "expected S3 to succeed well before the retry ceiling");
        }
        assert!(attempt(&store, b * 2.0).is_some());
        assert!(attempt(&store, 1000.0).is_some());
    }
}
