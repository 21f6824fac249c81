//! The triangular solver: verification application of the factored
//! operator `L*D*L^T`, the approximate-inverse solve built from it, and the
//! dense-matrix projection used for small-grid visualization and tests.

use ndarray::{Array2, Array3};

use crate::coeffs::CoefficientStore;
use crate::error::{Error, Result};
use crate::factor::Factors;
use crate::grid::GridShape;
use crate::stencil::OFFSETS;

fn check_buffers(shape: GridShape, a: &Array3<f64>, b: &Array3<f64>) -> Result<()> {
    let expected = shape.dim();
    if a.dim() != expected {
        return Err(Error::ShapeMismatch {
            expected,
            actual: a.dim(),
        });
    }
    if b.dim() != expected {
        return Err(Error::ShapeMismatch {
            expected,
            actual: b.dim(),
        });
    }
    if std::ptr::eq(a.as_ptr(), b.as_ptr()) {
        return Err(Error::AliasedBuffers);
    }
    Ok(())
}

/// `y := L*D*L^T * x`, computed from the cached factor. Used to verify the
/// factorization against the true operator; not the fast path for solving.
pub fn apply_approximate(shape: GridShape, factors: &Factors, x: &Array3<f64>, y: &mut Array3<f64>) -> Result<()> {
    check_buffers(shape, x, y)?;

    let d000 = factors.inverse_diag();

    // Forward gather: y <- L^T * x. Order is irrelevant since every term
    // reads only from x.
    for (i3, i2, i1) in shape.iter_lex() {
        let mut acc = x[[i3, i2, i1]];
        for offset in OFFSETS {
            let (d3, d2, d1) = offset.delta();
            let (n3, n2, n1) = (i3 as isize + d3, i2 as isize + d2, i1 as isize + d1);
            if !shape.in_bounds(n3, n2, n1) {
                continue;
            }
            let (j3, j2, j1) = (n3 as usize, n2 as usize, n1 as usize);
            acc += factors.off_diag(offset)[[i3, i2, i1]] * x[[j3, j2, j1]];
        }
        y[[i3, i2, i1]] = acc;
    }

    // Reverse scatter: y <- L*D*y, descending so that by the time a point
    // scatters into p+d, p+d's own D-scaled self term is already in place.
    for (i3, i2, i1) in shape.iter_lex_rev() {
        y[[i3, i2, i1]] /= d000[[i3, i2, i1]];
        let self_val = y[[i3, i2, i1]];
        for offset in OFFSETS {
            let (d3, d2, d1) = offset.delta();
            let (n3, n2, n1) = (i3 as isize + d3, i2 as isize + d2, i1 as isize + d1);
            if !shape.in_bounds(n3, n2, n1) {
                continue;
            }
            let (j3, j2, j1) = (n3 as usize, n2 as usize, n1 as usize);
            y[[j3, j2, j1]] += factors.off_diag(offset)[[i3, i2, i1]] * self_val;
        }
    }

    Ok(())
}

/// `x := (L*D*L^T)^-1 * b`, the approximate inverse. Forward substitution
/// followed by a combined diagonal-and-backward solve.
pub fn apply_approximate_inverse(shape: GridShape, factors: &Factors, b: &Array3<f64>, x: &mut Array3<f64>) -> Result<()> {
    check_buffers(shape, b, x)?;

    crate::grid::array::zero(x);
    let d000 = factors.inverse_diag();

    // Forward substitution L*z = b, ascending: z[p] is finalized the moment
    // we reach p (any scatter from q < p has already landed), so we can add
    // b[p] in place and immediately scatter onward.
    for (i3, i2, i1) in shape.iter_lex() {
        x[[i3, i2, i1]] += b[[i3, i2, i1]];
        let z = x[[i3, i2, i1]];
        for offset in OFFSETS {
            let (d3, d2, d1) = offset.delta();
            let (n3, n2, n1) = (i3 as isize + d3, i2 as isize + d2, i1 as isize + d1);
            if !shape.in_bounds(n3, n2, n1) {
                continue;
            }
            let (j3, j2, j1) = (n3 as usize, n2 as usize, n1 as usize);
            x[[j3, j2, j1]] -= factors.off_diag(offset)[[i3, i2, i1]] * z;
        }
    }

    // Combined D*y = z, L^T*x = y, descending: every forward neighbor p+d
    // has already been finalized by the time we gather from it.
    for (i3, i2, i1) in shape.iter_lex_rev() {
        let mut acc = d000[[i3, i2, i1]] * x[[i3, i2, i1]];
        for offset in OFFSETS {
            let (d3, d2, d1) = offset.delta();
            let (n3, n2, n1) = (i3 as isize + d3, i2 as isize + d2, i1 as isize + d1);
            if !shape.in_bounds(n3, n2, n1) {
                continue;
            }
            let (j3, j2, j1) = (n3 as usize, n2 as usize, n1 as usize);
            acc -= factors.off_diag(offset)[[i3, i2, i1]] * x[[j3, j2, j1]];
        }
        x[[i3, i2, i1]] = acc;
    }

    Ok(())
}

/// Materializes the full `n x n` dense matrix for a grid small enough to
/// fit in memory. For visualization and correctness tests only.
pub fn get_matrix(store: &CoefficientStore) -> Array2<f64> {
    let shape = store.shape();
    let n = shape.len();
    let mut m = Array2::zeros((n, n));

    let index: Vec<(usize, usize, usize)> = shape.iter_lex().collect();
    let linear = |i3: usize, i2: usize, i1: usize| i1 + shape.n1 * i2 + shape.n1 * shape.n2 * i3;

    for (row, &(i3, i2, i1)) in index.iter().enumerate() {
        m[[row, row]] = store.diag()[[i3, i2, i1]];
        for offset in OFFSETS {
            let (d3, d2, d1) = offset.delta();
            let (n3, n2, n1) = (i3 as isize + d3, i2 as isize + d2, i1 as isize + d1);
            if !shape.in_bounds(n3, n2, n1) {
                continue;
            }
            let col = linear(n3 as usize, n2 as usize, n1 as usize);
            let c = store.off_diag(offset)[[i3, i2, i1]];
            m[[row, col]] = c;
            m[[col, row]] = c;
        }
    }

    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridShape;

    fn laplacian_like(shape: GridShape) -> CoefficientStore {
        let mut s000 = shape.zeros();
        s000.fill(19.0);
        let off = std::array::from_fn(|_| {
            let mut a = shape.zeros();
            a.fill(-1.0);
            a
        });
        CoefficientStore::new(shape, s000, off, 0.0).unwrap()
    }

    #[test]
    fn get_matrix_is_symmetric() {
        let shape = GridShape::new(3, 2, 2);
        let store = laplacian_like(shape);
        let m = get_matrix(&store);
        assert_eq!(m, m.t());
    }

    #[test]
    fn approximate_inverse_is_mutual_inverse_of_approximate_apply() {
        let shape = GridShape::new(5, 4, 3);
        let store = laplacian_like(shape);
        let sink = crate::trace::TraceSink::new(false);
        let factors = crate::factor::factorize(&store, &sink).unwrap();

        let mut x = shape.zeros();
        let mut seed = 7u64;
        for v in x.iter_mut() {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            *v = ((seed >> 33) as f64 / u32::MAX as f64) - 0.5;
        }

        let mut y = shape.zeros();
        apply_approximate(shape, &factors, &x, &mut y).unwrap();
        let mut x_back = shape.zeros();
        apply_approximate_inverse(shape, &factors, &y, &mut x_back).unwrap();
        for (a, b) in x.iter().zip(x_back.iter()) {
            assert!((a - b).abs() < 1e-9);
        }

        let mut b = shape.zeros();
        for v in b.iter_mut() {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            *v = ((seed >> 33) as f64 / u32::MAX as f64) - 0.5;
        }
        let mut z = shape.zeros();
        apply_approximate_inverse(shape, &factors, &b, &mut z).unwrap();
        let mut b_back = shape.zeros();
        apply_approximate(shape, &factors, &z, &mut b_back).unwrap();
        for (a, c) in b.iter().zip(b_back.iter()) {
            assert!((a - c).abs() < 1e-9);
        }
    }
}
