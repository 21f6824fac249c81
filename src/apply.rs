//! The forward stencil applier: `y = A*x` for the 19-point operator
//! encoded by a [`CoefficientStore`].

use ndarray::Array3;

use crate::coeffs::CoefficientStore;
use crate::error::{Error, Result};
use crate::grid::GridShape;
use crate::stencil::OFFSETS;

fn check_buffers(shape: GridShape, x: &Array3<f64>, y: &Array3<f64>) -> Result<()> {
    let expected = shape.dim();
    if x.dim() != expected {
        return Err(Error::ShapeMismatch {
            expected,
            actual: x.dim(),
        });
    }
    if y.dim() != expected {
        return Err(Error::ShapeMismatch {
            expected,
            actual: y.dim(),
        });
    }
    if std::ptr::eq(x.as_ptr(), y.as_ptr()) {
        return Err(Error::AliasedBuffers);
    }
    Ok(())
}

/// Computes `y = A*x` where `A` is the 19-point operator encoded by `store`.
///
/// Traverses the grid in descending lexicographic (i3, i2, i1) order and,
/// for each point `p`, initializes `y[p]` exactly once to `s000[p]*x[p]`
/// before scattering `s_d[p]*x[p]` into `y[p+d]` for each stored offset
/// `d` (by that point in the descending sweep, `y[p+d]`, with `p+d`
/// lexicographically greater than `p`, has already been initialized).
pub fn apply(store: &CoefficientStore, x: &Array3<f64>, y: &mut Array3<f64>) -> Result<()> {
    let shape = store.shape();
    check_buffers(shape, x, y)?;

    let diag = store.diag();
    let off = store.off_array();

    for (i3, i2, i1) in shape.iter_lex_rev() {
        y[[i3, i2, i1]] = diag[[i3, i2, i1]] * x[[i3, i2, i1]];

        if shape.is_interior(i3, i2, i1) {
            for (offset, coeffs) in OFFSETS.iter().zip(off.iter()) {
                let (d3, d2, d1) = offset.delta();
                let (j3, j2, j1) = (
                    (i3 as isize + d3) as usize,
                    (i2 as isize + d2) as usize,
                    (i1 as isize + d1) as usize,
                );
                let c = coeffs[[i3, i2, i1]];
                y[[i3, i2, i1]] += c * x[[j3, j2, j1]];
                y[[j3, j2, j1]] += c * x[[i3, i2, i1]];
            }
        } else {
            for (offset, coeffs) in OFFSETS.iter().zip(off.iter()) {
                let (d3, d2, d1) = offset.delta();
                let (n3, n2, n1) = (i3 as isize + d3, i2 as isize + d2, i1 as isize + d1);
                if !shape.in_bounds(n3, n2, n1) {
                    continue;
                }
                let (j3, j2, j1) = (n3 as usize, n2 as usize, n1 as usize);
                let c = coeffs[[i3, i2, i1]];
                y[[i3, i2, i1]] += c * x[[j3, j2, j1]];
                y[[j3, j2, j1]] += c * x[[i3, i2, i1]];
            }
        }
    }

    Ok(())
}
