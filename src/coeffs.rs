//! The coefficient store: the ten reduced arrays of a locally varying,
//! symmetric 19-point operator, plus the scalar diagonal bias.

use ndarray::Array3;

use crate::error::{Error, Result};
use crate::grid::GridShape;
use crate::stencil::{Offset, OFFSET_COUNT};

/// Owns the ten `[n3][n2][n1]` coefficient arrays of a 19-point operator
/// reduced by symmetry, plus a non-negative diagonal bias.
///
/// Treated as read-only by every other component in the crate; the caller
/// warrants that the encoded operator is symmetric and, for exact
/// factorization, positive-definite.
#[derive(Debug, Clone)]
pub struct CoefficientStore {
    shape: GridShape,
    s000: Array3<f64>,
    off: [Array3<f64>; OFFSET_COUNT],
    bias: f64,
}

impl CoefficientStore {
    /// Takes ownership of the ten coefficient arrays (`s000` plus the nine
    /// off-diagonal arrays, in [`crate::stencil::OFFSETS`] order) and a
    /// non-negative scalar bias.
    pub fn new(shape: GridShape, s000: Array3<f64>, off: [Array3<f64>; OFFSET_COUNT], bias: f64) -> Result<Self> {
        if bias < 0.0 {
            return Err(Error::NegativeBias { bias });
        }
        let expected = shape.dim();
        if s000.dim() != expected {
            return Err(Error::ShapeMismatch {
                expected,
                actual: s000.dim(),
            });
        }
        for a in &off {
            if a.dim() != expected {
                return Err(Error::ShapeMismatch {
                    expected,
                    actual: a.dim(),
                });
            }
        }
        Ok(CoefficientStore { shape, s000, off, bias })
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    #[inline]
    pub fn diag(&self) -> &Array3<f64> {
        &self.s000
    }

    #[inline]
    pub fn off_diag(&self, offset: Offset) -> &Array3<f64> {
        &self.off[offset.index()]
    }

    pub(crate) fn off_array(&self) -> &[Array3<f64>; OFFSET_COUNT] {
        &self.off
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_bias() {
        let shape = GridShape::new(2, 2, 2);
        let off = std::array::from_fn(|_| shape.zeros());
        let err = CoefficientStore::new(shape, shape.zeros(), off, -1.0).unwrap_err();
        assert!(matches!(err, Error::NegativeBias { .. }));
    }

    #[test]
    fn rejects_shape_mismatch() {
        let shape = GridShape::new(2, 2, 2);
        let wrong = GridShape::new(3, 2, 2).zeros();
        let off = std::array::from_fn(|_| shape.zeros());
        let err = CoefficientStore::new(shape, wrong, off, 0.0).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }
}
