//! The 19-point stencil pattern, reduced by symmetry to the center plus
//! nine "upper half" offsets (those with (d3, d2, d1) >= (0, 0, 0) in
//! lexicographic order). The full 19-point pattern is this set together
//! with its nine negations.

/// One of the nine non-trivial offsets stored by the coefficient and
/// factor arrays. Named after the (d3, d2, d1) legend used throughout the
/// crate: `m` = -1, `0` = 0, `p` = +1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offset {
    S00p,
    S0pm,
    S0p0,
    S0pp,
    Spm0,
    Sp0m,
    Sp00,
    Sp0p,
    Spp0,
}

pub const OFFSET_COUNT: usize = 9;

/// The nine stored offsets, in the canonical order used to index the
/// `[Offset; 9]` arrays in [`crate::coeffs::CoefficientStore`] and
/// [`crate::factor::Factors`].
pub const OFFSETS: [Offset; OFFSET_COUNT] = [
    Offset::S00p,
    Offset::S0pm,
    Offset::S0p0,
    Offset::S0pp,
    Offset::Spm0,
    Offset::Sp0m,
    Offset::Sp00,
    Offset::Sp0p,
    Offset::Spp0,
];

impl Offset {
    /// Delta in (d3, d2, d1) order.
    #[inline]
    pub const fn delta(self) -> (isize, isize, isize) {
        match self {
            Offset::S00p => (0, 0, 1),
            Offset::S0pm => (0, 1, -1),
            Offset::S0p0 => (0, 1, 0),
            Offset::S0pp => (0, 1, 1),
            Offset::Spm0 => (1, -1, 0),
            Offset::Sp0m => (1, 0, -1),
            Offset::Sp00 => (1, 0, 0),
            Offset::Sp0p => (1, 0, 1),
            Offset::Spp0 => (1, 1, 0),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Offset::S00p => "s00p",
            Offset::S0pm => "s0pm",
            Offset::S0p0 => "s0p0",
            Offset::S0pp => "s0pp",
            Offset::Spm0 => "spm0",
            Offset::Sp0m => "sp0m",
            Offset::Sp00 => "sp00",
            Offset::Sp0p => "sp0p",
            Offset::Spp0 => "spp0",
        }
    }

    fn from_delta(delta: (isize, isize, isize)) -> Option<Offset> {
        OFFSETS.into_iter().find(|o| o.delta() == delta)
    }

    /// Position of this offset in [`OFFSETS`], i.e. the index into the
    /// `[Array3<f64>; 9]` off-diagonal arrays.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Offset::S00p => 0,
            Offset::S0pm => 1,
            Offset::S0p0 => 2,
            Offset::S0pp => 3,
            Offset::Spm0 => 4,
            Offset::Sp0m => 5,
            Offset::Sp00 => 6,
            Offset::Sp0p => 7,
            Offset::Spp0 => 8,
        }
    }
}

/// Vector sum of two stored offsets, resolved back to a stored offset if
/// the sum lands on one of the nine stencil directions, else `None`
/// (the IC(0) sparsity test used throughout the factorizer: "does the
/// pattern intersect here").
#[inline]
pub fn compose(a: Offset, b: Offset) -> Option<Offset> {
    let (a3, a2, a1) = a.delta();
    let (b3, b2, b1) = b.delta();
    Offset::from_delta((a3 + b3, a2 + b2, a1 + b1))
}
