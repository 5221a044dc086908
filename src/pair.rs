//! A single particle-particle interaction (spec.md §3 "Pair").

use crate::vector::Vec2;

/// One unordered interaction between flat-array indices `i` and `j` (`i != j`).
/// Indices only, never back-references to particle records (spec.md §9
/// "Raw pointer aliasing" — pairs are re-resolved against the flat array).
#[derive(Debug, Clone, Copy)]
pub struct Pair {
    pub i: usize,
    pub j: usize,
    pub r: f64,
    pub q: f64,
    pub w: f64,
    pub grad: Vec2,
}

impl Pair {
    pub fn new(i: usize, j: usize, r: f64, q: f64) -> Self {
        Self {
            i,
            j,
            r,
            q,
            w: 0.0,
            grad: Vec2::ZERO,
        }
    }
}
