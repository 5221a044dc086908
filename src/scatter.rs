//! Per-thread shadow-accumulator reduction for pair-stencil scatter.
//!
//! spec.md §9 ranks three strategies for the scatter that a pair loop does
//! into per-particle accumulators, with shadow accumulators reduced after the
//! loop as the top choice. `rayon`'s `fold`/`reduce` gives that directly
//! without hand-rolled atomics.

use rayon::prelude::*;

use crate::pair::Pair;
use crate::vector::Vec2;

/// Accumulate a scalar contribution from every pair into a length-`n` vector.
/// `contribute(pair, acc)` should add into `acc[pair.i]` and/or `acc[pair.j]`.
pub fn scatter_scalar(n: usize, pairs: &[Pair], contribute: impl Fn(&Pair, &mut [f64]) + Sync) -> Vec<f64> {
    pairs
        .par_iter()
        .fold(
            || vec![0.0_f64; n],
            |mut acc, pair| {
                contribute(pair, &mut acc);
                acc
            },
        )
        .reduce(
            || vec![0.0_f64; n],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b.iter()) {
                    *x += y;
                }
                a
            },
        )
}

/// As `scatter_scalar`, but accumulating `Vec2`s (used by the internal-force
/// stencil).
pub fn scatter_vec2(n: usize, pairs: &[Pair], contribute: impl Fn(&Pair, &mut [Vec2]) + Sync) -> Vec<Vec2> {
    pairs
        .par_iter()
        .fold(
            || vec![Vec2::ZERO; n],
            |mut acc, pair| {
                contribute(pair, &mut acc);
                acc
            },
        )
        .reduce(
            || vec![Vec2::ZERO; n],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b.iter()) {
                    *x += *y;
                }
                a
            },
        )
}

/// As `scatter_scalar`, for integer neighbor counts.
pub fn scatter_count(n: usize, pairs: &[Pair], contribute: impl Fn(&Pair, &mut [u32]) + Sync) -> Vec<u32> {
    pairs
        .par_iter()
        .fold(
            || vec![0_u32; n],
            |mut acc, pair| {
                contribute(pair, &mut acc);
                acc
            },
        )
        .reduce(
            || vec![0_u32; n],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b.iter()) {
                    *x += y;
                }
                a
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_scatter_sums_both_endpoints() {
        let pairs = vec![Pair::new(0, 1, 1.0, 1.0), Pair::new(1, 2, 1.0, 1.0)];
        let acc = scatter_scalar(3, &pairs, |p, acc| {
            acc[p.i] += 1.0;
            acc[p.j] += 1.0;
        });
        assert_eq!(acc, vec![1.0, 2.0, 1.0]);
    }
}
