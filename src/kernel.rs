//! Quintic spline kernel and its gradient (spec.md §4.1).

use std::f64::consts::PI;

use crate::vector::Vec2;

/// Evaluate the kernel weight `w(q)` and gradient `grad w` for one pair.
///
/// `delta` is `x_i - x_j` (the canonical direction, spec.md §3 Invariant 5),
/// `r` is its length, `h` the (shared) smoothing length.
pub fn kernel_and_gradient(delta: Vec2, r: f64, h: f64) -> (f64, Vec2) {
    let q = r / h;
    if q > 3.0 {
        return (0.0, Vec2::ZERO);
    }
    let factor = 7.0 / (478.0 * PI * h * h);
    let w = if q <= 1.0 {
        factor * ((3.0 - q).powi(5) - 6.0 * (2.0 - q).powi(5) + 15.0 * (1.0 - q).powi(5))
    } else if q <= 2.0 {
        factor * ((3.0 - q).powi(5) - 6.0 * (2.0 - q).powi(5))
    } else {
        factor * (3.0 - q).powi(5)
    };
    let grad = if q == 0.0 {
        Vec2::ZERO
    } else if q <= 1.0 {
        delta * (factor / (h * h) * (-120.0 + 120.0 * q * q - 50.0 * q.powi(3)))
    } else if q <= 2.0 {
        (delta / r) * (factor / h * (-5.0 * (3.0 - q).powi(4) + 30.0 * (2.0 - q).powi(4)))
    } else {
        (delta / r) * (factor / h * (-5.0 * (3.0 - q).powi(4)))
    };
    (w, grad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vanishes_beyond_support() {
        let (w, grad) = kernel_and_gradient(Vec2::new(10.0, 0.0), 10.0, 0.02);
        assert_eq!(w, 0.0);
        assert_eq!(grad, Vec2::ZERO);
    }

    #[test]
    fn zero_separation_has_zero_gradient() {
        let (w, grad) = kernel_and_gradient(Vec2::ZERO, 0.0, 0.02);
        assert!(w > 0.0);
        assert_eq!(grad, Vec2::ZERO);
    }

    #[test]
    fn weight_decreases_with_distance_within_support() {
        let h = 0.02;
        let (w_near, _) = kernel_and_gradient(Vec2::new(0.1 * h, 0.0), 0.1 * h, h);
        let (w_far, _) = kernel_and_gradient(Vec2::new(2.5 * h, 0.0), 2.5 * h, h);
        assert!(w_near > w_far);
        assert!(w_far >= 0.0);
    }

    #[test]
    fn gradient_points_opposite_to_separation() {
        let h = 0.02;
        let delta = Vec2::new(0.5 * h, 0.0);
        let (_, grad) = kernel_and_gradient(delta, delta.length(), h);
        // Within the first branch the spline gradient coefficient is negative,
        // so grad should point opposite to delta.
        assert!(grad.x < 0.0);
        assert_eq!(grad.y, 0.0);
    }
}
