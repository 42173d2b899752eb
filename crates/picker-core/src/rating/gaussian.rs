//! Standard normal helpers and the truncated-Gaussian correction terms used by
//! the moment-matching update.

use statrs::function::erf::{erf_inv, erfc};
use std::f64::consts::{PI, SQRT_2};

/// Below this a CDF difference is treated as having underflowed.
const DENOMINATOR_FLOOR: f64 = 1e-300;

/// Standard normal density.
pub fn pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Standard normal CDF, computed through `erfc` so the lower tail keeps precision.
pub fn cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Inverse of the standard normal CDF for `p` in `(0, 1)`.
pub fn inverse_cdf(p: f64) -> f64 {
    SQRT_2 * erf_inv(2.0 * p - 1.0)
}

/// Half-width of the performance-difference interval that counts as a draw
/// between two players, for a target draw rate between equally rated players.
pub fn draw_margin(draw_probability: f64, beta: f64) -> f64 {
    inverse_cdf((draw_probability + 1.0) / 2.0) * SQRT_2 * beta
}

/// Additive mean correction for a win, `t` and `e` already divided by `c`.
pub fn v_win(t: f64, e: f64) -> f64 {
    let x = t - e;
    let denom = cdf(x);
    if denom > DENOMINATOR_FLOOR {
        pdf(x) / denom
    } else {
        -x
    }
}

/// Multiplicative variance correction for a win, clamped into `[0, 1]`.
pub fn w_win(t: f64, e: f64) -> f64 {
    let x = t - e;
    if cdf(x) <= DENOMINATOR_FLOOR {
        return 1.0;
    }
    let v = v_win(t, e);
    (v * (v + x)).clamp(0.0, 1.0)
}

/// Mean correction for a draw; its sign pulls the higher mean down.
pub fn v_draw(t: f64, e: f64) -> f64 {
    let abs_t = t.abs();
    let upper = e - abs_t;
    let lower = -e - abs_t;
    let denom = cdf(upper) - cdf(lower);
    let magnitude = if denom > DENOMINATOR_FLOOR {
        (pdf(lower) - pdf(upper)) / denom
    } else {
        (upper + lower) / 2.0
    };
    if t < 0.0 { -magnitude } else { magnitude }
}

/// Variance correction for a draw, clamped into `[0, 1]`.
pub fn w_draw(t: f64, e: f64) -> f64 {
    let abs_t = t.abs();
    let upper = e - abs_t;
    let lower = -e - abs_t;
    let denom = cdf(upper) - cdf(lower);
    if denom <= DENOMINATOR_FLOOR {
        return 1.0;
    }
    let v = v_draw(abs_t, e);
    (v * v + (upper * pdf(upper) - lower * pdf(lower)) / denom).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64, tol: f64) -> bool {
        (actual - expected).abs() <= tol
    }

    #[test]
    fn density_and_cdf_match_reference_values() {
        assert!(close(pdf(0.0), 0.398_942_280_401_432_7, 1e-15));
        assert!(close(cdf(0.0), 0.5, 1e-15));
        // statrs' erfc is good to roughly 1e-11 away from the origin.
        assert!(close(cdf(1.0), 0.841_344_746_068_542_9, 1e-10));
        assert!(close(cdf(-1.96), 0.024_997_895_148_220_4, 1e-10));
        assert!(cdf(-40.0) >= 0.0 && cdf(40.0) <= 1.0);
    }

    #[test]
    fn inverse_cdf_undoes_cdf() {
        for p in [0.025, 0.3, 0.5, 0.55, 0.9] {
            assert!(close(cdf(inverse_cdf(p)), p, 1e-10), "p = {p}");
        }
        assert!(close(inverse_cdf(0.975), 1.959_963_984_540_054, 1e-9));
    }

    #[test]
    fn draw_margin_matches_reference() {
        let beta = 25.0 / 6.0;
        assert!(close(draw_margin(0.10, beta), 0.740_466_587_452_148, 1e-9));
        assert!(close(draw_margin(0.0, beta), 0.0, 1e-15));
    }

    #[test]
    fn win_corrections_shrink_with_expected_results() {
        // A strong favourite winning is barely informative; an upset is.
        assert!(v_win(3.0, 0.0) < v_win(0.0, 0.0));
        assert!(v_win(0.0, 0.0) < v_win(-3.0, 0.0));
        assert!(close(v_win(0.0, 0.0), 2.0 * pdf(0.0), 1e-12));
        for t in [-8.0, -2.0, 0.0, 2.0, 8.0] {
            let w = w_win(t, 0.05);
            assert!((0.0..=1.0).contains(&w), "w_win({t}) = {w}");
        }
    }

    #[test]
    fn win_corrections_fall_back_in_the_far_tail() {
        assert!(close(v_win(-60.0, 0.0), 60.0, 1e-9));
        assert_eq!(w_win(-60.0, 0.0), 1.0);
    }

    #[test]
    fn draw_corrections_are_antisymmetric_in_mean_gap() {
        let e = 0.056;
        assert!(v_draw(0.5, e) < 0.0);
        assert!(close(v_draw(0.5, e), -v_draw(-0.5, e), 1e-12));
        assert!(close(v_draw(0.0, e), 0.0, 1e-12));
        for t in [-3.0, -0.4, 0.0, 0.4, 3.0] {
            let w = w_draw(t, e);
            assert!((0.0..=1.0).contains(&w), "w_draw({t}) = {w}");
        }
    }

    #[test]
    fn zero_width_draw_falls_back_to_midpoint() {
        assert!(close(v_draw(0.7, 0.0), -0.7, 1e-12));
        assert_eq!(w_draw(0.7, 0.0), 1.0);
    }
}
