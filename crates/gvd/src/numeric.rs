//! Scalar numerics shared by the solvers and the builder.
//!
//! Purpose
//! - `chop` snaps near-zero intermediates to exactly zero so that determinant
//!   signs do not flip on rounding noise.
//! - `quadratic_roots` is the cancellation-free form used by the general solver.
//! - "Diangles" are a cheap monotone stand-in for `atan2` in `[0, 4)`, used to
//!   order vertices around a null-face.
//! - `brent_root` / `brent_minimize` are the bounded 1D searches used for
//!   SPLIT-vertex placement and for the desperate vertex position fallback.
//!
//! References
//! - Brent, "Algorithms for Minimization without Derivatives" (1973), ch. 4 and 5.

use nalgebra::Matrix3;

/// Default chop tolerance for solver intermediates.
pub const CHOP_EPS: f64 = 1e-10;

#[inline]
pub fn sq(a: f64) -> f64 {
    a * a
}

/// Return 0 when `|val| < tol`, otherwise `val`.
#[inline]
pub fn chop_tol(val: f64, tol: f64) -> f64 {
    if val.abs() < tol {
        0.0
    } else {
        val
    }
}

#[inline]
pub fn chop(val: f64) -> f64 {
    chop_tol(val, CHOP_EPS)
}

/// Real roots of `a x² + b x + c = 0` (zero, one or two of them).
pub fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a == 0.0 && b == 0.0 {
        return Vec::new();
    }
    if a == 0.0 {
        return vec![-c / b];
    }
    if b == 0.0 {
        let sqr = -c / a;
        return if sqr > 0.0 {
            let r = sqr.sqrt();
            vec![r, -r]
        } else if sqr == 0.0 {
            vec![0.0]
        } else {
            Vec::new()
        };
    }
    let disc = chop(b * b - 4.0 * a * c);
    if disc > 0.0 {
        let q = if b > 0.0 {
            (b + disc.sqrt()) / -2.0
        } else {
            (b - disc.sqrt()) / -2.0
        };
        vec![q / a, c / q]
    } else if disc == 0.0 {
        vec![-b / (2.0 * a)]
    } else {
        Vec::new()
    }
}

/// Determinant of the row-major 3x3 matrix `[a b c; d e f; g h i]`.
#[inline]
#[allow(clippy::too_many_arguments)]
pub fn determinant(
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
    g: f64,
    h: f64,
    i: f64,
) -> f64 {
    Matrix3::new(a, b, c, d, e, f, g, h, i).determinant()
}

/// Diamond angle of the direction `(x, y)`, monotone in the polar angle, in `[0, 4)`.
pub fn diangle(x: f64, y: f64) -> f64 {
    if y >= 0.0 {
        if x >= 0.0 {
            y / (x + y)
        } else {
            1.0 - x / (-x + y)
        }
    } else if x < 0.0 {
        2.0 - y / (-x - y)
    } else {
        3.0 + x / (x - y)
    }
}

#[inline]
pub fn diangle_x(a: f64) -> f64 {
    if a < 2.0 {
        1.0 - a
    } else {
        a - 3.0
    }
}

#[inline]
pub fn diangle_y(a: f64) -> f64 {
    if a < 3.0 {
        if a > 1.0 {
            2.0 - a
        } else {
            a
        }
    } else {
        a - 4.0
    }
}

/// Unit direction corresponding to diangle `a`.
pub fn diangle_xy(a: f64) -> (f64, f64) {
    let x = diangle_x(a);
    let y = diangle_y(a);
    let n = (x * x + y * y).sqrt();
    (x / n, y / n)
}

/// True if `a` lies in the (possibly wrapping) interval `[less, more)`.
pub fn diangle_bracket(less: f64, a: f64, more: f64) -> bool {
    if less == more {
        false
    } else if less < more {
        less <= a && a < more
    } else {
        (less <= a && a <= 4.0) || (0.0 <= a && a < more)
    }
}

/// Mid-direction between `alfa1` and `alfa2`, walking counterclockwise from `alfa1`.
pub fn diangle_mid(alfa1: f64, alfa2: f64) -> f64 {
    if alfa1 <= alfa2 {
        (alfa1 + alfa2) / 2.0
    } else {
        let opposite_mid = alfa2 + (alfa1 - alfa2) / 2.0;
        let mut mid = opposite_mid + 2.0;
        if mid > 4.0 {
            mid -= 4.0;
        }
        debug_assert!((0.0..=4.0).contains(&mid), "diangle_mid out of range: {mid}");
        mid
    }
}

/// Brent-Dekker root search on a bracketing interval `[a, b]`.
///
/// Returns `None` if `f(a)` and `f(b)` do not have opposite signs or if the
/// iteration cap is exhausted before the bracket shrinks below `tol`.
pub fn brent_root<F>(mut f: F, mut a: f64, mut b: f64, tol: f64, max_iter: usize) -> Option<f64>
where
    F: FnMut(f64) -> f64,
{
    let mut fa = f(a);
    let mut fb = f(b);
    if fa == 0.0 {
        return Some(a);
    }
    if fb == 0.0 {
        return Some(b);
    }
    if fa * fb > 0.0 {
        return None;
    }
    let mut c = a;
    let mut fc = fa;
    let mut d = b - a;
    let mut e = d;
    for _ in 0..max_iter {
        if fb * fc > 0.0 {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * tol;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb == 0.0 {
            return Some(b);
        }
        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            // inverse quadratic interpolation, or secant when only two points are distinct
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let qa = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * qa * (qa - r) - (b - a) * (r - 1.0)),
                    (qa - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }
        a = b;
        fa = fb;
        if d.abs() > tol1 {
            b += d;
        } else {
            b += tol1.copysign(xm);
        }
        fb = f(b);
    }
    None
}

/// Brent's derivative-free minimizer on `[lo, hi]`.
///
/// Converges when the bracket is within `rel_tol * |x| + abs_tol` of the
/// current best point or after `max_eval` evaluations; always returns a point
/// inside the interval.
pub fn brent_minimize<F>(mut f: F, lo: f64, hi: f64, rel_tol: f64, abs_tol: f64, max_eval: usize) -> f64
where
    F: FnMut(f64) -> f64,
{
    const GOLDEN: f64 = 0.381_966_011_250_105_1;
    let (mut a, mut b) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let mut x = a + GOLDEN * (b - a);
    let mut w = x;
    let mut v = x;
    let mut fx = f(x);
    let mut fw = fx;
    let mut fv = fx;
    let mut d: f64 = 0.0;
    let mut e: f64 = 0.0;
    let mut evals = 1;
    while evals < max_eval {
        let m = 0.5 * (a + b);
        let tol1 = rel_tol * x.abs() + abs_tol;
        let tol2 = 2.0 * tol1;
        if (x - m).abs() <= tol2 - 0.5 * (b - a) {
            break;
        }
        let mut golden = true;
        if e.abs() > tol1 {
            // parabolic step through (v, w, x)
            let r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            } else {
                q = -q;
            }
            let e_prev = e;
            e = d;
            if p.abs() < (0.5 * q * e_prev).abs() && p > q * (a - x) && p < q * (b - x) {
                d = p / q;
                let u = x + d;
                if u - a < tol2 || b - u < tol2 {
                    d = tol1.copysign(m - x);
                }
                golden = false;
            }
        }
        if golden {
            e = if x < m { b - x } else { a - x };
            d = GOLDEN * e;
        }
        let u = if d.abs() >= tol1 {
            x + d
        } else {
            x + tol1.copysign(d)
        };
        let fu = f(u);
        evals += 1;
        if fu <= fx {
            if u < x {
                b = x;
            } else {
                a = x;
            }
            v = w;
            fv = fw;
            w = x;
            fw = fx;
            x = u;
            fx = fu;
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                fv = fw;
                w = u;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadratic_roots_cases() {
        let mut r = quadratic_roots(1.0, -3.0, 2.0);
        r.sort_by(f64::total_cmp);
        assert!((r[0] - 1.0).abs() < 1e-12 && (r[1] - 2.0).abs() < 1e-12);
        assert_eq!(quadratic_roots(0.0, 2.0, -4.0), vec![2.0]);
        assert!(quadratic_roots(1.0, 0.0, 1.0).is_empty());
        assert_eq!(quadratic_roots(1.0, 2.0, 1.0), vec![-1.0]);
        assert!(quadratic_roots(0.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn chop_snaps_small_values() {
        assert_eq!(chop(1e-12), 0.0);
        assert_eq!(chop(-1e-11), 0.0);
        assert_eq!(chop(1e-9), 1e-9);
        assert_eq!(chop_tol(1e-5, 1e-4), 0.0);
    }

    #[test]
    fn determinant_matches_cofactor_expansion() {
        let d = determinant(2.0, 0.0, 1.0, 1.0, 3.0, 2.0, 1.0, 1.0, 1.0);
        let expect = 2.0 * (3.0 - 2.0) - 0.0 * (1.0 - 2.0) + 1.0 * (1.0 - 3.0);
        assert!((d - expect).abs() < 1e-12);
    }

    #[test]
    fn diangle_is_monotone_and_invertible() {
        let mut prev = -1.0;
        for i in 0..64 {
            let th = i as f64 / 64.0 * std::f64::consts::TAU;
            let a = diangle(th.cos(), th.sin());
            assert!(a > prev && a < 4.0);
            prev = a;
            let (x, y) = diangle_xy(a);
            assert!((x - th.cos()).abs() < 1e-9 && (y - th.sin()).abs() < 1e-9);
        }
    }

    #[test]
    fn diangle_mid_and_bracket() {
        assert!((diangle_mid(0.5, 1.5) - 1.0).abs() < 1e-12);
        // wrapping: from 3.5 counterclockwise to 0.5 the middle is 0.0 (== 4.0)
        let m = diangle_mid(3.5, 0.5);
        assert!(m.abs() < 1e-12 || (m - 4.0).abs() < 1e-12);
        assert!(diangle_bracket(3.0, 0.2, 1.0));
        assert!(!diangle_bracket(1.0, 2.0, 1.5));
        assert!(!diangle_bracket(1.0, 1.0, 1.0));
    }

    #[test]
    fn brent_root_finds_cubic_root() {
        let r = brent_root(|x| x * x * x - 2.0, 0.0, 2.0, 1e-14, 200).unwrap();
        assert!((r - 2f64.cbrt()).abs() < 1e-10);
        assert!(brent_root(|x| x * x + 1.0, -1.0, 1.0, 1e-12, 100).is_none());
    }

    #[test]
    fn brent_minimize_parabola_and_boundary() {
        let x = brent_minimize(|x| (x - 0.3).powi(2), 0.0, 1.0, 1e-10, 1e-14, 1000);
        assert!((x - 0.3).abs() < 1e-6);
        // monotone function: minimum at the lower end of the interval
        let x = brent_minimize(|x| x, 2.0, 5.0, 1e-10, 1e-14, 1000);
        assert!(x >= 2.0 && x < 2.0 + 1e-6);
    }
}
