//! Two parallel line sites and a third line site.

use super::{on_line_side, Solution, Solver};
use crate::point::Point;
use crate::site::Site;

/// Parallel line-line-line solver.
///
/// The first two sites are parallel: their bisector is the mid-line at
/// constant clearance `tb`. The vertex is where the third site's offset at
/// `tb` crosses that mid-line.
#[derive(Clone, Copy, Debug)]
pub struct LllParaSolver {
    pub det_eps: f64,
}

impl Default for LllParaSolver {
    fn default() -> Self {
        Self { det_eps: 1e-15 }
    }
}

impl LllParaSolver {
    /// Solve `[a b; c d]·(u, v) = (e, f)`, `None` when singular.
    fn two_by_two(&self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Option<(f64, f64)> {
        let det = a * d - c * b;
        if det.abs() < self.det_eps {
            return None;
        }
        Some(((d * e - b * f) / det, (-c * e + a * f) / det))
    }
}

impl Solver for LllParaSolver {
    fn solve(
        &self,
        s1: &Site,
        k1: f64,
        s2: &Site,
        k2: f64,
        s3: &Site,
        k3: f64,
        out: &mut Vec<Solution>,
    ) -> usize {
        debug_assert!(s1.is_line() && s2.is_line() && s3.is_line());
        let (e1, e2, e3) = (s1.eq(), s2.eq(), s3.eq());
        let mut s2c = e2.c;
        if e1.a * e2.a + e1.b * e2.b < 0.0 {
            s2c = -s2c;
        }
        let bc = (e1.c + s2c) * 0.5;
        let tb = 0.5 * (e1.c - s2c).abs();
        let k3_eff = s3.eqp(k3).k;
        let Some((x, y)) = self.two_by_two(e1.a, e1.b, e3.a, e3.b, -bc, -e3.c - k3_eff * tb) else {
            return 0;
        };
        let p = Point::new(x, y);
        if !on_line_side(s1, k1, &p) || !on_line_side(s2, k2, &p) || !on_line_side(s3, k3, &p) {
            return 0;
        }
        out.push(Solution::new(p, tb, k3));
        1
    }
}
