//! Three line sites: Cramer's rule on the 3x3 system in `(x, y, t)`.

use super::{on_line_side, LllParaSolver, Solution, Solver};
use crate::numeric::{chop_tol, determinant};
use crate::point::Point;
use crate::site::Site;

/// Line-line-line solver.
///
/// Near-singular systems (two of the lines parallel) are handed to
/// `LllParaSolver` for the parallel pair, keeping only results on the offset
/// side of `s3`.
#[derive(Clone, Copy, Debug)]
pub struct LllSolver {
    pub chop_eps: f64,
    pub det_eps: f64,
    pub para: LllParaSolver,
}

impl Default for LllSolver {
    fn default() -> Self {
        Self { chop_eps: crate::numeric::CHOP_EPS, det_eps: 1e-6, para: LllParaSolver::default() }
    }
}

impl Solver for LllSolver {
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
        let sites = [s1, s2, s3];
        let kvals = [k1, k2, k3];
        let eq = [s1.eqp(k1), s2.eqp(k2), s3.eqp(k3)];
        let [ei, ej, ek] = eq;
        let d = chop_tol(
            determinant(ei.a, ei.b, ei.k, ej.a, ej.b, ej.k, ek.a, ek.b, ek.k),
            self.chop_eps,
        );
        if d.abs() > self.det_eps {
            let t = determinant(ei.a, ei.b, -ei.c, ej.a, ej.b, -ej.c, ek.a, ek.b, -ek.c) / d;
            if t < 0.0 {
                return 0;
            }
            let x = determinant(-ei.c, ei.b, ei.k, -ej.c, ej.b, ej.k, -ek.c, ek.b, ek.k) / d;
            let y = determinant(ei.a, -ei.c, ei.k, ej.a, -ej.c, ej.k, ek.a, -ek.c, ek.k) / d;
            out.push(Solution::new(Point::new(x, y), t, k3));
            return 1;
        }
        for i in 0..3 {
            let j = (i + 1) % 3;
            let m = (i + 2) % 3;
            let delta = (eq[i].a * eq[j].b - eq[j].a * eq[i].b).abs();
            if delta <= 1e-300 {
                let mut para = Vec::new();
                self.para.solve(sites[i], kvals[i], sites[j], kvals[j], sites[m], kvals[m], &mut para);
                let before = out.len();
                out.extend(para.into_iter().filter(|s| on_line_side(s3, k3, &s.p)));
                return out.len() - before;
            }
        }
        0
    }
}
