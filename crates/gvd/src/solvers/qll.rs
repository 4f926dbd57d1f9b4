//! General solver: one quadratic and two linear equations.

use super::{Solution, Solver};
use crate::numeric::{chop_tol, quadratic_roots, CHOP_EPS};
use crate::point::Point;
use crate::site::{Equation, Site};

/// Quadratic-linear-linear solver.
///
/// Point and arc sites contribute quadratic equations, line sites linear
/// ones. Missing linear equations are produced by subtracting the first
/// quadratic from the others. The reduced system is solved three times with
/// the roles of `(x, y, t)` rotated and all candidates are kept.
#[derive(Clone, Copy, Debug)]
pub struct QllSolver {
    pub chop_eps: f64,
}

impl Default for QllSolver {
    fn default() -> Self {
        Self { chop_eps: CHOP_EPS }
    }
}

impl QllSolver {
    /// Solve with `(xi, yi, ti)` selecting which unknown each role maps to.
    fn solve_permuted(
        &self,
        lins: &[Equation; 2],
        xi: usize,
        yi: usize,
        ti: usize,
        quad: &Equation,
        k3: f64,
        out: &mut Vec<Solution>,
    ) -> usize {
        let (l0, l1) = (&lins[0], &lins[1]);
        let (ai, bi, ki, ci) = (l0.get(xi), l0.get(yi), l0.get(ti), l0.c);
        let (aj, bj, kj, cj) = (l1.get(xi), l1.get(yi), l1.get(ti), l1.c);
        let d = chop_tol(ai * bj - aj * bi, self.chop_eps);
        if d == 0.0 {
            return 0;
        }
        // u = a0·w + b0, v = a1·w + b1
        let a0 = (bi * kj - bj * ki) / d;
        let a1 = -(ai * kj - aj * ki) / d;
        let b0 = (bi * cj - bj * ci) / d;
        let b1 = -(ai * cj - aj * ci) / d;
        // quadratic coefficients (squared, linear) per unknown
        let aargs = [[1.0, quad.a], [1.0, quad.b], [-1.0, quad.k]];
        let roots = self.qll_solve(aargs[xi], aargs[yi], aargs[ti], quad.c, (a0, b0), (a1, b1));
        for &(u, v, w) in &roots {
            let mut tsol = [0.0; 3];
            tsol[xi] = u;
            tsol[yi] = v;
            tsol[ti] = w;
            out.push(Solution::new(Point::new(tsol[0], tsol[1]), tsol[2], k3));
        }
        roots.len()
    }

    /// Solve `qu·(u², u) + qv·(v², v) + qw·(w², w) + g = 0` with
    /// `u = lu.0·w + lu.1` and `v = lv.0·w + lv.1`.
    fn qll_solve(
        &self,
        qu: [f64; 2],
        qv: [f64; 2],
        qw: [f64; 2],
        g: f64,
        lu: (f64, f64),
        lv: (f64, f64),
    ) -> Vec<(f64, f64, f64)> {
        let [a0, b0] = qu;
        let [c0, d0] = qv;
        let [e0, f0] = qw;
        let (a1, b1) = lu;
        let (a2, b2) = lv;
        let a = chop_tol(a0 * a1 * a1 + c0 * a2 * a2 + e0, self.chop_eps);
        let b = chop_tol(2.0 * a0 * a1 * b1 + 2.0 * a2 * b2 * c0 + a1 * b0 + a2 * d0 + f0, self.chop_eps);
        let c = a0 * b1 * b1 + c0 * b2 * b2 + b0 * b1 + b2 * d0 + g;
        quadratic_roots(a, b, c).into_iter().map(|w| (a1 * w + b1, a2 * w + b2, w)).collect()
    }
}

impl Solver for QllSolver {
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
        let mut quads = Vec::with_capacity(3);
        let mut lins = Vec::with_capacity(3);
        for (s, k) in [(s1, k1), (s2, k2), (s3, k3)] {
            let eq = s.eqp(k);
            if s.is_linear() {
                lins.push(eq);
            } else {
                quads.push(eq);
            }
        }
        let Some(&quad) = quads.first() else {
            return 0;
        };
        if lins.len() <= 1 {
            for q in &quads[1..] {
                lins.push(q.sub(&quad));
            }
        }
        let [l0, l1] = lins.as_slice() else {
            return 0;
        };
        let lins = [*l0, *l1];
        let mut n = 0;
        n += self.solve_permuted(&lins, 0, 1, 2, &quad, k3, out);
        n += self.solve_permuted(&lins, 2, 0, 1, &quad, k3, out);
        n += self.solve_permuted(&lins, 1, 2, 0, &quad, k3, out);
        n
    }
}
