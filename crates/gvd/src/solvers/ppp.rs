//! Circumcenter of three point sites.

use super::{Solution, Solver};
use crate::numeric::sq;
use crate::point::{Point, PointExt};
use crate::site::Site;

/// Point-point-point solver.
///
/// The points are relabelled so that the triangle `pi, pj, pk` is
/// counterclockwise and `pi-pj` is its longest side, which keeps the
/// determinant formula well conditioned. Offset directions are ignored (all +1).
#[derive(Clone, Copy, Debug, Default)]
pub struct PppSolver;

impl Solver for PppSolver {
    fn solve(
        &self,
        s1: &Site,
        _k1: f64,
        s2: &Site,
        _k2: f64,
        s3: &Site,
        _k3: f64,
        out: &mut Vec<Solution>,
    ) -> usize {
        debug_assert!(s1.is_point() && s2.is_point() && s3.is_point());
        let mut pi = s1.position();
        let mut pj = s2.position();
        let mut pk = s3.position();
        if pi.is_right(&pj, &pk) {
            std::mem::swap(&mut pi, &mut pj);
        }
        let mut longest = (pi - pj).norm();
        while (pj - pk).norm() > longest || (pi - pk).norm() > longest {
            let tmp = pk;
            pk = pj;
            pj = pi;
            pi = tmp;
            longest = (pi - pj).norm();
        }
        let dj = sq(pj.x - pk.x) + sq(pj.y - pk.y);
        let di = sq(pi.x - pk.x) + sq(pi.y - pk.y);
        let j2 = (pi.y - pk.y) * dj / 2.0 - (pj.y - pk.y) * di / 2.0;
        let j3 = (pi.x - pk.x) * dj / 2.0 - (pj.x - pk.x) * di / 2.0;
        let j4 = (pi.x - pk.x) * (pj.y - pk.y) - (pj.x - pk.x) * (pi.y - pk.y);
        if j4 == 0.0 {
            // collinear points have no circumcenter
            return 0;
        }
        let p = Point::new(-j2 / j4 + pk.x, j3 / j4 + pk.y);
        out.push(Solution::new(p, (p - pi).norm(), 1.0));
        1
    }
}
