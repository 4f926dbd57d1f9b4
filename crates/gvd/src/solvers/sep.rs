//! Solvers for vertices on a separator.
//!
//! A separator leaves a segment endpoint `p` perpendicular to the segment:
//! `x(t) = p + t·sv` with `sv` the unit normal pointing into the segment's
//! offset region. Substituting into the third site's equation gives `t` from
//! a single linear equation:
//! - line: `t = -(a·px + b·py + c) / (sv·(a, b) + k)`
//! - point: `t = -(dx² + dy²) / (2·(dx·sv.x + dy·sv.y))` with `d = p - q`.

use super::{Solution, Solver};
use crate::point::Point;
use crate::site::Site;

/// Vertex on an existing SEPARATOR edge: `s1` is the line site, `s2` its endpoint.
#[derive(Clone, Copy, Debug, Default)]
pub struct SepSolver;

impl Solver for SepSolver {
    fn solve(
        &self,
        s1: &Site,
        _k1: f64,
        s2: &Site,
        _k2: f64,
        s3: &Site,
        k3: f64,
        out: &mut Vec<Solution>,
    ) -> usize {
        debug_assert!(s1.is_line() && s2.is_point() && s3.is_line());
        let e1 = s1.eq();
        let e3 = s3.eq();
        let p2 = s2.position();
        let sv = Point::new(-e1.a, -e1.b);
        let den = sv.x * e3.a + sv.y * e3.b + k3;
        if den == 0.0 {
            return 0;
        }
        let t = -(e3.a * p2.x + e3.b * p2.y + e3.c) / den;
        out.push(Solution::new(p2 + sv * t, t, k3));
        1
    }
}

/// Which of the edge's sites is the endpoint of the new line site `s3`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SepRole {
    /// `s1` is an endpoint of `s3`; `s2` is the third site.
    First,
    /// `s2` is an endpoint of `s3`; `s1` is the third site.
    Second,
}

/// Vertex on the separator of the new line site `s3` at one of its endpoints.
#[derive(Clone, Copy, Debug)]
pub struct AltSepSolver {
    pub role: SepRole,
}

impl AltSepSolver {
    pub fn new(role: SepRole) -> Self {
        Self { role }
    }
}

impl Solver for AltSepSolver {
    fn solve(
        &self,
        s1: &Site,
        _k1: f64,
        s2: &Site,
        _k2: f64,
        s3: &Site,
        k3: f64,
        out: &mut Vec<Solution>,
    ) -> usize {
        let (psite, third) = match self.role {
            SepRole::First => (s1, s2),
            SepRole::Second => (s2, s1),
        };
        debug_assert!(s3.is_line() && psite.is_point());
        let el = s3.eq();
        let sv = if k3 == -1.0 { Point::new(el.a, el.b) } else { Point::new(-el.a, -el.b) };
        let p = psite.position();
        let t = match third {
            Site::Point(q) => {
                let d = p - q.p;
                let den = 2.0 * (d.x * sv.x + d.y * sv.y);
                if den == 0.0 {
                    return 0;
                }
                -(d.x * d.x + d.y * d.y) / den
            }
            Site::Line(_) => {
                let e = third.eq();
                // the third site offsets towards its own face: k = +1
                let den = sv.x * e.a + sv.y * e.b + 1.0;
                if den == 0.0 {
                    return 0;
                }
                -(e.a * p.x + e.b * p.y + e.c) / den
            }
            Site::Arc(_) => return 0,
        };
        out.push(Solution::new(p + sv * t, t, k3));
        1
    }
}
