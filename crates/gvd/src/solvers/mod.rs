//! Vertex-position solvers and the positioner that dispatches to them.
//!
//! Purpose
//! - Given the two sites of an existing edge (with their offset directions
//!   `k1`, `k2`) and a newly inserted site `s3`, find points equidistant to all
//!   three, together with the clearance distance `t` and the side `k3` of `s3`.
//! - Closed forms are used where they exist (three points, three lines,
//!   parallel lines, separators); everything else goes through the general
//!   quadratic/linear solver.
//!
//! Why this design
//! - Each solver is a small value implementing `Solver`, so the positioner can
//!   own one of each and dispatch on the site kinds with an exhaustive match.
//! - Solvers only append candidates; filtering by `t` range, site region and
//!   edge distance happens once in `VertexPositioner`.
//!
//! References
//! - M. Held, "On the Computational Geometry of Pocket Machining" (1991), ch. 5.
//! - K. Sugihara, M. Iri, "Construction of the Voronoi diagram for 'one million'
//!   generators in single-precision arithmetic" (1992).

mod lll;
mod lll_para;
mod positioner;
mod ppp;
mod qll;
mod sep;

pub use lll::LllSolver;
pub use lll_para::LllParaSolver;
pub use positioner::VertexPositioner;
pub use ppp::PppSolver;
pub use qll::QllSolver;
pub use sep::{AltSepSolver, SepRole, SepSolver};

use crate::point::{Point, PointExt};
use crate::site::Site;

/// Candidate vertex: position, clearance distance and side of the new site.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Solution {
    pub p: Point,
    pub t: f64,
    pub k3: f64,
}

impl Solution {
    #[inline]
    pub fn new(p: Point, t: f64, k3: f64) -> Self {
        Self { p, t, k3 }
    }
}

/// A vertex-position solver for three sites with given offset directions.
pub trait Solver {
    /// Append candidate solutions to `out` and return how many were added.
    #[allow(clippy::too_many_arguments)]
    fn solve(
        &self,
        s1: &Site,
        k1: f64,
        s2: &Site,
        k2: f64,
        s3: &Site,
        k3: f64,
        out: &mut Vec<Solution>,
    ) -> usize;
}

/// True if `p` is on the offset side of line site `s` for face direction `k`.
///
/// The effective direction is the site's own `k` times `k`; `+1` means the
/// left side of the site's `start -> end`.
pub(crate) fn on_line_side(s: &Site, k: f64, p: &Point) -> bool {
    match s.as_line() {
        Some(l) => {
            let k_eff = s.eqp(k).k;
            (l.end - l.start).cross2(&(p - l.start)) * k_eff >= 0.0
        }
        None => true,
    }
}
