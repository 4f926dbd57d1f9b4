//! Sites (generators) and their offset-curve equations.
//!
//! Purpose
//! - Model the three generator kinds (point, line segment, circular arc) as a
//!   tagged union so solver dispatch is an exhaustive `match`.
//! - Each site carries an `Equation` describing its offset family
//!   `q·(x² + y² − t²) + a·x + b·y + c + k·t = 0`, normalized at construction.
//!
//! Conventions
//! - Line sites are normalized so `a² + b² = 1`; `k = ±1` picks the offset side
//!   (`+1` is the left side of `start -> end`).
//! - `in_region_t` snaps values within `region_snap_eps` of 0 or 1 to the
//!   boundary; point sites have no region (`in_region` is always true).
//! - Arc-site support is partial: region tests and solver coverage are only
//!   exercised for points and lines.

use crate::hedi::{EdgeId, VertexId};
use crate::numeric::diangle;
use crate::point::Point;

/// Snap tolerance for `in_region_t`.
pub(crate) const REGION_SNAP_EPS: f64 = 1e-7;

/// Coefficients of a site's offset equation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Equation {
    /// Quadratic flag (true for point and arc sites).
    pub q: bool,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub k: f64,
}

impl Equation {
    /// Coefficient by solver index: 0 → `a`, 1 → `b`, 2 → `k`.
    #[inline]
    pub fn get(&self, idx: usize) -> f64 {
        match idx {
            0 => self.a,
            1 => self.b,
            _ => self.k,
        }
    }

    /// Term-wise difference `self − other` (cancels the quadratic part of two
    /// quadratic equations).
    #[inline]
    pub fn sub(&self, other: &Equation) -> Equation {
        Equation {
            q: self.q,
            a: self.a - other.a,
            b: self.b - other.b,
            c: self.c - other.c,
            k: self.k - other.k,
        }
    }
}

/// Preliminary offset element between two points on a site's offset curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OffsetElement {
    Line { start: Point, end: Point },
    Arc { start: Point, end: Point, center: Point, radius: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointSite {
    pub p: Point,
    /// POINTSITE vertex of this site, once inserted.
    pub vertex: Option<VertexId>,
    eq: Equation,
}

impl PointSite {
    pub fn new(p: Point) -> Self {
        Self {
            p,
            vertex: None,
            eq: Equation { q: true, a: -2.0 * p.x, b: -2.0 * p.y, c: p.x * p.x + p.y * p.y, k: 0.0 },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineSite {
    pub start: Point,
    pub end: Point,
    /// LINESITE pseudo-edge of this site, once inserted.
    pub edge: Option<EdgeId>,
    eq: Equation,
}

impl LineSite {
    /// Segment `start -> end` with offset direction `koff` (±1).
    pub fn new(start: Point, end: Point, koff: f64) -> Self {
        let mut a = end.y - start.y;
        let mut b = start.x - end.x;
        let mut c = end.x * start.y - start.x * end.y;
        let d = (a * a + b * b).sqrt();
        a /= d;
        b /= d;
        c /= d;
        debug_assert!((a * a + b * b - 1.0).abs() < 1e-5);
        Self { start, end, edge: None, eq: Equation { q: false, a, b, c, k: koff } }
    }

    #[inline]
    pub fn k(&self) -> f64 {
        self.eq.k
    }

    #[inline]
    pub fn eq(&self) -> Equation {
        self.eq
    }

    fn t_raw(&self, p: &Point) -> f64 {
        let s_e = self.end - self.start;
        (p - self.start).dot(&s_e) / s_e.dot(&s_e)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArcSite {
    pub start: Point,
    pub end: Point,
    pub center: Point,
    /// Clockwise flag.
    pub cw: bool,
    pub radius: f64,
    /// +1 for an enlarging offset, −1 for a shrinking one.
    pub k: f64,
    eq: Equation,
}

impl ArcSite {
    pub fn new(start: Point, end: Point, center: Point, cw: bool) -> Self {
        let radius = (center - start).norm();
        let k = 1.0;
        Self {
            start,
            end,
            center,
            cw,
            radius,
            k,
            eq: Equation {
                q: true,
                a: -2.0 * center.x,
                b: -2.0 * center.y,
                c: center.x * center.x + center.y * center.y - radius * radius,
                k: -2.0 * k * radius,
            },
        }
    }

    fn t_raw(&self, pt: &Point) -> f64 {
        let cs = self.start - self.center;
        let ce = self.end - self.center;
        let cp = pt - self.center;
        let (lo, hi) = if self.cw {
            (diangle(ce.x, ce.y), diangle(cs.x, cs.y))
        } else {
            (diangle(cs.x, cs.y), diangle(ce.x, ce.y))
        };
        (diangle(cp.x, cp.y) - lo) / (hi - lo)
    }

    fn projection_point(&self, p: &Point) -> Point {
        if *p == self.center {
            self.start
        } else {
            self.center + (p - self.center).normalize() * self.radius
        }
    }

    fn closer_endpoint(&self, p: &Point) -> Point {
        if (self.start - p).norm() < (self.end - p).norm() {
            self.start
        } else {
            self.end
        }
    }
}

/// A generator of the diagram.
#[derive(Clone, Debug, PartialEq)]
pub enum Site {
    Point(PointSite),
    Line(LineSite),
    Arc(ArcSite),
}

fn snap_unit(t: f64) -> f64 {
    if t.abs() < REGION_SNAP_EPS {
        0.0
    } else if (t - 1.0).abs() < REGION_SNAP_EPS {
        1.0
    } else {
        t
    }
}

impl Site {
    pub fn point(p: Point) -> Self {
        Site::Point(PointSite::new(p))
    }

    pub fn line(start: Point, end: Point, koff: f64) -> Self {
        Site::Line(LineSite::new(start, end, koff))
    }

    pub fn arc(start: Point, end: Point, center: Point, cw: bool) -> Self {
        Site::Arc(ArcSite::new(start, end, center, cw))
    }

    #[inline]
    pub fn is_point(&self) -> bool {
        matches!(self, Site::Point(_))
    }

    #[inline]
    pub fn is_line(&self) -> bool {
        matches!(self, Site::Line(_))
    }

    #[inline]
    pub fn is_arc(&self) -> bool {
        matches!(self, Site::Arc(_))
    }

    /// Linear sites contribute a linear equation to the solvers.
    #[inline]
    pub fn is_linear(&self) -> bool {
        self.is_line()
    }

    pub fn as_point(&self) -> Option<&PointSite> {
        match self {
            Site::Point(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&LineSite> {
        match self {
            Site::Line(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_arc(&self) -> Option<&ArcSite> {
        match self {
            Site::Arc(s) => Some(s),
            _ => None,
        }
    }

    /// Location of a point site; start point for segments and arcs.
    pub fn position(&self) -> Point {
        match self {
            Site::Point(s) => s.p,
            Site::Line(s) => s.start,
            Site::Arc(s) => s.start,
        }
    }

    pub fn vertex(&self) -> Option<VertexId> {
        self.as_point().and_then(|s| s.vertex)
    }

    pub fn edge(&self) -> Option<EdgeId> {
        self.as_line().and_then(|s| s.edge)
    }

    #[inline]
    pub fn eq(&self) -> Equation {
        match self {
            Site::Point(s) => s.eq,
            Site::Line(s) => s.eq,
            Site::Arc(s) => s.eq,
        }
    }

    /// Equation with `k` scaled by the offset direction `kk`.
    #[inline]
    pub fn eqp(&self, kk: f64) -> Equation {
        let mut e = self.eq();
        e.k *= kk;
        e
    }

    /// Closest point on the site to `p`.
    pub fn apex_point(&self, p: &Point) -> Point {
        match self {
            Site::Point(s) => s.p,
            Site::Line(s) => {
                let t = s.t_raw(p);
                if t < 0.0 {
                    s.start
                } else if t > 1.0 {
                    s.end
                } else {
                    s.start + (s.end - s.start) * t
                }
            }
            Site::Arc(s) => {
                if self.in_region(p) {
                    s.projection_point(p)
                } else {
                    s.closer_endpoint(p)
                }
            }
        }
    }

    /// Site-local parameter of `p`, snapped to 0/1 near the boundary; −1 for point sites.
    pub fn in_region_t(&self, p: &Point) -> f64 {
        match self {
            Site::Point(_) => -1.0,
            Site::Line(s) => snap_unit(s.t_raw(p)),
            Site::Arc(s) => snap_unit(s.t_raw(p)),
        }
    }

    /// Unsnapped site-local parameter of `p`.
    pub fn in_region_t_raw(&self, p: &Point) -> f64 {
        match self {
            Site::Point(_) => -1.0,
            Site::Line(s) => s.t_raw(p),
            Site::Arc(s) => s.t_raw(p),
        }
    }

    pub fn in_region(&self, p: &Point) -> bool {
        match self {
            Site::Point(_) => true,
            Site::Arc(s) if *p == s.center => true,
            _ => {
                let t = self.in_region_t(p);
                (0.0..=1.0).contains(&t)
            }
        }
    }

    /// Offset element between `p1` and `p2` on this site's offset curve.
    pub fn offset(&self, p1: Point, p2: Point) -> OffsetElement {
        match self {
            Site::Point(s) => OffsetElement::Arc {
                start: p1,
                end: p2,
                center: s.p,
                radius: (p1 - s.p).norm(),
            },
            Site::Line(_) => OffsetElement::Line { start: p1, end: p2 },
            // radius is not tracked for arc offsets
            Site::Arc(s) => OffsetElement::Arc { start: p1, end: p2, center: s.center, radius: -1.0 },
        }
    }
}
