//! Parametrization of Voronoi edges by clearance distance `t`.
//!
//! Every bisector the diagram produces is written in one vector form
//!
//! `p(t) = origin + velocity·t ± normal·sqrt((r0 + r1·t)² − (s0 + s1·t)²)`
//!
//! - `origin + velocity·t` is the foot of the point on the bisector's axis,
//! - `normal` is the unit left-perpendicular of the apex direction,
//! - the `+` branch (`sign == true`) lies to the left of the apex direction.
//!
//! Apex direction per site pair: point→point runs from the first point to the
//! second; for a point or circle against a line or circle it runs from the
//! closest point of the other site towards the point (or circle center).
//! Swapping the two sites and flipping `sign` describes the same branch.
//!
//! Line/line bisectors have no square-root part. Parallel line/line bisectors
//! carry a single constant point; callers use the edge endpoints instead.

use super::types::EdgeType;
use crate::numeric::{chop_tol, sq};
use crate::point::{Point, PointExt};
use crate::site::{ArcSite, LineSite, PointSite, Site};

/// Determinant threshold below which two line sites count as parallel.
const PARALLEL_EPS: f64 = 1e-14;
/// Chop applied to the discriminant of the square-root term.
const DISCR_EPS: f64 = 1e-14;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeCurve {
    pub origin: Point,
    pub velocity: Point,
    pub normal: Point,
    /// Radius term `r0 + r1·t`.
    pub rad: (f64, f64),
    /// Axis offset term `s0 + s1·t`.
    pub off: (f64, f64),
    pub sign: bool,
}

impl Default for EdgeCurve {
    fn default() -> Self {
        Self {
            origin: Point::zeros(),
            velocity: Point::zeros(),
            normal: Point::zeros(),
            rad: (0.0, 0.0),
            off: (0.0, 0.0),
            sign: true,
        }
    }
}

impl EdgeCurve {
    /// Evaluate the curve at clearance distance `t`.
    pub fn point(&self, t: f64) -> Point {
        let r = self.rad.0 + self.rad.1 * t;
        let s = self.off.0 + self.off.1 * t;
        let discr = chop_tol(r * r - s * s, DISCR_EPS);
        let h = if discr > 0.0 { discr.sqrt() } else { 0.0 };
        let h = if self.sign { h } else { -h };
        self.origin + self.velocity * t + self.normal * h
    }

    /// Smallest `t >= 0` at which both branches meet (the apex), 0 without a
    /// square-root part.
    pub fn minimum_t(&self) -> f64 {
        let (r0, r1) = self.rad;
        let (s0, s1) = self.off;
        if r0 == 0.0 && r1 == 0.0 && s0 == 0.0 && s1 == 0.0 {
            return 0.0;
        }
        let mut best: Option<f64> = None;
        // r(t) = s(t) and r(t) = -s(t)
        for (den, num) in [(r1 - s1, s0 - r0), (r1 + s1, -(s0 + r0))] {
            if den == 0.0 {
                continue;
            }
            let t = num / den;
            if t >= 0.0 && r0 + r1 * t >= -DISCR_EPS {
                best = Some(best.map_or(t, |b: f64| b.min(t)));
            }
        }
        best.unwrap_or(0.0)
    }

    /// Straight separator from a segment endpoint `endp` through `p`.
    pub fn separator(endp: Point, p: Point) -> Self {
        let d = p - endp;
        let n = d.norm();
        let velocity = if n > 0.0 { d / n } else { Point::zeros() };
        Self { origin: endp, velocity, ..Self::default() }
    }

    /// Bisector of `s1` and `s2`, taking the branch selected by `sign`.
    pub fn bisector(s1: &Site, s2: &Site, sign: bool) -> (EdgeType, EdgeCurve) {
        match (s1, s2) {
            (Site::Point(p1), Site::Point(p2)) => (EdgeType::Line, point_point(p1, p2, sign)),
            (Site::Point(p), Site::Line(l)) => (EdgeType::Parabola, point_line(p, l, sign)),
            (Site::Line(l), Site::Point(p)) => (EdgeType::Parabola, point_line(p, l, !sign)),
            (Site::Line(l1), Site::Line(l2)) => line_line(l1, l2),
            (Site::Point(p), Site::Arc(a)) => {
                let c1 = Circle { c: p.p, r: 0.0, lambda: 1.0 };
                circle_circle(c1, Circle::of_arc(a, &p.p), sign)
            }
            (Site::Arc(a), Site::Point(p)) => {
                let c1 = Circle { c: p.p, r: 0.0, lambda: 1.0 };
                circle_circle(c1, Circle::of_arc(a, &p.p), !sign)
            }
            (Site::Arc(a1), Site::Arc(a2)) => {
                circle_circle(Circle::of_arc(a1, &a2.center), Circle::of_arc(a2, &a1.center), sign)
            }
            (Site::Line(l), Site::Arc(a)) => (EdgeType::Parabola, line_arc(l, a, sign)),
            (Site::Arc(a), Site::Line(l)) => (EdgeType::Parabola, line_arc(l, a, !sign)),
        }
    }
}

#[inline]
fn side(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else {
        -1.0
    }
}

fn point_point(p1: &PointSite, p2: &PointSite, sign: bool) -> EdgeCurve {
    let d = (p2.p - p1.p).norm();
    let u = (p2.p - p1.p) / d;
    EdgeCurve {
        origin: p1.p + u * (d / 2.0),
        velocity: Point::zeros(),
        normal: u.xy_perp(),
        rad: (0.0, 1.0),
        off: (d / 2.0, 0.0),
        sign,
    }
}

fn point_line(p: &PointSite, l: &LineSite, sign: bool) -> EdgeCurve {
    let eq = l.eq();
    let n = Point::new(eq.a, eq.b);
    let alfa3 = n.dot(&p.p) + eq.c;
    let sigma = side(alfa3);
    EdgeCurve {
        origin: p.p - n * alfa3,
        velocity: n * sigma,
        normal: (n * sigma).xy_perp(),
        rad: (0.0, 1.0),
        off: (-alfa3, sigma),
        sign,
    }
}

fn line_arc(l: &LineSite, a: &ArcSite, sign: bool) -> EdgeCurve {
    let eq = l.eq();
    let n = Point::new(eq.a, eq.b);
    let alfa3 = n.dot(&a.center) + eq.c;
    let sigma = side(alfa3);
    let lambda = if alfa3.abs() > a.radius { 1.0 } else { -1.0 };
    EdgeCurve {
        origin: a.center - n * alfa3,
        velocity: n * sigma,
        normal: (n * sigma).xy_perp(),
        rad: (a.radius, lambda),
        off: (-alfa3, sigma),
        sign,
    }
}

fn line_line(l1: &LineSite, l2: &LineSite) -> (EdgeType, EdgeCurve) {
    let e1 = l1.eq();
    let e2 = l2.eq();
    let delta = e1.a * e2.b - e1.b * e2.a;
    if delta.abs() <= PARALLEL_EPS {
        let q1 = Point::new(e1.a, e1.b) * -e1.c;
        let q2 = Point::new(e2.a, e2.b) * -e2.c;
        let curve = EdgeCurve { origin: (q1 + q2) / 2.0, ..EdgeCurve::default() };
        return (EdgeType::ParaLineLine, curve);
    }
    // both sites offset towards their own face: k = +1
    let (k1, k2) = (1.0, 1.0);
    let origin = Point::new(
        (e1.b * e2.c - e2.b * e1.c) / delta,
        (e2.a * e1.c - e1.a * e2.c) / delta,
    );
    let velocity = Point::new((e1.b * k2 - e2.b * k1) / delta, (e2.a * k1 - e1.a * k2) / delta);
    (EdgeType::LineLine, EdgeCurve { origin, velocity, ..EdgeCurve::default() })
}

/// Circle view of a point or arc site: `|x - c| = r + lambda·t`.
#[derive(Clone, Copy, Debug)]
struct Circle {
    c: Point,
    r: f64,
    lambda: f64,
}

impl Circle {
    /// Arc seen from `other`: growing offsets when `other` lies outside the circle.
    fn of_arc(a: &ArcSite, other: &Point) -> Self {
        let lambda = if (other - a.center).norm() > a.radius { 1.0 } else { -1.0 };
        Self { c: a.center, r: a.radius, lambda }
    }
}

fn circle_circle(c1: Circle, c2: Circle, sign: bool) -> (EdgeType, EdgeCurve) {
    let kind = if c1.lambda < 0.0 || c2.lambda < 0.0 {
        EdgeType::Ellipse
    } else {
        EdgeType::Hyperbola
    };
    let diff = c2.c - c1.c;
    let d = diff.norm();
    if d == 0.0 {
        // concentric circles: the bisector is a circle, not representable here
        return (kind, EdgeCurve { origin: c1.c, sign, ..EdgeCurve::default() });
    }
    let u = diff / d;
    let s0 = (sq(c1.r) - sq(c2.r) + sq(d)) / (2.0 * d);
    let s1 = (c1.r * c1.lambda - c2.r * c2.lambda) / d;
    // apex direction: from the closest point of circle 2 towards the center of circle 1
    let apex_dir = -u * side(d - c2.r);
    (
        kind,
        EdgeCurve {
            origin: c1.c + u * s0,
            velocity: u * s1,
            normal: apex_dir.xy_perp(),
            rad: (c1.r, c1.lambda),
            off: (s0, s1),
            sign,
        },
    )
}

