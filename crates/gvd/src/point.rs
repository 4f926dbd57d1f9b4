//! 2D point primitive used throughout the diagram.
//!
//! `Point` is a plain `nalgebra::Vector2<f64>`; this module only adds the few
//! planar predicates the construction relies on (left perpendicular, signed
//! cross product, side test).

use nalgebra::Vector2;

/// Position or direction in the plane.
pub type Point = Vector2<f64>;

/// Planar helpers on top of `Vector2<f64>`.
pub trait PointExt {
    /// 2D cross product `self.x * q.y - self.y * q.x`.
    fn cross2(&self, q: &Point) -> f64;
    /// Perpendicular rotated 90 degrees to the left.
    fn xy_perp(&self) -> Point;
    /// True if `self` lies strictly to the right of the directed line `p1 -> p2`.
    fn is_right(&self, p1: &Point, p2: &Point) -> bool;
}

impl PointExt for Point {
    #[inline]
    fn cross2(&self, q: &Point) -> f64 {
        self.x * q.y - self.y * q.x
    }

    #[inline]
    fn xy_perp(&self) -> Point {
        Point::new(-self.y, self.x)
    }

    #[inline]
    fn is_right(&self, p1: &Point, p2: &Point) -> bool {
        (p2 - p1).cross2(&(self - p1)) < 0.0
    }
}
