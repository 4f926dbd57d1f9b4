//! Incremental generalized Voronoi diagrams of points and line segments.
//!
//! Layout
//! - `point`, `numeric`: planar predicates, diangles, quadratic roots and the
//!   bounded Brent root finder/minimizer.
//! - `site`: point, line and arc generators with their implicit equations.
//! - `hedi`: arena half-edge diagram (vertices, edges, faces by index).
//! - `solvers`: three-site vertex solvers and the positioner choosing among them.
//! - `vd`: the Sugihara-Iri builder (`VoronoiDiagram`).
//! - `checker`: read-only topology checks run after every insertion.
//!
//! API Policy
//! - This crate is project-internal. There is no stable public API; `api`
//!   lists the intended entry points.

pub mod api;
pub mod checker;
pub mod hedi;
pub mod kdtree;
pub mod numeric;
pub mod point;
pub mod site;
pub mod solvers;
pub mod vd;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use nalgebra::Vector2 as Vec2;
pub use point::Point;
pub use vd::{InsertError, VdCfg, VoronoiDiagram};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::hedi::{EdgeId, EdgeType, FaceId, HalfEdgeDiagram, VertexId, VertexType};
    pub use crate::point::{Point, PointExt};
    pub use crate::site::Site;
    pub use crate::vd::{Filter, InsertError, VdCfg, VoronoiDiagram};
    pub use nalgebra::Vector2 as Vec2;
}
