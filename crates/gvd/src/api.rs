//! Curated surface for callers of the diagram (UNSTABLE).
//!
//! Important
//! - Convenience re-exports for the CLI, benches and downstream consumers
//!   (offset generators, filters, renderers). Breaking changes are allowed.
//! - Prefer these paths over reaching into submodules.

// Builder
pub use crate::vd::{Filter, InsertError, VdCfg, VoronoiDiagram};
// Read interface of the half-edge diagram
pub use crate::hedi::{
    Edge, EdgeCurve, EdgeId, EdgeType, Face, FaceId, FaceStatus, GraphError, HalfEdgeDiagram, Vertex,
    VertexId, VertexStatus, VertexType,
};
// Sites
pub use crate::site::{ArcSite, Equation, LineSite, OffsetElement, PointSite, Site};
// Verification
pub use crate::checker::DiagramChecker;
pub use crate::point::{Point, PointExt};
