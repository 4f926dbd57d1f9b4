//! Half-edge diagram (DCEL) used to store the Voronoi diagram.
//!
//! Purpose
//! - Own all vertices, half-edges and faces in one arena addressed by small
//!   copyable handles (`VertexId`, `EdgeId`, `FaceId`).
//! - Provide the structural edits the incremental builder needs: twin pairs,
//!   edge subdivision, degree-2 splicing and face-cycle relinking.
//! - Carry the per-edge bisector parametrization (`EdgeCurve`) so consumers
//!   can sample edges at a clearance distance.
//!
//! Invariants (between insertions)
//! - `twin(twin(e)) == e` with swapped endpoints;
//! - every edge on a face cycle has the same `face` and the same `k`.

mod curve;
mod graph;
mod types;

pub use curve::EdgeCurve;
pub use graph::{GraphError, HalfEdgeDiagram};
pub use types::{
    Edge, EdgeId, EdgeType, Face, FaceId, FaceStatus, Vertex, VertexId, VertexStatus, VertexType,
};

#[cfg(test)]
mod tests;
