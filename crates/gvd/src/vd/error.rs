//! Insertion errors.
//!
//! Two families:
//! - invalid input, detected before the diagram is touched; the diagram stays
//!   usable and the caller may continue with other sites;
//! - broken construction invariants, detected mid-insertion; the diagram must
//!   be discarded.

use crate::hedi::{GraphError, VertexId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InsertError {
    /// Site is not strictly inside the far circle.
    #[error("site ({x}, {y}) has norm {norm} and lies outside the far circle")]
    OutsideFarCircle { x: f64, y: f64, norm: f64 },

    /// A point site with the same coordinates is already in the diagram.
    #[error("a point site already exists at ({x}, {y})")]
    DuplicateSite { x: f64, y: f64 },

    /// Handle does not refer to a live vertex.
    #[error("vertex {0:?} is not in the diagram")]
    UnknownVertex(VertexId),

    /// Segment endpoints must be POINTSITE vertices.
    #[error("vertex {0:?} is not a point site")]
    NotAPointSite(VertexId),

    /// Both endpoints are the same vertex.
    #[error("segment endpoints coincide")]
    DegenerateSegment,

    /// The new segment crosses an already inserted segment.
    #[error("segment crosses an existing line site")]
    SegmentIntersects,

    /// Point sites cannot be added once line sites exist.
    #[error("point sites must be inserted before line sites")]
    PointAfterLine,

    /// Construction reached a topology it cannot resolve.
    #[error("topology invariant violated: {0}")]
    Topology(&'static str),

    /// Root search for a SPLIT vertex did not converge.
    #[error("root search for a split vertex did not converge")]
    RootNotFound,

    /// Face-repair walk exceeded its iteration cap.
    #[error("face repair did not close after {0} steps")]
    RepairDiverged(usize),
}

impl InsertError {
    /// True for errors that leave the diagram untouched.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            InsertError::OutsideFarCircle { .. }
                | InsertError::DuplicateSite { .. }
                | InsertError::UnknownVertex(_)
                | InsertError::NotAPointSite(_)
                | InsertError::DegenerateSegment
                | InsertError::SegmentIntersects
                | InsertError::PointAfterLine
        )
    }
}

impl From<GraphError> for InsertError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::OpenCycle(_) => InsertError::Topology("face cycle does not close"),
            GraphError::MissingTwin(_) => InsertError::Topology("edge without twin"),
        }
    }
}
