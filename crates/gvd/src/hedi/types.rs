//! Vertex, edge and face records of the half-edge diagram.
//!
//! Handles are plain indices into the arena owned by `HalfEdgeDiagram`. They
//! stay valid until the record is removed; faces are never removed.

use super::curve::EdgeCurve;
use crate::point::Point;
use crate::site::Site;

/// Handle of a vertex in the diagram arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// Handle of a half-edge in the diagram arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

/// Handle of a face in the diagram arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(pub usize);

impl EdgeId {
    /// Placeholder for a `next` link that has not been wired yet.
    pub const INVALID: EdgeId = EdgeId(usize::MAX);
}

impl FaceId {
    /// Placeholder for an edge whose face has not been assigned yet.
    pub const INVALID: FaceId = FaceId(usize::MAX);
}

/// Transient per-insertion vertex status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexStatus {
    /// Outside the region of the new site; survives.
    Out,
    /// Inside the region of the new site; deleted at the end of the insertion.
    In,
    /// Not yet decided.
    Undecided,
    /// Created during the current insertion.
    New,
}

/// Permanent vertex kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexType {
    /// Scaffold vertices of the far circle.
    Outer,
    /// Ordinary Voronoi vertex.
    Normal,
    /// Location of a point site (isolated, degree 0).
    PointSite,
    /// Segment endpoint on a null-face.
    Endpoint,
    /// Start of a separator on a null-face.
    SepPoint,
    /// Closest-approach point of a quadratic edge.
    Apex,
    /// Transient degree-2 vertex that breaks delete-tree cycles.
    Split,
}

impl VertexType {
    /// Degree (in + out half-edges) every vertex of this kind has between insertions.
    pub fn expected_degree(self) -> usize {
        match self {
            VertexType::Outer => 4,
            VertexType::Normal => 6,
            VertexType::PointSite => 0,
            VertexType::Endpoint => 6,
            VertexType::SepPoint => 6,
            VertexType::Split => 4,
            VertexType::Apex => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeType {
    /// Bisector of two point sites.
    Line,
    /// Bisector of two line sites.
    LineLine,
    /// Bisector of two parallel line sites.
    ParaLineLine,
    /// Scaffold edge of the far circle (no twin).
    OutEdge,
    /// Bisector of a point site and a line site (or a line site and an arc).
    Parabola,
    Ellipse,
    Hyperbola,
    /// Separator between a segment endpoint and the segment's offset region.
    Separator,
    /// Zero-length edge around a segment endpoint.
    NullEdge,
    /// Pseudo-edge of a line site.
    LineSite,
    /// Pseudo-edge of an arc site.
    ArcSite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceStatus {
    Incident,
    NonIncident,
}

#[derive(Clone, Debug)]
pub struct Vertex {
    pub position: Point,
    pub status: VertexStatus,
    pub kind: VertexType,
    /// Clearance-disk radius.
    pub r: f64,
    /// Offset direction (±1) towards the site being inserted.
    pub k3: i8,
    /// Diangle of a null-face vertex, −1 when unset.
    pub alfa: f64,
    /// Largest deviation between `r` and the distances to the defining sites.
    pub max_error: f64,
    pub in_queue: bool,
    /// Null-face of a segment endpoint.
    pub null_face: Option<FaceId>,
    /// Face of a point-site vertex.
    pub face: Option<FaceId>,
    pub(crate) out_edges: Vec<EdgeId>,
    pub(crate) in_edges: Vec<EdgeId>,
}

impl Vertex {
    pub fn new(position: Point, status: VertexStatus, kind: VertexType) -> Self {
        Self {
            position,
            status,
            kind,
            r: 0.0,
            k3: 0,
            alfa: -1.0,
            max_error: 0.0,
            in_queue: false,
            null_face: None,
            face: None,
            out_edges: Vec::new(),
            in_edges: Vec::new(),
        }
    }

    /// Vertex with clearance radius taken as the distance to `apex`.
    pub fn with_apex(position: Point, status: VertexStatus, kind: VertexType, apex: Point) -> Self {
        let mut v = Self::new(position, status, kind);
        v.r = (position - apex).norm();
        v
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.out_edges.len() + self.in_edges.len()
    }

    #[inline]
    pub fn out_edges(&self) -> &[EdgeId] {
        &self.out_edges
    }

    #[inline]
    pub fn in_edges(&self) -> &[EdgeId] {
        &self.in_edges
    }

    #[inline]
    pub fn dist(&self, p: &Point) -> f64 {
        (self.position - p).norm()
    }

    /// Set the clearance radius from the closest point `apex` of a defining site.
    #[inline]
    pub fn init_dist(&mut self, apex: &Point) {
        self.r = self.dist(apex);
    }

    /// In-circle predicate: negative when `p` is closer than the clearance radius.
    #[inline]
    pub fn in_circle(&self, p: &Point) -> f64 {
        self.dist(p) - self.r
    }

    pub fn set_alfa(&mut self, dir: &Point) {
        self.alfa = crate::numeric::diangle(dir.x, dir.y);
    }

    pub fn reset_status(&mut self) {
        self.in_queue = false;
        self.status = VertexStatus::Undecided;
    }
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub source: VertexId,
    pub target: VertexId,
    pub twin: Option<EdgeId>,
    pub next: EdgeId,
    pub face: FaceId,
    pub kind: EdgeType,
    /// Offset direction (±1) of the face on the left.
    pub k: i8,
    pub curve: EdgeCurve,
    /// Filter marker; topology is never changed by filtering.
    pub valid: bool,
    /// Point-site face on the endpoint side of a separator.
    pub null_face: Option<FaceId>,
    /// True for the start-to-end half of a LINESITE pseudo-edge.
    pub inserted_direction: bool,
}

impl Edge {
    pub(crate) fn new(source: VertexId, target: VertexId) -> Self {
        Self {
            source,
            target,
            twin: None,
            next: EdgeId::INVALID,
            face: FaceId::INVALID,
            kind: EdgeType::Line,
            k: 1,
            curve: EdgeCurve::default(),
            valid: true,
            null_face: None,
            inserted_direction: false,
        }
    }

    /// Copy the geometric and face data of `other`, keeping the topology links.
    pub(crate) fn copy_from(&mut self, other: &Edge) {
        self.face = other.face;
        self.k = other.k;
        self.kind = other.kind;
        self.curve = other.curve;
        self.null_face = other.null_face;
        self.valid = other.valid;
    }

    /// Point on the edge at clearance distance `t`.
    #[inline]
    pub fn point(&self, t: f64) -> Point {
        self.curve.point(t)
    }
}

#[derive(Clone, Debug)]
pub struct Face {
    /// One boundary edge of the face.
    pub edge: EdgeId,
    /// Generator of the face; null-faces carry the site of their endpoint.
    pub site: Option<Site>,
    pub status: FaceStatus,
    pub is_null_face: bool,
}

impl Face {
    pub fn new() -> Self {
        Self { edge: EdgeId::INVALID, site: None, status: FaceStatus::NonIncident, is_null_face: false }
    }
}

impl Default for Face {
    fn default() -> Self {
        Self::new()
    }
}
