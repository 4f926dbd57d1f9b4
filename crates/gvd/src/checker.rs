//! Read-only invariant checks over a half-edge diagram.
//!
//! `is_valid` combines the per-face checks (uniform face and `k` along each
//! boundary cycle, twin consistency) with the vertex degree check. The other
//! predicates look at vertex status runs and are used while debugging an
//! insertion. A face whose cycle does not close fails every check.

use crate::hedi::{EdgeId, FaceId, HalfEdgeDiagram, VertexId, VertexStatus};

/// Longest face cycle the checker is willing to walk.
const MAX_FACE_EDGES: usize = 10_000;

pub struct DiagramChecker<'a> {
    g: &'a HalfEdgeDiagram,
}

impl<'a> DiagramChecker<'a> {
    pub fn new(g: &'a HalfEdgeDiagram) -> Self {
        Self { g }
    }

    pub fn is_valid(&self) -> bool {
        self.all_faces_ok() && self.vertex_degree_ok()
    }

    /// Every vertex has the degree its type requires.
    pub fn vertex_degree_ok(&self) -> bool {
        self.g.vertices().all(|v| {
            let vx = &self.g[v];
            vx.degree() == vx.kind.expected_degree()
        })
    }

    pub fn all_in(&self, q: &[VertexId]) -> bool {
        q.iter().all(|&v| self.g[v].status == VertexStatus::In)
    }

    pub fn no_undecided_in_face(&self, f: FaceId) -> bool {
        self.g
            .face_vertices(f)
            .is_ok_and(|vs| vs.into_iter().all(|v| self.g[v].status != VertexStatus::Undecided))
    }

    /// The vertices of `f` with the given status form one contiguous run.
    pub fn face_vertices_connected(&self, f: FaceId, status: VertexStatus) -> bool {
        let Ok(edges) = self.g.face_edges(f) else {
            return false;
        };
        let count = edges.iter().filter(|&&e| self.g[self.g[e].target].status == status).count();
        if count <= 1 {
            return true;
        }
        let runs = edges
            .into_iter()
            .filter(|&e| {
                let ed = &self.g[e];
                self.g[ed.source].status != status && self.g[ed.target].status == status
            })
            .count();
        runs == 1
    }

    pub fn all_faces_ok(&self) -> bool {
        self.g.faces().all(|f| self.face_ok(f))
    }

    /// Uniform `k` (±1, +1 for point sites) and face along the boundary of `f`.
    pub fn face_ok(&self, f: FaceId) -> bool {
        let face = &self.g[f];
        let start = face.edge;
        if !self.g.contains_edge(start) {
            return false;
        }
        let k = self.g[start].k;
        if k != 1 && k != -1 {
            return false;
        }
        if face.site.as_ref().is_some_and(|s| s.is_point()) && k != 1 {
            return false;
        }
        let mut current = start;
        for _ in 0..MAX_FACE_EDGES {
            let e = &self.g[current];
            if e.k != k {
                return false;
            }
            if !self.g.contains_edge(e.next) || !self.current_face_equals_next_face(current) {
                return false;
            }
            if !self.check_edge(current) {
                return false;
            }
            current = e.next;
            if current == start {
                return true;
            }
        }
        false
    }

    pub fn current_face_equals_next_face(&self, e: EdgeId) -> bool {
        self.g[e].face == self.g[self.g[e].next].face
    }

    /// Twin links are mutual and have swapped endpoints (untwinned edges pass).
    pub fn check_edge(&self, e: EdgeId) -> bool {
        let ed = &self.g[e];
        let Some(tw) = ed.twin else {
            return true;
        };
        let Some(twin) = self.g.edge(tw) else {
            return false;
        };
        twin.twin == Some(e) && ed.source == twin.target && ed.target == twin.source
    }
}
