//! Arena-backed half-edge diagram with the structural edits used by the builder.
//!
//! Vertices and edges are tombstoned on removal (`None` slots), so handles held
//! by callers never alias a later record. Indexing a removed handle panics.
//! There is no `prev` pointer: `previous_edge` walks the face cycle. Every
//! cycle walk is capped and reports a `next` chain that does not close as
//! `GraphError::OpenCycle`.

use std::collections::HashSet;
use std::ops::{Index, IndexMut};

use super::curve::EdgeCurve;
use super::types::{Edge, EdgeId, EdgeType, Face, FaceId, Vertex, VertexId};
use crate::point::Point;
use crate::site::Site;

/// Upper bound on a face cycle length; longer walks mean a broken `next` chain.
pub(crate) const MAX_FACE_WALK: usize = 3_000_000;

/// Structural damage found while walking or editing the diagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("face cycle through {0:?} does not close")]
    OpenCycle(EdgeId),
    #[error("edge {0:?} has no twin")]
    MissingTwin(EdgeId),
}

#[derive(Clone, Debug, Default)]
pub struct HalfEdgeDiagram {
    vertices: Vec<Option<Vertex>>,
    edges: Vec<Option<Edge>>,
    faces: Vec<Face>,
    live_vertices: usize,
    live_edges: usize,
}

impl HalfEdgeDiagram {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.live_vertices
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.live_edges
    }

    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of edges on the boundary of `f`.
    pub fn num_face_edges(&self, f: FaceId) -> Result<usize, GraphError> {
        Ok(self.face_edges(f)?.len())
    }

    /// Handles of all live vertices.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.iter().enumerate().filter(|(_, v)| v.is_some()).map(|(i, _)| VertexId(i))
    }

    /// Handles of all live half-edges.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.iter().enumerate().filter(|(_, e)| e.is_some()).map(|(i, _)| EdgeId(i))
    }

    pub fn faces(&self) -> impl Iterator<Item = FaceId> {
        (0..self.faces.len()).map(FaceId)
    }

    pub fn vertex(&self, v: VertexId) -> Option<&Vertex> {
        self.vertices.get(v.0).and_then(Option::as_ref)
    }

    pub fn edge(&self, e: EdgeId) -> Option<&Edge> {
        self.edges.get(e.0).and_then(Option::as_ref)
    }

    pub fn face(&self, f: FaceId) -> Option<&Face> {
        self.faces.get(f.0)
    }

    #[inline]
    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertex(v).is_some()
    }

    #[inline]
    pub fn contains_edge(&self, e: EdgeId) -> bool {
        self.edge(e).is_some()
    }

    /// Site of face `f` (null-faces carry the site of their endpoint).
    pub fn site(&self, f: FaceId) -> Option<&Site> {
        self.faces.get(f.0).and_then(|face| face.site.as_ref())
    }

    pub fn add_vertex(&mut self, v: Vertex) -> VertexId {
        self.vertices.push(Some(v));
        self.live_vertices += 1;
        VertexId(self.vertices.len() - 1)
    }

    pub fn add_face(&mut self, f: Face) -> FaceId {
        self.faces.push(f);
        FaceId(self.faces.len() - 1)
    }

    /// Directed edge `v1 -> v2` without twin, next or face.
    pub fn add_edge(&mut self, v1: VertexId, v2: VertexId) -> EdgeId {
        self.edges.push(Some(Edge::new(v1, v2)));
        self.live_edges += 1;
        let e = EdgeId(self.edges.len() - 1);
        self[v1].out_edges.push(e);
        self[v2].in_edges.push(e);
        e
    }

    /// Mutually twinned pair `v1 -> v2`, `v2 -> v1`.
    pub fn add_twin_edges(&mut self, v1: VertexId, v2: VertexId) -> (EdgeId, EdgeId) {
        let e1 = self.add_edge(v1, v2);
        let e2 = self.add_edge(v2, v1);
        self.twin_edges(e1, e2);
        (e1, e2)
    }

    pub fn twin_edges(&mut self, e1: EdgeId, e2: EdgeId) {
        debug_assert_eq!(self[e1].target, self[e2].source);
        debug_assert_eq!(self[e1].source, self[e2].target);
        self[e1].twin = Some(e2);
        self[e2].twin = Some(e1);
    }

    pub fn has_edge(&self, v1: VertexId, v2: VertexId) -> bool {
        self.edge_between(v1, v2).is_some()
    }

    /// Half-edge `v1 -> v2`, if present.
    pub fn edge_between(&self, v1: VertexId, v2: VertexId) -> Option<EdgeId> {
        self[v1].out_edges.iter().copied().find(|&e| self[e].target == v2)
    }

    pub fn adjacent_vertices(&self, v: VertexId) -> Vec<VertexId> {
        self[v].out_edges.iter().map(|&e| self[e].target).collect()
    }

    /// Distinct faces to the left of the out-edges of `v`.
    pub fn adjacent_faces(&self, v: VertexId) -> Vec<FaceId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for &e in &self[v].out_edges {
            let f = self[e].face;
            if seen.insert(f) {
                out.push(f);
            }
        }
        out
    }

    /// Boundary edges of `f`, starting at `f.edge`.
    pub fn face_edges(&self, f: FaceId) -> Result<Vec<EdgeId>, GraphError> {
        let start = self.faces[f.0].edge;
        let mut out = vec![start];
        let mut current = self[start].next;
        while current != start {
            if out.len() >= MAX_FACE_WALK {
                return Err(GraphError::OpenCycle(start));
            }
            out.push(current);
            current = self[current].next;
        }
        Ok(out)
    }

    /// Boundary vertices of `f`, as the targets of `face_edges(f)`.
    pub fn face_vertices(&self, f: FaceId) -> Result<Vec<VertexId>, GraphError> {
        Ok(self.face_edges(f)?.into_iter().map(|e| self[e].target).collect())
    }

    /// Edge whose `next` is `e`.
    pub fn previous_edge(&self, e: EdgeId) -> Result<EdgeId, GraphError> {
        let mut previous = self[e].next;
        for _ in 0..MAX_FACE_WALK {
            if self[previous].next == e {
                return Ok(previous);
            }
            previous = self[previous].next;
        }
        Err(GraphError::OpenCycle(e))
    }

    pub fn set_next(&mut self, e1: EdgeId, e2: EdgeId) {
        debug_assert_eq!(self[e1].target, self[e2].source);
        self[e1].next = e2;
    }

    /// Close `list` into the boundary cycle of `f` with offset direction `k`.
    pub fn set_next_cycle(&mut self, list: &[EdgeId], f: FaceId, k: i8) {
        self.set_next_chain(list, f, k);
        if let (Some(&last), Some(&first)) = (list.last(), list.first()) {
            self.set_next(last, first);
        }
    }

    /// Link `list` into an open chain on `f` with offset direction `k`.
    pub fn set_next_chain(&mut self, list: &[EdgeId], f: FaceId, k: i8) {
        if let Some(&first) = list.first() {
            self.faces[f.0].edge = first;
        }
        for &e in list {
            self[e].face = f;
            self[e].k = k;
        }
        for w in list.windows(2) {
            self.set_next(w[0], w[1]);
        }
    }

    /// Edges on the boundary of `f` leaving and entering `v`: `(next, prev)`.
    pub fn find_next_prev(
        &self,
        f: FaceId,
        v: VertexId,
    ) -> Result<Option<(EdgeId, EdgeId)>, GraphError> {
        let mut next_edge = None;
        let mut prev_edge = None;
        for e in self.face_edges(f)? {
            if self[e].source == v {
                next_edge = Some(e);
            }
            if self[e].target == v {
                prev_edge = Some(e);
            }
        }
        Ok(next_edge.zip(prev_edge))
    }

    pub fn remove_edge(&mut self, e: EdgeId) {
        let (src, trg) = (self[e].source, self[e].target);
        self[src].out_edges.retain(|&x| x != e);
        self[trg].in_edges.retain(|&x| x != e);
        self.edges[e.0] = None;
        self.live_edges -= 1;
    }

    pub fn remove_twin_edges(&mut self, v1: VertexId, v2: VertexId) {
        debug_assert!(self.has_edge(v1, v2) && self.has_edge(v2, v1));
        if let Some(e) = self.edge_between(v1, v2) {
            self.remove_edge(e);
        }
        if let Some(e) = self.edge_between(v2, v1) {
            self.remove_edge(e);
        }
    }

    /// Remove every edge incident to `v`, keeping `v` itself.
    pub fn clear_vertex(&mut self, v: VertexId) {
        let out = std::mem::take(&mut self[v].out_edges);
        for e in out {
            let trg = self[e].target;
            self[trg].in_edges.retain(|&x| x != e);
            if self.edges[e.0].take().is_some() {
                self.live_edges -= 1;
            }
        }
        let inc = std::mem::take(&mut self[v].in_edges);
        for e in inc {
            let src = self[e].source;
            self[src].out_edges.retain(|&x| x != e);
            if self.edges[e.0].take().is_some() {
                self.live_edges -= 1;
            }
        }
    }

    pub fn remove_vertex(&mut self, v: VertexId) {
        if self.vertices[v.0].take().is_some() {
            self.live_vertices -= 1;
        }
    }

    pub fn delete_vertex(&mut self, v: VertexId) {
        self.clear_vertex(v);
        self.remove_vertex(v);
    }

    /// Subdivide the twinned edge `e` at vertex `v`.
    ///
    /// `src -> trg` becomes `src -> v -> trg` on both sides; the four new
    /// half-edges inherit face, kind, `k` and curve from `e` or its twin.
    pub fn add_vertex_in_edge(&mut self, v: VertexId, e: EdgeId) -> Result<(), GraphError> {
        let e_twin = self[e].twin.ok_or(GraphError::MissingTwin(e))?;
        let esource = self[e].source;
        let etarget = self[e].target;
        let face = self[e].face;
        let twin_face = self[e_twin].face;
        let previous = self.previous_edge(e)?;
        let twin_previous = self.previous_edge(e_twin)?;
        debug_assert_eq!(self[previous].face, face);
        debug_assert_eq!(self[twin_previous].face, twin_face);

        let (e1, te2) = self.add_twin_edges(esource, v);
        let (e2, te1) = self.add_twin_edges(v, etarget);

        let e_next = self[e].next;
        let twin_next = self[e_twin].next;
        self[previous].next = e1;
        self[e1].next = e2;
        self[e2].next = e_next;
        self[twin_previous].next = te1;
        self[te1].next = te2;
        self[te2].next = twin_next;

        let (orig, orig_twin) = (self[e].clone(), self[e_twin].clone());
        self[e1].copy_from(&orig);
        self[e2].copy_from(&orig);
        self[te1].copy_from(&orig_twin);
        self[te2].copy_from(&orig_twin);

        self.faces[face.0].edge = e1;
        self.faces[twin_face.0].edge = te1;
        self.remove_edge(e);
        self.remove_edge(e_twin);
        Ok(())
    }

    /// Splice out a degree-2 vertex, joining its two neighbours with one twin pair.
    pub fn remove_deg2_vertex(&mut self, v: VertexId) -> Result<(), GraphError> {
        debug_assert_eq!(self[v].out_edges.len(), 2);
        let out0 = self[v].out_edges[0];
        let out1 = self[v].out_edges[1];
        let v1 = self[out0].target;
        let v2 = self[out1].target;
        let v1_next = self[out0].next;
        let v2_next = self[out1].next;
        let tw0 = self[out0].twin.ok_or(GraphError::MissingTwin(out0))?;
        let tw1 = self[out1].twin.ok_or(GraphError::MissingTwin(out1))?;
        let v1_prev = self.previous_edge(tw0)?;
        let v2_prev = self.previous_edge(tw1)?;
        let face1 = self[out1].face;
        let face2 = self[out0].face;

        let (new1, new2) = self.add_twin_edges(v1, v2);
        self.set_next(new1, v2_next);
        self.set_next(new2, v1_next);
        self.set_next(v2_prev, new2);
        self.set_next(v1_prev, new1);
        self.faces[face1.0].edge = new1;
        self.faces[face2.0].edge = new2;
        let (src1, src0) = (self[out1].clone(), self[out0].clone());
        self[new1].copy_from(&src1);
        self[new2].copy_from(&src0);

        self.remove_twin_edges(v, v1);
        self.remove_twin_edges(v, v2);
        self.remove_vertex(v);
        Ok(())
    }

    /// Set kind and curve of `e` to the bisector of `s1` and `s2` on branch `sign`.
    pub fn set_parameters(&mut self, e: EdgeId, s1: &Site, s2: &Site, sign: bool) {
        let (kind, curve) = EdgeCurve::bisector(s1, s2, sign);
        let edge = &mut self[e];
        edge.kind = kind;
        edge.curve = curve;
    }

    /// Turn `e` into a straight separator from `endp` through `p`.
    pub fn set_sep_parameters(&mut self, e: EdgeId, endp: Point, p: Point) {
        let edge = &mut self[e];
        edge.kind = EdgeType::Separator;
        edge.curve = EdgeCurve::separator(endp, p);
    }
}

impl Index<VertexId> for HalfEdgeDiagram {
    type Output = Vertex;
    fn index(&self, v: VertexId) -> &Vertex {
        match self.vertices.get(v.0) {
            Some(Some(vx)) => vx,
            _ => panic!("vertex {v:?} is not in the diagram"),
        }
    }
}

impl IndexMut<VertexId> for HalfEdgeDiagram {
    fn index_mut(&mut self, v: VertexId) -> &mut Vertex {
        match self.vertices.get_mut(v.0) {
            Some(Some(vx)) => vx,
            _ => panic!("vertex {v:?} is not in the diagram"),
        }
    }
}

impl Index<EdgeId> for HalfEdgeDiagram {
    type Output = Edge;
    fn index(&self, e: EdgeId) -> &Edge {
        match self.edges.get(e.0) {
            Some(Some(ed)) => ed,
            _ => panic!("edge {e:?} is not in the diagram"),
        }
    }
}

impl IndexMut<EdgeId> for HalfEdgeDiagram {
    fn index_mut(&mut self, e: EdgeId) -> &mut Edge {
        match self.edges.get_mut(e.0) {
            Some(Some(ed)) => ed,
            _ => panic!("edge {e:?} is not in the diagram"),
        }
    }
}

impl Index<FaceId> for HalfEdgeDiagram {
    type Output = Face;
    fn index(&self, f: FaceId) -> &Face {
        &self.faces[f.0]
    }
}

impl IndexMut<FaceId> for HalfEdgeDiagram {
    fn index_mut(&mut self, f: FaceId) -> &mut Face {
        &mut self.faces[f.0]
    }
}
