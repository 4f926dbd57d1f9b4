//! Per-insertion state and the steps shared by point and line insertion.
//!
//! Steps, in order:
//! 1. find a seed vertex on the face closest to the new site;
//! 2. grow the delete-tree of IN vertices (priority queue on |in-circle|);
//! 3. place a NEW vertex on every IN-OUT edge;
//! 4. split every INCIDENT face with a NEW-NEW edge (APEX split if needed);
//! 5. repair next-pointers, delete the IN vertices, reset all markers.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use tracing::{debug, trace};

use super::{InsertError, VdCfg};
use crate::hedi::{
    EdgeId, Face, FaceId, FaceStatus, HalfEdgeDiagram, Vertex, VertexId, VertexStatus, VertexType,
};
use crate::kdtree::KdTree;
use crate::point::{Point, PointExt};
use crate::site::Site;
use crate::solvers::VertexPositioner;

/// Queue entry ordered by decreasing |in-circle| value.
#[derive(Clone, Copy, Debug)]
struct Queued {
    v: VertexId,
    h: f64,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        self.h.abs().total_cmp(&other.h.abs())
    }
}

/// A NEW-NEW edge to add on face `f`: `v1_prv -> v1 ... v2_prv -> v2 -> v2_nxt`.
#[derive(Clone, Copy, Debug)]
pub(super) struct EdgeData {
    pub v1_prv: EdgeId,
    pub v1: VertexId,
    pub v1_nxt: EdgeId,
    pub v2_prv: EdgeId,
    pub v2: VertexId,
    pub v2_nxt: EdgeId,
    pub f: FaceId,
}

/// Scratch state of one insertion, discarded when the call returns.
pub(super) struct Insertion<'a> {
    pub g: &'a mut HalfEdgeDiagram,
    pub kd: &'a mut KdTree,
    pub vpos: &'a mut VertexPositioner,
    pub cfg: &'a VdCfg,
    /// Faces marked INCIDENT, in marking order.
    pub incident_faces: Vec<FaceId>,
    /// Vertices whose status must be reset at the end.
    pub modified: HashSet<VertexId>,
    /// The delete-tree.
    pub v0: Vec<VertexId>,
    queue: BinaryHeap<Queued>,
}

/// Offset direction as stored on vertices and edges.
fn sign_i8(k: f64) -> i8 {
    if k > 0.0 {
        1
    } else if k < 0.0 {
        -1
    } else {
        0
    }
}

impl<'a> Insertion<'a> {
    pub fn new(
        g: &'a mut HalfEdgeDiagram,
        kd: &'a mut KdTree,
        vpos: &'a mut VertexPositioner,
        cfg: &'a VdCfg,
    ) -> Self {
        Self {
            g,
            kd,
            vpos,
            cfg,
            incident_faces: Vec::new(),
            modified: HashSet::new(),
            v0: Vec::new(),
            queue: BinaryHeap::new(),
        }
    }

    /// Insert a point site at `p` and return its POINTSITE vertex.
    pub fn point_site(mut self, p: Point) -> Result<VertexId, InsertError> {
        let new_vert = self.g.add_vertex(Vertex::new(p, VertexStatus::Out, VertexType::PointSite));
        let mut site = Site::point(p);
        if let Site::Point(ps) = &mut site {
            ps.vertex = Some(new_vert);
        }
        let nearest = self.kd.nearest(&p).ok_or(InsertError::Topology("empty point-site index"))?;
        let seed = self.find_seed_vertex(nearest, &site)?;
        self.mark_vertex(seed, &site)?;
        self.augment_vertex_set(&site)?;
        self.add_vertices(&site)?;
        let newface = self.add_face(site);
        self.g[new_vert].face = Some(newface);
        for f in self.incident_faces.clone() {
            self.add_edges(newface, f, None, None)?;
        }
        self.repair_face(newface, None, None)?;
        self.remove_vertex_set();
        self.reset_status();
        Ok(new_vert)
    }

    /// NORMAL vertex of `f` with the most negative in-circle value for `site`.
    pub fn find_seed_vertex(&self, f: FaceId, site: &Site) -> Result<VertexId, InsertError> {
        self.seed_on_face(f, site)?
            .ok_or(InsertError::Topology("no seed vertex inside the new site's clearance disk"))
    }

    /// Like `find_seed_vertex`, but `None` when no candidate has a negative
    /// in-circle value, so the caller can try another face.
    pub fn seed_on_face(&self, f: FaceId, site: &Site) -> Result<Option<VertexId>, InsertError> {
        let mut min_pred = 0.0;
        let mut seed = None;
        for e in self.g.face_edges(f)? {
            let q = self.g[e].target;
            let qv = &self.g[q];
            if qv.status != VertexStatus::Out && qv.kind == VertexType::Normal {
                let h = qv.in_circle(&site.apex_point(&qv.position));
                if seed.is_none() || (h < min_pred && site.in_region(&qv.position)) {
                    min_pred = h;
                    seed = Some(q);
                }
            }
        }
        match seed {
            Some(v) if min_pred < 0.0 => {
                debug!(seed = v.0, h = min_pred, "seed vertex found");
                Ok(Some(v))
            }
            _ => Ok(None),
        }
    }

    /// Mark `v` IN, mark its faces INCIDENT and queue its UNDECIDED neighbours.
    pub fn mark_vertex(&mut self, v: VertexId, site: &Site) -> Result<(), InsertError> {
        self.g[v].status = VertexStatus::In;
        self.v0.push(v);
        self.modified.insert(v);
        if site.is_point() {
            self.mark_adjacent_faces_p(v);
        } else {
            self.mark_adjacent_faces(v, site)?;
        }
        let neighbours: Vec<VertexId> = self.g.adjacent_vertices(v);
        for w in neighbours {
            let wv = &self.g[w];
            if wv.status == VertexStatus::Undecided && !wv.in_queue {
                let h = wv.in_circle(&site.apex_point(&wv.position));
                self.queue.push(Queued { v: w, h });
                self.g[w].in_queue = true;
            }
        }
        Ok(())
    }

    fn mark_adjacent_faces_p(&mut self, v: VertexId) {
        for f in self.g.adjacent_faces(v) {
            if self.g[f].status != FaceStatus::Incident {
                self.g[f].status = FaceStatus::Incident;
                self.incident_faces.push(f);
            }
        }
    }

    /// Line and arc sites also get SPLIT vertices on every newly incident face.
    fn mark_adjacent_faces(&mut self, v: VertexId, site: &Site) -> Result<(), InsertError> {
        let faces = self.g.adjacent_faces(v);
        debug_assert!(
            faces.len() == 3
                || (matches!(self.g[v].kind, VertexType::Apex | VertexType::Split) && faces.len() == 2)
        );
        for f in faces {
            if self.g[f].status != FaceStatus::Incident {
                if site.is_line() {
                    self.add_split_vertex(f, site)?;
                }
                self.g[f].status = FaceStatus::Incident;
                self.incident_faces.push(f);
            }
        }
        Ok(())
    }

    /// Grow the delete-tree, most certain decisions first.
    ///
    /// A vertex with negative in-circle value becomes IN unless it would
    /// close a cycle (two IN neighbours), would disconnect the IN set on an
    /// incident face, or lies outside the new site's region.
    pub fn augment_vertex_set(&mut self, site: &Site) -> Result<(), InsertError> {
        while let Some(Queued { v, h }) = self.queue.pop() {
            debug_assert_eq!(self.g[v].status, VertexStatus::Undecided);
            if h < 0.0 {
                let pos = self.g[v].position;
                if self.predicate_c4(v) || !self.predicate_c5(v)? || !site.in_region(&pos) {
                    trace!(v = v.0, h, "rejected by tree conditions");
                    self.g[v].status = VertexStatus::Out;
                } else {
                    trace!(v = v.0, h, "marked in");
                    self.mark_vertex(v, site)?;
                }
            } else {
                self.g[v].status = VertexStatus::Out;
            }
            self.modified.insert(v);
        }
        debug!(num_in = self.v0.len(), faces = self.incident_faces.len(), "delete-tree grown");
        Ok(())
    }

    /// Two or more IN neighbours: marking `v` would close a cycle.
    fn predicate_c4(&self, v: VertexId) -> bool {
        self.g[v]
            .out_edges()
            .iter()
            .filter(|&&e| self.g[self.g[e].target].status == VertexStatus::In)
            .nth(1)
            .is_some()
    }

    /// Every INCIDENT face around `v` already holds an IN vertex adjacent to `v`.
    fn predicate_c5(&self, v: VertexId) -> Result<bool, InsertError> {
        if matches!(self.g[v].kind, VertexType::Apex | VertexType::Split) {
            return Ok(true);
        }
        let g = &*self.g;
        let faces: Vec<FaceId> = g[v]
            .out_edges()
            .iter()
            .map(|&e| g[e].face)
            .filter(|&f| g[f].status == FaceStatus::Incident)
            .collect();
        for f in faces {
            let connected = g.face_vertices(f)?.into_iter().any(|w| {
                if w == v {
                    return false;
                }
                let wv = &g[w];
                (wv.status == VertexStatus::In && g.has_edge(w, v))
                    || matches!(wv.kind, VertexType::Endpoint | VertexType::Apex | VertexType::Split)
                    || (wv.kind == VertexType::SepPoint && g.has_edge(w, v))
            });
            if !connected {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn find_in_out_edges(&self) -> Vec<EdgeId> {
        let mut out = Vec::new();
        for &v in &self.v0 {
            debug_assert_eq!(self.g[v].status, VertexStatus::In);
            for &e in self.g[v].out_edges() {
                if self.g[self.g[e].target].status == VertexStatus::Out {
                    out.push(e);
                }
            }
        }
        out
    }

    /// Place a NEW vertex on every IN-OUT edge.
    pub fn add_vertices(&mut self, site: &Site) -> Result<(), InsertError> {
        let edges = self.find_in_out_edges();
        if edges.is_empty() {
            return Err(InsertError::Topology("delete-tree has no IN-OUT edge"));
        }
        for e in edges {
            let sl = self.vpos.position(&*self.g, e, site)?;
            let max_error = VertexPositioner::dist_error(&*self.g, e, &sl, site);
            let mut q =
                Vertex::with_apex(sl.p, VertexStatus::New, VertexType::Normal, site.apex_point(&sl.p));
            q.k3 = sign_i8(sl.k3);
            q.max_error = max_error;
            let q = self.g.add_vertex(q);
            self.modified.insert(q);
            self.g.add_vertex_in_edge(q, e)?;
        }
        let num_new = self.modified.iter().filter(|&&v| self.g[v].status == VertexStatus::New).count();
        debug!(num_new, "new vertices placed");
        Ok(())
    }

    /// New face for `site`; point sites are also registered in the index.
    pub fn add_face(&mut self, site: Site) -> FaceId {
        let p = site.as_point().map(|s| s.p);
        let f = self.g.add_face(Face { site: Some(site), ..Face::new() });
        if let Some(p) = p {
            self.kd.insert(p, f);
        }
        f
    }

    /// NEW vertices of `f`, SEPPOINTs excluded.
    fn num_new_vertices(&self, f: FaceId) -> Result<usize, InsertError> {
        Ok(self
            .g
            .face_vertices(f)?
            .into_iter()
            .filter(|&v| self.g[v].status == VertexStatus::New && self.g[v].kind != VertexType::SepPoint)
            .count())
    }

    /// Split `f` with one NEW-NEW edge per pair of NEW vertices on it.
    ///
    /// `newface` is the `k = +1` face of the new site, `newface2` the `k = -1`
    /// face of a line site. `segment` holds the ENDPOINT vertices of a line site.
    pub fn add_edges(
        &mut self,
        newface: FaceId,
        f: FaceId,
        newface2: Option<FaceId>,
        segment: Option<(VertexId, VertexId)>,
    ) -> Result<(), InsertError> {
        let new_count = self.num_new_vertices(f)?;
        if new_count == 0 || new_count % 2 != 0 {
            return Err(InsertError::Topology("incident face has an odd number of NEW vertices"));
        }
        let mut startverts = Vec::with_capacity(new_count / 2);
        for _ in 0..new_count / 2 {
            let ed = self.find_edge_data(f, &startverts, segment)?;
            self.add_edge(&ed, newface, newface2)?;
            startverts.push(ed.v1);
        }
        debug!(face = f.0, edges = new_count / 2, "face split");
        Ok(())
    }

    /// Locate `OUT-NEW(v1)-IN ... IN-NEW(v2)-OUT` on `f`.
    ///
    /// `startverts` holds `v1` vertices already used on this face.
    fn find_edge_data(
        &self,
        f: FaceId,
        startverts: &[VertexId],
        segment: Option<(VertexId, VertexId)>,
    ) -> Result<EdgeData, InsertError> {
        let g = &*self.g;
        let is_endpoint = |v: VertexId| segment.is_some_and(|(a, b)| v == a || v == b);
        let edges = g.face_edges(f)?;
        let n = edges.len();
        let first = edges.iter().position(|&cur| {
            let next = g[cur].next;
            let prev_v = g[cur].source;
            let cur_v = g[cur].target;
            let next_v = g[next].target;
            let cv = &g[cur_v];
            cv.status == VertexStatus::New
                && cv.kind != VertexType::SepPoint
                && ((matches!(g[prev_v].status, VertexStatus::Out | VertexStatus::Undecided)
                    && !is_endpoint(prev_v))
                    || is_endpoint(next_v))
                && !startverts.contains(&cur_v)
        });
        let Some(i) = first else {
            return Err(InsertError::Topology("no OUT-NEW-IN vertex on incident face"));
        };
        let v1_prv = edges[i];
        let v1 = g[v1_prv].target;
        let v2_prv = (1..=n)
            .map(|j| edges[(i + j) % n])
            .find(|&cur| {
                let cv = g[cur].target;
                cv != v1 && g[cv].status == VertexStatus::New && g[cv].kind != VertexType::SepPoint
            })
            .ok_or(InsertError::Topology("no IN-NEW-OUT vertex on incident face"))?;
        Ok(EdgeData {
            v1_prv,
            v1,
            v1_nxt: g[v1_prv].next,
            v2_prv,
            v2: g[v2_prv].target,
            v2_nxt: g[v2_prv].next,
            f,
        })
    }

    /// Connect `ed.v1 -> ed.v2` across face `ed.f`, splitting at an APEX
    /// vertex when the two ends lie on different branches of the bisector.
    fn add_edge(
        &mut self,
        ed: &EdgeData,
        newface: FaceId,
        newface2: Option<FaceId>,
    ) -> Result<(), InsertError> {
        let EdgeData { v1_prv: new_previous, v1: new_source, v1_nxt: twin_next, f, .. } = *ed;
        let EdgeData { v2_prv: twin_previous, v2: new_target, v2_nxt: new_next, .. } = *ed;
        let g = &mut *self.g;
        let f_site = g.site(f).cloned().ok_or(InsertError::Topology("incident face has no site"))?;
        let new_face = if g[new_source].k3 == 1 {
            newface
        } else {
            newface2.ok_or(InsertError::Topology("NEW vertex on the negative side of a point site"))?
        };
        let new_site = g.site(new_face).cloned().ok_or(InsertError::Topology("new face has no site"))?;
        debug_assert_eq!(g[new_target].k3, g[new_source].k3);

        let src = g[new_source].position;
        let trg = g[new_target].position;
        let (mut src_sign, mut trg_sign) = (true, true);
        match (&f_site, &new_site) {
            (Site::Point(_), Site::Line(_)) => {
                let pt2 = f_site.position();
                let pt1 = new_site.apex_point(&pt2);
                src_sign = src.is_right(&pt1, &pt2);
                trg_sign = trg.is_right(&pt1, &pt2);
            }
            (Site::Point(_), Site::Arc(a)) => {
                let pt2 = f_site.position();
                let d = pt2 - a.center;
                let pt1 = a.center + d * (a.radius / d.norm());
                src_sign = src.is_right(&pt1, &pt2);
                trg_sign = trg.is_right(&pt1, &pt2);
            }
            (Site::Point(fp), Site::Point(np)) => {
                src_sign = src.is_right(&fp.p, &np.p);
                trg_sign = trg.is_right(&fp.p, &np.p);
            }
            // line-line bisectors have no square-root branch
            (Site::Line(_), Site::Line(_)) => {}
            (Site::Line(_), Site::Arc(a)) => {
                let pt2 = a.center;
                let pt1 = f_site.apex_point(&pt2);
                src_sign = src.is_right(&pt1, &pt2);
                trg_sign = trg.is_right(&pt1, &pt2);
                // a zero-clearance end sits on a null-face and its sign is unreliable
                let (rs, rt) = (g[new_source].r, g[new_target].r);
                if rs == 0.0 || rt == 0.0 {
                    if rs > rt {
                        src_sign = trg_sign;
                    } else {
                        trg_sign = src_sign;
                    }
                }
            }
            _ => return Err(InsertError::Topology("no apex-split sign rule for this site pair")),
        }

        let k3 = g[new_source].k3;
        if src_sign == trg_sign {
            let (e_new, e_twin) = g.add_twin_edges(new_source, new_target);
            debug_assert_eq!(g[new_next].k, g[new_previous].k);
            g[e_new].next = new_next;
            g[e_new].k = g[new_next].k;
            g[e_new].face = f;
            g[new_previous].next = e_new;
            g[f].edge = e_new;
            g.set_parameters(e_new, &f_site, &new_site, !src_sign);

            g[twin_previous].next = e_twin;
            g[e_twin].next = twin_next;
            g[e_twin].k = k3;
            g.set_parameters(e_twin, &f_site, &new_site, !src_sign);
            g[e_twin].face = new_face;
            g[new_face].edge = e_twin;
        } else {
            //   new_prv -> NEW --e1--> APEX --e2--> NEW -> new_nxt      (f)
            //   twn_nxt <- NEW <-e1_tw- APEX <-e2_tw- NEW <- twn_prv    (new_face)
            let apex = g.add_vertex(Vertex::new(Point::zeros(), VertexStatus::New, VertexType::Apex));
            let (e1, e1_tw) = g.add_twin_edges(new_source, apex);
            let (e2, e2_tw) = g.add_twin_edges(apex, new_target);
            g.set_parameters(e1, &f_site, &new_site, !src_sign);
            g.set_parameters(e2, &f_site, &new_site, !trg_sign);
            debug_assert_eq!(g[new_previous].face, f);
            debug_assert_eq!(g[new_next].face, f);
            debug_assert_eq!(g[new_next].k, g[new_previous].k);
            let k = g[new_next].k;
            g[new_previous].next = e1;
            g[e1].next = e2;
            g[e2].next = new_next;
            for e in [e1, e2] {
                g[e].face = f;
                g[e].k = k;
            }
            g[f].edge = e1;

            g.set_parameters(e1_tw, &new_site, &f_site, src_sign);
            g.set_parameters(e2_tw, &new_site, &f_site, trg_sign);
            debug_assert_eq!(g[twin_previous].k, g[twin_next].k);
            debug_assert_eq!(g[twin_previous].face, g[twin_next].face);
            g[twin_previous].next = e2_tw;
            g[e2_tw].next = e1_tw;
            g[e1_tw].next = twin_next;
            for e in [e1_tw, e2_tw] {
                g[e].face = new_face;
                g[e].k = k3;
            }
            g[new_face].edge = e1_tw;

            let curve = g[e1].curve;
            let pos = curve.point(curve.minimum_t());
            let apex_v = &mut g[apex];
            apex_v.position = pos;
            apex_v.init_dist(&f_site.apex_point(&pos));
            self.modified.insert(apex);
        }
        Ok(())
    }

    /// Re-link the boundary of `f` after its NEW-NEW edges were added.
    ///
    /// At each vertex the walk takes the out-edge that lies on `f` and leads
    /// to a NEW, ENDPOINT or SEPPOINT vertex. Null-edges next to a segment
    /// endpoint are pulled onto `f` when coming from a non-null edge.
    pub fn repair_face(
        &mut self,
        f: FaceId,
        segment: Option<(VertexId, VertexId)>,
        null_faces: Option<(FaceId, FaceId)>,
    ) -> Result<(), InsertError> {
        use crate::hedi::EdgeType::NullEdge;
        let g = &mut *self.g;
        let start = g[f].edge;
        let mut current = start;
        let mut steps = 0;
        loop {
            let cur_t = g[current].target;
            let cur_s = g[current].source;
            let outs = g[cur_t].out_edges().to_vec();
            for e in outs {
                let out_t = g[e].target;
                let ot_kind = g[out_t].kind;
                let wanted = g[out_t].status == VertexStatus::New
                    || matches!(ot_kind, VertexType::Endpoint | VertexType::SepPoint);
                if out_t == cur_s || !wanted {
                    continue;
                }
                let to_segment_end = segment.is_some_and(|(a, b)| out_t == a || out_t == b);
                let ef = g[e].face;
                let off_null_face = null_faces.map_or(true, |(a, b)| ef != a && ef != b);
                let pull = g[e].kind == NullEdge
                    && g[current].kind != NullEdge
                    && ((g[cur_t].kind == VertexType::SepPoint && ot_kind == VertexType::Endpoint)
                        || (g[cur_s].kind == VertexType::Endpoint && g[cur_t].kind == VertexType::Endpoint)
                        || to_segment_end)
                    && off_null_face;
                if pull {
                    g[e].face = f;
                    g[e].k = g[current].k;
                }
                if g[e].face == f {
                    debug_assert_eq!(g[current].k, g[e].k);
                    g[current].next = e;
                }
            }
            current = g[current].next;
            steps += 1;
            if steps > self.cfg.repair_max_iter {
                return Err(InsertError::RepairDiverged(steps));
            }
            if current == start {
                return Ok(());
            }
        }
    }

    /// Delete the IN vertices together with their edges.
    pub fn remove_vertex_set(&mut self) {
        for v in std::mem::take(&mut self.v0) {
            debug_assert_eq!(self.g[v].status, VertexStatus::In);
            self.g.delete_vertex(v);
            self.modified.remove(&v);
        }
    }

    /// Reset vertex and face markers for the next insertion.
    pub fn reset_status(&mut self) {
        for v in self.modified.drain() {
            if self.g.contains_vertex(v) {
                self.g[v].reset_status();
            }
        }
        for f in self.incident_faces.drain(..) {
            self.g[f].status = FaceStatus::NonIncident;
        }
        self.v0.clear();
    }
}
