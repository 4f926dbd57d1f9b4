//! Line-site insertion: null-faces, separators and SPLIT vertices.
//!
//! A segment between two point-site vertices gets two faces, one per side
//! (`k = +1` left of `end -> start`, `k = -1` left of `start -> end`),
//! joined by a twin pair of LINESITE pseudo-edges. Each endpoint carries a
//! zero-area null-face whose boundary vertices sit on the endpoint, ordered
//! by diangle `alfa`. SEPARATOR edges leave the null-face along the segment
//! normal and split the endpoint's point-site face from the segment faces.
//!
//! SPLIT vertices are placed on point-site faces the segment region crosses,
//! so the delete-tree on such a face cannot close a cycle. They are removed
//! again before the insertion returns.

use tracing::{debug, trace};

use super::insert::Insertion;
use super::InsertError;
use crate::hedi::{EdgeId, EdgeType, Face, FaceId, FaceStatus, Vertex, VertexId, VertexStatus, VertexType};
use crate::numeric::{brent_root, diangle, diangle_mid};
use crate::point::{Point, PointExt};
use crate::site::Site;

/// Result of preparing the null-face at one segment endpoint.
#[derive(Clone, Copy, Debug)]
struct NullFaceInfo {
    /// ENDPOINT vertex of the new segment.
    endpoint: VertexId,
    null_face: FaceId,
    /// SEPPOINT sources of the separators to add, if any.
    pos_sep: Option<VertexId>,
    neg_sep: Option<VertexId>,
}

/// NEW vertex on a point-site face where a separator ends.
#[derive(Clone, Copy, Debug)]
struct SepTarget {
    v_previous: EdgeId,
    v_target: VertexId,
    v_next: EdgeId,
    /// Found as `OUT-NEW-IN` (true) or `IN-NEW-OUT` (false).
    out_new_in: bool,
}

impl Insertion<'_> {
    /// Insert the segment `start -> end`; both must be POINTSITE vertices.
    pub fn line_site(mut self, start: VertexId, end: VertexId) -> Result<(), InsertError> {
        for v in [start, end] {
            let vx = &mut self.g[v];
            vx.status = VertexStatus::Out;
            vx.r = 0.0;
        }
        let (src_se, trg_se) = (self.g[start].position, self.g[end].position);
        let left = (src_se + trg_se) * 0.5 + (trg_se - src_se).xy_perp();

        let mut pos_site = Site::line(trg_se, src_se, 1.0);
        let mut neg_site = Site::line(src_se, trg_se, -1.0);

        let seed_face = self.g[start].face.ok_or(InsertError::NotAPointSite(start))?;
        let end_face = self.g[end].face.ok_or(InsertError::NotAPointSite(end))?;
        let seed = self.line_seed(seed_face, end_face, &pos_site)?;
        self.mark_vertex(seed, &pos_site)?;
        self.augment_vertex_set(&pos_site)?;

        let dir1 = trg_se - src_se;
        let dir2 = src_se - trg_se;
        let nf_start = self.find_null_face(start, end, left, dir1, &pos_site)?;
        let nf_end = self.find_null_face(end, start, left, dir2, &pos_site)?;

        let g = &mut *self.g;
        let (pos_edge, neg_edge) = g.add_twin_edges(nf_end.endpoint, nf_start.endpoint);
        for (e, inserted, k) in [(pos_edge, false, 1), (neg_edge, true, -1)] {
            g[e].inserted_direction = inserted;
            g[e].kind = EdgeType::LineSite;
            g[e].k = k;
        }
        if let Site::Line(l) = &mut pos_site {
            l.edge = Some(pos_edge);
        }
        if let Site::Line(l) = &mut neg_site {
            l.edge = Some(neg_edge);
        }
        let pos_face = self.add_face(pos_site.clone());
        let neg_face = self.add_face(neg_site);
        let g = &mut *self.g;
        g[pos_face].edge = pos_edge;
        g[neg_face].edge = neg_edge;
        g[pos_edge].face = pos_face;
        g[neg_edge].face = neg_face;

        self.add_vertices(&pos_site)?;

        for (v, face, nf) in [(start, seed_face, nf_start), (end, end_face, nf_end)] {
            let pos_target = self.find_separator_target(face, nf.pos_sep, (src_se, trg_se), None)?;
            let taken = pos_target.map(|t| t.v_target);
            let neg_target = self.find_separator_target(face, nf.neg_sep, (src_se, trg_se), taken)?;
            self.add_separator(face, nf.null_face, pos_target, nf.pos_sep, pos_face, neg_face)?;
            self.add_separator(face, nf.null_face, neg_target, nf.neg_sep, pos_face, neg_face)?;
            self.g[face].status = FaceStatus::NonIncident;
            trace!(endpoint = v.0, "separators added");
        }

        let segment = Some((nf_start.endpoint, nf_end.endpoint));
        for f in self.incident_faces.clone() {
            if self.g[f].status == FaceStatus::Incident {
                self.add_edges(pos_face, f, Some(neg_face), segment)?;
            }
        }

        self.remove_vertex_set();
        let null_faces = Some((nf_start.null_face, nf_end.null_face));
        self.repair_face(pos_face, segment, null_faces)?;
        self.repair_face(neg_face, segment, null_faces)?;

        for f in self.incident_faces.clone() {
            self.remove_split_vertex(f)?;
        }
        self.reset_status();
        debug!(start = start.0, end = end.0, "segment faces closed");
        Ok(())
    }

    /// Seed vertex for a segment.
    ///
    /// The start face is tried first. When its vertices all project onto an
    /// endpoint (in-circle value zero up to rounding) the end face is tried,
    /// then the faces around the vertices of both.
    fn line_seed(
        &self,
        start_face: FaceId,
        end_face: FaceId,
        site: &Site,
    ) -> Result<VertexId, InsertError> {
        if let Some(v) = self.seed_on_face(start_face, site)? {
            return Ok(v);
        }
        debug!(face = start_face.0, "no seed on the start face");
        if let Some(v) = self.seed_on_face(end_face, site)? {
            return Ok(v);
        }
        let mut ring = Vec::new();
        for f in [start_face, end_face] {
            for v in self.g.face_vertices(f)? {
                for af in self.g.adjacent_faces(v) {
                    if af != start_face && af != end_face && !ring.contains(&af) {
                        ring.push(af);
                    }
                }
            }
        }
        let mut best: Option<(VertexId, f64)> = None;
        for f in ring {
            if self.g[f].is_null_face {
                continue;
            }
            if let Some(v) = self.seed_on_face(f, site)? {
                let h = self.g[v].in_circle(&site.apex_point(&self.g[v].position));
                if best.map_or(true, |(_, bh)| h < bh) {
                    best = Some((v, h));
                }
            }
        }
        best.map(|(v, _)| v)
            .ok_or(InsertError::Topology("no seed vertex inside the new site's clearance disk"))
    }

    /// Find or create the null-face at segment endpoint `start`.
    ///
    /// `other` is the opposite endpoint, `left` a point left of the segment
    /// and `dir` the direction from `start` into the segment.
    fn find_null_face(
        &mut self,
        start: VertexId,
        other: VertexId,
        left: Point,
        dir: Point,
        new_site: &Site,
    ) -> Result<NullFaceInfo, InsertError> {
        let (sp, op) = (self.g[start].position, self.g[other].position);
        let k3_sign = match new_site {
            Site::Line(_) => left.is_right(&sp, &op),
            Site::Arc(a) => a.center.is_right(&sp, &op),
            Site::Point(_) => return Err(InsertError::Topology("null-face for a point site")),
        };

        if let Some(null_face) = self.g[start].null_face {
            let mut seg_start = Vertex::new(sp, VertexStatus::Out, VertexType::Endpoint);
            seg_start.set_alfa(&dir);
            let seg_start = self.g.add_vertex(seg_start);
            let insert_edge = self
                .g
                .face_edges(null_face)?
                .into_iter()
                .find(|&e| {
                    self.g[e].twin.is_some_and(|tw| self.g[self.g[tw].face].status == FaceStatus::Incident)
                })
                .ok_or(InsertError::Topology("no null-edge next to an incident face"))?;
            self.g.add_vertex_in_edge(seg_start, insert_edge)?;

            let (next_edge, prev_edge) = self
                .g
                .find_next_prev(null_face, seg_start)?
                .ok_or(InsertError::Topology("endpoint not on its null-face"))?;
            let neg_sep = self.process_null_edge(dir, next_edge, k3_sign, true)?;
            let pos_sep = self.process_null_edge(dir, prev_edge, k3_sign, false)?;
            debug!(endpoint = start.0, "existing null-face extended");
            return Ok(NullFaceInfo { endpoint: seg_start, null_face, pos_sep, neg_sep });
        }

        //  neg_sep -> seg_endp -> pos_sep, all at the endpoint position
        let start_face = self.g[start].face.ok_or(InsertError::NotAPointSite(start))?;
        let null_face = self.g.add_face(Face { is_null_face: true, ..Face::new() });

        let mut seg_start = Vertex::new(sp, VertexStatus::Out, VertexType::Endpoint);
        seg_start.set_alfa(&dir);
        let mut pos_sep = Vertex::new(sp, VertexStatus::Undecided, VertexType::SepPoint);
        let mut neg_sep = Vertex::new(sp, VertexStatus::Undecided, VertexType::SepPoint);
        (pos_sep.k3, neg_sep.k3) = if k3_sign { (1, -1) } else { (-1, 1) };
        pos_sep.set_alfa(&dir.xy_perp());
        neg_sep.set_alfa(&(-dir.xy_perp()));
        let g = &mut *self.g;
        let seg_start = g.add_vertex(seg_start);
        let pos_sep = g.add_vertex(pos_sep);
        let neg_sep = g.add_vertex(neg_sep);

        let (e1, e1_tw) = g.add_twin_edges(seg_start, pos_sep);
        let (e2, e2_tw) = g.add_twin_edges(pos_sep, neg_sep);
        let (e3, e3_tw) = g.add_twin_edges(neg_sep, seg_start);
        g.set_next_cycle(&[e1, e2, e3], null_face, 1);
        // the reversed cycle is spliced into the start face by the separators
        let start_face_edge = g[start_face].edge;
        g.set_next_cycle(&[e3_tw, e2_tw, e1_tw], start_face, 1);
        g[start_face].edge = start_face_edge;
        g[null_face].edge = e1;
        for e in [e1, e2, e3, e1_tw, e2_tw, e3_tw] {
            g[e].kind = EdgeType::NullEdge;
        }
        g[start].null_face = Some(null_face);
        g[null_face].site = g[start_face].site.clone();
        debug!(endpoint = start.0, face = null_face.0, "null-face created");
        Ok(NullFaceInfo { endpoint: seg_start, null_face, pos_sep: Some(pos_sep), neg_sep: Some(neg_sep) })
    }

    /// Prepare the null-edge next to a new ENDPOINT on an existing null-face.
    ///
    /// `next_prev` is true for the edge leaving the endpoint. Returns the
    /// SEPPOINT a separator should start from, if one is needed.
    fn process_null_edge(
        &mut self,
        dir: Point,
        next_edge: EdgeId,
        k3: bool,
        next_prev: bool,
    ) -> Result<Option<VertexId>, InsertError> {
        let g = &mut *self.g;
        debug_assert_eq!(g[next_edge].kind, EdgeType::NullEdge);
        let (src, trg) = (g[next_edge].source, g[next_edge].target);
        let adj = if next_prev { trg } else { src };
        let sep_dir = if next_prev { dir.xy_perp() } else { -dir.xy_perp() };
        let sep_alfa = diangle(sep_dir.x, sep_dir.y);
        let new_k3: i8 = if next_prev == k3 { 1 } else { -1 };

        if g[adj].kind == VertexType::Endpoint {
            let src_pos = g[src].position;
            let mut new_v = Vertex::with_apex(src_pos, VertexStatus::New, VertexType::Normal, src_pos);
            new_v.alfa = diangle_mid(g[src].alfa, g[trg].alfa);
            new_v.k3 = new_k3;
            let new_v = g.add_vertex(new_v);
            self.modified.insert(new_v);
            g.add_vertex_in_edge(new_v, next_edge)?;
            return Ok(None);
        }

        let (mid, seppoint_pred) = if next_prev {
            let next_trg = g[g[next_edge].next].target;
            (diangle_mid(g[src].alfa, g[next_trg].alfa), g[next_trg].kind != VertexType::Endpoint)
        } else {
            let prev_src = g[g.previous_edge(next_edge)?].source;
            (diangle_mid(g[prev_src].alfa, g[trg].alfa), g[prev_src].kind != VertexType::Endpoint)
        };

        let adj_out = g[adj]
            .out_edges()
            .iter()
            .find(|&&e| g[e].kind != EdgeType::NullEdge)
            .map(|&e| g[e].target)
            .ok_or(InsertError::Topology("null-face vertex without a diagram edge"))?;

        if matches!(g[adj_out].status, VertexStatus::Out | VertexStatus::Undecided) {
            let mut sep = Vertex::new(g[src].position, VertexStatus::Out, VertexType::SepPoint);
            sep.set_alfa(&sep_dir);
            sep.k3 = new_k3;
            let sep = g.add_vertex(sep);
            g.add_vertex_in_edge(sep, next_edge)?;
            self.modified.insert(sep);
            return Ok(Some(sep));
        }

        // push and convert the existing vertex
        let a = &mut g[adj];
        let sep_point = if seppoint_pred {
            a.alfa = sep_alfa;
            a.kind = VertexType::SepPoint;
            Some(adj)
        } else {
            a.alfa = mid;
            a.kind = VertexType::Normal;
            None
        };
        a.status = VertexStatus::New;
        a.k3 = new_k3;
        self.modified.insert(adj);
        Ok(sep_point)
    }

    /// NEW vertex on `f` with the same `k3` as `endp`, where its separator ends.
    ///
    /// `seg` is the new segment as `(start, end)` positions and `taken` a
    /// vertex already used by the other separator on this face. When no
    /// vertex carries a matching `k3`, which happens when the positioner
    /// rounds a solution onto the wrong side of a nearly collinear segment,
    /// the target is chosen geometrically: the `OUT-NEW-IN` or `IN-NEW-OUT`
    /// vertex on the separator's side of the segment that lies closest to
    /// the endpoint normal. Its `k3` is then corrected.
    fn find_separator_target(
        &mut self,
        f: FaceId,
        endp: Option<VertexId>,
        seg: (Point, Point),
        taken: Option<VertexId>,
    ) -> Result<Option<SepTarget>, InsertError> {
        let Some(endp) = endp else {
            return Ok(None);
        };
        let g = &*self.g;
        let outside = |s: VertexStatus| matches!(s, VertexStatus::Out | VertexStatus::Undecided);
        let mut candidates = Vec::new();
        for cur in g.face_edges(f)? {
            let next = g[cur].next;
            let prv = g[g[cur].source].status;
            let v = g[cur].target;
            let nxt = g[g[next].target].status;
            if g[v].status != VertexStatus::New || v == endp || Some(v) == taken {
                continue;
            }
            let out_new_in = outside(prv) && nxt == VertexStatus::In;
            let in_new_out = prv == VertexStatus::In && outside(nxt);
            if !(out_new_in || in_new_out) {
                continue;
            }
            let target = SepTarget { v_previous: cur, v_target: v, v_next: next, out_new_in };
            if g[endp].k3 == g[v].k3 {
                return Ok(Some(target));
            }
            candidates.push(target);
        }

        let (sp, ep) = seg;
        let dir = (ep - sp).normalize();
        let origin = g[endp].position;
        let k3 = g[endp].k3;
        let on_side = |p: &Point| {
            let c = dir.cross2(&(p - sp));
            if k3 == 1 {
                c <= 0.0
            } else {
                c >= 0.0
            }
        };
        let target = candidates
            .into_iter()
            .filter(|t| on_side(&g[t.v_target].position))
            .min_by(|a, b| {
                let da = dir.dot(&(g[a.v_target].position - origin)).abs();
                let db = dir.dot(&(g[b.v_target].position - origin)).abs();
                da.total_cmp(&db)
            })
            .ok_or(InsertError::Topology("no separator target on endpoint face"))?;
        debug!(v = target.v_target.0, k3, "separator target chosen by side of the segment");
        self.g[target.v_target].k3 = k3;
        Ok(Some(target))
    }

    /// Add the SEPARATOR edge from `sep_endp` to `target` on the point-site face `f`.
    fn add_separator(
        &mut self,
        f: FaceId,
        null_face: FaceId,
        target: Option<SepTarget>,
        sep_endp: Option<VertexId>,
        pos_face: FaceId,
        neg_face: FaceId,
    ) -> Result<(), InsertError> {
        let (Some(sep_endp), Some(target)) = (sep_endp, target) else {
            return Ok(());
        };
        let g = &mut *self.g;
        debug_assert!(g[sep_endp].k3 == 1 || g[sep_endp].k3 == -1);
        g[sep_endp].r = 0.0;

        let (endp_next_tw, endp_prev_tw) = g
            .find_next_prev(null_face, sep_endp)?
            .ok_or(InsertError::Topology("separator source not on its null-face"))?;
        let (Some(endp_prev), Some(endp_next)) = (g[endp_next_tw].twin, g[endp_prev_tw].twin) else {
            return Err(InsertError::Topology("null-edge without twin"));
        };

        let SepTarget { v_previous, v_target, v_next, out_new_in } = target;
        debug_assert_eq!(g[sep_endp].k3, g[v_target].k3);
        let seg_face = |k: i8| if k == -1 { neg_face } else { pos_face };

        let (e2, e2_tw) = g.add_twin_edges(sep_endp, v_target);
        // the point-site side keeps k = +1; the segment side takes the target's k3
        if out_new_in {
            let k = g[v_target].k3;
            g[e2].k = k;
            g[e2_tw].k = 1;
            g[e2_tw].face = f;
            g[e2_tw].null_face = Some(f);
            g[f].edge = e2_tw;
            g[endp_prev].k = k;
            let sf = seg_face(k);
            g[e2].face = sf;
            g[sf].edge = e2;
            g[endp_prev].face = sf;
            g.set_next(v_previous, e2_tw);
            g.set_next(e2_tw, endp_next);
            g[endp_next].face = f;
            g[endp_next].k = 1;
            g.set_next(e2, v_next);
        } else {
            let k = g[v_target].k3;
            g[e2].k = 1;
            g[e2_tw].k = k;
            g[e2].face = f;
            g[e2].null_face = Some(f);
            g[f].edge = e2;
            g[endp_next].k = k;
            let sf = seg_face(k);
            g[e2_tw].face = sf;
            g[sf].edge = e2_tw;
            g[endp_next].face = sf;
            g.set_next(v_previous, e2_tw);
            g[endp_prev].face = f;
            g[endp_prev].k = 1;
            g.set_next(endp_prev, e2);
            g.set_next(e2, v_next);
        }
        let (ep, tp) = (g[sep_endp].position, g[v_target].position);
        g.set_sep_parameters(e2, ep, tp);
        g.set_sep_parameters(e2_tw, ep, tp);
        trace!(from = sep_endp.0, to = v_target.0, out_new_in, "separator added");
        Ok(())
    }

    /// Place SPLIT vertices on the boundary of point-site face `f` where the
    /// normal of segment `s` through the point site crosses it.
    pub(super) fn add_split_vertex(&mut self, f: FaceId, s: &Site) -> Result<(), InsertError> {
        let Some(line) = s.as_line() else {
            return Ok(());
        };
        let Some(Site::Point(fs)) = self.g.site(f) else {
            return Ok(());
        };
        let pt1 = fs.p;
        if pt1 == line.start || pt1 == line.end || !s.in_region(&pt1) {
            return Ok(());
        }
        let eq = s.eq();
        let pt2 = pt1 - Point::new(eq.a, eq.b);

        for split_edge in self.find_split_edges(f, &pt1, &pt2)? {
            if matches!(self.g[split_edge].kind, EdgeType::Separator | EdgeType::LineSite) {
                return Ok(());
            }
            let edge = &self.g[split_edge];
            let (rs, rt) = (self.g[edge.source].r, self.g[edge.target].r);
            let (min_t, max_t) = (rs.min(rt), rs.max(rt));
            let curve = edge.curve;
            let err = |t: f64| {
                let p = curve.point(t);
                let d = pt2 - pt1;
                let proj = pt1 + d * ((p - pt1).dot(&d) / d.dot(&d));
                let dist = (proj - p).norm();
                if p.is_right(&pt1, &pt2) {
                    dist
                } else {
                    -dist
                }
            };
            if err(min_t) * err(max_t) >= 0.0 {
                return Ok(());
            }
            let t = brent_root(err, min_t, max_t, 1e-20, self.cfg.split_max_iter)
                .ok_or(InsertError::RootNotFound)?;
            let pos = curve.point(t);
            let v = self.g.add_vertex(Vertex::with_apex(pos, VertexStatus::Undecided, VertexType::Split, pt1));
            self.g.add_vertex_in_edge(v, split_edge)?;
            trace!(face = f.0, v = v.0, t, "split vertex placed");
        }
        Ok(())
    }

    /// Edges of `f` starting at a diagram vertex whose ends lie on opposite
    /// sides of the line `pt1 -> pt2`.
    fn find_split_edges(
        &self,
        f: FaceId,
        pt1: &Point,
        pt2: &Point,
    ) -> Result<Vec<EdgeId>, InsertError> {
        let g = &*self.g;
        Ok(g.face_edges(f)?
            .into_iter()
            .filter(|&e| {
                let src = &g[g[e].source];
                let trg = &g[g[e].target];
                matches!(src.kind, VertexType::Normal | VertexType::Apex | VertexType::Split)
                    && src.position.is_right(pt1, pt2) != trg.position.is_right(pt1, pt2)
            })
            .collect())
    }

    /// Splice every SPLIT vertex out of the boundary of `f`.
    fn remove_split_vertex(&mut self, f: FaceId) -> Result<(), InsertError> {
        while let Some(v) =
            self.g.face_vertices(f)?.into_iter().find(|&v| self.g[v].kind == VertexType::Split)
        {
            if self.g[v].out_edges().len() != 2 {
                return Err(InsertError::Topology("split vertex is not of degree two"));
            }
            self.g.remove_deg2_vertex(v)?;
            self.modified.remove(&v);
        }
        Ok(())
    }
}
