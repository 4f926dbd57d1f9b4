//! Incremental Voronoi diagram of point and line-segment sites.
//!
//! Purpose
//! - Own the half-edge diagram, the point-site index and the vertex positioner,
//!   and expose the two insertion operations plus read access for consumers.
//!
//! Why this design
//! - Topology-oriented incremental construction (Sugihara and Iri): every
//!   insertion grows a tree of IN vertices from a seed, places NEW vertices on
//!   IN-OUT edges, splits the incident faces and deletes the tree. The graph
//!   stays valid between insertions even when the geometry is inexact.
//! - All per-insertion scratch state (delete-tree, incident faces, queue)
//!   lives in an `Insertion` value built fresh for each call.
//!
//! Usage
//! - Insert every point site first, then connect point-site vertices with
//!   `insert_line_site`. All sites must lie strictly inside the far circle.
//!
//! References
//! - K. Sugihara, M. Iri, "Construction of the Voronoi diagram for 'one million'
//!   generators in single-precision arithmetic", Proc. IEEE 80(9), 1992.
//! - M. Held, "VRONI: an engineering approach to the reliable and efficient
//!   computation of Voronoi diagrams of points and line segments", 2001.

mod cfg;
mod error;
mod insert;
mod line;

pub use cfg::VdCfg;
pub use error::InsertError;

use tracing::debug;

use crate::checker::DiagramChecker;
use crate::hedi::{EdgeId, EdgeType, Face, FaceId, HalfEdgeDiagram, Vertex, VertexId};
use crate::hedi::{VertexStatus, VertexType};
use crate::kdtree::KdTree;
use crate::point::{Point, PointExt};
use crate::site::Site;
use crate::solvers::VertexPositioner;
use insert::Insertion;

/// Edge predicate used to mark a sub-graph through `Edge::valid`.
pub trait Filter {
    /// True if `e` belongs to the selected sub-graph.
    fn apply(&self, g: &HalfEdgeDiagram, e: EdgeId) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&HalfEdgeDiagram, EdgeId) -> bool,
{
    fn apply(&self, g: &HalfEdgeDiagram, e: EdgeId) -> bool {
        self(g, e)
    }
}

/// Number of far generator sites created by `initialize`.
const NUM_FAR_SITES: usize = 3;

#[derive(Clone, Debug)]
pub struct VoronoiDiagram {
    g: HalfEdgeDiagram,
    kd: KdTree,
    vpos: VertexPositioner,
    cfg: VdCfg,
    num_psites: usize,
    num_lsites: usize,
    num_asites: usize,
    segments: Vec<(VertexId, VertexId)>,
}

impl Default for VoronoiDiagram {
    fn default() -> Self {
        Self::new()
    }
}

impl VoronoiDiagram {
    pub fn new() -> Self {
        Self::with_cfg(VdCfg::default())
    }

    pub fn with_cfg(cfg: VdCfg) -> Self {
        let mut vd = Self {
            g: HalfEdgeDiagram::new(),
            kd: KdTree::new(),
            vpos: VertexPositioner::new(&cfg),
            cfg,
            num_psites: NUM_FAR_SITES,
            num_lsites: 0,
            num_asites: 0,
            segments: Vec::new(),
        };
        vd.initialize();
        vd
    }

    /// Seed the diagram with three far generators and the outer scaffold.
    ///
    /// The generators sit at three times the far radius, 120 degrees apart;
    /// the OUTER vertices at six times that. One NORMAL vertex at the origin
    /// and three APEX vertices (one per generator pair) complete the graph.
    fn initialize(&mut self) {
        let far = self.cfg.far_radius;
        let mult = 6.0;
        let s3 = 3f64.sqrt();
        let gen1 = Point::new(0.0, 3.0 * far);
        let gen2 = Point::new(-3.0 * s3 * far / 2.0, -3.0 * far / 2.0);
        let gen3 = Point::new(3.0 * s3 * far / 2.0, -3.0 * far / 2.0);
        let vd1 = Point::new(0.0, -3.0 * far * mult);
        let vd2 = Point::new(3.0 * s3 * far * mult / 2.0, 3.0 * far * mult / 2.0);
        let vd3 = Point::new(-3.0 * s3 * far * mult / 2.0, 3.0 * far * mult / 2.0);

        let g = &mut self.g;
        use VertexStatus::{Out, Undecided};
        let v00 = g.add_vertex(Vertex::with_apex(Point::zeros(), Undecided, VertexType::Normal, gen1));
        let v01 = g.add_vertex(Vertex::with_apex(vd1, Out, VertexType::Outer, gen3));
        let v02 = g.add_vertex(Vertex::with_apex(vd2, Out, VertexType::Outer, gen1));
        let v03 = g.add_vertex(Vertex::with_apex(vd3, Out, VertexType::Outer, gen2));
        let vert1 = g.add_vertex(Vertex::new(gen1, Out, VertexType::PointSite));
        let vert2 = g.add_vertex(Vertex::new(gen2, Out, VertexType::PointSite));
        let vert3 = g.add_vertex(Vertex::new(gen3, Out, VertexType::PointSite));
        let a1 = g.add_vertex(Vertex::with_apex((gen2 + gen3) * 0.5, Undecided, VertexType::Apex, gen2));
        let a2 = g.add_vertex(Vertex::with_apex((gen1 + gen3) * 0.5, Undecided, VertexType::Apex, gen3));
        let a3 = g.add_vertex(Vertex::with_apex((gen1 + gen2) * 0.5, Undecided, VertexType::Apex, gen1));

        // face 1 encloses gen3
        let e1_1 = g.add_edge(v00, a1);
        let e1_2 = g.add_edge(a1, v01);
        let e2 = g.add_edge(v01, v02);
        let e3_1 = g.add_edge(v02, a2);
        let e3_2 = g.add_edge(a2, v00);
        let f1 = add_site_face(g, &mut self.kd, gen3, vert3);
        g.set_next_cycle(&[e1_1, e1_2, e2, e3_1, e3_2], f1, 1);

        // face 2 encloses gen1
        let e4_1 = g.add_edge(v00, a2);
        let e4_2 = g.add_edge(a2, v02);
        let e5 = g.add_edge(v02, v03);
        let e6_1 = g.add_edge(v03, a3);
        let e6_2 = g.add_edge(a3, v00);
        let f2 = add_site_face(g, &mut self.kd, gen1, vert1);
        g.set_next_cycle(&[e4_1, e4_2, e5, e6_1, e6_2], f2, 1);

        // face 3 encloses gen2
        let e7_1 = g.add_edge(v00, a3);
        let e7_2 = g.add_edge(a3, v03);
        let e8 = g.add_edge(v03, v01);
        let e9_1 = g.add_edge(v01, a1);
        let e9_2 = g.add_edge(a1, v00);
        let f3 = add_site_face(g, &mut self.kd, gen2, vert2);
        g.set_next_cycle(&[e7_1, e7_2, e8, e9_1, e9_2], f3, 1);

        let (s1, s2, s3) = (Site::point(gen3), Site::point(gen1), Site::point(gen2));
        for (e, a, b, sign) in [
            (e1_1, &s1, &s3, false),
            (e1_2, &s1, &s3, true),
            (e3_1, &s2, &s1, true),
            (e3_2, &s2, &s1, false),
            (e4_1, &s2, &s1, false),
            (e4_2, &s2, &s1, true),
            (e6_1, &s2, &s3, false),
            (e6_2, &s2, &s3, true),
            (e7_1, &s2, &s3, true),
            (e7_2, &s2, &s3, false),
            (e9_1, &s1, &s3, true),
            (e9_2, &s1, &s3, false),
        ] {
            g.set_parameters(e, a, b, sign);
        }
        for e in [e2, e5, e8] {
            g[e].kind = EdgeType::OutEdge;
        }
        g.twin_edges(e1_1, e9_2);
        g.twin_edges(e1_2, e9_1);
        g.twin_edges(e3_1, e4_2);
        g.twin_edges(e3_2, e4_1);
        g.twin_edges(e6_1, e7_2);
        g.twin_edges(e6_2, e7_1);
        debug_assert!(DiagramChecker::new(&self.g).is_valid());
    }

    /// Insert a point site; returns its POINTSITE vertex.
    ///
    /// Every point site must be inserted before the first line site.
    pub fn insert_point_site(&mut self, p: Point) -> Result<VertexId, InsertError> {
        let norm = p.norm();
        if !(norm < self.cfg.far_radius) {
            return Err(InsertError::OutsideFarCircle { x: p.x, y: p.y, norm });
        }
        if self.num_lsites > 0 {
            return Err(InsertError::PointAfterLine);
        }
        let duplicate = self
            .kd
            .nearest(&p)
            .and_then(|f| self.g.site(f))
            .is_some_and(|s| s.position() == p);
        if duplicate {
            return Err(InsertError::DuplicateSite { x: p.x, y: p.y });
        }

        let v = Insertion::new(&mut self.g, &mut self.kd, &mut self.vpos, &self.cfg).point_site(p)?;
        self.num_psites += 1;
        debug!(vertex = v.0, x = p.x, y = p.y, faces = self.g.num_faces(), "point site inserted");
        self.post_check()?;
        Ok(v)
    }

    /// Insert the segment between two point-site vertices.
    pub fn insert_line_site(&mut self, start: VertexId, end: VertexId) -> Result<(), InsertError> {
        for v in [start, end] {
            let vx = self.g.vertex(v).ok_or(InsertError::UnknownVertex(v))?;
            if vx.kind != VertexType::PointSite || vx.face.is_none() {
                return Err(InsertError::NotAPointSite(v));
            }
        }
        if start == end {
            return Err(InsertError::DegenerateSegment);
        }
        let (p, q) = (self.g[start].position, self.g[end].position);
        let crosses = self.segments.iter().any(|&(a, b)| {
            segments_conflict(p, q, self.g[a].position, self.g[b].position)
        });
        if crosses {
            return Err(InsertError::SegmentIntersects);
        }

        Insertion::new(&mut self.g, &mut self.kd, &mut self.vpos, &self.cfg).line_site(start, end)?;
        self.num_lsites += 1;
        self.segments.push((start, end));
        debug!(start = start.0, end = end.0, faces = self.g.num_faces(), "line site inserted");
        self.post_check()
    }

    fn post_check(&self) -> Result<(), InsertError> {
        if self.cfg.check_each_insertion && !self.check() {
            return Err(InsertError::Topology("diagram check failed after insertion"));
        }
        Ok(())
    }

    /// Run the full topology check.
    pub fn check(&self) -> bool {
        DiagramChecker::new(&self.g).is_valid()
    }

    /// Read-only access to the half-edge diagram.
    pub fn graph(&self) -> &HalfEdgeDiagram {
        &self.g
    }

    pub fn cfg(&self) -> &VdCfg {
        &self.cfg
    }

    pub fn far_radius(&self) -> f64 {
        self.cfg.far_radius
    }

    /// Point sites inserted by the caller (the far generators do not count).
    pub fn num_point_sites(&self) -> usize {
        self.num_psites - NUM_FAR_SITES
    }

    pub fn num_line_sites(&self) -> usize {
        self.num_lsites
    }

    pub fn num_arc_sites(&self) -> usize {
        self.num_asites
    }

    /// Diagram vertices, excluding the POINTSITE vertices of caller sites.
    pub fn num_vertices(&self) -> usize {
        self.g.num_vertices() - self.num_point_sites()
    }

    /// Faces of caller sites and null-faces; the far generator faces do not count.
    pub fn num_faces(&self) -> usize {
        self.g.num_faces() - NUM_FAR_SITES
    }

    pub fn num_edges(&self) -> usize {
        self.g.num_edges()
    }

    /// SPLIT vertices left in the graph; zero between insertions.
    pub fn num_split_vertices(&self) -> usize {
        self.g.vertices().filter(|&v| self.g[v].kind == VertexType::Split).count()
    }

    /// Distance deviation of every vertex positioned so far.
    pub fn error_stats(&self) -> &[f64] {
        self.vpos.error_stats()
    }

    /// Mark every edge rejected by `flt` as invalid. Topology is untouched.
    pub fn filter<F: Filter + ?Sized>(&mut self, flt: &F) {
        let edges: Vec<EdgeId> = self.g.edges().collect();
        for e in edges {
            if !flt.apply(&self.g, e) {
                self.g[e].valid = false;
            }
        }
    }

    /// Mark every edge valid again.
    pub fn filter_reset(&mut self) {
        let edges: Vec<EdgeId> = self.g.edges().collect();
        for e in edges {
            self.g[e].valid = true;
        }
    }
}

/// Face of a far generator, registered in the point-site index.
fn add_site_face(g: &mut HalfEdgeDiagram, kd: &mut KdTree, p: Point, v: VertexId) -> FaceId {
    let mut site = Site::point(p);
    if let Site::Point(ps) = &mut site {
        ps.vertex = Some(v);
    }
    let f = g.add_face(Face { site: Some(site), ..Face::new() });
    g[v].face = Some(f);
    kd.insert(p, f);
    f
}

/// True if segment `p-q` crosses, touches or overlaps segment `a-b` anywhere
/// other than at a shared endpoint.
fn segments_conflict(p: Point, q: Point, a: Point, b: Point) -> bool {
    let orient = |o: Point, u: Point, w: Point| (u - o).cross2(&(w - o));
    let on_segment = |s: Point, e: Point, x: Point| {
        x != s && x != e && orient(s, e, x) == 0.0 && (x - s).dot(&(x - e)) < 0.0
    };
    let shared = [p, q].iter().filter(|x| **x == a || **x == b).count();
    if shared == 2 {
        return true;
    }
    if on_segment(p, q, a) || on_segment(p, q, b) || on_segment(a, b, p) || on_segment(a, b, q) {
        return true;
    }
    if shared == 1 {
        return false;
    }
    let d1 = orient(a, b, p);
    let d2 = orient(a, b, q);
    let d3 = orient(p, q, a);
    let d4 = orient(p, q, b);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

#[cfg(test)]
mod tests;
#[cfg(test)]
mod tests_regress;
