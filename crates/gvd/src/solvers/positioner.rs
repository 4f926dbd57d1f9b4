//! Places a new vertex on an existing edge for a newly inserted site.
//!
//! The three defining sites are the faces on either side of the edge and the
//! new site `s3`. Candidates from the matching solver are filtered by the
//! edge's clearance range `[t_min, t_max]`, by the region of `s3`, and
//! finally by their distance to the edge curve. When nothing survives, a
//! bounded 1D minimization along the edge provides the vertex instead.

use tracing::warn;

use super::{
    AltSepSolver, LllParaSolver, LllSolver, PppSolver, QllSolver, SepRole, SepSolver, Solution,
    Solver,
};
use crate::hedi::{Edge, EdgeId, EdgeType, HalfEdgeDiagram};
use crate::numeric::brent_minimize;
use crate::point::{Point, PointExt};
use crate::site::Site;
use crate::vd::{InsertError, VdCfg};

/// Error assigned to the first candidate before any comparison.
const INITIAL_MIN_ERROR: f64 = 100.0;

/// Dispatches vertex positioning to the solvers and keeps error statistics.
#[derive(Clone, Debug)]
pub struct VertexPositioner {
    ppp: PppSolver,
    lll: LllSolver,
    lll_para: LllParaSolver,
    qll: QllSolver,
    sep: SepSolver,
    t_snap_eps: f64,
    dist_rel_tol: f64,
    on_edge_limit: f64,
    errstat: Vec<f64>,
}

/// Per-call state: the edge being split and its clearance range.
struct EdgeCtx<'a> {
    g: &'a HalfEdgeDiagram,
    id: EdgeId,
    edge: &'a Edge,
    t_min: f64,
    t_max: f64,
}

impl VertexPositioner {
    pub fn new(cfg: &VdCfg) -> Self {
        Self {
            ppp: PppSolver,
            lll: LllSolver {
                chop_eps: cfg.chop_eps,
                det_eps: cfg.lll_det_eps,
                para: LllParaSolver { det_eps: cfg.para_det_eps },
            },
            lll_para: LllParaSolver { det_eps: cfg.para_det_eps },
            qll: QllSolver { chop_eps: cfg.chop_eps },
            sep: SepSolver,
            t_snap_eps: cfg.t_snap_eps,
            dist_rel_tol: cfg.dist_rel_tol,
            on_edge_limit: cfg.on_edge_limit,
            errstat: Vec::new(),
        }
    }

    /// Largest distance deviation of every vertex positioned so far.
    pub fn error_stats(&self) -> &[f64] {
        &self.errstat
    }

    /// Position a new vertex on edge `e` equidistant to its two sites and `s3`.
    pub fn position(
        &mut self,
        g: &HalfEdgeDiagram,
        e: EdgeId,
        s3: &Site,
    ) -> Result<Solution, InsertError> {
        let edge = &g[e];
        let twin = edge.twin.ok_or(InsertError::Topology("positioned edge has no twin"))?;
        let t_src = g[edge.source].r;
        let t_trg = g[edge.target].r;
        let ctx = EdgeCtx { g, id: e, edge, t_min: t_src.min(t_trg), t_max: t_src.max(t_trg) };
        let s1 = g.site(edge.face).ok_or(InsertError::Topology("edge face has no site"))?;
        let s2 = g.site(g[twin].face).ok_or(InsertError::Topology("twin face has no site"))?;
        let sl = self.position_sites(&ctx, s1, f64::from(edge.k), s2, f64::from(g[twin].k), s3)?;

        let err = self.edge_error(&ctx, &sl);
        if err >= self.on_edge_limit {
            warn!(edge = e.0, err, "solution is not on the edge");
        }
        if !self.check_dist(s1, s2, s3, &sl) {
            warn!(edge = e.0, x = sl.p.x, y = sl.p.y, t = sl.t, "vertex is not equidistant to its sites");
        }
        Ok(sl)
    }

    fn position_sites(
        &self,
        ctx: &EdgeCtx<'_>,
        s1: &Site,
        k1: f64,
        s2: &Site,
        k2: f64,
        s3: &Site,
    ) -> Result<Solution, InsertError> {
        debug_assert!(k1 == 1.0 || k1 == -1.0);
        debug_assert!(k2 == 1.0 || k2 == -1.0);
        let mut solutions = Vec::new();
        self.dispatch(ctx, s1, k1, s2, k2, s3, 1.0, &mut solutions)?;
        if !s3.is_point() {
            self.dispatch(ctx, s1, k1, s2, k2, s3, -1.0, &mut solutions)?;
        }

        if let [only] = solutions.as_slice() {
            if ctx.t_min <= only.t && only.t <= ctx.t_max && s3.in_region(&only.p) {
                return Ok(*only);
            }
        }

        solutions.retain(|s| s3.in_region(&s.p) && self.t_in_range(ctx, s.t));
        match solutions.as_slice() {
            [] => Ok(self.desperate_solution(ctx, s3)),
            [only] => Ok(*only),
            _ => {
                let mut min_error = INITIAL_MIN_ERROR;
                let mut best = Solution::new(Point::zeros(), 0.0, 0.0);
                for s in &solutions {
                    let err = self.edge_error(ctx, s);
                    if err < min_error {
                        best = *s;
                        min_error = err;
                    }
                }
                Ok(best)
            }
        }
    }

    /// `t` within `[t_min, t_max]`, snapping values close to either end.
    fn t_in_range(&self, ctx: &EdgeCtx<'_>, t: f64) -> bool {
        let t = if (t - ctx.t_min).abs() < self.t_snap_eps {
            ctx.t_min
        } else if (t - ctx.t_max).abs() < self.t_snap_eps {
            ctx.t_max
        } else {
            t
        };
        ctx.t_min <= t && t <= ctx.t_max
    }

    #[allow(clippy::too_many_arguments)]
    fn dispatch(
        &self,
        ctx: &EdgeCtx<'_>,
        s1: &Site,
        k1: f64,
        s2: &Site,
        k2: f64,
        s3: &Site,
        k3: f64,
        out: &mut Vec<Solution>,
    ) -> Result<usize, InsertError> {
        let edge = ctx.edge;
        if edge.kind == EdgeType::Separator {
            let (mut s1, mut k1, mut s2, mut k2) = (s1, k1, s2, k2);
            if s1.is_line() && s2.is_line() {
                let null_face = edge
                    .null_face
                    .or_else(|| edge.twin.and_then(|tw| ctx.g[tw].null_face));
                if let Some(site) = null_face.and_then(|f| ctx.g.site(f)) {
                    s2 = site;
                    k2 = 1.0;
                }
            } else if s1.is_point() && s2.is_line() {
                std::mem::swap(&mut s1, &mut s2);
                std::mem::swap(&mut k1, &mut k2);
            }
            if !(s1.is_line() && s2.is_point()) {
                return Err(InsertError::Topology("separator without line and point site"));
            }
            return Ok(self.sep.solve(s1, k1, s2, k2, s3, k3, out));
        }
        if edge.kind == EdgeType::ParaLineLine && s3.is_line() {
            return Ok(self.lll_para.solve(s1, k1, s2, k2, s3, k3, out));
        }
        if s1.is_line() && s2.is_line() && s3.is_line() {
            return Ok(self.lll.solve(s1, k1, s2, k2, s3, k3, out));
        }
        if s1.is_point() && s2.is_point() && s3.is_point() {
            return Ok(self.ppp.solve(s1, 1.0, s2, 1.0, s3, 1.0, out));
        }
        if s3.is_line() {
            if s1.is_point() && self.detect_sep_case(ctx.g, s3, s1)? {
                return Ok(AltSepSolver::new(SepRole::First).solve(s1, k1, s2, k2, s3, k3, out));
            }
            if s2.is_point() && self.detect_sep_case(ctx.g, s3, s2)? {
                return Ok(AltSepSolver::new(SepRole::Second).solve(s1, k1, s2, k2, s3, k3, out));
            }
        }
        Ok(self.qll.solve(s1, k1, s2, k2, s3, k3, out))
    }

    /// True if `psite` is one of the endpoints of the inserted line site `lsite`.
    ///
    /// The endpoints are found through the null-faces around the source and
    /// target of the line site's pseudo-edge.
    fn detect_sep_case(
        &self,
        g: &HalfEdgeDiagram,
        lsite: &Site,
        psite: &Site,
    ) -> Result<bool, InsertError> {
        let le = lsite.edge().ok_or(InsertError::Topology("line site without pseudo-edge"))?;
        let pv = psite.vertex();
        for v in [g[le].source, g[le].target] {
            let null_edge = g[v]
                .out_edges()
                .iter()
                .copied()
                .filter(|&e| g[e].kind == EdgeType::NullEdge)
                .last()
                .ok_or(InsertError::Topology("segment endpoint without null-edge"))?;
            let mut f = g[null_edge].face;
            if !g[f].is_null_face {
                let tw = g[null_edge].twin.ok_or(InsertError::Topology("null-edge without twin"))?;
                f = g[tw].face;
            }
            let site = g.site(f).filter(|s| s.is_point());
            let Some(site) = site else {
                return Err(InsertError::Topology("null-face without point site"));
            };
            if site.vertex().is_some() && site.vertex() == pv {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Distance from a solution to the edge curve.
    fn edge_error(&self, ctx: &EdgeCtx<'_>, sl: &Solution) -> f64 {
        let p = if ctx.edge.kind == EdgeType::ParaLineLine {
            let p0 = ctx.g[ctx.edge.source].position;
            let p1 = ctx.g[ctx.edge.target].position;
            let v = p1 - p0;
            let t = ((sl.p - p0).dot(&v) / v.dot(&v)).clamp(0.0, 1.0);
            p0 + v * t
        } else {
            ctx.edge.point(sl.t)
        };
        (p - sl.p).norm()
    }

    /// Point on the edge at clearance `t`; LINELINE edges interpolate their endpoints.
    fn edge_point(ctx: &EdgeCtx<'_>, t: f64) -> Point {
        if ctx.edge.kind != EdgeType::LineLine {
            return ctx.edge.point(t);
        }
        let src = &ctx.g[ctx.edge.source];
        let trg = &ctx.g[ctx.edge.target];
        let (a, b) = if trg.r > src.r { (src, trg) } else { (trg, src) };
        if b.r == a.r {
            return a.position;
        }
        let frac = (t - a.r) / (b.r - a.r);
        a.position + (b.position - a.position) * frac
    }

    /// Minimize `|t − dist(edge(t), s3)|` along the edge.
    fn desperate_solution(&self, ctx: &EdgeCtx<'_>, s3: &Site) -> Solution {
        let err = |t: f64| {
            let p = Self::edge_point(ctx, t);
            (t - (p - s3.apex_point(&p)).norm()).abs()
        };
        let t = brent_minimize(err, ctx.t_min, ctx.t_max, 1e-10, 1e-14, 1000);
        let p = Self::edge_point(ctx, t);
        let k3 = match s3 {
            Site::Line(l) => {
                let on_right = p.is_right(&l.start, &l.end);
                match (on_right, l.k() == 1.0) {
                    (true, true) | (false, false) => -1.0,
                    _ => 1.0,
                }
            }
            Site::Point(_) => 1.0,
            Site::Arc(_) => 0.0,
        };
        warn!(edge = ctx.id.0, t, k3, "no solver candidate survived, using numeric search");
        Solution::new(p, t, k3)
    }

    /// Distances to the three defining sites agree with each other and with `t`.
    fn check_dist(&mut self, s1: &Site, s2: &Site, s3: &Site, sl: &Solution) -> bool {
        let d = [s1, s2, s3].map(|s| (sl.p - s.apex_point(&sl.p)).norm());
        let maxd = d.iter().map(|di| (sl.t - di).abs()).fold(0.0, f64::max);
        self.errstat.push(maxd);
        self.equal(d[0], d[1])
            && self.equal(d[0], d[2])
            && self.equal(d[1], d[2])
            && d.iter().all(|&di| self.equal(sl.t, di))
    }

    /// Largest deviation between `sl.t` and the distances to the three sites.
    pub fn dist_error(g: &HalfEdgeDiagram, e: EdgeId, sl: &Solution, s3: &Site) -> f64 {
        let edge = &g[e];
        let sites = [
            g.site(edge.face),
            edge.twin.and_then(|tw| g.site(g[tw].face)),
            Some(s3),
        ];
        sites
            .into_iter()
            .flatten()
            .map(|s| (sl.t - (sl.p - s.apex_point(&sl.p)).norm()).abs())
            .fold(0.0, f64::max)
    }

    fn equal(&self, d1: f64, d2: f64) -> bool {
        let diff = (d1 - d2).abs();
        diff < 1e-15 || diff <= self.dist_rel_tol * d1.max(d2)
    }
}
