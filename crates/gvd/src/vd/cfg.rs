//! Tolerances and limits for diagram construction.
//!
//! Policy
//! - Defaults reproduce the behaviour the regression scenarios were tuned on.
//!   Override through `VoronoiDiagram::with_cfg` only when experimenting with
//!   robustness; changing them is not needed for normal inputs.

/// Construction configuration (tolerances and iteration caps).
#[derive(Clone, Copy, Debug)]
pub struct VdCfg {
    /// Sites must lie strictly inside the circle of this radius around the origin.
    pub far_radius: f64,
    /// Solver intermediates with smaller magnitude are snapped to zero.
    pub chop_eps: f64,
    /// Snap distance of a solution `t` to the edge's `[t_min, t_max]` bounds.
    pub t_snap_eps: f64,
    /// Relative tolerance of the post-solve distance check.
    pub dist_rel_tol: f64,
    /// Largest accepted distance between a solution and its edge.
    pub on_edge_limit: f64,
    /// Determinant threshold below which the three-line system counts as singular.
    pub lll_det_eps: f64,
    /// Determinant threshold of the parallel-line 2x2 solve.
    pub para_det_eps: f64,
    /// Iteration cap of a single face-repair walk.
    pub repair_max_iter: usize,
    /// Iteration cap of the SPLIT vertex root search.
    pub split_max_iter: usize,
    /// Run the full diagram check after every insertion.
    pub check_each_insertion: bool,
}

impl Default for VdCfg {
    fn default() -> Self {
        Self {
            far_radius: 1.0,
            chop_eps: 1e-10,
            t_snap_eps: 1e-9,
            dist_rel_tol: 1e-3,
            on_edge_limit: 9e-4,
            lll_det_eps: 1e-6,
            para_det_eps: 1e-15,
            repair_max_iter: 30_000,
            split_max_iter: 500,
            check_each_insertion: cfg!(debug_assertions),
        }
    }
}
