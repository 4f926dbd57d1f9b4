use super::*;
use crate::hedi::EdgeType;
use nalgebra::vector;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn insert_points(vd: &mut VoronoiDiagram, pts: &[(f64, f64)]) -> Vec<VertexId> {
    pts.iter()
        .map(|&(x, y)| vd.insert_point_site(vector![x, y]).expect("point insertion"))
        .collect()
}

/// Every NORMAL vertex is equidistant (relative 1e-3) to the point sites of its faces.
fn assert_clearance(vd: &VoronoiDiagram) {
    let g = vd.graph();
    for v in g.vertices() {
        let vx = &g[v];
        if vx.kind != VertexType::Normal {
            continue;
        }
        for f in g.adjacent_faces(v) {
            if let Some(Site::Point(ps)) = g.site(f) {
                let d = (vx.position - ps.p).norm();
                assert!(
                    (d - vx.r).abs() <= 1e-3 * vx.r.max(1.0),
                    "vertex {v:?} at {:?}: distance {d} vs clearance {}",
                    vx.position,
                    vx.r
                );
            }
        }
    }
}

fn counts(vd: &VoronoiDiagram) -> (usize, usize, usize) {
    (vd.num_vertices(), vd.num_faces(), vd.num_edges())
}

#[test]
fn empty_diagram_is_valid() {
    let vd = VoronoiDiagram::new();
    assert!(vd.check());
    assert_eq!(vd.num_point_sites(), 0);
    assert_eq!(vd.num_faces(), 0);
    assert_eq!(vd.graph().num_faces(), 3);
    assert_eq!(vd.num_split_vertices(), 0);
    assert_clearance(&vd);
}

#[test]
fn three_points() {
    let mut vd = VoronoiDiagram::new();
    insert_points(&mut vd, &[(0.1, 0.2), (-0.3, 0.05), (0.25, -0.4)]);
    assert_eq!(vd.num_faces(), 3);
    assert_eq!(vd.num_point_sites(), 3);
    assert!(vd.check());
    assert_clearance(&vd);
}

#[test]
fn point_vertex_knows_its_face() {
    let mut vd = VoronoiDiagram::new();
    let v = vd.insert_point_site(vector![0.3, -0.1]).unwrap();
    let g = vd.graph();
    assert_eq!(g[v].kind, VertexType::PointSite);
    let f = g[v].face.expect("point-site face");
    assert_eq!(g.site(f).map(Site::position), Some(vector![0.3, -0.1]));
    assert_eq!(g.site(f).and_then(Site::vertex), Some(v));
}

#[test]
fn random_points_keep_clearance() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut vd = VoronoiDiagram::new();
    for _ in 0..100 {
        let p = vector![rng.gen_range(-0.7..0.7), rng.gen_range(-0.7..0.7)];
        vd.insert_point_site(p).unwrap();
    }
    assert_eq!(vd.num_point_sites(), 100);
    assert_eq!(vd.num_faces(), 100);
    assert!(vd.check());
    assert_clearance(&vd);
    assert!(!vd.error_stats().is_empty());
    assert!(vd.error_stats().iter().all(|e| e.is_finite() && *e < 1e-3));
}

#[test]
fn pentagon() {
    let pts = [(-0.1, -0.2), (0.2, 0.1), (0.4, 0.2), (0.6, 0.6), (-0.6, 0.3)];
    let mut vd = VoronoiDiagram::new();
    let ids = insert_points(&mut vd, &pts);
    assert!(vd.check());
    for i in 0..ids.len() {
        vd.insert_line_site(ids[i], ids[(i + 1) % ids.len()]).unwrap();
        assert!(vd.check(), "check failed after segment {i}");
        assert_eq!(vd.num_split_vertices(), 0);
    }
    assert_eq!(vd.num_line_sites(), 5);
    // five point faces, two faces per segment, one null-face per endpoint
    assert_eq!(vd.num_faces(), 5 + 10 + 5);
}

#[test]
fn single_segment_among_close_points() {
    let pts = [(-0.0256, -0.4051), (-0.1070, -0.3220), (-0.0841, -0.4092), (-0.0186, -0.4492)];
    let mut vd = VoronoiDiagram::new();
    let ids = insert_points(&mut vd, &pts);
    vd.insert_line_site(ids[0], ids[1]).unwrap();
    assert!(vd.check());
    assert_eq!(vd.num_line_sites(), 1);
}

#[test]
fn octagon_with_parallel_sides() {
    let pts = [
        (0.15907424869091413, -0.22755592000227737),
        (-0.158774429631718, -0.22755592000227737),
        (-0.158774429631718, 0.5000000000000007),
        (-0.44085019690616734, 0.5000000000000007),
        (-0.44085019690616734, -0.4999999999999993),
        (0.44085019690616595, -0.4999999999999993),
        (0.44085019690616595, 0.4999999999999993),
        (0.15907424869091413, 0.4999999999999993),
    ];
    let mut vd = VoronoiDiagram::new();
    let ids = insert_points(&mut vd, &pts);
    for i in 0..ids.len() {
        vd.insert_line_site(ids[i], ids[(i + 1) % ids.len()]).unwrap();
    }
    assert!(vd.check());
    assert_eq!(vd.num_line_sites(), 8);
}

#[test]
fn outside_far_circle_is_rejected_without_mutation() {
    let mut vd = VoronoiDiagram::new();
    insert_points(&mut vd, &[(0.1, 0.1), (-0.2, 0.3)]);
    let before = counts(&vd);
    for p in [vector![1.0, 0.0], vector![0.8, 0.8], vector![0.0, -3.0]] {
        let err = vd.insert_point_site(p).unwrap_err();
        assert!(matches!(err, InsertError::OutsideFarCircle { .. }));
        assert!(err.is_input_error());
    }
    assert_eq!(counts(&vd), before);
    assert_eq!(vd.num_point_sites(), 2);
    assert!(vd.check());
}

#[test]
fn larger_far_radius_accepts_more() {
    let cfg = VdCfg { far_radius: 2.0, ..VdCfg::default() };
    let mut vd = VoronoiDiagram::with_cfg(cfg);
    vd.insert_point_site(vector![1.5, 0.0]).unwrap();
    vd.insert_point_site(vector![-1.2, 0.9]).unwrap();
    assert!(vd.check());
    assert_eq!(vd.far_radius(), 2.0);
}

#[test]
fn duplicate_point_is_rejected() {
    let mut vd = VoronoiDiagram::new();
    insert_points(&mut vd, &[(0.1, 0.1), (0.3, -0.2)]);
    let before = counts(&vd);
    let err = vd.insert_point_site(vector![0.3, -0.2]).unwrap_err();
    assert_eq!(err, InsertError::DuplicateSite { x: 0.3, y: -0.2 });
    assert_eq!(counts(&vd), before);
}

#[test]
fn points_after_lines_are_rejected() {
    let mut vd = VoronoiDiagram::new();
    let ids = insert_points(&mut vd, &[(0.1, 0.1), (0.3, -0.2), (-0.4, 0.2)]);
    vd.insert_line_site(ids[0], ids[1]).unwrap();
    let before = counts(&vd);
    let err = vd.insert_point_site(vector![0.0, 0.5]).unwrap_err();
    assert_eq!(err, InsertError::PointAfterLine);
    assert!(err.is_input_error());
    assert_eq!(counts(&vd), before);
    assert_eq!(vd.num_point_sites(), 3);
}

#[test]
fn repair_cap_stops_a_point_insertion() {
    let cfg = VdCfg { repair_max_iter: 0, ..VdCfg::default() };
    let mut vd = VoronoiDiagram::with_cfg(cfg);
    let err = vd.insert_point_site(vector![0.1, 0.2]).unwrap_err();
    assert_eq!(err, InsertError::RepairDiverged(1));
    assert!(!err.is_input_error());
}

#[test]
fn split_root_cap_stops_a_segment_insertion() {
    // (0.05, 0.1) projects inside the segment, so its face gets a SPLIT vertex
    let cfg = VdCfg { split_max_iter: 0, ..VdCfg::default() };
    let mut vd = VoronoiDiagram::with_cfg(cfg);
    let ids = insert_points(&mut vd, &[(-0.5, 0.0), (0.5, 0.0), (0.05, 0.1)]);
    let err = vd.insert_line_site(ids[0], ids[1]).unwrap_err();
    assert_eq!(err, InsertError::RootNotFound);
    assert!(!err.is_input_error());
}

#[test]
fn bad_segment_handles_are_rejected() {
    let mut vd = VoronoiDiagram::new();
    let ids = insert_points(&mut vd, &[(0.1, 0.1), (0.3, -0.2), (-0.4, 0.2)]);
    let before = counts(&vd);
    assert_eq!(vd.insert_line_site(ids[0], ids[0]), Err(InsertError::DegenerateSegment));
    let ghost = VertexId(usize::MAX - 1);
    assert_eq!(vd.insert_line_site(ids[0], ghost), Err(InsertError::UnknownVertex(ghost)));
    let normal = vd
        .graph()
        .vertices()
        .find(|&v| vd.graph()[v].kind == VertexType::Normal)
        .expect("a diagram vertex");
    assert_eq!(vd.insert_line_site(normal, ids[1]), Err(InsertError::NotAPointSite(normal)));
    assert_eq!(counts(&vd), before);
    assert_eq!(vd.num_line_sites(), 0);
}

#[test]
fn crossing_segment_is_rejected() {
    let mut vd = VoronoiDiagram::new();
    let ids = insert_points(&mut vd, &[(-0.3, -0.3), (0.3, 0.35), (-0.3, 0.32), (0.31, -0.3)]);
    vd.insert_line_site(ids[0], ids[1]).unwrap();
    let before = counts(&vd);
    let err = vd.insert_line_site(ids[2], ids[3]).unwrap_err();
    assert_eq!(err, InsertError::SegmentIntersects);
    assert!(err.is_input_error());
    assert_eq!(counts(&vd), before);
    // the same segment again is a conflict too
    assert_eq!(vd.insert_line_site(ids[1], ids[0]), Err(InsertError::SegmentIntersects));
    assert!(vd.check());
}

#[test]
fn segments_sharing_an_endpoint_do_not_conflict() {
    let (a, b, c) = (vector![0.0, 0.0], vector![1.0, 0.0], vector![0.0, 1.0]);
    assert!(!segments_conflict(a, b, a, c));
    assert!(!segments_conflict(b, a, c, a));
    assert!(segments_conflict(a, b, b, a));
    // collinear overlap
    assert!(segments_conflict(a, b, vector![0.5, 0.0], vector![2.0, 0.0]));
    // touching in the interior
    assert!(segments_conflict(a, b, vector![0.5, 0.0], vector![0.5, 1.0]));
    // disjoint
    assert!(!segments_conflict(a, b, vector![0.0, 0.5], vector![1.0, 0.5]));
}

#[test]
fn filter_marks_and_resets_edges() {
    let pts = [(-0.1, -0.2), (0.2, 0.1), (0.4, 0.2), (0.6, 0.6), (-0.6, 0.3)];
    let mut vd = VoronoiDiagram::new();
    let ids = insert_points(&mut vd, &pts);
    for i in 0..ids.len() {
        vd.insert_line_site(ids[i], ids[(i + 1) % ids.len()]).unwrap();
    }
    let num_edges = vd.num_edges();
    vd.filter(&|g: &HalfEdgeDiagram, e: EdgeId| g[e].kind != EdgeType::LineSite);
    let invalid: Vec<EdgeId> = vd.graph().edges().filter(|&e| !vd.graph()[e].valid).collect();
    assert_eq!(invalid.len(), 10);
    assert!(invalid.iter().all(|&e| vd.graph()[e].kind == EdgeType::LineSite));
    assert_eq!(vd.num_edges(), num_edges);
    assert!(vd.check());

    vd.filter_reset();
    assert!(vd.graph().edges().all(|e| vd.graph()[e].valid));
}

#[test]
fn line_site_edges_carry_direction() {
    let mut vd = VoronoiDiagram::new();
    let ids = insert_points(&mut vd, &[(-0.2, 0.0), (0.3, 0.1), (0.0, 0.4)]);
    vd.insert_line_site(ids[0], ids[1]).unwrap();
    let g = vd.graph();
    let seg: Vec<EdgeId> = g.edges().filter(|&e| g[e].kind == EdgeType::LineSite).collect();
    assert_eq!(seg.len(), 2);
    let fwd = seg.iter().copied().find(|&e| g[e].inserted_direction).expect("start-to-end half");
    assert_eq!(g[fwd].k, -1);
    assert_eq!(g[g[fwd].source].position, vector![-0.2, 0.0]);
    assert_eq!(g[g[fwd].target].position, vector![0.3, 0.1]);
    // both endpoints now own a null-face
    for v in [ids[0], ids[1]] {
        let nf = g[v].null_face.expect("null-face");
        assert!(g[nf].is_null_face);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_face_count_ignores_insertion_order(
        pts in prop::collection::vec((-0.7f64..0.7, -0.7f64..0.7), 3..25),
        seed in any::<u64>(),
    ) {
        let close = pts.iter().enumerate().any(|(i, a)| {
            pts[..i].iter().any(|b| (a.0 - b.0).hypot(a.1 - b.1) < 1e-3)
        });
        prop_assume!(!close);

        let mut first = VoronoiDiagram::new();
        for &(x, y) in &pts {
            first.insert_point_site(vector![x, y]).unwrap();
        }
        let mut shuffled = pts.clone();
        shuffled.shuffle(&mut StdRng::seed_from_u64(seed));
        let mut second = VoronoiDiagram::new();
        for &(x, y) in &shuffled {
            second.insert_point_site(vector![x, y]).unwrap();
        }
        prop_assert!(first.check() && second.check());
        prop_assert_eq!(first.num_faces(), second.num_faces());
        prop_assert_eq!(first.num_point_sites(), second.num_point_sites());
        prop_assert_eq!(first.num_point_sites(), pts.len());
    }
}
