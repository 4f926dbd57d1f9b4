use super::*;
use crate::point::{Point, PointExt};
use crate::site::Site;
use nalgebra::vector;

/// Triangle a-b-c with an inner face (ccw) and an outer face (cw), all twinned.
fn triangle() -> (HalfEdgeDiagram, [VertexId; 3], FaceId, FaceId) {
    let mut g = HalfEdgeDiagram::new();
    let a = g.add_vertex(Vertex::new(vector![0.0, 0.0], VertexStatus::Undecided, VertexType::Normal));
    let b = g.add_vertex(Vertex::new(vector![1.0, 0.0], VertexStatus::Undecided, VertexType::Normal));
    let c = g.add_vertex(Vertex::new(vector![0.0, 1.0], VertexStatus::Undecided, VertexType::Normal));
    let inner = g.add_face(Face::new());
    let outer = g.add_face(Face::new());
    let (ab, ba) = g.add_twin_edges(a, b);
    let (bc, cb) = g.add_twin_edges(b, c);
    let (ca, ac) = g.add_twin_edges(c, a);
    g.set_next_cycle(&[ab, bc, ca], inner, 1);
    g.set_next_cycle(&[ac, cb, ba], outer, -1);
    (g, [a, b, c], inner, outer)
}

fn assert_consistent(g: &HalfEdgeDiagram) {
    for e in g.edges() {
        let ed = &g[e];
        assert_eq!(ed.face, g[ed.next].face, "face mismatch along next at {e:?}");
        assert_eq!(ed.k, g[ed.next].k);
        assert_eq!(ed.target, g[ed.next].source);
        if let Some(tw) = ed.twin {
            assert_eq!(g[tw].twin, Some(e));
            assert_eq!(g[tw].source, ed.target);
            assert_eq!(g[tw].target, ed.source);
        }
    }
}

#[test]
fn triangle_cycles_and_lookups() {
    let (g, [a, b, c], inner, outer) = triangle();
    assert_eq!(g.num_vertices(), 3);
    assert_eq!(g.num_edges(), 6);
    assert_eq!(g.num_faces(), 2);
    assert_eq!(g.num_face_edges(inner), Ok(3));
    assert_consistent(&g);
    assert!(g.has_edge(a, b) && g.has_edge(b, a));
    let ab = g.edge_between(a, b).unwrap();
    let ca = g.edge_between(c, a).unwrap();
    assert_eq!(g.previous_edge(ab), Ok(ca));
    let (next, prev) = g.find_next_prev(inner, a).unwrap().unwrap();
    assert_eq!(next, ab);
    assert_eq!(prev, ca);
    let mut fv = g.face_vertices(outer).unwrap();
    fv.sort();
    assert_eq!(fv, vec![a, b, c]);
    let mut adj = g.adjacent_faces(a);
    adj.sort();
    assert_eq!(adj, vec![inner, outer]);
    assert_eq!(g[a].degree(), 4);
}

#[test]
fn subdivide_then_splice_restores_counts() {
    let (mut g, [a, b, _c], inner, outer) = triangle();
    let ab = g.edge_between(a, b).unwrap();
    let m = g.add_vertex(Vertex::new(vector![0.5, 0.0], VertexStatus::New, VertexType::Split));
    g.add_vertex_in_edge(m, ab).unwrap();
    assert!(!g.contains_edge(ab));
    assert_eq!(g.num_edges(), 8);
    assert_eq!(g.num_face_edges(inner), Ok(4));
    assert_eq!(g.num_face_edges(outer), Ok(4));
    assert_eq!(g[m].degree(), 4);
    assert_consistent(&g);
    assert!(g.has_edge(a, m) && g.has_edge(m, b));
    assert_eq!(g[g.edge_between(m, b).unwrap()].face, inner);
    assert_eq!(g[g.edge_between(m, a).unwrap()].face, outer);
    assert_eq!(g[g.edge_between(m, a).unwrap()].k, -1);

    g.remove_deg2_vertex(m).unwrap();
    assert!(!g.contains_vertex(m));
    assert_eq!(g.num_vertices(), 3);
    assert_eq!(g.num_edges(), 6);
    assert_eq!(g.num_face_edges(inner), Ok(3));
    assert_eq!(g.num_face_edges(outer), Ok(3));
    assert_consistent(&g);
    let ab = g.edge_between(a, b).unwrap();
    assert_eq!(g[ab].face, inner);
    assert_eq!(g[g[ab].twin.unwrap()].face, outer);
}

#[test]
fn open_next_chain_is_reported() {
    let (mut g, [a, b, c], inner, _) = triangle();
    let ab = g.edge_between(a, b).unwrap();
    let bc = g.edge_between(b, c).unwrap();
    // a -> b -> c -> b -> c ... never returns to ab
    g[bc].next = bc;
    assert_eq!(g.face_edges(inner), Err(GraphError::OpenCycle(ab)));
    assert_eq!(g.face_vertices(inner), Err(GraphError::OpenCycle(ab)));
    assert_eq!(g.previous_edge(ab), Err(GraphError::OpenCycle(ab)));
    assert!(g.find_next_prev(inner, a).is_err());
    let m = g.add_vertex(Vertex::new(vector![0.5, 0.0], VertexStatus::New, VertexType::Split));
    assert_eq!(g.add_vertex_in_edge(m, ab), Err(GraphError::OpenCycle(ab)));
}

#[test]
fn subdividing_an_untwinned_edge_fails() {
    let mut g = HalfEdgeDiagram::new();
    let a = g.add_vertex(Vertex::new(vector![0.0, 0.0], VertexStatus::Undecided, VertexType::Normal));
    let b = g.add_vertex(Vertex::new(vector![1.0, 0.0], VertexStatus::Undecided, VertexType::Normal));
    let e = g.add_edge(a, b);
    let m = g.add_vertex(Vertex::new(vector![0.5, 0.0], VertexStatus::New, VertexType::Split));
    assert_eq!(g.add_vertex_in_edge(m, e), Err(GraphError::MissingTwin(e)));
    assert!(g.contains_edge(e));
}

#[test]
fn delete_vertex_detaches_all_edges() {
    let (mut g, [a, b, c], _, _) = triangle();
    g.delete_vertex(a);
    assert_eq!(g.num_vertices(), 2);
    assert_eq!(g.num_edges(), 2);
    assert!(g.vertex(a).is_none());
    assert_eq!(g[b].degree(), 2);
    assert_eq!(g[c].degree(), 2);
    assert_eq!(g.vertices().count(), 2);
}

#[test]
#[should_panic]
fn indexing_removed_vertex_panics() {
    let (mut g, [a, _, _], _, _) = triangle();
    g.delete_vertex(a);
    let _ = g[a].position;
}

#[test]
fn point_point_curve_is_equidistant() {
    let s1 = Site::point(vector![0.0, 0.0]);
    let s2 = Site::point(vector![2.0, 0.0]);
    let (kind, c) = EdgeCurve::bisector(&s1, &s2, true);
    assert_eq!(kind, EdgeType::Line);
    assert!((c.minimum_t() - 1.0).abs() < 1e-12);
    for t in [1.0, 1.5, 3.0] {
        let p = c.point(t);
        assert!(((p - vector![0.0, 0.0]).norm() - t).abs() < 1e-12);
        assert!(((p - vector![2.0, 0.0]).norm() - t).abs() < 1e-12);
        // positive branch: left of s1 -> s2
        if t > 1.0 {
            assert!(!p.is_right(&vector![0.0, 0.0], &vector![2.0, 0.0]));
        }
    }
    let (_, c2) = EdgeCurve::bisector(&s2, &s1, false);
    assert!((c2.point(2.0) - c.point(2.0)).norm() < 1e-12);
}

#[test]
fn point_line_curve_is_equidistant() {
    let p = vector![0.3, 0.5];
    let ps = Site::point(p);
    let ls = Site::line(vector![-1.0, 0.0], vector![1.0, 0.0], 1.0);
    let (kind, c) = EdgeCurve::bisector(&ps, &ls, true);
    assert_eq!(kind, EdgeType::Parabola);
    assert!((c.minimum_t() - 0.25).abs() < 1e-12);
    assert!((c.point(0.25) - vector![0.3, 0.25]).norm() < 1e-12);
    for t in [0.25, 0.4, 1.0] {
        for sign in [true, false] {
            let (_, c) = EdgeCurve::bisector(&ps, &ls, sign);
            let x = c.point(t);
            assert!(((x - p).norm() - t).abs() < 1e-12);
            assert!((x.y - t).abs() < 1e-12);
        }
    }
    // the + branch lies left of the apex direction (projection -> point, i.e. +y)
    assert!(c.point(1.0).x < p.x);
    let (_, swapped) = EdgeCurve::bisector(&ls, &ps, false);
    assert!((swapped.point(0.7) - c.point(0.7)).norm() < 1e-12);
}

#[test]
fn line_line_curve_and_parallel_case() {
    let l1 = Site::line(vector![0.0, 0.0], vector![1.0, 0.0], 1.0);
    let l2 = Site::line(vector![0.0, 1.0], vector![0.0, 0.0], 1.0);
    let (kind, c) = EdgeCurve::bisector(&l1, &l2, true);
    assert_eq!(kind, EdgeType::LineLine);
    let x = c.point(0.5);
    assert!((x - vector![0.5, 0.5]).norm() < 1e-12, "{x:?}");
    assert_eq!(c.minimum_t(), 0.0);

    let l3 = Site::line(vector![1.0, 2.0], vector![0.0, 2.0], 1.0);
    let (kind, c) = EdgeCurve::bisector(&l1, &l3, true);
    assert_eq!(kind, EdgeType::ParaLineLine);
    assert!((c.point(3.0).y - 1.0).abs() < 1e-12);
}

#[test]
fn point_arc_curve_is_equidistant() {
    let p = vector![3.0, 0.0];
    let ps = Site::point(p);
    let arc = Site::arc(vector![0.0, -1.0], vector![0.0, 1.0], vector![0.0, 0.0], false);
    let (kind, c) = EdgeCurve::bisector(&ps, &arc, true);
    assert_eq!(kind, EdgeType::Hyperbola);
    assert!((c.minimum_t() - 1.0).abs() < 1e-12);
    for t in [1.0, 2.0, 4.0] {
        let x = c.point(t);
        assert!(((x - p).norm() - t).abs() < 1e-9);
        assert!((x.norm() - 1.0 - t).abs() < 1e-9);
    }
}

#[test]
fn point_inside_arc_gives_an_ellipse() {
    let p = vector![0.5, 0.0];
    let ps = Site::point(p);
    let arc = Site::arc(vector![0.0, -2.0], vector![0.0, 2.0], vector![0.0, 0.0], false);
    for sign in [true, false] {
        let (kind, c) = EdgeCurve::bisector(&ps, &arc, sign);
        assert_eq!(kind, EdgeType::Ellipse);
        // foci at p and the arc center, distances summing to the radius
        for t in [0.8, 1.0, 1.2] {
            let x = c.point(t);
            assert!(((x - p).norm() - t).abs() < 1e-9);
            assert!((x.norm() - (2.0 - t)).abs() < 1e-9);
        }
    }
    let (kind, _) = EdgeCurve::bisector(&arc, &ps, true);
    assert_eq!(kind, EdgeType::Ellipse);
}

#[test]
fn arc_pairs_pick_ellipse_or_hyperbola() {
    let unit = Site::arc(vector![0.0, -1.0], vector![0.0, 1.0], vector![0.0, 0.0], false);
    let apart = Site::arc(vector![3.0, -1.0], vector![3.0, 1.0], vector![3.0, 0.0], false);
    let (kind, c) = EdgeCurve::bisector(&unit, &apart, true);
    assert_eq!(kind, EdgeType::Hyperbola);
    let x = c.point(2.0);
    assert!((x.norm() - 3.0).abs() < 1e-9);
    assert!(((x - vector![3.0, 0.0]).norm() - 3.0).abs() < 1e-9);

    let big = Site::arc(vector![0.0, -3.0], vector![0.0, 3.0], vector![0.0, 0.0], false);
    let small = Site::arc(vector![0.5, -0.5], vector![0.5, 0.5], vector![0.5, 0.0], false);
    let (kind, _) = EdgeCurve::bisector(&big, &small, true);
    assert_eq!(kind, EdgeType::Ellipse);
}

#[test]
fn separator_curve_is_a_ray() {
    let c = EdgeCurve::separator(vector![1.0, 1.0], vector![1.0, 3.0]);
    assert!((c.point(0.5) - vector![1.0, 1.5]).norm() < 1e-15);
    let degenerate = EdgeCurve::separator(vector![1.0, 1.0], vector![1.0, 1.0]);
    assert_eq!(degenerate.point(2.0), vector![1.0, 1.0]);
}

#[test]
fn set_parameters_updates_edge_kind() {
    let (mut g, [a, b, _], _, _) = triangle();
    let ab = g.edge_between(a, b).unwrap();
    let s1 = Site::point(vector![0.0, 0.0]);
    let s2 = Site::line(vector![0.0, 1.0], vector![1.0, 1.0], 1.0);
    g.set_parameters(ab, &s1, &s2, true);
    assert_eq!(g[ab].kind, EdgeType::Parabola);
    g.set_sep_parameters(ab, Point::new(0.0, 0.0), Point::new(1.0, 0.0));
    assert_eq!(g[ab].kind, EdgeType::Separator);
    assert!((g[ab].point(0.25) - vector![0.25, 0.0]).norm() < 1e-15);
}
