//! Inputs that once broke the construction: separator placement, nearly
//! collinear point clusters and short segments close to other sites.

use super::*;
use nalgebra::vector;

/// Insert `pts`, then the segments `(i, j)` (0-based into `pts`), checking after each.
fn build(pts: &[(f64, f64)], segs: &[(usize, usize)]) -> VoronoiDiagram {
    let mut vd = VoronoiDiagram::new();
    let ids: Vec<VertexId> = pts
        .iter()
        .map(|&(x, y)| vd.insert_point_site(vector![x, y]).expect("point insertion"))
        .collect();
    for &(i, j) in segs {
        vd.insert_line_site(ids[i], ids[j]).expect("segment insertion");
        assert!(vd.check(), "check failed after segment ({i}, {j})");
        assert_eq!(vd.num_split_vertices(), 0);
    }
    assert_eq!(vd.num_point_sites(), pts.len());
    assert_eq!(vd.num_line_sites(), segs.len());
    vd
}

#[test]
fn separator_positioning_minimized() {
    build(
        &[
            (-0.2567719874411157, -0.4983049800651602),
            (-0.25972854724944455, -0.5143879072702902),
            (-0.34168692840153536, -0.6418861147966213),
            (-0.5288215108461576, 0.18480346369654843),
            (-0.35263585687204546, -0.50735692278175),
        ],
        &[(1, 2), (3, 4)],
    );
}

#[test]
fn separator_positioning_full() {
    build(
        &[
            (-0.2567719874411157, -0.4983049800651602),
            (0.12205285479992212, -0.640371712930281),
            (-0.25972854724944455, -0.5143879072702902),
            (-0.34168692840153536, -0.6418861147966213),
            (-0.5288215108461576, 0.18480346369654843),
            (-0.35263585687204546, -0.50735692278175),
            (-0.4821854389417177, 0.46463421861462373),
        ],
        &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 0)],
    );
}

#[test]
fn short_segment_near_cluster() {
    build(
        &[
            (-0.0255809378746924, -0.40506709848555283),
            (-0.1070304600334181, -0.32199887924165504),
            (-0.08412200854010599, -0.4091862019580794),
            (-0.018610976572355775, -0.44924671559984736),
        ],
        &[(0, 1)],
    );
}

#[test]
fn flat_cluster_first() {
    build(
        &[
            (-0.4569868959788259, -0.6901889429096152),
            (-0.4777558843163665, -0.6741982953078733),
            (-0.5828928817215249, -0.6506785938772909),
            (-0.6509162259830449, -0.6905569065947034),
        ],
        &[(0, 1)],
    );
}

#[test]
fn flat_cluster_second() {
    build(
        &[
            (-0.26416290615203275, -0.6167731946769498),
            (-0.49700490843397843, -0.642139619517225),
            (-0.4540183254084518, -0.6092924695453144),
            (-0.5513893549317856, -0.5712639908621272),
        ],
        &[(0, 1)],
    );
}

#[test]
fn flat_cluster_three_segments() {
    build(
        &[
            (0.41164403323558574, -0.6789386939364543),
            (0.17427452375132169, -0.6522148409835533),
            (0.15951277675921582, -0.6538785084950686),
            (0.3890141779152667, -0.6928288255549844),
            (0.3860913593953006, -0.6919949537598736),
            (0.42532972342719244, -0.6914003202947938),
            (-0.16212113598677202, -0.6733320323817963),
        ],
        &[(3, 4), (0, 1), (5, 6)],
    );
}

#[test]
fn open_chain_along_a_line() {
    build(
        &[
            (0.3862126318449599, 0.5264600856031032),
            (0.6865969842890696, -0.21517998694176943),
            (0.6346354715467906, -0.08747150829990835),
            (0.4441427359131531, 0.38013360292792653),
        ],
        &[(0, 1), (1, 2), (2, 3)],
    );
}

#[test]
fn short_segment_beside_long_one() {
    build(
        &[
            (0.5262779849041228, -0.18953355654322246),
            (0.19507597140208333, 0.30486762117317756),
            (0.2112261870707135, 0.280197231985694),
            (0.1821522008347376, 0.30546312177727897),
            (0.19684192998991756, 0.2762259925193069),
        ],
        &[(0, 1), (2, 3)],
    );
}

#[test]
fn nearly_parallel_horizontals() {
    build(
        &[
            (0.5, -0.25000096153846174),
            (-0.5, -0.25000096153846174),
            (0.4896403846153846, 0.23890288461538464),
            (-0.36254423076923076, 0.23890288461538464),
            (0.4896365384615385, -0.23891442307692334),
        ],
        &[(0, 1), (2, 3), (4, 2)],
    );
}
