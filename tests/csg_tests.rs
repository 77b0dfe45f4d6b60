use approx::assert_relative_eq;
use bspcsg::{
    float_types::Real,
    mesh::{Mesh, polyhedron::Polyhedron},
    traits::CSGOps,
};
use nalgebra::{Matrix4, Point3, Vector3};

mod support;

use crate::support::{approx_eq, bounding_box, cuboid, in_box};

const VOLUME_EPS: Real = 1e-6;

fn overlapping_pair() -> (Mesh<()>, Mesh<()>) {
    (cuboid([0.0; 3], [1.0; 3]), cuboid([0.5; 3], [1.5; 3]))
}

#[test]
fn union_of_disjoint_cubes_keeps_every_face() {
    let a = cuboid([0.0; 3], [1.0; 3]);
    let b = cuboid([2.0; 3], [3.0; 3]);

    let u = a.union(&b);
    assert_eq!(u.polygons.len(), 12);
    assert!(approx_eq(u.volume(), 2.0, VOLUME_EPS));
    assert_eq!(bounding_box(&u.polygons), [0.0, 0.0, 0.0, 3.0, 3.0, 3.0]);
}

#[test]
fn union_with_empty_mesh() {
    let a = cuboid([0.0; 3], [1.0; 3]);
    let empty = Mesh::<()>::new();

    assert_eq!(a.union(&empty).polygons.len(), 6);
    assert_eq!(empty.union(&a).polygons.len(), 6);
}

#[test]
fn overlapping_volumes() {
    let (a, b) = overlapping_pair();

    assert_relative_eq!(a.union(&b).volume(), 1.875, epsilon = VOLUME_EPS);
    assert_relative_eq!(a.subtract(&b).volume(), 0.875, epsilon = VOLUME_EPS);
    assert_relative_eq!(b.subtract(&a).volume(), 0.875, epsilon = VOLUME_EPS);
    assert_relative_eq!(a.intersect(&b).volume(), 0.125, epsilon = VOLUME_EPS);
    assert_relative_eq!(a.xor(&b).volume(), 1.75, epsilon = VOLUME_EPS);
}

#[test]
fn results_face_outward() {
    let (a, b) = overlapping_pair();

    for result in [a.union(&b), a.subtract(&b), a.intersect(&b), a.xor(&b)] {
        assert!(result.signed_volume() > 0.0);
    }
}

#[test]
fn union_and_intersect_commute_in_volume() {
    let (a, b) = overlapping_pair();

    assert!(approx_eq(
        a.union(&b).volume(),
        b.union(&a).volume(),
        VOLUME_EPS
    ));
    assert!(approx_eq(
        a.intersect(&b).volume(),
        b.intersect(&a).volume(),
        VOLUME_EPS
    ));
}

#[test]
fn union_is_associative_in_volume() {
    let (a, b) = overlapping_pair();
    let c = cuboid([1.25; 3], [2.25; 3]);

    let left = a.union(&b).union(&c);
    let right = a.union(&b.union(&c));
    assert_relative_eq!(left.volume(), 2.859375, epsilon = VOLUME_EPS);
    assert_relative_eq!(right.volume(), left.volume(), epsilon = VOLUME_EPS);
}

#[test]
fn intersection_stays_inside_both_operands() {
    let (a, b) = overlapping_pair();
    let i = a.intersect(&b);

    assert!(!i.polygons.is_empty());
    for v in i.vertices() {
        assert!(in_box(&v.pos, [0.5; 3], [1.0; 3], 1e-9), "{:?}", v.pos);
    }
}

#[test]
fn subtraction_stays_inside_left_operand() {
    let (a, b) = overlapping_pair();
    for v in a.subtract(&b).vertices() {
        assert!(in_box(&v.pos, [0.0; 3], [1.0; 3], 1e-9), "{:?}", v.pos);
    }
}

#[test]
fn self_subtraction_is_empty() {
    let a = cuboid([0.0; 3], [1.0; 3]);
    let d = a.subtract(&a);
    assert!(approx_eq(d.volume(), 0.0, VOLUME_EPS));
    assert!(d.polygons.is_empty());
}

#[test]
fn double_inverse_is_identity() {
    let (a, _) = overlapping_pair();
    let inverted = a.inverse();

    assert!(inverted.signed_volume() < 0.0);
    assert_eq!(inverted.inverse().polygons, a.polygons);
}

#[test]
fn operands_are_left_untouched() {
    let (a, b) = overlapping_pair();
    let (a_before, b_before) = (a.polygons.clone(), b.polygons.clone());

    let _ = a.union(&b);
    let _ = a.subtract(&b);
    let _ = a.intersect(&b);
    let _ = a.xor(&b);
    let _ = a.inverse();

    assert_eq!(a.polygons, a_before);
    assert_eq!(b.polygons, b_before);
}

#[test]
fn metadata_follows_source_polygons() {
    let a: Mesh<&str> = Mesh::from_polyhedron(&Polyhedron::cuboid([0.0; 3], [1.0; 3]), Some("a"));
    let b: Mesh<&str> = Mesh::from_polyhedron(&Polyhedron::cuboid([0.5; 3], [1.5; 3]), Some("b"));

    let i = a.intersect(&b);
    assert_eq!(i.metadata, Some("a"));

    let tags: Vec<_> = i.polygons.iter().filter_map(|p| p.metadata().copied()).collect();
    assert_eq!(tags.len(), i.polygons.len());
    assert!(tags.contains(&"a"));
    assert!(tags.contains(&"b"));
}

#[test]
fn transform_translate_and_center() {
    let a = cuboid([0.0; 3], [1.0; 3]);

    let moved = a.translate(1.0, 2.0, 3.0);
    let bb = moved.bounding_box();
    assert_eq!(bb.mins, Point3::new(1.0, 2.0, 3.0));
    assert_eq!(bb.maxs, Point3::new(2.0, 3.0, 4.0));
    assert!(approx_eq(moved.volume(), 1.0, VOLUME_EPS));

    let centered = moved.center();
    let bb = centered.bounding_box();
    assert_eq!(bb.mins, Point3::new(-0.5, -0.5, -0.5));
    assert_eq!(bb.maxs, Point3::new(0.5, 0.5, 0.5));
}

#[test]
fn transform_keeps_planes_consistent() {
    let a = cuboid([0.0; 3], [1.0; 3]).rotate(30.0, 45.0, 60.0);

    assert!(approx_eq(a.signed_volume(), 1.0, 1e-9));
    for poly in &a.polygons {
        for v in &poly.vertices {
            assert!(poly.plane.distance(&v.pos).abs() < 1e-9);
            assert!(approx_eq(v.normal.dot(&poly.plane.normal()), 1.0, 1e-9));
        }
    }
}

#[test]
fn mirroring_keeps_faces_outward() {
    let a = cuboid([0.0; 3], [1.0; 3]);
    let mirrored = a.scale(-1.0, 1.0, 1.0);

    assert!(approx_eq(mirrored.signed_volume(), 1.0, 1e-12));
    assert_eq!(mirrored.bounding_box().mins, Point3::new(-1.0, 0.0, 0.0));

    let shear = Matrix4::new(
        1.0, 0.5, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    );
    assert!(approx_eq(a.transform(&shear).signed_volume(), 1.0, 1e-12));
}

#[test]
fn bounding_box_is_cached_until_invalidated() {
    let mut a = cuboid([0.0; 3], [1.0; 3]);
    assert_eq!(a.bounding_box().maxs, Point3::new(1.0, 1.0, 1.0));

    for poly in &mut a.polygons {
        for v in &mut poly.vertices {
            v.pos += Vector3::new(5.0, 0.0, 0.0);
        }
    }
    assert_eq!(a.bounding_box().maxs.x, 1.0);

    a.invalidate_bounding_box();
    assert_eq!(a.bounding_box().maxs.x, 6.0);
}

#[test]
fn surface_area_of_union() {
    let (a, b) = overlapping_pair();
    // two unit cubes minus the three hidden quarter faces of each
    assert!(approx_eq(a.union(&b).surface_area(), 12.0 - 6.0 * 0.25, 1e-9));
}

#[test]
fn contains_point() {
    let (a, b) = overlapping_pair();
    assert!(a.contains_point(&Point3::new(0.3, 0.4, 0.6)));
    assert!(!a.contains_point(&Point3::new(1.5, 0.5, 0.5)));
    assert!(!a.contains_point(&Point3::new(-0.2, 0.4, 0.6)));

    let d = a.subtract(&b);
    assert!(d.contains_point(&Point3::new(0.25, 0.25, 0.25)));
    assert!(!d.contains_point(&Point3::new(0.75, 0.75, 0.75)));
}

#[test]
fn ray_intersections_are_sorted() {
    let a = cuboid([0.0; 3], [1.0; 3]);
    let hits = a.ray_intersections(&Point3::new(-1.0, 0.3, 0.6), &Vector3::x());

    assert_eq!(hits.len(), 2);
    assert!(approx_eq(hits[0].1, 1.0, 1e-9));
    assert!(approx_eq(hits[1].1, 2.0, 1e-9));
    assert!(approx_eq(hits[1].0.x, 1.0, 1e-9));
}

#[test]
fn triangulate_preserves_volume() {
    let (a, b) = overlapping_pair();
    let u = a.union(&b);
    let tris = u.triangulate();

    assert!(tris.polygons.iter().all(|p| p.vertices.len() == 3));
    assert!(approx_eq(tris.volume(), 1.875, VOLUME_EPS));
}

#[test]
fn round_trip_through_polyhedron() {
    let a = cuboid([0.0; 3], [1.0; 3]);
    let poly = a.to_polyhedron();
    assert_eq!(poly.points().len(), 8);
    assert_eq!(poly.faces().len(), 6);

    let back: Mesh<()> = Mesh::from_polyhedron(&poly, None);
    assert_eq!(back.polygons, a.polygons);

    let (a, b) = overlapping_pair();
    let exported = a.union(&b).to_polyhedron();
    assert!(approx_eq(exported.volume(), 1.875, VOLUME_EPS));

    let triangles = a.union(&b).to_triangle_polyhedron();
    assert!(triangles.faces().iter().all(|f| f.len() == 3));
    assert!(approx_eq(triangles.volume(), 1.875, VOLUME_EPS));
}
